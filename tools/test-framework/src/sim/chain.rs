/*!
   An in-process chain able to run CosmWasm contracts and the subset of
   the IBC core handlers that the counter contract relies on.

   The chain state is a plain value: every transaction and every
   relayer message runs against it atomically, restoring the previous
   state when any step fails.
*/

use core::time::Duration;
use cosmwasm_std::testing::{MockApi, MockQuerier};
use cosmwasm_std::{
    from_json, to_json_vec, Addr, Attribute, BankMsg, Binary, BlockInfo, Coin, CosmosMsg, Deps,
    DepsMut, Env, Event, IbcAcknowledgement, IbcChannel, IbcChannelCloseMsg, IbcChannelConnectMsg,
    IbcChannelOpenMsg, IbcEndpoint, IbcMsg, IbcOrder, IbcPacket, IbcPacketAckMsg,
    IbcPacketReceiveMsg, IbcPacketTimeoutMsg, IbcTimeout, MessageInfo, QuerierWrapper, ReplyOn,
    SubMsg, Timestamp, TransactionInfo,
};
use eyre::{eyre, Report};
use ibc_relayer_types::core::ics24_host::identifier::{
    ChainId, ChannelId, ClientId, ConnectionId, PortId,
};
use secp256k1::PublicKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use subtle_encoding::{base64, hex};
use tracing::{debug, info};

use crate::error::{handle_generic_error, Error};
use crate::sim::account::{derive_address_from_hash, sign_digest, verify_signature, Account, SignedTx};
use crate::sim::clock::MockClock;
use crate::sim::contract::Contract;
use crate::sim::coordinator::TIME_INCREMENT;
use crate::sim::ibc::{
    ChannelEnd, ChannelState, ClientState, ConnectionEnd, ConnectionState, IbcStore,
};
use crate::sim::storage::SimStorage;
use crate::sim::wasm_msg::SimMsg;
use crate::types::client::ClientStatus;
use crate::types::contract::{ContractStateResp, KvPair};

pub const ACCOUNT_PREFIX: &str = "cosmos";
pub const BOND_DENOM: &str = "stake";

/// Contracts exporting IBC entry points are bound to `wasm.<address>`.
pub const WASM_PORT_PREFIX: &str = "wasm.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInfo {
    pub code_id: u64,
    pub label: String,
    pub admin: Option<String>,
    pub creator: String,
    pub ibc_port_id: Option<PortId>,
}

/// What a transaction or a relayed message produced.
#[derive(Debug, Clone, Default)]
pub struct TxResult {
    pub events: Vec<Event>,
    pub data: Option<Binary>,
    pub packets: Vec<IbcPacket>,
}

#[derive(Debug, Clone)]
struct ContractInstance {
    info: ContractInfo,
    storage: SimStorage,
}

#[derive(Debug, Clone)]
struct BaseAccount {
    account_number: u64,
    sequence: u64,
    public_key: PublicKey,
}

#[derive(Debug, Clone)]
struct ChainState {
    height: u64,
    block_time: Timestamp,
    accounts: BTreeMap<String, BaseAccount>,
    balances: BTreeMap<String, BTreeMap<String, u128>>,
    contracts: BTreeMap<String, ContractInstance>,
    ibc: IbcStore,
    next_account_number: u64,
    next_instance_id: u64,
}

pub struct SimChain {
    chain_id: ChainId,
    clock: MockClock,
    codes: Vec<Box<dyn Contract>>,
    state: ChainState,
    sender: Option<Account>,
    pending_packets: Vec<IbcPacket>,
}

impl SimChain {
    /**
       Create a chain at height 1 whose block time follows the given clock,
       with a funded default account used for contract instantiation and
       for submitting relayer messages.
    */
    pub fn new(chain_id: ChainId, clock: MockClock) -> Result<Self, Error> {
        let block_time = clock.now()?;

        let mut chain = Self {
            chain_id,
            clock,
            codes: Vec::new(),
            state: ChainState {
                height: 1,
                block_time,
                accounts: BTreeMap::new(),
                balances: BTreeMap::new(),
                contracts: BTreeMap::new(),
                ibc: IbcStore::default(),
                next_account_number: 0,
                next_instance_id: 1,
            },
            sender: None,
            pending_packets: Vec::new(),
        };

        chain.sender = Some(Account::generate(&mut chain)?);

        Ok(chain)
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    pub fn height(&self) -> u64 {
        self.state.height
    }

    pub fn block_time(&self) -> Timestamp {
        self.state.block_time
    }

    pub fn account_prefix(&self) -> &str {
        ACCOUNT_PREFIX
    }

    pub fn bond_denom(&self) -> &str {
        BOND_DENOM
    }

    /// The default account of the chain. IBC messages delivered by the
    /// coordinator name it as their relayer.
    pub fn sender(&self) -> Result<&Account, Error> {
        self.sender
            .as_ref()
            .ok_or_else(|| Error::generic(eyre!("chain {} has no default account", self.chain_id)))
    }

    pub fn balance(&self, address: &str, denom: &str) -> u128 {
        self.state
            .balances
            .get(address)
            .and_then(|balances| balances.get(denom))
            .copied()
            .unwrap_or_default()
    }

    pub fn account_sequence(&self, address: &str) -> Result<u64, Error> {
        Ok(self.base_account(address)?.sequence)
    }

    pub(crate) fn register_account(
        &mut self,
        address: &str,
        public_key: PublicKey,
        initial_balance: u128,
    ) -> Result<u64, Error> {
        if self.state.accounts.contains_key(address) {
            return Err(Error::generic(eyre!(
                "account {} already exists on chain {}",
                address,
                self.chain_id
            )));
        }

        let account_number = self.state.next_account_number;
        self.state.next_account_number += 1;

        self.state.accounts.insert(
            address.to_string(),
            BaseAccount {
                account_number,
                sequence: 0,
                public_key,
            },
        );

        self.mint(address, BOND_DENOM, initial_balance);

        Ok(account_number)
    }

    fn mint(&mut self, address: &str, denom: &str, amount: u128) {
        *self
            .state
            .balances
            .entry(address.to_string())
            .or_default()
            .entry(denom.to_string())
            .or_default() += amount;
    }

    fn base_account(&self, address: &str) -> Result<&BaseAccount, Error> {
        self.state
            .accounts
            .get(address)
            .ok_or_else(|| Error::unknown_account(self.chain_id.to_string(), address.to_string()))
    }

    /// Set the block time to the current time of the shared clock.
    pub fn update_time(&mut self) -> Result<(), Error> {
        self.state.block_time = self.clock.now()?;
        Ok(())
    }

    /// Commit the current block and start a new one at the clock's time.
    pub fn next_block(&mut self) -> Result<(), Error> {
        self.state.height += 1;
        self.state.block_time = self.clock.now()?;
        Ok(())
    }

    /// Run `f` against the chain, restoring the chain state if it fails.
    pub fn atomically<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let snapshot = self.state.clone();

        let result = f(self);

        if result.is_err() {
            self.state = snapshot;
        }

        result
    }

    /// Queue the packets sent by a committed transaction for relaying.
    pub fn capture_ibc_events(&mut self, result: &TxResult) {
        self.pending_packets.extend(result.packets.iter().cloned());
    }

    pub fn pending_packets(&self) -> &[IbcPacket] {
        &self.pending_packets
    }

    /// Drop a packet from the relay queue once it is acknowledged or timed out.
    pub fn remove_pending_packet(&mut self, packet: &IbcPacket) {
        self.pending_packets.retain(|pending| pending != packet);
    }

    pub fn store_code(&mut self, contract: Box<dyn Contract>) -> u64 {
        self.codes.push(contract);

        let code_id = self.codes.len() as u64;
        debug!("stored code {} on chain {}", code_id, self.chain_id);

        code_id
    }

    /**
       Instantiate a contract from the chain's default account, committing
       a block. Returns the address of the new contract.
    */
    pub fn instantiate_contract(
        &mut self,
        code_id: u64,
        msg: &impl Serialize,
    ) -> Result<String, Error> {
        let sender = self.sender()?.clone();
        let msg = sender.wasm_instantiate(code_id, msg, Some(sender.address()), vec![])?;

        let result = self.send_msgs(vec![msg])?;

        let address = result
            .data
            .ok_or_else(|| Error::generic(eyre!("instantiate returned no contract address")))?;

        String::from_utf8(address.to_vec()).map_err(handle_generic_error)
    }

    /**
       Deliver messages signed by the default account, committing a block
       and moving the shared clock forward on success.
    */
    pub fn send_msgs(&mut self, msgs: Vec<SimMsg>) -> Result<TxResult, Error> {
        self.update_time()?;

        let tx = self.sender()?.sign(msgs)?;
        let result = self.deliver_tx(&tx)?;

        self.next_block()?;

        if let Some(sender) = self.sender.as_mut() {
            sender.bump_sequence();
        }

        self.clock.increment(TIME_INCREMENT)?;
        self.update_time()?;
        self.capture_ibc_events(&result);

        Ok(result)
    }

    pub fn contract_info(&self, address: &str) -> Result<&ContractInfo, Error> {
        Ok(&self.contract_instance(address)?.info)
    }

    /// The IBC port of a contract, failing for contracts without IBC entry points.
    pub fn contract_port(&self, address: &str) -> Result<PortId, Error> {
        self.contract_info(address)?
            .ibc_port_id
            .clone()
            .ok_or_else(|| Error::generic(eyre!("contract {} has no IBC port", address)))
    }

    pub fn query_smart<T: DeserializeOwned>(
        &self,
        address: &str,
        msg: &impl Serialize,
    ) -> Result<T, Error> {
        let msg = to_json_vec(msg)?;

        let instance = self.contract_instance(address)?;
        let code = self.code(instance.info.code_id)?;

        let api = MockApi::default();
        let querier: MockQuerier = MockQuerier::new(&[]);
        let deps = Deps {
            storage: &instance.storage,
            api: &api,
            querier: QuerierWrapper::new(&querier),
        };

        let response = code
            .query(deps, self.env(address), &msg)
            .map_err(|e| Error::contract(address.to_string(), e.to_string()))?;

        Ok(from_json(&response)?)
    }

    /// Raw storage of a contract, in the shape returned by `query wasm contract-state all`.
    pub fn dump_contract_state(&self, address: &str) -> Result<ContractStateResp, Error> {
        let instance = self.contract_instance(address)?;

        let models = instance
            .storage
            .records()
            .map(|(key, value)| {
                let key = String::from_utf8(hex::encode_upper(key)).map_err(handle_generic_error)?;
                let value = String::from_utf8(base64::encode(value)).map_err(handle_generic_error)?;
                Ok(KvPair { key, value })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(ContractStateResp { models })
    }

    /**
       Check the signature and sequence of a transaction, then execute its
       messages in order. Any failing message rolls back the whole
       transaction, including the sequence bump.
    */
    pub fn deliver_tx(&mut self, tx: &SignedTx) -> Result<TxResult, Error> {
        let account = self.base_account(&tx.signer)?;

        if tx.sequence != account.sequence {
            return Err(Error::account_sequence_mismatch(
                tx.signer.clone(),
                account.sequence,
                tx.sequence,
            ));
        }

        if tx.account_number != account.account_number {
            return Err(Error::invalid_signature(tx.signer.clone()));
        }

        let digest = sign_digest(&self.chain_id, account.account_number, account.sequence, &tx.msgs)?;

        verify_signature(&digest, &tx.signature, &account.public_key)
            .map_err(|_| Error::invalid_signature(tx.signer.clone()))?;

        if let Some(msg) = tx.msgs.iter().find(|msg| msg.signer() != tx.signer) {
            return Err(Error::invalid_signature(msg.signer().to_string()));
        }

        self.atomically(|chain| {
            let mut result = TxResult::default();

            for msg in &tx.msgs {
                chain.execute_msg(msg, &mut result)?;
            }

            if let Some(account) = chain.state.accounts.get_mut(&tx.signer) {
                account.sequence += 1;
            }

            Ok(result)
        })
    }

    fn execute_msg(&mut self, msg: &SimMsg, result: &mut TxResult) -> Result<(), Error> {
        match msg {
            SimMsg::ExecuteContract {
                sender,
                contract,
                msg,
                funds,
            } => {
                self.transfer(sender, contract, funds)?;

                let info = MessageInfo {
                    sender: Addr::unchecked(sender),
                    funds: funds.clone(),
                };

                let response =
                    self.call_contract(contract, |code, deps, env| {
                        code.execute(deps, env, info, msg.as_slice())
                    })?;

                if response.data.is_some() {
                    result.data = response.data;
                }

                self.dispatch_response(
                    contract,
                    response.messages,
                    response.attributes,
                    response.events,
                    result,
                )
            }
            SimMsg::InstantiateContract {
                sender,
                admin,
                code_id,
                label,
                msg,
                funds,
            } => {
                let address = self.create_instance(*code_id, label, admin.clone(), sender)?;

                self.transfer(sender, &address, funds)?;

                let info = MessageInfo {
                    sender: Addr::unchecked(sender),
                    funds: funds.clone(),
                };

                let response = self.call_contract(&address, |code, deps, env| {
                    code.instantiate(deps, env, info, msg.as_slice())
                })?;

                result.events.push(
                    Event::new("instantiate")
                        .add_attribute("_contract_address", &address)
                        .add_attribute("code_id", code_id.to_string()),
                );

                self.dispatch_response(
                    &address,
                    response.messages,
                    response.attributes,
                    response.events,
                    result,
                )?;

                info!(
                    "instantiated code {} at {} on chain {}",
                    code_id, address, self.chain_id
                );

                result.data = Some(Binary::from(address.as_bytes()));

                Ok(())
            }
            SimMsg::BankSend {
                from_address,
                to_address,
                amount,
            } => self.transfer(from_address, to_address, amount),
        }
    }

    fn create_instance(
        &mut self,
        code_id: u64,
        label: &str,
        admin: Option<String>,
        creator: &str,
    ) -> Result<String, Error> {
        let has_ibc = self.code(code_id)?.has_ibc();

        let instance_id = self.state.next_instance_id;
        self.state.next_instance_id += 1;

        let address = contract_address(code_id, instance_id)?;

        let ibc_port_id = if has_ibc {
            Some(
                format!("{WASM_PORT_PREFIX}{address}")
                    .parse()
                    .map_err(|e| eyre!("invalid contract port: {}", e))?,
            )
        } else {
            None
        };

        self.state.contracts.insert(
            address.clone(),
            ContractInstance {
                info: ContractInfo {
                    code_id,
                    label: label.to_string(),
                    admin,
                    creator: creator.to_string(),
                    ibc_port_id,
                },
                storage: SimStorage::default(),
            },
        );

        Ok(address)
    }

    fn transfer(&mut self, from: &str, to: &str, coins: &[Coin]) -> Result<(), Error> {
        for coin in coins {
            let amount = coin.amount.u128();

            let balance = self
                .state
                .balances
                .entry(from.to_string())
                .or_default()
                .entry(coin.denom.clone())
                .or_default();

            if *balance < amount {
                return Err(Error::insufficient_funds(from.to_string(), coin.to_string()));
            }

            *balance -= amount;

            self.mint(to, &coin.denom, amount);
        }

        Ok(())
    }

    fn code(&self, code_id: u64) -> Result<&dyn Contract, Error> {
        code_id
            .checked_sub(1)
            .and_then(|index| self.codes.get(index as usize))
            .map(|code| code.as_ref())
            .ok_or_else(|| Error::unknown_code(self.chain_id.to_string(), code_id))
    }

    fn contract_instance(&self, address: &str) -> Result<&ContractInstance, Error> {
        self.state
            .contracts
            .get(address)
            .ok_or_else(|| Error::unknown_contract(self.chain_id.to_string(), address.to_string()))
    }

    fn env(&self, address: &str) -> Env {
        Env {
            block: BlockInfo {
                height: self.state.height,
                time: self.state.block_time,
                chain_id: self.chain_id.to_string(),
            },
            transaction: Some(TransactionInfo { index: 0 }),
            contract: cosmwasm_std::ContractInfo {
                address: Addr::unchecked(address),
            },
        }
    }

    /// Call into a contract with mutable access to its storage.
    fn call_contract<T>(
        &mut self,
        address: &str,
        f: impl FnOnce(&dyn Contract, DepsMut, Env) -> Result<T, Report>,
    ) -> Result<T, Error> {
        let env = self.env(address);

        let chain_id = self.chain_id.to_string();

        let instance = self
            .state
            .contracts
            .get_mut(address)
            .ok_or_else(|| Error::unknown_contract(chain_id.clone(), address.to_string()))?;

        let code_id = instance.info.code_id;

        let code = code_id
            .checked_sub(1)
            .and_then(|index| self.codes.get(index as usize))
            .ok_or_else(|| Error::unknown_code(chain_id, code_id))?;

        let api = MockApi::default();
        let querier: MockQuerier = MockQuerier::new(&[]);
        let deps = DepsMut {
            storage: &mut instance.storage,
            api: &api,
            querier: QuerierWrapper::new(&querier),
        };

        f(code.as_ref(), deps, env).map_err(|e| Error::contract(address.to_string(), e.to_string()))
    }

    fn dispatch_response(
        &mut self,
        contract: &str,
        messages: Vec<SubMsg>,
        attributes: Vec<Attribute>,
        events: Vec<Event>,
        result: &mut TxResult,
    ) -> Result<(), Error> {
        result.events.push(
            Event::new("wasm")
                .add_attribute("_contract_address", contract)
                .add_attributes(attributes),
        );

        result.events.extend(events.into_iter().map(|event| {
            Event::new(format!("wasm-{}", event.ty))
                .add_attribute("_contract_address", contract)
                .add_attributes(event.attributes)
        }));

        for sub_msg in messages {
            if sub_msg.reply_on != ReplyOn::Never {
                return Err(Error::unsupported_message(format!(
                    "submessage {} expects a reply",
                    sub_msg.id
                )));
            }

            self.dispatch_message(contract, sub_msg.msg, result)?;
        }

        Ok(())
    }

    fn dispatch_message(
        &mut self,
        contract: &str,
        msg: CosmosMsg,
        result: &mut TxResult,
    ) -> Result<(), Error> {
        match msg {
            CosmosMsg::Ibc(IbcMsg::SendPacket {
                channel_id,
                data,
                timeout,
            }) => {
                let port_id = self.contract_port(contract)?;
                let channel_id = parse_channel_id(&channel_id)?;

                let packet = self.send_packet(&port_id, &channel_id, data, timeout)?;
                result.packets.push(packet);

                Ok(())
            }
            CosmosMsg::Ibc(IbcMsg::CloseChannel { channel_id }) => {
                let port_id = self.contract_port(contract)?;
                let channel_id = parse_channel_id(&channel_id)?;

                self.close_channel(&port_id, &channel_id, false, result)
            }
            CosmosMsg::Bank(BankMsg::Send { to_address, amount }) => {
                self.transfer(contract, &to_address, &amount)
            }
            other => Err(Error::unsupported_message(format!("{other:?}"))),
        }
    }

    /// Find the contract bound to a `wasm.<address>` port.
    fn port_contract(&self, port_id: &PortId) -> Result<String, Error> {
        let address = port_id
            .as_str()
            .strip_prefix(WASM_PORT_PREFIX)
            .ok_or_else(|| eyre!("port {} is not bound to a contract", port_id))?;

        let instance = self.contract_instance(address)?;

        if instance.info.ibc_port_id.as_ref() != Some(port_id) {
            return Err(Error::generic(eyre!(
                "port {} is not bound to a contract",
                port_id
            )));
        }

        Ok(address.to_string())
    }

    pub fn client_state(&self, client_id: &ClientId) -> Result<&ClientState, Error> {
        self.state.ibc.client(&self.chain_id, client_id)
    }

    pub fn client_status(&self, client_id: &ClientId) -> Result<ClientStatus, Error> {
        Ok(self.client_state(client_id)?.status(self.state.block_time))
    }

    pub fn connection(&self, connection_id: &ConnectionId) -> Result<&ConnectionEnd, Error> {
        self.state.ibc.connection(&self.chain_id, connection_id)
    }

    pub fn channel(&self, port_id: &PortId, channel_id: &ChannelId) -> Result<&ChannelEnd, Error> {
        self.state.ibc.channel(&self.chain_id, port_id, channel_id)
    }

    pub fn packet_commitment(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: u64,
    ) -> Option<&IbcPacket> {
        self.state
            .ibc
            .commitments
            .get(&(port_id.clone(), channel_id.clone(), sequence))
    }

    pub fn has_packet_receipt(&self, port_id: &PortId, channel_id: &ChannelId, sequence: u64) -> bool {
        self.state
            .ibc
            .receipts
            .contains(&(port_id.clone(), channel_id.clone(), sequence))
    }

    pub fn packet_acknowledgement(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: u64,
    ) -> Option<&Binary> {
        self.state
            .ibc
            .acknowledgements
            .get(&(port_id.clone(), channel_id.clone(), sequence))
    }

    fn ensure_client_active(&self, client_id: &ClientId) -> Result<(), Error> {
        let status = self.client_status(client_id)?;

        if status != ClientStatus::Active {
            return Err(Error::client_not_active(
                self.chain_id.to_string(),
                client_id.to_string(),
                status.to_string(),
            ));
        }

        Ok(())
    }

    fn ensure_connection_client_active(&self, connection_id: &ConnectionId) -> Result<(), Error> {
        let client_id = self.connection(connection_id)?.client_id.clone();
        self.ensure_client_active(&client_id)
    }

    fn ensure_channel_open(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<ChannelEnd, Error> {
        let channel = self.channel(port_id, channel_id)?;

        if channel.state != ChannelState::Open {
            return Err(Error::channel_not_open(
                self.chain_id.to_string(),
                port_id.to_string(),
                channel_id.to_string(),
            ));
        }

        Ok(channel.clone())
    }

    fn ensure_connection_state(
        &self,
        connection_id: &ConnectionId,
        expected: ConnectionState,
    ) -> Result<(), Error> {
        let connection = self.connection(connection_id)?;

        if connection.state != expected {
            return Err(Error::generic(eyre!(
                "connection {} on chain {} is in state {:?}, expected {:?}",
                connection_id,
                self.chain_id,
                connection.state,
                expected
            )));
        }

        Ok(())
    }

    fn ensure_channel_state(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        expected: ChannelState,
    ) -> Result<ChannelEnd, Error> {
        let channel = self.channel(port_id, channel_id)?;

        if channel.state != expected {
            return Err(Error::generic(eyre!(
                "channel {}/{} on chain {} is in state {:?}, expected {:?}",
                port_id,
                channel_id,
                self.chain_id,
                channel.state,
                expected
            )));
        }

        Ok(channel.clone())
    }

    fn relayer_address(&self) -> Result<Addr, Error> {
        Ok(Addr::unchecked(self.sender()?.address()))
    }

    pub fn create_client(
        &mut self,
        counterparty_chain_id: &ChainId,
        counterparty_height: u64,
        counterparty_time: Timestamp,
        trusting_period: Duration,
    ) -> Result<ClientId, Error> {
        let client_id = self.state.ibc.add_client(ClientState {
            counterparty_chain_id: counterparty_chain_id.clone(),
            trusting_period,
            latest_height: counterparty_height,
            latest_timestamp: counterparty_time,
            frozen: false,
        })?;

        debug!(
            "created client {} of chain {} on chain {}",
            client_id, counterparty_chain_id, self.chain_id
        );

        Ok(client_id)
    }

    /// Record a newer consensus state of the counterparty. Clients that are
    /// no longer active cannot be updated.
    pub fn update_client(
        &mut self,
        client_id: &ClientId,
        counterparty_height: u64,
        counterparty_time: Timestamp,
    ) -> Result<(), Error> {
        self.ensure_client_active(client_id)?;

        let client = self.state.ibc.client_mut(&self.chain_id, client_id)?;

        if counterparty_height > client.latest_height {
            client.latest_height = counterparty_height;
            client.latest_timestamp = counterparty_time;
        }

        Ok(())
    }

    pub fn conn_open_init(
        &mut self,
        client_id: &ClientId,
        counterparty_client_id: &ClientId,
    ) -> Result<ConnectionId, Error> {
        self.client_state(client_id)?;

        Ok(self.state.ibc.add_connection(ConnectionEnd {
            state: ConnectionState::Init,
            client_id: client_id.clone(),
            counterparty_client_id: counterparty_client_id.clone(),
            counterparty_connection_id: None,
        }))
    }

    pub fn conn_open_try(
        &mut self,
        client_id: &ClientId,
        counterparty_client_id: &ClientId,
        counterparty_connection_id: &ConnectionId,
    ) -> Result<ConnectionId, Error> {
        self.ensure_client_active(client_id)?;

        Ok(self.state.ibc.add_connection(ConnectionEnd {
            state: ConnectionState::TryOpen,
            client_id: client_id.clone(),
            counterparty_client_id: counterparty_client_id.clone(),
            counterparty_connection_id: Some(counterparty_connection_id.clone()),
        }))
    }

    pub fn conn_open_ack(
        &mut self,
        connection_id: &ConnectionId,
        counterparty_connection_id: &ConnectionId,
    ) -> Result<(), Error> {
        self.ensure_connection_state(connection_id, ConnectionState::Init)?;
        self.ensure_connection_client_active(connection_id)?;

        let connection = self.state.ibc.connection_mut(&self.chain_id, connection_id)?;
        connection.state = ConnectionState::Open;
        connection.counterparty_connection_id = Some(counterparty_connection_id.clone());

        Ok(())
    }

    pub fn conn_open_confirm(&mut self, connection_id: &ConnectionId) -> Result<(), Error> {
        self.ensure_connection_state(connection_id, ConnectionState::TryOpen)?;
        self.ensure_connection_client_active(connection_id)?;

        self.state
            .ibc
            .connection_mut(&self.chain_id, connection_id)?
            .state = ConnectionState::Open;

        Ok(())
    }

    /**
       Start a channel handshake on `port_id`. The contract bound to the
       port may reject the channel or override the proposed version.
    */
    pub fn chan_open_init(
        &mut self,
        port_id: &PortId,
        connection_id: &ConnectionId,
        counterparty_port_id: &PortId,
        order: IbcOrder,
        version: &str,
    ) -> Result<ChannelId, Error> {
        self.connection(connection_id)?;
        let contract = self.port_contract(port_id)?;

        let channel_id = self.state.ibc.add_channel(
            port_id,
            ChannelEnd {
                state: ChannelState::Init,
                order,
                version: version.to_string(),
                connection_id: connection_id.clone(),
                counterparty_port_id: counterparty_port_id.clone(),
                counterparty_channel_id: None,
                next_sequence_send: 1,
            },
        );

        let channel = ibc_channel(port_id, &channel_id, self.channel(port_id, &channel_id)?);
        let msg = IbcChannelOpenMsg::new_init(channel);

        let response =
            self.call_contract(&contract, |code, deps, env| code.ibc_channel_open(deps, env, msg))?;

        if let Some(response) = response {
            self.state
                .ibc
                .channel_mut(&self.chain_id, port_id, &channel_id)?
                .version = response.version;
        }

        Ok(channel_id)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn chan_open_try(
        &mut self,
        port_id: &PortId,
        connection_id: &ConnectionId,
        counterparty_port_id: &PortId,
        counterparty_channel_id: &ChannelId,
        order: IbcOrder,
        version: &str,
        counterparty_version: &str,
    ) -> Result<ChannelId, Error> {
        self.ensure_connection_state(connection_id, ConnectionState::Open)?;
        self.ensure_connection_client_active(connection_id)?;
        let contract = self.port_contract(port_id)?;

        let channel_id = self.state.ibc.add_channel(
            port_id,
            ChannelEnd {
                state: ChannelState::TryOpen,
                order,
                version: version.to_string(),
                connection_id: connection_id.clone(),
                counterparty_port_id: counterparty_port_id.clone(),
                counterparty_channel_id: Some(counterparty_channel_id.clone()),
                next_sequence_send: 1,
            },
        );

        let channel = ibc_channel(port_id, &channel_id, self.channel(port_id, &channel_id)?);
        let msg = IbcChannelOpenMsg::new_try(channel, counterparty_version);

        let response =
            self.call_contract(&contract, |code, deps, env| code.ibc_channel_open(deps, env, msg))?;

        if let Some(response) = response {
            self.state
                .ibc
                .channel_mut(&self.chain_id, port_id, &channel_id)?
                .version = response.version;
        }

        Ok(channel_id)
    }

    pub fn chan_open_ack(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty_channel_id: &ChannelId,
        counterparty_version: &str,
    ) -> Result<TxResult, Error> {
        let channel = self.ensure_channel_state(port_id, channel_id, ChannelState::Init)?;
        self.ensure_connection_client_active(&channel.connection_id)?;
        let contract = self.port_contract(port_id)?;

        let channel = ChannelEnd {
            counterparty_channel_id: Some(counterparty_channel_id.clone()),
            ..channel
        };

        let msg = IbcChannelConnectMsg::new_ack(
            ibc_channel(port_id, channel_id, &channel),
            counterparty_version,
        );

        let response = self
            .call_contract(&contract, |code, deps, env| code.ibc_channel_connect(deps, env, msg))?;

        let mut result = TxResult::default();
        self.dispatch_response(
            &contract,
            response.messages,
            response.attributes,
            response.events,
            &mut result,
        )?;

        *self.state.ibc.channel_mut(&self.chain_id, port_id, channel_id)? = ChannelEnd {
            state: ChannelState::Open,
            ..channel
        };

        Ok(result)
    }

    pub fn chan_open_confirm(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<TxResult, Error> {
        let channel = self.ensure_channel_state(port_id, channel_id, ChannelState::TryOpen)?;
        self.ensure_connection_client_active(&channel.connection_id)?;
        let contract = self.port_contract(port_id)?;

        let msg = IbcChannelConnectMsg::new_confirm(ibc_channel(port_id, channel_id, &channel));

        let response = self
            .call_contract(&contract, |code, deps, env| code.ibc_channel_connect(deps, env, msg))?;

        let mut result = TxResult::default();
        self.dispatch_response(
            &contract,
            response.messages,
            response.attributes,
            response.events,
            &mut result,
        )?;

        self.state
            .ibc
            .channel_mut(&self.chain_id, port_id, channel_id)?
            .state = ChannelState::Open;

        Ok(result)
    }

    pub fn chan_close_init(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<TxResult, Error> {
        let mut result = TxResult::default();
        self.close_channel(port_id, channel_id, false, &mut result)?;
        Ok(result)
    }

    pub fn chan_close_confirm(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<TxResult, Error> {
        let mut result = TxResult::default();
        self.close_channel(port_id, channel_id, true, &mut result)?;
        Ok(result)
    }

    fn close_channel(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        confirm: bool,
        result: &mut TxResult,
    ) -> Result<(), Error> {
        let channel = self.channel(port_id, channel_id)?.clone();

        if channel.state == ChannelState::Closed {
            return Err(Error::channel_not_open(
                self.chain_id.to_string(),
                port_id.to_string(),
                channel_id.to_string(),
            ));
        }

        if confirm {
            self.ensure_connection_client_active(&channel.connection_id)?;
        }

        let contract = self.port_contract(port_id)?;
        let ibc_channel = ibc_channel(port_id, channel_id, &channel);

        let msg = if confirm {
            IbcChannelCloseMsg::new_confirm(ibc_channel)
        } else {
            IbcChannelCloseMsg::new_init(ibc_channel)
        };

        // Mark the channel closed before calling the contract, so that a
        // contract closing its own channel does not recurse.
        self.state
            .ibc
            .channel_mut(&self.chain_id, port_id, channel_id)?
            .state = ChannelState::Closed;

        let response = self
            .call_contract(&contract, |code, deps, env| code.ibc_channel_close(deps, env, msg))?;

        self.dispatch_response(
            &contract,
            response.messages,
            response.attributes,
            response.events,
            result,
        )?;

        info!(
            "closed channel {}/{} on chain {}",
            port_id, channel_id, self.chain_id
        );

        Ok(())
    }

    fn send_packet(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        data: Binary,
        timeout: IbcTimeout,
    ) -> Result<IbcPacket, Error> {
        let channel = self.ensure_channel_open(port_id, channel_id)?;
        self.ensure_connection_client_active(&channel.connection_id)?;

        let counterparty_channel_id = channel.counterparty_channel_id.ok_or_else(|| {
            Error::channel_not_open(
                self.chain_id.to_string(),
                port_id.to_string(),
                channel_id.to_string(),
            )
        })?;

        let sequence = channel.next_sequence_send;
        self.state
            .ibc
            .channel_mut(&self.chain_id, port_id, channel_id)?
            .next_sequence_send += 1;

        let packet = IbcPacket::new(
            data,
            IbcEndpoint {
                port_id: port_id.to_string(),
                channel_id: channel_id.to_string(),
            },
            IbcEndpoint {
                port_id: channel.counterparty_port_id.to_string(),
                channel_id: counterparty_channel_id.to_string(),
            },
            sequence,
            timeout,
        );

        self.state.ibc.commitments.insert(
            (port_id.clone(), channel_id.clone(), sequence),
            packet.clone(),
        );

        debug!(
            "sent packet {} on {}/{} of chain {}",
            sequence, port_id, channel_id, self.chain_id
        );

        Ok(packet)
    }

    /**
       Deliver a packet sent by the counterparty to the contract bound to
       its destination port, storing the receipt and the acknowledgement
       the contract wrote.
    */
    pub fn recv_packet(&mut self, packet: &IbcPacket) -> Result<(Binary, TxResult), Error> {
        let port_id = parse_port_id(&packet.dest.port_id)?;
        let channel_id = parse_channel_id(&packet.dest.channel_id)?;

        let channel = self.ensure_channel_open(&port_id, &channel_id)?;
        self.ensure_connection_client_active(&channel.connection_id)?;

        let timed_out_by_time = packet
            .timeout
            .timestamp()
            .map_or(false, |timestamp| self.state.block_time >= timestamp);

        let timed_out_by_height = packet
            .timeout
            .block()
            .map_or(false, |block| self.state.height >= block.height);

        if timed_out_by_time || timed_out_by_height {
            return Err(Error::packet_timed_out(
                self.chain_id.to_string(),
                packet.sequence,
            ));
        }

        let key = (port_id.clone(), channel_id.clone(), packet.sequence);

        if self.state.ibc.receipts.contains(&key) {
            return Err(Error::packet_already_received(
                self.chain_id.to_string(),
                packet.sequence,
            ));
        }

        let contract = self.port_contract(&port_id)?;
        let msg = IbcPacketReceiveMsg::new(packet.clone(), self.relayer_address()?);

        let response = self
            .call_contract(&contract, |code, deps, env| code.ibc_packet_receive(deps, env, msg))?;

        let acknowledgement = response.acknowledgement;

        let mut result = TxResult::default();
        self.dispatch_response(
            &contract,
            response.messages,
            response.attributes,
            response.events,
            &mut result,
        )?;

        self.state.ibc.receipts.insert(key.clone());
        self.state
            .ibc
            .acknowledgements
            .insert(key, acknowledgement.clone());

        Ok((acknowledgement, result))
    }

    pub fn acknowledge_packet(
        &mut self,
        packet: &IbcPacket,
        acknowledgement: &Binary,
    ) -> Result<TxResult, Error> {
        let (port_id, channel_id) = self.committed_packet(packet)?;

        let channel = self.ensure_channel_open(&port_id, &channel_id)?;
        self.ensure_connection_client_active(&channel.connection_id)?;

        let contract = self.port_contract(&port_id)?;
        let msg = IbcPacketAckMsg::new(
            IbcAcknowledgement::new(acknowledgement.clone()),
            packet.clone(),
            self.relayer_address()?,
        );

        let response =
            self.call_contract(&contract, |code, deps, env| code.ibc_packet_ack(deps, env, msg))?;

        let mut result = TxResult::default();
        self.dispatch_response(
            &contract,
            response.messages,
            response.attributes,
            response.events,
            &mut result,
        )?;

        self.state
            .ibc
            .commitments
            .remove(&(port_id, channel_id, packet.sequence));

        Ok(result)
    }

    /**
       Time out a packet this chain sent. The chain's client of the
       counterparty must be active and must have seen a consensus state
       past the packet's timeout.
    */
    pub fn timeout_packet(&mut self, packet: &IbcPacket) -> Result<TxResult, Error> {
        let (port_id, channel_id) = self.committed_packet(packet)?;

        let channel = self.ensure_channel_open(&port_id, &channel_id)?;
        self.ensure_connection_client_active(&channel.connection_id)?;

        let client_id = self.connection(&channel.connection_id)?.client_id.clone();
        let client = self.client_state(&client_id)?;

        let timed_out_by_time = packet
            .timeout
            .timestamp()
            .map_or(false, |timestamp| client.latest_timestamp >= timestamp);

        let timed_out_by_height = packet
            .timeout
            .block()
            .map_or(false, |block| client.latest_height >= block.height);

        if !timed_out_by_time && !timed_out_by_height {
            return Err(Error::generic(eyre!(
                "packet {} has not timed out yet on chain {}",
                packet.sequence,
                client.counterparty_chain_id
            )));
        }

        let contract = self.port_contract(&port_id)?;
        let msg = IbcPacketTimeoutMsg::new(packet.clone(), self.relayer_address()?);

        let response = self
            .call_contract(&contract, |code, deps, env| code.ibc_packet_timeout(deps, env, msg))?;

        let mut result = TxResult::default();
        self.dispatch_response(
            &contract,
            response.messages,
            response.attributes,
            response.events,
            &mut result,
        )?;

        self.state
            .ibc
            .commitments
            .remove(&(port_id.clone(), channel_id.clone(), packet.sequence));

        if channel.order == IbcOrder::Ordered {
            self.state
                .ibc
                .channel_mut(&self.chain_id, &port_id, &channel_id)?
                .state = ChannelState::Closed;
        }

        Ok(result)
    }

    fn committed_packet(&self, packet: &IbcPacket) -> Result<(PortId, ChannelId), Error> {
        let port_id = parse_port_id(&packet.src.port_id)?;
        let channel_id = parse_channel_id(&packet.src.channel_id)?;

        if self
            .packet_commitment(&port_id, &channel_id, packet.sequence)
            .is_none()
        {
            return Err(Error::generic(eyre!(
                "no commitment for packet {} on {}/{} of chain {}",
                packet.sequence,
                port_id,
                channel_id,
                self.chain_id
            )));
        }

        Ok((port_id, channel_id))
    }
}

/// `bech32(prefix, sha256("contract" || code id || instance id))`
fn contract_address(code_id: u64, instance_id: u64) -> Result<String, Error> {
    let mut hasher = Sha256::new();
    hasher.update(b"contract");
    hasher.update(code_id.to_be_bytes());
    hasher.update(instance_id.to_be_bytes());

    derive_address_from_hash(ACCOUNT_PREFIX, &hasher.finalize())
}

fn ibc_channel(port_id: &PortId, channel_id: &ChannelId, channel: &ChannelEnd) -> IbcChannel {
    IbcChannel::new(
        IbcEndpoint {
            port_id: port_id.to_string(),
            channel_id: channel_id.to_string(),
        },
        IbcEndpoint {
            port_id: channel.counterparty_port_id.to_string(),
            channel_id: channel
                .counterparty_channel_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        },
        channel.order.clone(),
        channel.version.clone(),
        channel.connection_id.to_string(),
    )
}

fn parse_port_id(port_id: &str) -> Result<PortId, Error> {
    Ok(port_id
        .parse()
        .map_err(|e| eyre!("invalid port id {}: {}", port_id, e))?)
}

fn parse_channel_id(channel_id: &str) -> Result<ChannelId, Error> {
    Ok(channel_id
        .parse()
        .map_err(|e| eyre!("invalid channel id {}: {}", channel_id, e))?)
}
