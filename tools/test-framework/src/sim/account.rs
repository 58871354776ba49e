/*!
   Key pairs able to sign transactions for a simulated chain.
*/

use bech32::{ToBase32, Variant};
use cw_ibc_example::msg::{ExecuteMsg, GetCountResponse, QueryMsg};
use ibc_relayer_types::core::ics24_host::identifier::ChainId;
use ripemd::Ripemd160;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{handle_generic_error, Error};
use crate::sim::chain::{SimChain, TxResult};
use crate::sim::coordinator::Coordinator;
use crate::sim::wasm_msg::SimMsg;

/// Amount of the bond denom minted into every generated account.
pub const INITIAL_BALANCE: u128 = 100_000_000;

#[derive(Debug, Clone)]
pub struct Account {
    secret_key: SecretKey,
    public_key: PublicKey,
    address: String,
    account_number: u64,
    sequence: u64,
    chain_id: ChainId,
}

/// A transaction as submitted to [`SimChain::deliver_tx`].
#[derive(Debug, Clone)]
pub struct SignedTx {
    pub signer: String,
    pub account_number: u64,
    pub sequence: u64,
    pub msgs: Vec<SimMsg>,
    pub signature: Vec<u8>,
}

#[derive(Serialize)]
struct SignDoc<'a> {
    chain_id: &'a str,
    account_number: u64,
    sequence: u64,
    msgs: &'a [SimMsg],
}

/// The digest signed by the account, over the JSON encoded sign document.
pub fn sign_digest(
    chain_id: &ChainId,
    account_number: u64,
    sequence: u64,
    msgs: &[SimMsg],
) -> Result<Message, Error> {
    let sign_doc = SignDoc {
        chain_id: chain_id.as_str(),
        account_number,
        sequence,
        msgs,
    };

    let bytes = serde_json::to_vec(&sign_doc).map_err(handle_generic_error)?;
    let digest = Sha256::digest(bytes);

    Message::from_digest_slice(digest.as_slice()).map_err(handle_generic_error)
}

pub fn verify_signature(
    message: &Message,
    signature: &[u8],
    public_key: &PublicKey,
) -> Result<(), secp256k1::Error> {
    let signature = Signature::from_compact(signature)?;

    Secp256k1::verification_only().verify_ecdsa(message, &signature, public_key)
}

/// `bech32(prefix, ripemd160(sha256(compressed public key)))`
pub fn derive_address(prefix: &str, public_key: &PublicKey) -> Result<String, Error> {
    let sha = Sha256::digest(public_key.serialize());
    let hash = Ripemd160::digest(sha);

    derive_address_from_hash(prefix, &hash)
}

pub fn derive_address_from_hash(prefix: &str, hash: &[u8]) -> Result<String, Error> {
    bech32::encode(prefix, hash.to_base32(), Variant::Bech32).map_err(handle_generic_error)
}

impl Account {
    /**
       Generate a fresh key pair and register it as a base account on the
       given chain, funded with [`INITIAL_BALANCE`] of the bond denom.
    */
    pub fn generate(chain: &mut SimChain) -> Result<Self, Error> {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut secp256k1::rand::thread_rng());

        let address = derive_address(chain.account_prefix(), &public_key)?;
        let account_number = chain.register_account(&address, public_key, INITIAL_BALANCE)?;

        debug!(
            "generated account {} with number {} on chain {}",
            address,
            account_number,
            chain.chain_id()
        );

        Ok(Self {
            secret_key,
            public_key,
            address,
            account_number,
            sequence: 0,
            chain_id: chain.chain_id().clone(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn account_number(&self) -> u64 {
        self.account_number
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    pub(crate) fn bump_sequence(&mut self) {
        self.sequence += 1;
    }

    pub fn sign(&self, msgs: Vec<SimMsg>) -> Result<SignedTx, Error> {
        let message = sign_digest(&self.chain_id, self.account_number, self.sequence, &msgs)?;
        let signature = Secp256k1::signing_only().sign_ecdsa(&message, &self.secret_key);

        Ok(SignedTx {
            signer: self.address.clone(),
            account_number: self.account_number,
            sequence: self.sequence,
            msgs,
            signature: signature.serialize_compact().to_vec(),
        })
    }

    /**
       Sign and deliver the messages as a single transaction.

       On success a block is committed, the account sequence is bumped,
       the shared clock moves forward and the packets sent by the
       transaction are queued for relaying. A failed transaction leaves
       the chain state and the sequence untouched.
    */
    pub fn send(
        &mut self,
        coordinator: &mut Coordinator,
        msgs: Vec<SimMsg>,
    ) -> Result<TxResult, Error> {
        coordinator.update_time()?;

        let tx = self.sign(msgs)?;

        let chain = coordinator.chain_mut(&self.chain_id)?;
        let result = chain.deliver_tx(&tx)?;
        chain.next_block()?;

        self.bump_sequence();

        coordinator.increment_time()?;
        coordinator
            .chain_mut(&self.chain_id)?
            .capture_ibc_events(&result);

        Ok(result)
    }

    /// Increment the counter over `channel` and return the local count of
    /// that channel once the transaction is committed.
    pub fn execute_increment(
        &mut self,
        coordinator: &mut Coordinator,
        contract: &str,
        channel: &str,
    ) -> Result<u32, Error> {
        let msg = self.wasm_execute(
            contract,
            &ExecuteMsg::Increment {
                channel: channel.to_string(),
            },
            vec![],
        )?;

        self.send(coordinator, vec![msg])?;

        let response: GetCountResponse = coordinator.chain(&self.chain_id)?.query_smart(
            contract,
            &QueryMsg::GetCount {
                channel: channel.to_string(),
            },
        )?;

        Ok(response.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::MockClock;

    #[test]
    fn address_uses_chain_prefix() -> Result<(), Error> {
        let mut chain = SimChain::new(ChainId::from_string("testchain0"), MockClock::default())?;
        let account = Account::generate(&mut chain)?;

        assert!(account.address().starts_with("cosmos1"));
        assert_eq!(
            account.address(),
            derive_address("cosmos", account.public_key())?
        );
        assert_eq!(
            chain.balance(account.address(), chain.bond_denom()),
            INITIAL_BALANCE
        );

        Ok(())
    }

    #[test]
    fn account_numbers_are_sequential() -> Result<(), Error> {
        let mut chain = SimChain::new(ChainId::from_string("testchain0"), MockClock::default())?;

        let first = Account::generate(&mut chain)?;
        let second = Account::generate(&mut chain)?;

        assert_eq!(second.account_number(), first.account_number() + 1);
        assert_eq!(first.sequence(), 0);

        Ok(())
    }

    #[test]
    fn signature_verifies_against_public_key() -> Result<(), Error> {
        let mut chain = SimChain::new(ChainId::from_string("testchain0"), MockClock::default())?;
        let account = Account::generate(&mut chain)?;

        let tx = account.sign(vec![account.bank_send("cosmos1someone", vec![])])?;
        let digest = sign_digest(account.chain_id(), tx.account_number, tx.sequence, &tx.msgs)?;

        assert!(verify_signature(&digest, &tx.signature, account.public_key()).is_ok());

        let other = Account::generate(&mut chain)?;
        assert!(verify_signature(&digest, &tx.signature, other.public_key()).is_err());

        Ok(())
    }
}
