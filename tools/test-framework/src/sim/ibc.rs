/*!
   The IBC state kept by a simulated chain.

   Only the parts the test scenarios observe are tracked: light client
   consensus times, connection and channel handshake states, packet
   commitments, receipts and acknowledgements. Proofs are not modelled;
   the coordinator checks the counterparty state directly instead.
*/

use core::time::Duration;
use cosmwasm_std::{Binary, IbcOrder, IbcPacket, Timestamp};
use eyre::eyre;
use ibc_relayer_types::core::ics24_host::identifier::{
    ChainId, ChannelId, ClientId, ConnectionId, PortId,
};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Error;
use crate::types::client::ClientStatus;

/// Identifies a packet by its port, channel and sequence on one side.
pub type PacketKey = (PortId, ChannelId, u64);

#[derive(Debug, Clone)]
pub struct ClientState {
    pub counterparty_chain_id: ChainId,
    pub trusting_period: Duration,
    pub latest_height: u64,
    pub latest_timestamp: Timestamp,
    pub frozen: bool,
}

impl ClientState {
    pub fn status(&self, now: Timestamp) -> ClientStatus {
        if self.frozen {
            return ClientStatus::Frozen;
        }

        let trusting_period = u64::try_from(self.trusting_period.as_nanos()).unwrap_or(u64::MAX);
        let expires_at = self.latest_timestamp.nanos().saturating_add(trusting_period);

        if expires_at <= now.nanos() {
            ClientStatus::Expired
        } else {
            ClientStatus::Active
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Init,
    TryOpen,
    Open,
}

#[derive(Debug, Clone)]
pub struct ConnectionEnd {
    pub state: ConnectionState,
    pub client_id: ClientId,
    pub counterparty_client_id: ClientId,
    pub counterparty_connection_id: Option<ConnectionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Init,
    TryOpen,
    Open,
    Closed,
}

#[derive(Debug, Clone)]
pub struct ChannelEnd {
    pub state: ChannelState,
    pub order: IbcOrder,
    pub version: String,
    pub connection_id: ConnectionId,
    pub counterparty_port_id: PortId,
    pub counterparty_channel_id: Option<ChannelId>,
    pub next_sequence_send: u64,
}

#[derive(Debug, Clone, Default)]
pub struct IbcStore {
    pub clients: BTreeMap<ClientId, ClientState>,
    pub connections: BTreeMap<ConnectionId, ConnectionEnd>,
    pub channels: BTreeMap<(PortId, ChannelId), ChannelEnd>,
    pub commitments: BTreeMap<PacketKey, IbcPacket>,
    pub receipts: BTreeSet<PacketKey>,
    pub acknowledgements: BTreeMap<PacketKey, Binary>,
    next_client_sequence: u64,
    next_connection_sequence: u64,
    next_channel_sequence: u64,
}

impl IbcStore {
    pub fn add_client(&mut self, client: ClientState) -> Result<ClientId, Error> {
        let client_id: ClientId = format!("07-tendermint-{}", self.next_client_sequence)
            .parse()
            .map_err(|e| eyre!("invalid client id: {}", e))?;

        self.next_client_sequence += 1;
        self.clients.insert(client_id.clone(), client);

        Ok(client_id)
    }

    pub fn add_connection(&mut self, connection: ConnectionEnd) -> ConnectionId {
        let connection_id = ConnectionId::new(self.next_connection_sequence);

        self.next_connection_sequence += 1;
        self.connections.insert(connection_id.clone(), connection);

        connection_id
    }

    pub fn add_channel(&mut self, port_id: &PortId, channel: ChannelEnd) -> ChannelId {
        let channel_id = ChannelId::new(self.next_channel_sequence);

        self.next_channel_sequence += 1;
        self.channels
            .insert((port_id.clone(), channel_id.clone()), channel);

        channel_id
    }

    pub fn client(&self, chain_id: &ChainId, client_id: &ClientId) -> Result<&ClientState, Error> {
        self.clients
            .get(client_id)
            .ok_or_else(|| Error::unknown_client(chain_id.to_string(), client_id.to_string()))
    }

    pub fn client_mut(
        &mut self,
        chain_id: &ChainId,
        client_id: &ClientId,
    ) -> Result<&mut ClientState, Error> {
        self.clients
            .get_mut(client_id)
            .ok_or_else(|| Error::unknown_client(chain_id.to_string(), client_id.to_string()))
    }

    pub fn connection(
        &self,
        chain_id: &ChainId,
        connection_id: &ConnectionId,
    ) -> Result<&ConnectionEnd, Error> {
        self.connections.get(connection_id).ok_or_else(|| {
            Error::unknown_connection(chain_id.to_string(), connection_id.to_string())
        })
    }

    pub fn connection_mut(
        &mut self,
        chain_id: &ChainId,
        connection_id: &ConnectionId,
    ) -> Result<&mut ConnectionEnd, Error> {
        self.connections.get_mut(connection_id).ok_or_else(|| {
            Error::unknown_connection(chain_id.to_string(), connection_id.to_string())
        })
    }

    pub fn channel(
        &self,
        chain_id: &ChainId,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<&ChannelEnd, Error> {
        self.channels
            .get(&(port_id.clone(), channel_id.clone()))
            .ok_or_else(|| {
                Error::unknown_channel(
                    chain_id.to_string(),
                    port_id.to_string(),
                    channel_id.to_string(),
                )
            })
    }

    pub fn channel_mut(
        &mut self,
        chain_id: &ChainId,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<&mut ChannelEnd, Error> {
        self.channels
            .get_mut(&(port_id.clone(), channel_id.clone()))
            .ok_or_else(|| {
                Error::unknown_channel(
                    chain_id.to_string(),
                    port_id.to_string(),
                    channel_id.to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(trusting_period: Duration) -> ClientState {
        ClientState {
            counterparty_chain_id: ChainId::from_string("testchain1"),
            trusting_period,
            latest_height: 1,
            latest_timestamp: Timestamp::from_seconds(1000),
            frozen: false,
        }
    }

    #[test]
    fn client_expires_at_the_end_of_the_trusting_period() {
        let client = client(Duration::from_secs(60));

        assert_eq!(client.status(Timestamp::from_seconds(1059)), ClientStatus::Active);
        assert_eq!(client.status(Timestamp::from_seconds(1060)), ClientStatus::Expired);
    }

    #[test]
    fn frozen_client_is_never_active() {
        let client = ClientState {
            frozen: true,
            ..client(Duration::from_secs(60))
        };

        assert_eq!(client.status(Timestamp::from_seconds(1000)), ClientStatus::Frozen);
    }

    #[test]
    fn identifiers_are_sequential() -> Result<(), Error> {
        let mut store = IbcStore::default();

        let client_a = store.add_client(client(Duration::from_secs(60)))?;
        let client_b = store.add_client(client(Duration::from_secs(60)))?;

        assert_eq!(client_a.as_str(), "07-tendermint-0");
        assert_eq!(client_b.as_str(), "07-tendermint-1");

        let connection_id = store.add_connection(ConnectionEnd {
            state: ConnectionState::Init,
            client_id: client_a,
            counterparty_client_id: client_b,
            counterparty_connection_id: None,
        });

        assert_eq!(connection_id.as_str(), "connection-0");

        Ok(())
    }
}
