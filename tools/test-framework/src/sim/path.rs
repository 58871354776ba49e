/*!
   A path is the pair of endpoints connected by a client, a connection and
   a channel. The identifiers are filled in by the coordinator as the
   handshakes progress.
*/

use core::time::Duration;
use cosmwasm_std::IbcOrder;
use ibc_relayer_types::core::ics24_host::identifier::{
    ChainId, ChannelId, ClientId, ConnectionId, PortId,
};

use crate::error::Error;

/// Two weeks, the trusting period used when an endpoint does not set one.
pub const DEFAULT_TRUSTING_PERIOD: Duration = Duration::from_secs(14 * 24 * 60 * 60);

pub const TRANSFER_PORT: &str = "transfer";
pub const TRANSFER_VERSION: &str = "ics20-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn counterparty(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub trusting_period: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            trusting_period: DEFAULT_TRUSTING_PERIOD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub port_id: PortId,
    pub version: String,
    pub order: IbcOrder,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            port_id: PortId::transfer(),
            version: TRANSFER_VERSION.to_string(),
            order: IbcOrder::Unordered,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Endpoint {
    pub chain_id: ChainId,
    pub client_id: Option<ClientId>,
    pub connection_id: Option<ConnectionId>,
    pub channel_id: Option<ChannelId>,
    pub client_config: ClientConfig,
    pub channel_config: ChannelConfig,
}

impl Endpoint {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            client_id: None,
            connection_id: None,
            channel_id: None,
            client_config: ClientConfig::default(),
            channel_config: ChannelConfig::default(),
        }
    }

    pub fn client_id(&self) -> Result<&ClientId, Error> {
        self.client_id
            .as_ref()
            .ok_or_else(|| Error::missing_endpoint_id(self.chain_id.to_string(), "client".into()))
    }

    pub fn connection_id(&self) -> Result<&ConnectionId, Error> {
        self.connection_id.as_ref().ok_or_else(|| {
            Error::missing_endpoint_id(self.chain_id.to_string(), "connection".into())
        })
    }

    pub fn channel_id(&self) -> Result<&ChannelId, Error> {
        self.channel_id
            .as_ref()
            .ok_or_else(|| Error::missing_endpoint_id(self.chain_id.to_string(), "channel".into()))
    }

    pub fn port_id(&self) -> &PortId {
        &self.channel_config.port_id
    }
}

#[derive(Debug, Clone)]
pub struct Path {
    pub endpoint_a: Endpoint,
    pub endpoint_b: Endpoint,
}

impl Path {
    pub fn new(chain_a: &ChainId, chain_b: &ChainId) -> Self {
        Self {
            endpoint_a: Endpoint::new(chain_a.clone()),
            endpoint_b: Endpoint::new(chain_b.clone()),
        }
    }

    pub fn endpoint(&self, side: Side) -> &Endpoint {
        match side {
            Side::A => &self.endpoint_a,
            Side::B => &self.endpoint_b,
        }
    }

    pub fn endpoint_mut(&mut self, side: Side) -> &mut Endpoint {
        match side {
            Side::A => &mut self.endpoint_a,
            Side::B => &mut self.endpoint_b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_path_has_no_identifiers() {
        let path = Path::new(
            &ChainId::from_string("testchain0"),
            &ChainId::from_string("testchain1"),
        );

        assert!(path.endpoint(Side::A).client_id().is_err());
        assert!(path.endpoint(Side::B).channel_id().is_err());
        assert_eq!(path.endpoint_b.channel_config.port_id.as_str(), TRANSFER_PORT);
        assert_eq!(
            path.endpoint_a.client_config.trusting_period,
            DEFAULT_TRUSTING_PERIOD
        );
    }

    #[test]
    fn counterparty_side() {
        assert_eq!(Side::A.counterparty(), Side::B);
        assert_eq!(Side::B.counterparty(), Side::A);
    }
}
