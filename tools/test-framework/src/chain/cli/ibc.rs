use serde::Deserialize;
use serde_json as json;

use crate::chain::driver::ChainDriver;
use crate::error::{handle_generic_error, Error};

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionCounterparty {
    pub client_id: String,
    #[serde(default)]
    pub connection_id: String,
}

/// A connection end, as printed by `query ibc connection connections`.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentifiedConnection {
    pub id: String,
    pub client_id: String,
    pub state: String,
    pub counterparty: ConnectionCounterparty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelCounterparty {
    pub port_id: String,
    #[serde(default)]
    pub channel_id: String,
}

/// A channel end, as printed by `query ibc channel channels`.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentifiedChannel {
    pub state: String,
    pub ordering: String,
    pub counterparty: ChannelCounterparty,
    #[serde(default)]
    pub connection_hops: Vec<String>,
    pub version: String,
    pub port_id: String,
    pub channel_id: String,
}

#[derive(Debug, Deserialize)]
struct ConnectionsResponse {
    #[serde(default)]
    connections: Vec<IdentifiedConnection>,
}

#[derive(Debug, Deserialize)]
struct ChannelsResponse {
    #[serde(default)]
    channels: Vec<IdentifiedChannel>,
}

pub fn query_connections(driver: &ChainDriver) -> Result<Vec<IdentifiedConnection>, Error> {
    let output = driver.exec(&[
        "query",
        "ibc",
        "connection",
        "connections",
        "--node",
        &driver.rpc_listen_address(),
        "--output",
        "json",
    ])?;

    parse_connections(&output.stdout)
}

pub fn query_channels(driver: &ChainDriver) -> Result<Vec<IdentifiedChannel>, Error> {
    let output = driver.exec(&[
        "query",
        "ibc",
        "channel",
        "channels",
        "--node",
        &driver.rpc_listen_address(),
        "--output",
        "json",
    ])?;

    parse_channels(&output.stdout)
}

pub fn parse_connections(raw: &str) -> Result<Vec<IdentifiedConnection>, Error> {
    let response: ConnectionsResponse = json::from_str(raw).map_err(handle_generic_error)?;
    Ok(response.connections)
}

pub fn parse_channels(raw: &str) -> Result<Vec<IdentifiedChannel>, Error> {
    let response: ChannelsResponse = json::from_str(raw).map_err(handle_generic_error)?;
    Ok(response.channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_include_counterparty() {
        let raw = r#"{
            "channels": [
                {
                    "state": "STATE_OPEN",
                    "ordering": "ORDER_UNORDERED",
                    "counterparty": { "port_id": "wasm.juno1b", "channel_id": "channel-1" },
                    "connection_hops": ["connection-0"],
                    "version": "counter-1",
                    "port_id": "wasm.juno1a",
                    "channel_id": "channel-0"
                }
            ],
            "pagination": { "next_key": null, "total": "0" },
            "height": { "revision_number": "0", "revision_height": "31" }
        }"#;

        let channels = parse_channels(raw).unwrap();

        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].counterparty.channel_id, "channel-1");
        assert_eq!(channels[0].connection_hops, vec!["connection-0"]);
    }

    #[test]
    fn connections_are_parsed() {
        let raw = r#"{
            "connections": [
                {
                    "id": "connection-0",
                    "client_id": "07-tendermint-0",
                    "versions": [{ "identifier": "1", "features": ["ORDER_ORDERED", "ORDER_UNORDERED"] }],
                    "state": "STATE_OPEN",
                    "counterparty": {
                        "client_id": "07-tendermint-0",
                        "connection_id": "connection-0",
                        "prefix": { "key_prefix": "aWJj" }
                    },
                    "delay_period": "0"
                }
            ]
        }"#;

        let connections = parse_connections(raw).unwrap();

        assert_eq!(connections[0].state, "STATE_OPEN");
        assert_eq!(connections[0].counterparty.connection_id, "connection-0");
        assert!(parse_connections("{}").unwrap().is_empty());
    }
}
