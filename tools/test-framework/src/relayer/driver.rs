use core::str::FromStr;
use core::time::Duration;
use eyre::eyre;
use serde_json as json;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use ibc_relayer_types::core::ics04_channel::channel::Ordering;
use ibc_relayer_types::core::ics04_channel::version::Version;
use ibc_relayer_types::core::ics24_host::identifier::{
    ChainId, ChannelId, ClientId, ConnectionId, PortId,
};

use crate::chain::cli::query::last_json_line;
use crate::chain::exec::{simple_exec, spawn_logged, ExecOutput};
use crate::error::Error;
use crate::relayer::config::{format_duration, Config};
use crate::types::env::{EnvWriter, ExportEnv};
use crate::types::process::ChildProcess;
use crate::util::mutex::MutexUtil;

/**
   Drives a `hermes` binary with a config file owned by the test.
*/
#[derive(Clone)]
pub struct RelayerDriver {
    /**
       The command path of the hermes binary.
    */
    pub command_path: String,

    /**
       The path to the relayer config saved on the filesystem.

       This allows users to test the relayer manually with the config file
       while the test is suspended.
    */
    pub config_path: PathBuf,

    /**
       The directory for the relayer's key store and log files.
    */
    pub home_path: PathBuf,

    pub config: Config,

    pub hang_on_fail: bool,

    process: Arc<Mutex<Option<ChildProcess>>>,
}

impl RelayerDriver {
    /**
       Create a new driver, saving `config` at `home_path/config.toml`.
    */
    pub fn new(
        command_path: &str,
        home_path: PathBuf,
        config: Config,
        hang_on_fail: bool,
    ) -> Result<Self, Error> {
        fs::create_dir_all(&home_path)?;

        let config_path = home_path.join("config.toml");
        config.save(&config_path)?;

        debug!("saved relayer config to {}", config_path.display());

        Ok(Self {
            command_path: command_path.to_string(),
            config_path,
            home_path,
            config,
            hang_on_fail,
            process: Arc::new(Mutex::new(None)),
        })
    }

    pub fn key_store_folder(&self) -> PathBuf {
        self.home_path.join("keys")
    }

    /**
       Run a one-shot hermes command with JSON output.
    */
    pub fn exec(&self, args: &[&str]) -> Result<ExecOutput, Error> {
        let config_path = self.config_path.display().to_string();

        let mut full_args = vec!["--config", &config_path, "--json"];
        full_args.extend_from_slice(args);

        simple_exec("hermes", &self.command_path, &full_args)
    }

    /**
       Run a one-shot hermes command and return the `result` field of its
       final JSON line, failing if the command reported an error status.
    */
    pub fn exec_json(&self, args: &[&str]) -> Result<json::Value, Error> {
        let output = self.exec(args)?;
        parse_result(&output.stdout)
    }

    /**
       Import the key for `chain_id` from a mnemonic.
    */
    pub fn add_key(&self, chain_id: &ChainId, key_name: &str, mnemonic: &str) -> Result<(), Error> {
        let mnemonic_path = self.home_path.join(format!("{}-mnemonic.txt", chain_id));
        fs::write(&mnemonic_path, mnemonic)?;

        self.exec_json(&[
            "keys",
            "add",
            "--chain",
            chain_id.as_str(),
            "--key-name",
            key_name,
            "--mnemonic-file",
            &mnemonic_path.display().to_string(),
            "--overwrite",
        ])?;

        Ok(())
    }

    /**
       Create a client on `host_chain` tracking `reference_chain`. When no
       trusting period is given, hermes derives one from the unbonding
       period of the reference chain.
    */
    pub fn create_client(
        &self,
        host_chain: &ChainId,
        reference_chain: &ChainId,
        trusting_period: Option<Duration>,
    ) -> Result<ClientId, Error> {
        let trusting_period = trusting_period.map(format_duration);

        let mut args = vec![
            "create",
            "client",
            "--host-chain",
            host_chain.as_str(),
            "--reference-chain",
            reference_chain.as_str(),
        ];

        if let Some(trusting_period) = &trusting_period {
            args.extend_from_slice(&["--trusting-period", trusting_period]);
        }

        let result = self.exec_json(&args)?;

        let client_id = find_string(&result, "client_id")
            .ok_or_else(|| eyre!("expected client_id in create client result: {}", result))?;

        let client_id = ClientId::from_str(&client_id)
            .map_err(|e| eyre!("invalid client id {}: {}", client_id, e))?;

        info!(
            "created client {} on chain {} tracking chain {}",
            client_id, host_chain, reference_chain
        );

        Ok(client_id)
    }

    /**
       Open a connection between two existing clients, returning the
       connection IDs on chain A and chain B.
    */
    pub fn create_connection(
        &self,
        chain_a: &ChainId,
        client_a: &ClientId,
        client_b: &ClientId,
    ) -> Result<(ConnectionId, ConnectionId), Error> {
        let result = self.exec_json(&[
            "create",
            "connection",
            "--a-chain",
            chain_a.as_str(),
            "--a-client",
            client_a.as_str(),
            "--b-client",
            client_b.as_str(),
        ])?;

        let connection_a = side_field(&result, "a_side", "connection_id")?;
        let connection_b = side_field(&result, "b_side", "connection_id")?;

        let connection_a = ConnectionId::from_str(&connection_a)
            .map_err(|e| eyre!("invalid connection id {}: {}", connection_a, e))?;
        let connection_b = ConnectionId::from_str(&connection_b)
            .map_err(|e| eyre!("invalid connection id {}: {}", connection_b, e))?;

        info!(
            "created connection {} <-> {} from chain {}",
            connection_a, connection_b, chain_a
        );

        Ok((connection_a, connection_b))
    }

    /**
       Open a channel over an existing connection, returning the channel
       IDs on chain A and chain B.
    */
    pub fn create_channel(
        &self,
        chain_a: &ChainId,
        connection_a: &ConnectionId,
        port_a: &PortId,
        port_b: &PortId,
        order: Ordering,
        version: &Version,
    ) -> Result<(ChannelId, ChannelId), Error> {
        let version = version.to_string();

        let result = self.exec_json(&[
            "create",
            "channel",
            "--a-chain",
            chain_a.as_str(),
            "--a-connection",
            connection_a.as_str(),
            "--a-port",
            port_a.as_str(),
            "--b-port",
            port_b.as_str(),
            "--order",
            order_flag(order),
            "--channel-version",
            &version,
        ])?;

        let channel_a = side_field(&result, "a_side", "channel_id")?;
        let channel_b = side_field(&result, "b_side", "channel_id")?;

        let channel_a = ChannelId::from_str(&channel_a)
            .map_err(|e| eyre!("invalid channel id {}: {}", channel_a, e))?;
        let channel_b = ChannelId::from_str(&channel_b)
            .map_err(|e| eyre!("invalid channel id {}: {}", channel_b, e))?;

        info!(
            "created channel {}/{} <-> {}/{}",
            port_a, channel_a, port_b, channel_b
        );

        Ok((channel_a, channel_b))
    }

    pub fn update_client(&self, host_chain: &ChainId, client_id: &ClientId) -> Result<(), Error> {
        self.exec_json(&[
            "update",
            "client",
            "--host-chain",
            host_chain.as_str(),
            "--client",
            client_id.as_str(),
        ])?;

        Ok(())
    }

    /**
       List the channels known on `chain_id` as port and channel ID pairs.
    */
    pub fn query_channels(&self, chain_id: &ChainId) -> Result<Vec<(PortId, ChannelId)>, Error> {
        let result = self.exec_json(&["query", "channels", "--chain", chain_id.as_str()])?;

        parse_port_channels(&result)
    }

    /**
       Spawn `hermes start` in the background, replacing any process
       previously started by this driver.
    */
    pub fn start(&self) -> Result<(), Error> {
        let config_path = self.config_path.display().to_string();

        let child = spawn_logged(
            "hermes",
            &self.command_path,
            &["--config", &config_path, "start"],
            &self.home_path.join("stdout.log").display().to_string(),
            &self.home_path.join("stderr.log").display().to_string(),
        )?;

        info!("started relayer with config {}", config_path);

        let mut process = self.process.acquire_mutex()?;

        *process = Some(child);

        Ok(())
    }

    /// Stop the relayer process started by [`start`](Self::start), if any.
    pub fn stop(&self) -> Result<(), Error> {
        let mut process = self.process.acquire_mutex()?;

        if let Some(mut child) = process.take() {
            child.kill()?;
            info!("stopped relayer");
        }

        Ok(())
    }

    pub fn is_running(&self) -> Result<bool, Error> {
        let mut process = self.process.acquire_mutex()?;

        Ok(process.as_mut().map(|child| child.is_running()).unwrap_or(false))
    }
}

impl ExportEnv for RelayerDriver {
    fn export_env(&self, writer: &mut impl EnvWriter) {
        writer.write_env("RELAYER_CMD", &self.command_path);
        writer.write_env("RELAYER_CONFIG", &format!("{}", self.config_path.display()));
    }
}

fn order_flag(order: Ordering) -> &'static str {
    match order {
        Ordering::Ordered => "ordered",
        _ => "unordered",
    }
}

fn parse_result(stdout: &str) -> Result<json::Value, Error> {
    let output = last_json_line(stdout)?;

    let status = output
        .get("status")
        .and_then(|status| status.as_str())
        .unwrap_or_default();

    let result = output.get("result").cloned().unwrap_or(json::Value::Null);

    if status == "success" {
        Ok(result)
    } else {
        Err(Error::relayer(result.to_string()))
    }
}

fn side_field(result: &json::Value, side: &str, field: &str) -> Result<String, Error> {
    result
        .get(side)
        .and_then(|side| side.get(field))
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
        .ok_or_else(|| Error::generic(eyre!("expected {}.{} in relayer result: {}", side, field, result)))
}

/**
   Search a JSON value depth first for a string field named `key`.
*/
fn find_string(value: &json::Value, key: &str) -> Option<String> {
    match value {
        json::Value::Object(fields) => fields
            .get(key)
            .and_then(|value| value.as_str())
            .map(|value| value.to_string())
            .or_else(|| fields.values().find_map(|value| find_string(value, key))),
        json::Value::Array(items) => items.iter().find_map(|item| find_string(item, key)),
        _ => None,
    }
}

fn parse_port_channels(result: &json::Value) -> Result<Vec<(PortId, ChannelId)>, Error> {
    let entries = result
        .as_array()
        .ok_or_else(|| eyre!("expected a list of channels: {}", result))?;

    entries
        .iter()
        .map(|entry| {
            let port = entry
                .get("port_id")
                .and_then(|port| port.as_str())
                .ok_or_else(|| eyre!("expected port_id in {}", entry))?;
            let channel = entry
                .get("channel_id")
                .and_then(|channel| channel.as_str())
                .ok_or_else(|| eyre!("expected channel_id in {}", entry))?;

            let port = PortId::from_str(port).map_err(|e| eyre!("invalid port {}: {}", port, e))?;
            let channel = ChannelId::from_str(channel)
                .map_err(|e| eyre!("invalid channel {}: {}", channel, e))?;

            Ok((port, channel))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_of_last_line_is_returned() {
        let stdout = concat!(
            "{\"timestamp\":\"..\",\"level\":\"INFO\",\"fields\":{\"message\":\"creating client\"}}\n",
            "{\"result\":{\"CreateClient\":{\"client_id\":\"07-tendermint-1\",\"client_type\":\"07-tendermint\"}},\"status\":\"success\"}\n"
        );

        let result = parse_result(stdout).unwrap();

        assert_eq!(find_string(&result, "client_id").as_deref(), Some("07-tendermint-1"));
    }

    #[test]
    fn error_status_is_an_error() {
        let stdout = "{\"result\":\"client is expired\",\"status\":\"error\"}";

        assert!(parse_result(stdout).is_err());
    }

    #[test]
    fn channel_sides_are_parsed() {
        let result = json!({
            "a_side": { "channel_id": "channel-0", "port_id": "wasm.juno1a" },
            "b_side": { "channel_id": "channel-3", "port_id": "wasm.juno1b" },
            "ordering": "Unordered"
        });

        assert_eq!(side_field(&result, "a_side", "channel_id").unwrap(), "channel-0");
        assert_eq!(side_field(&result, "b_side", "channel_id").unwrap(), "channel-3");
        assert!(side_field(&result, "c_side", "channel_id").is_err());
    }

    #[test]
    fn port_channels_are_parsed() {
        let result = json!([
            { "channel_id": "channel-0", "port_id": "transfer" },
            { "channel_id": "channel-1", "port_id": "wasm.juno1contract" }
        ]);

        let channels = parse_port_channels(&result).unwrap();

        assert_eq!(channels.len(), 2);
        assert_eq!(channels[1].0.as_str(), "wasm.juno1contract");
        assert_eq!(channels[1].1, ChannelId::new(1));
        assert_eq!(order_flag(Ordering::Ordered), "ordered");
        assert_eq!(order_flag(Ordering::Unordered), "unordered");
    }
}
