/*!
    Helper functions for modifying the full node config in TOML, and
    the genesis file in JSON.

    Since we do not need to understand the full structure of the
    CosmosSDK config, we are updating the config as dynamic TOML
    values instead of serializing them into proper types.
*/

use core::time::Duration;
use eyre::{eyre, Report as Error};
use toml::Value;

/// Set the `rpc` field in the full node config.
pub fn set_rpc_port(config: &mut Value, port: u16) -> Result<(), Error> {
    config
        .get_mut("rpc")
        .ok_or_else(|| eyre!("expect rpc section"))?
        .as_table_mut()
        .ok_or_else(|| eyre!("expect object"))?
        .insert(
            "laddr".to_string(),
            format!("tcp://0.0.0.0:{}", port).into(),
        );

    Ok(())
}

/// Set the `rpc.pprof_laddr` field, which defaults to a fixed port.
pub fn set_pprof_port(config: &mut Value, port: u16) -> Result<(), Error> {
    config
        .get_mut("rpc")
        .ok_or_else(|| eyre!("expect rpc section"))?
        .as_table_mut()
        .ok_or_else(|| eyre!("expect object"))?
        .insert(
            "pprof_laddr".to_string(),
            format!("localhost:{}", port).into(),
        );

    Ok(())
}

pub fn set_grpc_port(config: &mut Value, port: u16) -> Result<(), Error> {
    config
        .get_mut("grpc")
        .ok_or_else(|| eyre!("expect grpc section"))?
        .as_table_mut()
        .ok_or_else(|| eyre!("expect object"))?
        .insert("address".to_string(), format!("0.0.0.0:{}", port).into());

    Ok(())
}

pub fn disable_grpc_web(config: &mut Value) -> Result<(), Error> {
    if let Some(field) = config.get_mut("grpc-web") {
        field
            .as_table_mut()
            .ok_or_else(|| eyre!("expect object"))?
            .insert("enable".to_string(), false.into());
    }

    Ok(())
}

pub fn disable_api(config: &mut Value) -> Result<(), Error> {
    if let Some(field) = config.get_mut("api") {
        field
            .as_table_mut()
            .ok_or_else(|| eyre!("expect object"))?
            .insert("enable".to_string(), false.into());
    }

    Ok(())
}

/// Set the `p2p` field in the full node config.
pub fn set_p2p_port(config: &mut Value, port: u16) -> Result<(), Error> {
    config
        .get_mut("p2p")
        .ok_or_else(|| eyre!("expect p2p section"))?
        .as_table_mut()
        .ok_or_else(|| eyre!("expect object"))?
        .insert(
            "laddr".to_string(),
            format!("tcp://0.0.0.0:{}", port).into(),
        );

    Ok(())
}

/// Set the `consensus.timeout_commit` field in the full node config.
pub fn set_timeout_commit(config: &mut Value, duration: Duration) -> Result<(), Error> {
    config
        .get_mut("consensus")
        .ok_or_else(|| eyre!("expect consensus section"))?
        .as_table_mut()
        .ok_or_else(|| eyre!("expect object"))?
        .insert(
            "timeout_commit".to_string(),
            format!("{}ms", duration.as_millis()).into(),
        );

    Ok(())
}

/// Set the `consensus.timeout_propose` field in the full node config.
pub fn set_timeout_propose(config: &mut Value, duration: Duration) -> Result<(), Error> {
    config
        .get_mut("consensus")
        .ok_or_else(|| eyre!("expect consensus section"))?
        .as_table_mut()
        .ok_or_else(|| eyre!("expect object"))?
        .insert(
            "timeout_propose".to_string(),
            format!("{}ms", duration.as_millis()).into(),
        );

    Ok(())
}

/// Set the `log_level` field in the full node config.
pub fn set_log_level(config: &mut Value, log_level: &str) -> Result<(), Error> {
    config
        .as_table_mut()
        .ok_or_else(|| eyre!("expect object"))?
        .insert("log_level".to_string(), log_level.into());

    Ok(())
}

pub fn set_minimum_gas_price(config: &mut Value, price: &str) -> Result<(), Error> {
    config
        .as_table_mut()
        .ok_or_else(|| eyre!("expect object"))?
        .insert("minimum-gas-prices".to_string(), price.into());

    Ok(())
}

/**
   Replace every occurrence of the default `"stake"` denomination in the
   genesis app state with `denom`, so that staking, minting, fees and
   governance deposits all use the chain's native token.
*/
pub fn set_genesis_denom(genesis: &mut serde_json::Value, denom: &str) -> Result<(), Error> {
    let app_state = genesis
        .get_mut("app_state")
        .ok_or_else(|| eyre!("expect app_state in genesis file"))?;

    replace_denom(app_state, "stake", denom);

    Ok(())
}

fn replace_denom(value: &mut serde_json::Value, from: &str, to: &str) {
    match value {
        serde_json::Value::String(s) if s == from => {
            *s = to.to_string();
        }
        serde_json::Value::Array(items) => {
            for item in items.iter_mut() {
                replace_denom(item, from, to);
            }
        }
        serde_json::Value::Object(fields) => {
            for (_, field) in fields.iter_mut() {
                replace_denom(field, from, to);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ports_and_timeouts_are_written() {
        let mut config: Value = toml::from_str(
            r#"
            log_level = "debug"

            [rpc]
            laddr = "tcp://127.0.0.1:26657"

            [p2p]
            laddr = "tcp://0.0.0.0:26656"

            [consensus]
            timeout_commit = "5s"
            "#,
        )
        .unwrap();

        set_rpc_port(&mut config, 3000).unwrap();
        set_p2p_port(&mut config, 3001).unwrap();
        set_timeout_commit(&mut config, Duration::from_millis(500)).unwrap();
        set_log_level(&mut config, "info").unwrap();

        assert_eq!(config["rpc"]["laddr"].as_str(), Some("tcp://0.0.0.0:3000"));
        assert_eq!(config["p2p"]["laddr"].as_str(), Some("tcp://0.0.0.0:3001"));
        assert_eq!(config["consensus"]["timeout_commit"].as_str(), Some("500ms"));
        assert_eq!(config["log_level"].as_str(), Some("info"));
        assert!(set_grpc_port(&mut config, 3002).is_err());
    }

    #[test]
    fn genesis_denoms_are_replaced() {
        let mut genesis = json!({
            "app_state": {
                "staking": { "params": { "bond_denom": "stake" } },
                "mint": { "params": { "mint_denom": "stake" } },
                "gov": { "params": { "min_deposit": [{ "denom": "stake", "amount": "10" }] } },
                "bank": { "denom_metadata": [] }
            }
        });

        set_genesis_denom(&mut genesis, "ujuno").unwrap();

        assert_eq!(genesis["app_state"]["staking"]["params"]["bond_denom"], "ujuno");
        assert_eq!(genesis["app_state"]["mint"]["params"]["mint_denom"], "ujuno");
        assert_eq!(
            genesis["app_state"]["gov"]["params"]["min_deposit"][0]["denom"],
            "ujuno"
        );
    }
}
