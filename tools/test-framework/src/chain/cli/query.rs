use core::time::Duration;
use eyre::eyre;
use serde_json as json;
use tracing::debug;

use crate::chain::driver::ChainDriver;
use crate::error::{handle_generic_error, Error};
use crate::util::retry::assert_eventually_succeed;

/**
   Number of one second attempts to wait for a broadcasted transaction
   to be included in a block.
*/
const WAIT_TX_ATTEMPTS: u16 = 30;

pub fn query_latest_height(driver: &ChainDriver) -> Result<u64, Error> {
    let output = driver.exec(&["status", "--node", &driver.rpc_listen_address()])?;

    // Older SDK versions print the status to stderr.
    let raw = if output.stdout.trim().is_empty() {
        output.stderr
    } else {
        output.stdout
    };

    let status: json::Value = json::from_str(&raw).map_err(handle_generic_error)?;

    parse_latest_height(&status)
}

pub fn parse_latest_height(status: &json::Value) -> Result<u64, Error> {
    let height = status
        .get("sync_info")
        .or_else(|| status.get("SyncInfo"))
        .and_then(|info| info.get("latest_block_height"))
        .and_then(|height| height.as_str())
        .ok_or_else(|| eyre!("expected sync_info.latest_block_height in status: {}", status))?;

    height.parse().map_err(handle_generic_error)
}

/**
   Query a transaction by hash, retrying until it has been included in
   a block. Fails if the transaction was executed with a non zero code.
*/
pub fn query_tx(driver: &ChainDriver, tx_hash: &str) -> Result<json::Value, Error> {
    let tx = assert_eventually_succeed(
        &format!("transaction {} to be committed", tx_hash),
        WAIT_TX_ATTEMPTS,
        Duration::from_secs(1),
        || {
            let output = driver.exec(&[
                "query",
                "tx",
                tx_hash,
                "--node",
                &driver.rpc_listen_address(),
                "--output",
                "json",
            ])?;

            json::from_str::<json::Value>(&output.stdout).map_err(handle_generic_error)
        },
    )?;

    check_tx_code(&tx)?;

    Ok(tx)
}

/**
   Extract the transaction hash from the output of a broadcasted
   transaction, after checking that it passed `CheckTx`.
*/
pub fn parse_tx_hash(broadcast_output: &str) -> Result<String, Error> {
    let response = last_json_line(broadcast_output)?;

    check_tx_code(&response)?;

    let tx_hash = response
        .get("txhash")
        .and_then(|hash| hash.as_str())
        .ok_or_else(|| eyre!("expected txhash in broadcast output: {}", broadcast_output))?;

    debug!("broadcasted transaction {}", tx_hash);

    Ok(tx_hash.to_string())
}

fn check_tx_code(response: &json::Value) -> Result<(), Error> {
    let code = response.get("code").and_then(|code| code.as_u64()).unwrap_or(0);

    if code != 0 {
        let raw_log = response
            .get("raw_log")
            .and_then(|log| log.as_str())
            .unwrap_or_default()
            .to_string();

        return Err(Error::tx_failed(code, raw_log));
    }

    Ok(())
}

/**
   Find the value of attribute `key` of the first event of type
   `event_type` in a transaction response.

   Both the per message `logs` of older SDK versions and the flat
   `events` list of newer ones are searched.
*/
pub fn find_event_attribute(tx: &json::Value, event_type: &str, key: &str) -> Option<String> {
    let from_logs = tx
        .get("logs")
        .and_then(|logs| logs.as_array())
        .into_iter()
        .flatten()
        .filter_map(|log| log.get("events"))
        .find_map(|events| find_in_events(events, event_type, key));

    from_logs.or_else(|| {
        tx.get("events")
            .and_then(|events| find_in_events(events, event_type, key))
    })
}

fn find_in_events(events: &json::Value, event_type: &str, key: &str) -> Option<String> {
    events
        .as_array()?
        .iter()
        .filter(|event| event.get("type").and_then(|t| t.as_str()) == Some(event_type))
        .filter_map(|event| event.get("attributes").and_then(|attrs| attrs.as_array()))
        .flatten()
        .find(|attr| attr.get("key").and_then(|k| k.as_str()) == Some(key))
        .and_then(|attr| attr.get("value"))
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
}

/**
   Commands run with `--output json` may print warnings before the JSON
   document, so only the last line that parses is taken.
*/
pub fn last_json_line(output: &str) -> Result<json::Value, Error> {
    output
        .lines()
        .rev()
        .filter(|line| line.trim_start().starts_with('{'))
        .find_map(|line| json::from_str(line).ok())
        .ok_or_else(|| Error::generic(eyre!("expected JSON output, got: {}", output)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn height_is_read_from_either_status_format() {
        let new = json!({ "sync_info": { "latest_block_height": "42" } });
        let old = json!({ "SyncInfo": { "latest_block_height": "7" } });

        assert_eq!(parse_latest_height(&new).unwrap(), 42);
        assert_eq!(parse_latest_height(&old).unwrap(), 7);
        assert!(parse_latest_height(&json!({})).is_err());
    }

    #[test]
    fn attributes_are_found_in_logs_and_events() {
        let legacy = json!({
            "logs": [{
                "events": [
                    { "type": "message", "attributes": [{ "key": "action", "value": "store" }] },
                    { "type": "store_code", "attributes": [{ "key": "code_id", "value": "3" }] }
                ]
            }]
        });

        let flat = json!({
            "logs": [],
            "events": [
                { "type": "instantiate", "attributes": [
                    { "key": "_contract_address", "value": "juno1contract", "index": true },
                    { "key": "code_id", "value": "3", "index": true }
                ]}
            ]
        });

        assert_eq!(
            find_event_attribute(&legacy, "store_code", "code_id").as_deref(),
            Some("3")
        );
        assert_eq!(
            find_event_attribute(&flat, "instantiate", "_contract_address").as_deref(),
            Some("juno1contract")
        );
        assert_eq!(find_event_attribute(&flat, "store_code", "code_id"), None);
    }

    #[test]
    fn failed_broadcast_is_an_error() {
        let output = "gas estimate: 123\n{\"code\":5,\"raw_log\":\"insufficient funds\",\"txhash\":\"AB\"}";

        assert!(parse_tx_hash(output).is_err());
        assert_eq!(
            parse_tx_hash("{\"code\":0,\"raw_log\":\"\",\"txhash\":\"CD\"}").unwrap(),
            "CD"
        );
    }
}
