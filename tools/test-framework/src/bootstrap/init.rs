/*!
   Functions for initializing each test at the beginning of a Rust test
   session.
*/

use eyre::Report as Error;
use std::env;
use std::fs;
use std::io::{stdout, IsTerminal};
use std::path::PathBuf;
use std::sync::Once;
use tracing_subscriber::{
    self as ts,
    filter::{EnvFilter, LevelFilter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::types::config::TestConfig;
use crate::util::random::random_u32;

static INIT: Once = Once::new();

/**
   Initialize the test with a global logger and error handlers,
   read the environment variables and return a [`TestConfig`].
*/
pub fn init_test() -> Result<TestConfig, Error> {
    let no_color_log = env::var("NO_COLOR_LOG")
        .ok()
        .map(|val| val == "1")
        .unwrap_or(false);

    INIT.call_once(|| {
        if stdout().is_terminal() && !no_color_log {
            // Another report hook may already be installed by the test binary.
            let _ = color_eyre::install();
        }
        install_logger(!no_color_log);
    });

    let chain_command_paths =
        parse_list(&env::var("CHAIN_COMMAND_PATHS").unwrap_or_else(|_| "junod".to_string()));

    let account_prefixes =
        parse_list(&env::var("ACCOUNT_PREFIXES").unwrap_or_else(|_| "juno".to_string()));

    let native_tokens =
        parse_list(&env::var("NATIVE_TOKENS").unwrap_or_else(|_| "ujuno".to_string()));

    let docker_images = parse_list(&env::var("CHAIN_DOCKER_IMAGES").unwrap_or_default());

    let relayer_command_path =
        env::var("RELAYER_COMMAND_PATH").unwrap_or_else(|_| "hermes".to_string());

    let contract_wasm_path = PathBuf::from(
        env::var("CONTRACT_WASM_PATH")
            .unwrap_or_else(|_| "artifacts/cw_ibc_example.wasm".to_string()),
    );

    let base_chain_store_dir = env::var("CHAIN_STORE_DIR").unwrap_or_else(|_| "data".to_string());

    let chain_store_dir = format!("{}/test-{}", base_chain_store_dir, random_u32());

    fs::create_dir_all(&chain_store_dir)?;

    let chain_store_dir = fs::canonicalize(chain_store_dir)?;

    let hang_on_fail = env::var("HANG_ON_FAIL")
        .ok()
        .map(|val| val == "1")
        .unwrap_or(false);

    Ok(TestConfig {
        chain_command_paths,
        account_prefixes,
        native_tokens,
        docker_images,
        relayer_command_path,
        contract_wasm_path,
        chain_store_dir,
        hang_on_fail,
    })
}

/**
   Split a comma separated environment variable, ignoring empty entries.
*/
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}

/**
   Install the [`tracing_subscriber`] logger handlers so that logs will
   be displayed during test.
*/
pub fn install_logger(with_color: bool) {
    // Use log level INFO by default if RUST_LOG is not set.
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let layer = ts::fmt::layer().with_ansi(with_color).with_test_writer();

    // Ignore the error if a global subscriber was already set.
    let _ = ts::registry().with(env_filter).with(layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_split_on_commas() {
        assert_eq!(parse_list("junod,wasmd"), vec!["junod", "wasmd"]);
        assert_eq!(parse_list(" junod , "), vec!["junod"]);
        assert!(parse_list("").is_empty());
    }
}
