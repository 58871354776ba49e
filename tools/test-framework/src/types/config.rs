/*!
   Definition for the test configuration.
*/

use core::fmt::Debug;
use std::path::PathBuf;

/**
   The test configuration, loaded from the environment by
   [`init_test`](crate::bootstrap::init::init_test) and optionally
   modified by the test overrides.
*/
#[derive(Debug, Clone)]
pub struct TestConfig {
    /**
       The command paths of the chain daemons. Defaults to `junod`.

       This can be overridden with the `$CHAIN_COMMAND_PATHS` environment
       variable, as a comma separated list. The two chains of a binary test
       take the paths in turn.
    */
    pub chain_command_paths: Vec<String>,

    /**
       The account prefixes of the chains, in the same order as
       [`chain_command_paths`](Self::chain_command_paths). Defaults to `juno`.
    */
    pub account_prefixes: Vec<String>,

    /**
       The native token denominations of the chains. Defaults to `ujuno`.
    */
    pub native_tokens: Vec<String>,

    /**
       Docker images to run the chain daemons in. When empty, the
       daemons are spawned as local processes.

       Set with `$CHAIN_DOCKER_IMAGES`.
    */
    pub docker_images: Vec<String>,

    /**
       The command path of the hermes relayer. Defaults to `hermes`.
    */
    pub relayer_command_path: String,

    /**
       Path to the compiled `cw_ibc_example.wasm`.

       Set with `$CONTRACT_WASM_PATH`.
    */
    pub contract_wasm_path: PathBuf,

    /**
       The directory path for storing the chain and relayer files.
       Defaults to `"data"`. This can be overridden with the `$CHAIN_STORE_DIR`
       environment variable.

       Note that this will resolve to `"tools/integration-test/data"`
       relative to the root project directory, as `cargo test` will
       automatically use the sub-crate as the working directory.
    */
    pub chain_store_dir: PathBuf,

    /**
       Whether to suspend a test case when it fails whenever possible.
       Defaults to `false`. This can be overrideen by setting `HANG_ON_FAIL=1`.
    */
    pub hang_on_fail: bool,
}
