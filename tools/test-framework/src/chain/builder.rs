/*!
   Builder construct that spawn new chains with some common parameters.
*/

use std::sync::Arc;

use ibc_relayer_types::core::ics24_host::identifier::ChainId;
use tokio::runtime::Runtime;

use crate::chain::driver::ChainDriver;
use crate::chain::runner::ChainRunner;
use crate::types::config::TestConfig;
use crate::util::random::{random_u32, random_unused_tcp_port};

/**
   Used for holding common configuration needed to create new `ChainDriver`s.

   The command paths, account prefixes, native tokens and docker images
   are given as lists, and the `n`-th chain built takes the `n`-th entry
   of each list, wrapping around when a list is shorter.
*/
#[derive(Debug)]
pub struct ChainBuilder {
    pub command_paths: Vec<String>,

    pub account_prefixes: Vec<String>,

    pub native_tokens: Vec<String>,

    pub docker_images: Vec<String>,

    /**
       The filesystem path to store the data files used by the chain.
    */
    pub base_store_dir: String,

    pub runtime: Arc<Runtime>,
}

impl ChainBuilder {
    /**
       Create a new `ChainBuilder`.
    */
    pub fn new(
        command_paths: Vec<String>,
        account_prefixes: Vec<String>,
        native_tokens: Vec<String>,
        docker_images: Vec<String>,
        base_store_dir: &str,
        runtime: Arc<Runtime>,
    ) -> Self {
        Self {
            command_paths,
            account_prefixes,
            native_tokens,
            docker_images,
            base_store_dir: base_store_dir.to_string(),
            runtime,
        }
    }

    /**
       Create a `ChainBuilder` based on the provided [`TestConfig`].
    */
    pub fn new_with_config(config: &TestConfig, runtime: Arc<Runtime>) -> Self {
        Self::new(
            config.chain_command_paths.clone(),
            config.account_prefixes.clone(),
            config.native_tokens.clone(),
            config.docker_images.clone(),
            &format!("{}", config.chain_store_dir.display()),
            runtime,
        )
    }

    /**
       Create a new [`ChainDriver`] with the chain ID containing the
       given prefix.

       Note that this only configures the [`ChainDriver`] without
       the actual chain being intitialized or spawned.

       The `ChainBuilder` will configure the [`ChainDriver`] with random
       unused ports, and add a random suffix to the chain ID.

       For example, calling this with a prefix `"alpha"` will return
       a [`ChainDriver`] configured with a chain ID  like
       `"ibc-alpha-f5a2a988"`.
    */
    pub fn new_chain(&self, prefix: &str, chain_number: usize) -> ChainDriver {
        let chain_num = random_u32();
        let chain_id = ChainId::from_string(&format!("ibc-{}-{:x}", prefix, chain_num));

        let rpc_port = random_unused_tcp_port();
        let grpc_port = random_unused_tcp_port();
        let p2p_port = random_unused_tcp_port();
        let pprof_port = random_unused_tcp_port();

        let home_path = format!("{}/{}", self.base_store_dir, chain_id);

        ChainDriver::create(
            ChainRunner::from_image(pick(&self.docker_images, chain_number)),
            pick(&self.command_paths, chain_number)
                .cloned()
                .unwrap_or_else(|| "junod".to_string()),
            chain_id,
            home_path,
            pick(&self.account_prefixes, chain_number)
                .cloned()
                .unwrap_or_else(|| "juno".to_string()),
            pick(&self.native_tokens, chain_number)
                .cloned()
                .unwrap_or_else(|| "ujuno".to_string()),
            rpc_port,
            grpc_port,
            p2p_port,
            pprof_port,
            self.runtime.clone(),
        )
    }
}

fn pick(values: &[String], index: usize) -> Option<&String> {
    if values.is_empty() {
        None
    } else {
        values.get(index % values.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(docker_images: Vec<String>) -> ChainBuilder {
        ChainBuilder::new(
            vec!["junod".to_string(), "wasmd".to_string()],
            vec!["juno".to_string(), "wasm".to_string()],
            vec!["ujuno".to_string()],
            docker_images,
            "/tmp/chains",
            Arc::new(Runtime::new().unwrap()),
        )
    }

    #[test]
    fn chains_take_settings_in_turn() {
        let builder = builder(Vec::new());

        let alpha = builder.new_chain("alpha", 0);
        let beta = builder.new_chain("beta", 1);

        assert_eq!(alpha.command_path, "junod");
        assert_eq!(beta.command_path, "wasmd");
        assert_eq!(beta.account_prefix, "wasm");
        assert_eq!(beta.denom, "ujuno");
        assert_eq!(alpha.runner, ChainRunner::Native);
        assert!(alpha.chain_id.as_str().starts_with("ibc-alpha-"));
        assert!(beta.home_path.starts_with("/tmp/chains/ibc-beta-"));
    }

    #[test]
    fn docker_image_selects_docker_runner() {
        let builder = builder(vec!["juno:v21".to_string()]);

        assert_eq!(
            builder.new_chain("alpha", 1).runner,
            ChainRunner::Docker {
                image: "juno:v21".to_string()
            }
        );
    }
}
