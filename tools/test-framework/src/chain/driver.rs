/*!
   Implementation of [`ChainDriver`].
*/

use core::time::Duration;
use std::sync::Arc;

use ibc_relayer_types::core::ics24_host::identifier::ChainId;
use tokio::runtime::Runtime;
use tracing::info;

use crate::chain::cli::query::query_latest_height;
use crate::chain::exec::ExecOutput;
use crate::chain::runner::ChainRunner;
use crate::error::Error;
use crate::types::env::{EnvWriter, ExportEnv};
use crate::util::retry::assert_eventually_succeed;

/**
   Number of one second attempts to wait for a freshly started full node
   to answer queries. Docker images may take a while to be pulled the
   first time they are used.
*/
const WAIT_NODE_ATTEMPTS: u16 = 90;

/**
    A driver for interacting with a chain full nodes through command line.

    The name `ChainDriver` is inspired by
    [WebDriver](https://developer.mozilla.org/en-US/docs/Web/WebDriver),
    which is the term used to describe programs that control spawning of the
    web browsers. In our case, the ChainDriver is used to spawn and manage
    wasm enabled chain full nodes such as `junod` or `wasmd`.
*/
#[derive(Debug, Clone)]
pub struct ChainDriver {
    /**
       Whether the daemon commands run on the host or in docker.
    */
    pub runner: ChainRunner,

    /**
       The filesystem path to the chain CLI. Defaults to `junod`.
    */
    pub command_path: String,

    /**
       The ID of the chain.
    */
    pub chain_id: ChainId,

    /**
       The home directory for the full node to store data files.
    */
    pub home_path: String,

    pub account_prefix: String,

    /**
       The native token, used for staking and gas.
    */
    pub denom: String,

    /**
       The port used for RPC.
    */
    pub rpc_port: u16,

    /**
       The port used for GRPC.
    */
    pub grpc_port: u16,

    /**
       The port used for P2P. (Currently unused other than for setup)
    */
    pub p2p_port: u16,

    pub pprof_port: u16,

    pub runtime: Arc<Runtime>,
}

impl ExportEnv for ChainDriver {
    fn export_env(&self, writer: &mut impl EnvWriter) {
        writer.write_env("CMD", &self.command_path);
        writer.write_env("HOME", &self.home_path);
        writer.write_env("RPC_ADDR", &self.rpc_address());
        writer.write_env("GRPC_ADDR", &self.grpc_address());

        if let ChainRunner::Docker { image } = &self.runner {
            writer.write_env("DOCKER_IMAGE", image);
            writer.write_env("CONTAINER", &self.container_name());
        }
    }
}

impl ChainDriver {
    /// Create a new [`ChainDriver`]
    pub fn create(
        runner: ChainRunner,
        command_path: String,
        chain_id: ChainId,
        home_path: String,
        account_prefix: String,
        denom: String,
        rpc_port: u16,
        grpc_port: u16,
        p2p_port: u16,
        pprof_port: u16,
        runtime: Arc<Runtime>,
    ) -> Self {
        Self {
            runner,
            command_path,
            chain_id,
            home_path,
            account_prefix,
            denom,
            rpc_port,
            grpc_port,
            p2p_port,
            pprof_port,
            runtime,
        }
    }

    /// Returns the full URL for the RPC address.
    pub fn rpc_address(&self) -> String {
        format!("http://localhost:{}", self.rpc_port)
    }

    /// Returns the full URL for the WebSocket address.
    pub fn websocket_address(&self) -> String {
        format!("ws://localhost:{}/websocket", self.rpc_port)
    }

    /// Returns the full URL for the GRPC address.
    pub fn grpc_address(&self) -> String {
        format!("http://localhost:{}", self.grpc_port)
    }

    /**
        Returns the full URL for the RPC address to listen to when starting
        the full node.

        This is somehow different from [`rpc_address`](ChainDriver::rpc_address)
        as it requires the `"tcp://"` scheme.
    */
    pub fn rpc_listen_address(&self) -> String {
        format!("tcp://localhost:{}", self.rpc_port)
    }

    /**
        Returns the full URL for the GRPC address to listen to when starting
        the full node.

        This is somehow different from [`grpc_address`](ChainDriver::grpc_address)
        as it requires no scheme to be specified.
    */
    pub fn grpc_listen_address(&self) -> String {
        format!("localhost:{}", self.grpc_port)
    }

    /// Name of the docker container running the daemon, if any.
    pub fn container_name(&self) -> String {
        format!("cw-ibc-{}", self.chain_id)
    }

    /**
       Run the chain CLI with the given arguments, through the configured
       [`ChainRunner`].
    */
    pub fn exec(&self, args: &[&str]) -> Result<ExecOutput, Error> {
        self.runner
            .exec(self.chain_id.as_str(), &self.command_path, &self.home_path, args)
    }

    /**
       Query the latest block height of the chain.
    */
    pub fn query_latest_height(&self) -> Result<u64, Error> {
        query_latest_height(self)
    }

    /**
       Wait until the full node answers status queries and has produced
       at least one block.
    */
    pub fn assert_eventually_running(&self) -> Result<u64, Error> {
        let height = assert_eventually_succeed(
            &format!("full node of chain {} to produce blocks", self.chain_id),
            WAIT_NODE_ATTEMPTS,
            Duration::from_secs(1),
            || {
                let height = self.query_latest_height()?;
                if height > 0 {
                    Ok(height)
                } else {
                    Err(Error::assertion(format!(
                        "chain {} has not produced any block yet",
                        self.chain_id
                    )))
                }
            },
        )?;

        info!("chain {} is running at height {}", self.chain_id, height);

        Ok(height)
    }
}

/**
   Wait until every given chain has produced `blocks` more blocks than
   the height it had when this was called.
*/
pub fn wait_for_blocks(blocks: u64, chains: &[&ChainDriver]) -> Result<(), Error> {
    let start_heights = chains
        .iter()
        .map(|chain| chain.query_latest_height())
        .collect::<Result<Vec<_>, _>>()?;

    for (chain, start) in chains.iter().zip(start_heights) {
        let target = start + blocks;

        assert_eventually_succeed(
            &format!("chain {} to reach height {}", chain.chain_id, target),
            (blocks as u16).saturating_mul(10).max(30),
            Duration::from_millis(500),
            || {
                let height = chain.query_latest_height()?;
                if height >= target {
                    Ok(())
                } else {
                    Err(Error::assertion(format!(
                        "chain {} is at height {}, waiting for {}",
                        chain.chain_id, height, target
                    )))
                }
            },
        )?;
    }

    Ok(())
}
