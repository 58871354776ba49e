/*!
   Type definition for two connected chains.
*/

use ibc_relayer_types::core::ics24_host::identifier::{ChainId, ClientId, ConnectionId};

use crate::types::env::{prefix_writer, EnvWriter, ExportEnv};
use crate::types::single::node::FullNode;

/**
   Two running full nodes, with a light client of each other and an open
   connection between them.
*/
#[derive(Clone)]
pub struct ConnectedChains {
    /**
       The [`FullNode`] for chain A.
    */
    pub node_a: FullNode,

    /**
       The [`FullNode`] for chain B.
    */
    pub node_b: FullNode,

    /**
       The client hosted on chain A that tracks chain B.
    */
    pub client_id_a: ClientId,

    /**
       The client hosted on chain B that tracks chain A.
    */
    pub client_id_b: ClientId,

    pub connection_id_a: ConnectionId,

    pub connection_id_b: ConnectionId,
}

impl ConnectedChains {
    pub fn chain_id_a(&self) -> &ChainId {
        &self.node_a.chain_driver.chain_id
    }

    pub fn chain_id_b(&self) -> &ChainId {
        &self.node_b.chain_driver.chain_id
    }

    /**
       Swap the position of the two chains, so that the same test logic
       can be run in the other direction.
    */
    pub fn flip(self) -> Self {
        Self {
            node_a: self.node_b,
            node_b: self.node_a,
            client_id_a: self.client_id_b,
            client_id_b: self.client_id_a,
            connection_id_a: self.connection_id_b,
            connection_id_b: self.connection_id_a,
        }
    }
}

impl ExportEnv for ConnectedChains {
    fn export_env(&self, writer: &mut impl EnvWriter) {
        writer.write_env("CHAIN_ID_A", self.chain_id_a().as_str());
        writer.write_env("CHAIN_ID_B", self.chain_id_b().as_str());

        writer.write_env("CLIENT_ID_A", self.client_id_a.as_str());
        writer.write_env("CLIENT_ID_B", self.client_id_b.as_str());

        writer.write_env("CONNECTION_ID_A", self.connection_id_a.as_str());
        writer.write_env("CONNECTION_ID_B", self.connection_id_b.as_str());

        self.node_a.export_env(&mut prefix_writer("NODE_A", writer));
        self.node_b.export_env(&mut prefix_writer("NODE_B", writer));
    }
}
