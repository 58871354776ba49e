/*!
   Type definitions for the counter contracts connected by an IBC channel.
*/

use ibc_relayer_types::core::ics24_host::identifier::{ChannelId, PortId};

use crate::types::env::{EnvWriter, ExportEnv};

/**
   A `counter-1` channel between two deployed counter contracts.
*/
#[derive(Debug, Clone)]
pub struct ConnectedChannel {
    /// Address of the contract on chain A.
    pub contract_a: String,

    /// Address of the contract on chain B.
    pub contract_b: String,

    pub port_a: PortId,

    pub port_b: PortId,

    pub channel_id_a: ChannelId,

    pub channel_id_b: ChannelId,
}

impl ConnectedChannel {
    pub fn flip(self) -> Self {
        Self {
            contract_a: self.contract_b,
            contract_b: self.contract_a,
            port_a: self.port_b,
            port_b: self.port_a,
            channel_id_a: self.channel_id_b,
            channel_id_b: self.channel_id_a,
        }
    }
}

impl ExportEnv for ConnectedChannel {
    fn export_env(&self, writer: &mut impl EnvWriter) {
        writer.write_env("CONTRACT_A", &self.contract_a);
        writer.write_env("CONTRACT_B", &self.contract_b);
        writer.write_env("PORT_A", self.port_a.as_str());
        writer.write_env("PORT_B", self.port_b.as_str());
        writer.write_env("CHANNEL_ID_A", self.channel_id_a.as_str());
        writer.write_env("CHANNEL_ID_B", self.channel_id_b.as_str());
    }
}
