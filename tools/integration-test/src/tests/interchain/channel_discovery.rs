use cw_ibc_test_framework::prelude::*;

#[test]
fn test_interchain_channel_discovery() -> Result<(), Error> {
    run_binary_channel_test(&ChannelDiscoveryTest)
}

pub struct ChannelDiscoveryTest;

impl TestOverrides for ChannelDiscoveryTest {
    fn should_start_relayer(&self) -> bool {
        false
    }
}

impl BinaryChannelTest for ChannelDiscoveryTest {
    fn run(
        &self,
        _config: &TestConfig,
        relayer: RelayerDriver,
        chains: ConnectedChains,
        channel: ConnectedChannel,
    ) -> Result<(), Error> {
        let chain_a = &chains.node_a.chain_driver;

        wait_for_blocks(10, &[chain_a, &chains.node_b.chain_driver])?;

        let relayer_channels = relayer.query_channels(chains.chain_id_a())?;

        info!("channels known to the relayer: {:?}", relayer_channels);

        if !relayer_channels.contains(&(channel.port_a.clone(), channel.channel_id_a.clone())) {
            return Err(Error::assertion(format!(
                "expected the relayer to list channel {}/{}",
                channel.port_a, channel.channel_id_a
            )));
        }

        let channels = chain_a.query_channels()?;

        let found = channels
            .iter()
            .find(|c| c.port_id == channel.port_a.as_str())
            .ok_or_else(|| eyre!("no channel bound to port {} on chain A", channel.port_a))?;

        info!(
            "channel {} has counterparty {}",
            found.channel_id, found.counterparty.channel_id
        );

        assert_eq(
            "local channel id",
            &found.channel_id.as_str(),
            &channel.channel_id_a.as_str(),
        )?;

        assert_eq(
            "counterparty channel id",
            &found.counterparty.channel_id.as_str(),
            &channel.channel_id_b.as_str(),
        )?;

        Ok(())
    }
}
