/*!
   Let the light clients of a connected pair of chains expire while the
   relayer is down, then check that the connection stays open but can no
   longer carry increments in either direction.
*/

use cw_ibc_test_framework::prelude::*;

const TRUSTING_PERIOD: Duration = Duration::from_secs(60);

/// Twice the lifetime of an increment packet.
const PACKET_WAIT: Duration = Duration::from_secs(120);

#[test]
fn test_interchain_light_client_expiry() -> Result<(), Error> {
    run_binary_channel_test(&LightClientExpiryTest)
}

pub struct LightClientExpiryTest;

impl TestOverrides for LightClientExpiryTest {
    fn client_options(&self) -> BootstrapClientOptions {
        BootstrapClientOptions::default().trusting_period(TRUSTING_PERIOD)
    }

    fn modify_relayer_config(&self, config: &mut RelayerConfig) {
        // The relayer must not keep the clients alive on its own.
        config.mode.clients.refresh = false;
    }
}

impl BinaryChannelTest for LightClientExpiryTest {
    fn run(
        &self,
        _config: &TestConfig,
        relayer: RelayerDriver,
        chains: ConnectedChains,
        channel: ConnectedChannel,
    ) -> Result<(), Error> {
        let chain_a = &chains.node_a.chain_driver;
        let chain_b = &chains.node_b.chain_driver;
        let wallet_a = &chains.node_a.wallets.user;

        chain_a.execute_increment(wallet_a, &channel.contract_a, channel.channel_id_a.as_str())?;

        wait_for_count(chain_b, &channel.contract_b, channel.channel_id_b.as_str(), 1)?;

        relayer.stop()?;

        info!("sleeping for {:?} to let the clients expire", TRUSTING_PERIOD);

        sleep(TRUSTING_PERIOD);

        match update_clients(&relayer, &chains) {
            Ok(()) => warn!("updating the clients unexpectedly succeeded"),
            Err(e) => info!("updating the expired clients failed as expected: {}", e),
        }

        let status = chain_a.query_client_status(&chains.client_id_a)?;
        assert_eq("status of the client on chain A", &status, &ClientStatus::Expired)?;

        let count = chain_b.query_count(&channel.contract_b, channel.channel_id_b.as_str())?;
        assert_eq("count on chain B after expiry", &count, &1)?;

        let connections = chain_a.query_connections()?;
        let connection = connections
            .first()
            .ok_or_else(|| eyre!("expected chain A to have a connection"))?;

        assert_eq(
            "state of the connection on chain A",
            &connection.state.as_str(),
            &"STATE_OPEN",
        )?;

        relayer.start()?;

        match chain_a.execute_increment(
            wallet_a,
            &channel.contract_a,
            channel.channel_id_a.as_str(),
        ) {
            Ok(response) => info!("increment over an expired client: {}", response),
            Err(e) => info!("increment over an expired client failed: {}", e),
        }

        sleep(PACKET_WAIT);
        wait_for_blocks(10, &[chain_a, chain_b])?;

        let count = chain_b.query_count(&channel.contract_b, channel.channel_id_b.as_str())?;
        assert_eq("count on chain B after restarting the relayer", &count, &1)?;

        let timeouts =
            chain_a.query_timeout_count(&channel.contract_a, channel.channel_id_a.as_str())?;
        assert_eq("timeout count on chain A", &timeouts, &0)?;

        Ok(())
    }
}

fn wait_for_count(
    chain: &ChainDriver,
    contract: &str,
    channel: &str,
    expected: u32,
) -> Result<(), Error> {
    assert_eventually_succeed(
        &format!("count on {} to reach {}", chain.chain_id, expected),
        30,
        Duration::from_secs(2),
        || {
            let count = chain.query_count(contract, channel)?;
            assert_eq("count", &count, &expected)
        },
    )
}
