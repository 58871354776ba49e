use cw_ibc_test_framework::prelude::*;

#[test]
fn test_interchain_can_count() -> Result<(), Error> {
    run_binary_channel_test(&CanCountTest)
}

pub struct CanCountTest;

impl TestOverrides for CanCountTest {}

impl BinaryChannelTest for CanCountTest {
    fn run(
        &self,
        _config: &TestConfig,
        _relayer: RelayerDriver,
        chains: ConnectedChains,
        channel: ConnectedChannel,
    ) -> Result<(), Error> {
        let chain_a = &chains.node_a.chain_driver;
        let chain_b = &chains.node_b.chain_driver;

        let response = chain_a.execute_increment(
            &chains.node_a.wallets.user,
            &channel.contract_a,
            channel.channel_id_a.as_str(),
        )?;

        debug!("increment response: {}", response);

        let count = assert_eventually_succeed(
            "increment to be relayed to chain B",
            30,
            Duration::from_secs(2),
            || {
                let count =
                    chain_b.query_count(&channel.contract_b, channel.channel_id_b.as_str())?;

                if count == 1 {
                    Ok(count)
                } else {
                    Err(Error::assertion(format!(
                        "expected count 1 on chain B, got {count}"
                    )))
                }
            },
        )?;

        info!("count on chain B is {}", count);

        let state = chain_b.dump_contract_state(&channel.contract_b)?;

        for model in state.models.iter() {
            info!(
                "contract state of {}: {} = {}",
                channel.contract_b,
                model.decoded_key()?,
                model.decoded_value()?
            );
        }

        let count_a = chain_a.query_count(&channel.contract_a, channel.channel_id_a.as_str())?;
        assert_eq("count on chain A", &count_a, &0)?;

        Ok(())
    }
}
