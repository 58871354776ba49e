//! Increments sent back and forth are counted by the receiving contract.

use cw_ibc_test_framework::prelude::*;

use super::setup_counter_path;

#[test]
fn test_can_count() -> Result<(), Error> {
    let mut setup = setup_counter_path(|_| {})?;

    // Nothing has been received on A yet.
    let count = setup.increment_a()?;
    assert_eq("local count of A after first increment", &count, &0)?;
    setup.relay()?;

    let count = setup.increment_b()?;
    assert_eq("local count of B after first increment", &count, &1)?;
    setup.relay()?;

    let count = setup.increment_a()?;
    assert_eq("local count of A after second increment", &count, &1)?;
    setup.relay()?;

    let count = setup.increment_b()?;
    assert_eq("local count of B after second increment", &count, &2)?;
    setup.relay()?;

    let count_a = super::query_count(setup.chain_a()?, &setup.contract_a, &setup.channel_a()?)?;
    let count_b = super::query_count(setup.chain_b()?, &setup.contract_b, &setup.channel_b()?)?;

    assert_eq("final count of A", &count_a, &2)?;
    assert_eq("final count of B", &count_b, &2)?;

    Ok(())
}

#[test]
fn test_increments_are_counted_per_channel() -> Result<(), Error> {
    let mut setup = setup_counter_path(|_| {})?;

    for _ in 0..3 {
        setup.increment_a()?;
    }

    setup.relay()?;

    let count_b = super::query_count(setup.chain_b()?, &setup.contract_b, &setup.channel_b()?)?;
    assert_eq("count of B after three increments", &count_b, &3)?;

    let other_channel =
        super::query_count(setup.chain_b()?, &setup.contract_b, "channel-42")?;
    assert_eq("count of an unknown channel", &other_channel, &0)?;

    let pending = setup.chain_a()?.pending_packets().len();
    assert_eq("pending packets on A after relaying", &pending, &0)?;

    Ok(())
}
