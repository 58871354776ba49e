/*!
   A packet that is not relayed within its lifetime is timed out on the
   sending chain, and the sending contract counts the timeout.
*/

use cw_ibc_example::contract::PACKET_LIFETIME;
use cw_ibc_test_framework::error::ErrorDetail;
use cw_ibc_test_framework::prelude::*;

use super::{query_count, query_timeout_count, setup_counter_path};

#[test]
fn test_timeout_count() -> Result<(), Error> {
    let mut setup = setup_counter_path(|_| {})?;

    setup.increment_a()?;

    setup
        .coordinator
        .increment_time_by(Duration::from_secs(PACKET_LIFETIME + 1))?;

    match setup.relay() {
        Ok(()) => {
            return Err(Error::assertion(
                "expected relaying an expired packet to fail".to_string(),
            ))
        }
        Err(e) => match e.detail() {
            ErrorDetail::PacketTimedOut(_) => {
                info!("relaying failed as expected: {}", e);
            }
            _ => return Err(e),
        },
    }

    setup.coordinator.timeout_pending_packets(&setup.path)?;

    let timeouts_a =
        query_timeout_count(setup.chain_a()?, &setup.contract_a, &setup.channel_a()?)?;
    assert_eq("timeout count on A", &timeouts_a, &1)?;

    let count_b = query_count(setup.chain_b()?, &setup.contract_b, &setup.channel_b()?)?;
    assert_eq("count on B", &count_b, &0)?;

    let timeouts_b =
        query_timeout_count(setup.chain_b()?, &setup.contract_b, &setup.channel_b()?)?;
    assert_eq("timeout count on B", &timeouts_b, &0)?;

    let pending = setup.chain_a()?.pending_packets().len();
    assert_eq("pending packets on A", &pending, &0)?;

    Ok(())
}

#[test]
fn test_packet_within_lifetime_is_not_timed_out() -> Result<(), Error> {
    let mut setup = setup_counter_path(|_| {})?;

    setup.increment_a()?;

    setup
        .coordinator
        .increment_time_by(Duration::from_secs(PACKET_LIFETIME / 2))?;

    setup.coordinator.timeout_pending_packets(&setup.path)?;

    let pending = setup.chain_a()?.pending_packets().len();
    assert_eq("pending packets on A", &pending, &1)?;

    setup.relay()?;

    let count_b = query_count(setup.chain_b()?, &setup.contract_b, &setup.channel_b()?)?;
    assert_eq("count on B", &count_b, &1)?;

    let timeouts_a =
        query_timeout_count(setup.chain_a()?, &setup.contract_a, &setup.channel_a()?)?;
    assert_eq("timeout count on A", &timeouts_a, &0)?;

    Ok(())
}

#[test]
fn test_timeout_after_earlier_relay() -> Result<(), Error> {
    let mut setup = setup_counter_path(|_| {})?;

    setup.increment_a()?;
    setup.relay()?;

    setup.increment_a()?;

    setup
        .coordinator
        .increment_time_by(Duration::from_secs(PACKET_LIFETIME + 1))?;

    setup.coordinator.timeout_pending_packets(&setup.path)?;

    let timeouts_a =
        query_timeout_count(setup.chain_a()?, &setup.contract_a, &setup.channel_a()?)?;
    assert_eq("timeout count on A", &timeouts_a, &1)?;

    let count_b = query_count(setup.chain_b()?, &setup.contract_b, &setup.channel_b()?)?;
    assert_eq("count on B", &count_b, &1)?;

    let pending = setup.chain_a()?.pending_packets().len();
    assert_eq("pending packets on A", &pending, &0)?;

    Ok(())
}
