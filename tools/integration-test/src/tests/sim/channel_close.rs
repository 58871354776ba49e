//! Closing the channel removes the counters and stops further increments.

use cw_ibc_test_framework::error::ErrorDetail;
use cw_ibc_test_framework::prelude::*;
use cw_ibc_test_framework::sim::ibc::ChannelState;

use super::{query_count, setup_counter_path};

#[test]
fn test_channel_close() -> Result<(), Error> {
    let mut setup = setup_counter_path(|_| {})?;

    setup.increment_a()?;
    setup.relay()?;

    let count_b = query_count(setup.chain_b()?, &setup.contract_b, &setup.channel_b()?)?;
    assert_eq("count on B before closing", &count_b, &1)?;

    setup.coordinator.close_channel(&setup.path, Side::A)?;

    for side in [Side::A, Side::B] {
        let endpoint = setup.path.endpoint(side);
        let state = setup
            .coordinator
            .chain(&endpoint.chain_id)?
            .channel(endpoint.port_id(), endpoint.channel_id()?)?
            .state;

        assert_eq(
            &format!("channel state on {}", endpoint.chain_id),
            &state,
            &ChannelState::Closed,
        )?;
    }

    let count_b = query_count(setup.chain_b()?, &setup.contract_b, &setup.channel_b()?)?;
    assert_eq("count on B after closing", &count_b, &0)?;

    match setup.increment_b() {
        Ok(count) => Err(Error::assertion(format!(
            "expected increment on a closed channel to fail, got count {count}"
        ))),
        Err(e) => match e.detail() {
            ErrorDetail::ChannelNotOpen(_) => Ok(()),
            _ => Err(e),
        },
    }
}

#[test]
fn test_closed_channel_cannot_be_closed_again() -> Result<(), Error> {
    let mut setup = setup_counter_path(|_| {})?;

    setup.coordinator.close_channel(&setup.path, Side::B)?;

    assert_err(
        "closing a closed channel",
        setup.coordinator.close_channel(&setup.path, Side::A),
    )?;

    Ok(())
}
