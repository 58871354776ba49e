//! The counter contract only accepts unordered `counter-1` channels.

use cosmwasm_std::IbcOrder;
use cw_ibc_test_framework::prelude::*;
use cw_ibc_test_framework::sim::ibc::ChannelState;

use super::setup_counter_path;

#[test]
fn test_ordered_channel_is_rejected() -> Result<(), Error> {
    let result = setup_counter_path(|path| {
        path.endpoint_a.channel_config.order = IbcOrder::Ordered;
        path.endpoint_b.channel_config.order = IbcOrder::Ordered;
    });

    assert_err("opening an ordered channel", result.map(|_| ()))?;

    Ok(())
}

#[test]
fn test_wrong_version_on_init_is_rejected() -> Result<(), Error> {
    let result = setup_counter_path(|path| {
        path.endpoint_a.channel_config.version = "counter-2".to_string();
    });

    assert_err("opening a channel with version counter-2", result.map(|_| ()))?;

    Ok(())
}

#[test]
fn test_wrong_version_on_try_is_rejected() -> Result<(), Error> {
    let result = setup_counter_path(|path| {
        path.endpoint_b.channel_config.version = "ics20-1".to_string();
    });

    assert_err("accepting a channel with version ics20-1", result.map(|_| ()))?;

    Ok(())
}

#[test]
fn test_default_channel_config_opens() -> Result<(), Error> {
    let setup = setup_counter_path(|_| {})?;

    let channel = setup
        .chain_a()?
        .channel(setup.path.endpoint_a.port_id(), setup.path.endpoint_a.channel_id()?)?;

    assert_eq("channel state on A", &channel.state, &ChannelState::Open)?;
    assert_eq("channel order on A", &channel.order, &IbcOrder::Unordered)?;
    assert_eq("channel version on A", &channel.version.as_str(), &"counter-1")?;

    Ok(())
}
