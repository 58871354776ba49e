/*!
   Once the light clients of a path expire, the connection stays open but
   no packet can flow on it any more: new increments are rejected, and
   nothing is delivered or timed out.
*/

use cw_ibc_example::contract::PACKET_LIFETIME;
use cw_ibc_test_framework::error::ErrorDetail;
use cw_ibc_test_framework::prelude::*;
use cw_ibc_test_framework::sim::ibc::ConnectionState;

use super::{query_count, query_timeout_count, setup_counter_path};

const TRUSTING_PERIOD: Duration = Duration::from_secs(60);

fn expect_client_not_active(message: &str, result: Result<(), Error>) -> Result<(), Error> {
    match result {
        Ok(()) => Err(Error::assertion(format!(
            "expected {message} to fail on an expired client"
        ))),
        Err(e) => match e.detail() {
            ErrorDetail::ClientNotActive(_) => {
                info!("{} failed as expected: {}", message, e);
                Ok(())
            }
            _ => Err(e),
        },
    }
}

#[test]
fn test_light_client_expiry() -> Result<(), Error> {
    let mut setup = setup_counter_path(|path| {
        path.endpoint_a.client_config = ClientConfig {
            trusting_period: TRUSTING_PERIOD,
        };
        path.endpoint_b.client_config = ClientConfig {
            trusting_period: TRUSTING_PERIOD,
        };
    })?;

    setup.increment_a()?;
    setup.relay()?;

    let count_b = query_count(setup.chain_b()?, &setup.contract_b, &setup.channel_b()?)?;
    assert_eq("count on B before expiry", &count_b, &1)?;

    info!("waiting {:?} without updating the clients", TRUSTING_PERIOD);

    setup.coordinator.increment_time_by(TRUSTING_PERIOD)?;
    setup.coordinator.update_time()?;

    let status_a = setup
        .chain_a()?
        .client_status(setup.path.endpoint_a.client_id()?)?;
    assert_eq("client status on A", &status_a, &ClientStatus::Expired)?;

    let status_b = setup
        .chain_b()?
        .client_status(setup.path.endpoint_b.client_id()?)?;
    assert_eq("client status on B", &status_b, &ClientStatus::Expired)?;

    let connection_state = setup
        .chain_a()?
        .connection(setup.path.endpoint_a.connection_id()?)?
        .state;
    assert_eq("connection state on A", &connection_state, &ConnectionState::Open)?;

    assert_err(
        "expired clients cannot be updated",
        setup.coordinator.update_clients(&setup.path),
    )?;

    assert_err("increment over an expired client", setup.increment_a())?;

    setup
        .coordinator
        .increment_time_by(Duration::from_secs(120))?;

    setup.coordinator.timeout_pending_packets(&setup.path)?;

    let count_b = query_count(setup.chain_b()?, &setup.contract_b, &setup.channel_b()?)?;
    assert_eq("count on B after expiry", &count_b, &1)?;

    let timeouts_a =
        query_timeout_count(setup.chain_a()?, &setup.contract_a, &setup.channel_a()?)?;
    assert_eq("timeout count on A after expiry", &timeouts_a, &0)?;

    Ok(())
}

#[test]
fn test_packet_sent_before_expiry_is_stuck() -> Result<(), Error> {
    let mut setup = setup_counter_path(|path| {
        path.endpoint_a.client_config = ClientConfig {
            trusting_period: TRUSTING_PERIOD,
        };
        path.endpoint_b.client_config = ClientConfig {
            trusting_period: TRUSTING_PERIOD,
        };
    })?;

    setup.increment_a()?;

    setup.coordinator.increment_time_by(TRUSTING_PERIOD)?;

    let result = setup.relay();
    expect_client_not_active("relaying", result)?;

    setup
        .coordinator
        .increment_time_by(Duration::from_secs(PACKET_LIFETIME))?;

    let result = setup.coordinator.timeout_pending_packets(&setup.path);
    expect_client_not_active("timing out", result)?;

    let count_b = query_count(setup.chain_b()?, &setup.contract_b, &setup.channel_b()?)?;
    assert_eq("count on B", &count_b, &0)?;

    let timeouts_a =
        query_timeout_count(setup.chain_a()?, &setup.contract_a, &setup.channel_a()?)?;
    assert_eq("timeout count on A", &timeouts_a, &0)?;

    let pending = setup.chain_a()?.pending_packets().len();
    assert_eq("pending packets on A", &pending, &1)?;

    let received = setup.chain_b()?.has_packet_receipt(
        setup.path.endpoint_b.port_id(),
        setup.path.endpoint_b.channel_id()?,
        1,
    );
    assert_eq("packet receipt on B", &received, &false)?;

    Ok(())
}
