#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    from_json, DepsMut, Env, IbcBasicResponse, IbcChannel, IbcChannelCloseMsg,
    IbcChannelConnectMsg, IbcChannelOpenMsg, IbcChannelOpenResponse, IbcOrder, IbcPacketAckMsg,
    IbcPacketReceiveMsg, IbcPacketTimeoutMsg, IbcReceiveResponse, StdResult,
};

use crate::ack::{make_ack_fail, make_ack_success};
use crate::contract::try_increment;
use crate::error::{ContractError, Never};
use crate::msg::IbcExecuteMsg;
use crate::state::{CONNECTION_COUNTS, TIMEOUT_COUNTS};

pub const IBC_VERSION: &str = "counter-1";

/// Handles the `OpenInit` and `OpenTry` parts of the IBC handshake.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_channel_open(
    _deps: DepsMut,
    _env: Env,
    msg: IbcChannelOpenMsg,
) -> Result<IbcChannelOpenResponse, ContractError> {
    validate_order_and_version(msg.channel(), msg.counterparty_version())?;
    Ok(None)
}

/// Handles the `OpenAck` and `OpenConfirm` parts of the IBC handshake.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_channel_connect(
    deps: DepsMut,
    _env: Env,
    msg: IbcChannelConnectMsg,
) -> Result<IbcBasicResponse, ContractError> {
    validate_order_and_version(msg.channel(), msg.counterparty_version())?;

    let channel = msg.channel().endpoint.channel_id.clone();
    CONNECTION_COUNTS.save(deps.storage, channel.clone(), &0)?;

    Ok(IbcBasicResponse::new()
        .add_attribute("method", "ibc_channel_connect")
        .add_attribute("channel_id", channel))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_channel_close(
    deps: DepsMut,
    _env: Env,
    msg: IbcChannelCloseMsg,
) -> Result<IbcBasicResponse, ContractError> {
    let channel = msg.channel().endpoint.channel_id.clone();
    CONNECTION_COUNTS.remove(deps.storage, channel.clone());

    Ok(IbcBasicResponse::new()
        .add_attribute("method", "ibc_channel_close")
        .add_attribute("channel", channel))
}

/// An acknowledgement is committed for every packet, so failures are
/// reported through an error ack instead of aborting the transaction.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_packet_receive(
    deps: DepsMut,
    env: Env,
    msg: IbcPacketReceiveMsg,
) -> Result<IbcReceiveResponse, Never> {
    match do_ibc_packet_receive(deps, env, msg) {
        Ok(response) => Ok(response),
        Err(error) => Ok(IbcReceiveResponse::new()
            .add_attribute("method", "ibc_packet_receive")
            .add_attribute("error", error.to_string())
            .set_ack(make_ack_fail(error.to_string()))),
    }
}

pub fn do_ibc_packet_receive(
    deps: DepsMut,
    _env: Env,
    msg: IbcPacketReceiveMsg,
) -> Result<IbcReceiveResponse, ContractError> {
    // the local end of the channel the packet arrived on
    let channel = msg.packet.dest.channel_id;
    let msg: IbcExecuteMsg = from_json(&msg.packet.data)?;

    match msg {
        IbcExecuteMsg::Increment {} => receive_increment(deps, channel),
    }
}

fn receive_increment(deps: DepsMut, channel: String) -> Result<IbcReceiveResponse, ContractError> {
    let count = try_increment(deps, channel)?;
    Ok(IbcReceiveResponse::new()
        .add_attribute("method", "execute_increment")
        .add_attribute("count", count.to_string())
        .set_ack(make_ack_success()))
}

/// No state is kept about delivery to the counterparty, so acks are
/// not inspected.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_packet_ack(
    _deps: DepsMut,
    _env: Env,
    _ack: IbcPacketAckMsg,
) -> Result<IbcBasicResponse, ContractError> {
    Ok(IbcBasicResponse::new().add_attribute("method", "ibc_packet_ack"))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_packet_timeout(
    deps: DepsMut,
    _env: Env,
    msg: IbcPacketTimeoutMsg,
) -> Result<IbcBasicResponse, ContractError> {
    // we sent the packet, so it is counted against its source channel
    TIMEOUT_COUNTS.update(
        deps.storage,
        msg.packet.src.channel_id,
        |count| -> StdResult<_> { Ok(count.unwrap_or_default() + 1) },
    )?;

    Ok(IbcBasicResponse::new().add_attribute("method", "ibc_packet_timeout"))
}

/// Only unordered channels speaking [`IBC_VERSION`] are accepted. The
/// counterparty version is known during `OpenTry` and `OpenAck` and is
/// checked whenever it is present.
pub fn validate_order_and_version(
    channel: &IbcChannel,
    counterparty_version: Option<&str>,
) -> Result<(), ContractError> {
    if channel.order != IbcOrder::Unordered {
        return Err(ContractError::OrderedChannel {});
    }

    if channel.version != IBC_VERSION {
        return Err(ContractError::InvalidVersion {
            actual: channel.version.to_string(),
            expected: IBC_VERSION.to_string(),
        });
    }

    if let Some(counterparty_version) = counterparty_version {
        if counterparty_version != IBC_VERSION {
            return Err(ContractError::InvalidVersion {
                actual: counterparty_version.to_string(),
                expected: IBC_VERSION.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::testing::{
        mock_dependencies, mock_env, mock_ibc_channel_close_init, mock_ibc_channel_connect_ack,
        mock_ibc_channel_open_init, mock_ibc_channel_open_try,
    };
    use cosmwasm_std::{
        to_json_binary, Addr, Binary, Deps, IbcEndpoint, IbcPacket, IbcTimeout, Timestamp,
    };

    use super::*;
    use crate::ack::Ack;
    use crate::contract::query;
    use crate::msg::{GetCountResponse, QueryMsg};

    fn packet(src_channel: &str, dst_channel: &str, data: Binary) -> IbcPacket {
        IbcPacket::new(
            data,
            IbcEndpoint {
                port_id: "wasm.sender".to_string(),
                channel_id: src_channel.to_string(),
            },
            IbcEndpoint {
                port_id: "wasm.receiver".to_string(),
                channel_id: dst_channel.to_string(),
            },
            1,
            IbcTimeout::with_timestamp(Timestamp::from_seconds(1_000)),
        )
    }

    fn increment_packet(src_channel: &str, dst_channel: &str) -> IbcPacket {
        packet(
            src_channel,
            dst_channel,
            to_json_binary(&IbcExecuteMsg::Increment {}).unwrap(),
        )
    }

    fn get_count(deps: Deps, channel: &str) -> u32 {
        let msg = QueryMsg::GetCount {
            channel: channel.to_string(),
        };
        let res = query(deps, mock_env(), msg).unwrap();
        from_json::<GetCountResponse>(&res).unwrap().count
    }

    fn get_timeout_count(deps: Deps, channel: &str) -> u32 {
        let msg = QueryMsg::GetTimeoutCount {
            channel: channel.to_string(),
        };
        let res = query(deps, mock_env(), msg).unwrap();
        from_json::<GetCountResponse>(&res).unwrap().count
    }

    #[test]
    fn handshake_accepts_unordered_counter_channels() {
        let mut deps = mock_dependencies();

        let open = mock_ibc_channel_open_init("channel-0", IbcOrder::Unordered, IBC_VERSION);
        assert_eq!(None, ibc_channel_open(deps.as_mut(), mock_env(), open).unwrap());

        let open = mock_ibc_channel_open_try("channel-0", IbcOrder::Unordered, IBC_VERSION);
        assert_eq!(None, ibc_channel_open(deps.as_mut(), mock_env(), open).unwrap());

        let connect = mock_ibc_channel_connect_ack("channel-0", IbcOrder::Unordered, IBC_VERSION);
        ibc_channel_connect(deps.as_mut(), mock_env(), connect).unwrap();

        assert_eq!(0, get_count(deps.as_ref(), "channel-0"));
    }

    #[test]
    fn handshake_rejects_ordered_channels() {
        let mut deps = mock_dependencies();

        let open = mock_ibc_channel_open_init("channel-0", IbcOrder::Ordered, IBC_VERSION);
        let err = ibc_channel_open(deps.as_mut(), mock_env(), open).unwrap_err();
        assert_eq!(err, ContractError::OrderedChannel {});
    }

    #[test]
    fn handshake_rejects_other_versions() {
        let mut deps = mock_dependencies();

        let open = mock_ibc_channel_open_init("channel-0", IbcOrder::Unordered, "ics20-1");
        let err = ibc_channel_open(deps.as_mut(), mock_env(), open).unwrap_err();
        assert_eq!(
            err,
            ContractError::InvalidVersion {
                actual: "ics20-1".to_string(),
                expected: IBC_VERSION.to_string(),
            }
        );

        let connect = mock_ibc_channel_connect_ack("channel-0", IbcOrder::Unordered, "ics20-1");
        ibc_channel_connect(deps.as_mut(), mock_env(), connect).unwrap_err();
    }

    #[test]
    fn counterparty_version_is_checked_when_known() {
        let channel = mock_ibc_channel_open_init("channel-0", IbcOrder::Unordered, IBC_VERSION)
            .channel()
            .clone();

        validate_order_and_version(&channel, None).unwrap();
        validate_order_and_version(&channel, Some(IBC_VERSION)).unwrap();

        let err = validate_order_and_version(&channel, Some("counter-2")).unwrap_err();
        assert_eq!(
            err,
            ContractError::InvalidVersion {
                actual: "counter-2".to_string(),
                expected: IBC_VERSION.to_string(),
            }
        );
    }

    #[test]
    fn receive_counts_on_destination_channel() {
        let mut deps = mock_dependencies();
        let relayer = Addr::unchecked("relayer");

        for expected in 1..=3 {
            let msg = IbcPacketReceiveMsg::new(
                increment_packet("channel-9", "channel-3"),
                relayer.clone(),
            );
            let res = ibc_packet_receive(deps.as_mut(), mock_env(), msg).unwrap();

            assert_eq!(
                from_json::<Ack>(&res.acknowledgement).unwrap(),
                Ack::Result(b"1".into())
            );
            assert!(res
                .attributes
                .iter()
                .any(|attr| attr.key == "count" && attr.value == expected.to_string()));
        }

        assert_eq!(3, get_count(deps.as_ref(), "channel-3"));
        assert_eq!(0, get_count(deps.as_ref(), "channel-9"));
    }

    #[test]
    fn receive_garbage_writes_error_ack() {
        let mut deps = mock_dependencies();

        let msg = IbcPacketReceiveMsg::new(
            packet("channel-9", "channel-3", Binary::from(b"not json".to_vec())),
            Addr::unchecked("relayer"),
        );
        let res = ibc_packet_receive(deps.as_mut(), mock_env(), msg).unwrap();

        match from_json::<Ack>(&res.acknowledgement).unwrap() {
            Ack::Error(_) => {}
            other => panic!("expected error ack, got {other:?}"),
        }
        assert!(res.attributes.iter().any(|attr| attr.key == "error"));
        assert_eq!(0, get_count(deps.as_ref(), "channel-3"));
    }

    #[test]
    fn timeout_counts_on_source_channel() {
        let mut deps = mock_dependencies();

        let msg = IbcPacketTimeoutMsg::new(
            increment_packet("channel-4", "channel-8"),
            Addr::unchecked("relayer"),
        );
        ibc_packet_timeout(deps.as_mut(), mock_env(), msg).unwrap();

        assert_eq!(1, get_timeout_count(deps.as_ref(), "channel-4"));
        assert_eq!(0, get_timeout_count(deps.as_ref(), "channel-8"));
        assert_eq!(0, get_count(deps.as_ref(), "channel-4"));
    }

    #[test]
    fn close_resets_counter() {
        let mut deps = mock_dependencies();

        let connect = mock_ibc_channel_connect_ack("channel-0", IbcOrder::Unordered, IBC_VERSION);
        ibc_channel_connect(deps.as_mut(), mock_env(), connect).unwrap();
        try_increment(deps.as_mut(), "channel-0".to_string()).unwrap();
        assert_eq!(1, get_count(deps.as_ref(), "channel-0"));

        let close = mock_ibc_channel_close_init("channel-0", IbcOrder::Unordered, IBC_VERSION);
        ibc_channel_close(deps.as_mut(), mock_env(), close).unwrap();

        assert_eq!(0, get_count(deps.as_ref(), "channel-0"));
    }
}
