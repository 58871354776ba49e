#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Binary, Deps, DepsMut, Env, IbcMsg, IbcTimeout, MessageInfo, Response,
    StdResult,
};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::msg::{ExecuteMsg, GetCountResponse, IbcExecuteMsg, InstantiateMsg, QueryMsg};
use crate::state::{CONNECTION_COUNTS, TIMEOUT_COUNTS};

const CONTRACT_NAME: &str = "crates.io:cw-ibc-example";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Seconds after the sending block's time at which an increment packet
/// times out.
pub const PACKET_LIFETIME: u64 = 120;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    _msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new().add_attribute("method", "instantiate"))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    _deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Increment { channel } => execute_increment(env, channel),
    }
}

fn execute_increment(env: Env, channel: String) -> Result<Response, ContractError> {
    let packet = IbcMsg::SendPacket {
        channel_id: channel.clone(),
        data: to_json_binary(&IbcExecuteMsg::Increment {})?,
        timeout: IbcTimeout::with_timestamp(env.block.time.plus_seconds(PACKET_LIFETIME)),
    };

    Ok(Response::new()
        .add_attribute("method", "execute_increment")
        .add_attribute("channel", channel)
        .add_message(packet))
}

/// Increments the counter of a local channel, returning the new value.
pub fn try_increment(deps: DepsMut, channel: String) -> StdResult<u32> {
    CONNECTION_COUNTS.update(deps.storage, channel, |count| -> StdResult<_> {
        Ok(count.unwrap_or_default() + 1)
    })
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::GetCount { channel } => to_json_binary(&query_count(deps, channel)?),
        QueryMsg::GetTimeoutCount { channel } => {
            to_json_binary(&query_timeout_count(deps, channel)?)
        }
    }
}

fn query_count(deps: Deps, channel: String) -> StdResult<GetCountResponse> {
    let count = CONNECTION_COUNTS
        .may_load(deps.storage, channel)?
        .unwrap_or_default();
    Ok(GetCountResponse { count })
}

fn query_timeout_count(deps: Deps, channel: String) -> StdResult<GetCountResponse> {
    let count = TIMEOUT_COUNTS
        .may_load(deps.storage, channel)?
        .unwrap_or_default();
    Ok(GetCountResponse { count })
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::testing::{mock_dependencies, mock_env, mock_info};
    use cosmwasm_std::{from_json, CosmosMsg, IbcTimeout};

    use super::*;

    fn count(deps: Deps, msg: QueryMsg) -> u32 {
        let res = query(deps, mock_env(), msg).unwrap();
        from_json::<GetCountResponse>(&res).unwrap().count
    }

    #[test]
    fn instantiate_records_version() {
        let mut deps = mock_dependencies();
        let res = instantiate(
            deps.as_mut(),
            mock_env(),
            mock_info("creator", &[]),
            InstantiateMsg {},
        )
        .unwrap();

        assert_eq!(0, res.messages.len());

        let version = cw2::get_contract_version(deps.as_ref().storage).unwrap();
        assert_eq!(version.contract, CONTRACT_NAME);
        assert_eq!(version.version, CONTRACT_VERSION);
    }

    #[test]
    fn increment_sends_packet_with_two_minute_timeout() {
        let mut deps = mock_dependencies();
        let env = mock_env();

        let res = execute(
            deps.as_mut(),
            env.clone(),
            mock_info("sender", &[]),
            ExecuteMsg::Increment {
                channel: "channel-7".to_string(),
            },
        )
        .unwrap();

        assert_eq!(1, res.messages.len());
        match &res.messages[0].msg {
            CosmosMsg::Ibc(IbcMsg::SendPacket {
                channel_id,
                data,
                timeout,
            }) => {
                assert_eq!(channel_id, "channel-7");
                assert_eq!(
                    from_json::<IbcExecuteMsg>(data).unwrap(),
                    IbcExecuteMsg::Increment {}
                );
                assert_eq!(
                    timeout,
                    &IbcTimeout::with_timestamp(env.block.time.plus_seconds(120))
                );
            }
            other => panic!("unexpected message: {other:?}"),
        }

        // sending does not touch the local counters
        let channel = "channel-7".to_string();
        assert_eq!(0, count(deps.as_ref(), QueryMsg::GetCount { channel }));
    }

    #[test]
    fn counters_are_per_channel() {
        let mut deps = mock_dependencies();

        assert_eq!(1, try_increment(deps.as_mut(), "channel-0".to_string()).unwrap());
        assert_eq!(2, try_increment(deps.as_mut(), "channel-0".to_string()).unwrap());
        assert_eq!(1, try_increment(deps.as_mut(), "channel-1".to_string()).unwrap());

        let get = |channel: &str| QueryMsg::GetCount {
            channel: channel.to_string(),
        };
        assert_eq!(2, count(deps.as_ref(), get("channel-0")));
        assert_eq!(1, count(deps.as_ref(), get("channel-1")));
        assert_eq!(0, count(deps.as_ref(), get("channel-2")));
        assert_eq!(
            0,
            count(
                deps.as_ref(),
                QueryMsg::GetTimeoutCount {
                    channel: "channel-0".to_string()
                }
            )
        );
    }
}
