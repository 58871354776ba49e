/*!
   Type-erased access to a contract's entry points.

   The simulated chain stores contract code as [`Contract`] trait objects.
   [`ContractWrapper`] adapts the plain entry point functions exported by a
   CosmWasm contract crate, deserializing the raw JSON messages into the
   contract's own message types.
*/

use core::fmt::Display;
use cosmwasm_std::{
    from_json, Binary, Deps, DepsMut, Env, IbcBasicResponse, IbcChannelCloseMsg,
    IbcChannelConnectMsg, IbcChannelOpenMsg, IbcChannelOpenResponse, IbcPacketAckMsg,
    IbcPacketReceiveMsg, IbcPacketTimeoutMsg, IbcReceiveResponse, MessageInfo, Response,
};
use eyre::{eyre, Report};
use serde::de::DeserializeOwned;

pub trait Contract {
    fn instantiate(
        &self,
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        msg: &[u8],
    ) -> Result<Response, Report>;

    fn execute(
        &self,
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        msg: &[u8],
    ) -> Result<Response, Report>;

    fn query(&self, deps: Deps, env: Env, msg: &[u8]) -> Result<Binary, Report>;

    /// Whether the contract exports the IBC entry points. Only such contracts
    /// are bound to an IBC port when instantiated.
    fn has_ibc(&self) -> bool;

    fn ibc_channel_open(
        &self,
        deps: DepsMut,
        env: Env,
        msg: IbcChannelOpenMsg,
    ) -> Result<IbcChannelOpenResponse, Report>;

    fn ibc_channel_connect(
        &self,
        deps: DepsMut,
        env: Env,
        msg: IbcChannelConnectMsg,
    ) -> Result<IbcBasicResponse, Report>;

    fn ibc_channel_close(
        &self,
        deps: DepsMut,
        env: Env,
        msg: IbcChannelCloseMsg,
    ) -> Result<IbcBasicResponse, Report>;

    fn ibc_packet_receive(
        &self,
        deps: DepsMut,
        env: Env,
        msg: IbcPacketReceiveMsg,
    ) -> Result<IbcReceiveResponse, Report>;

    fn ibc_packet_ack(
        &self,
        deps: DepsMut,
        env: Env,
        msg: IbcPacketAckMsg,
    ) -> Result<IbcBasicResponse, Report>;

    fn ibc_packet_timeout(
        &self,
        deps: DepsMut,
        env: Env,
        msg: IbcPacketTimeoutMsg,
    ) -> Result<IbcBasicResponse, Report>;
}

type InstantiateFn = Box<dyn Fn(DepsMut, Env, MessageInfo, &[u8]) -> Result<Response, Report>>;
type ExecuteFn = Box<dyn Fn(DepsMut, Env, MessageInfo, &[u8]) -> Result<Response, Report>>;
type QueryFn = Box<dyn Fn(Deps, Env, &[u8]) -> Result<Binary, Report>>;

type ChannelOpenFn =
    Box<dyn Fn(DepsMut, Env, IbcChannelOpenMsg) -> Result<IbcChannelOpenResponse, Report>>;
type ChannelConnectFn =
    Box<dyn Fn(DepsMut, Env, IbcChannelConnectMsg) -> Result<IbcBasicResponse, Report>>;
type ChannelCloseFn =
    Box<dyn Fn(DepsMut, Env, IbcChannelCloseMsg) -> Result<IbcBasicResponse, Report>>;
type PacketReceiveFn =
    Box<dyn Fn(DepsMut, Env, IbcPacketReceiveMsg) -> Result<IbcReceiveResponse, Report>>;
type PacketAckFn = Box<dyn Fn(DepsMut, Env, IbcPacketAckMsg) -> Result<IbcBasicResponse, Report>>;
type PacketTimeoutFn =
    Box<dyn Fn(DepsMut, Env, IbcPacketTimeoutMsg) -> Result<IbcBasicResponse, Report>>;

struct IbcEntryPoints {
    channel_open: ChannelOpenFn,
    channel_connect: ChannelConnectFn,
    channel_close: ChannelCloseFn,
    packet_receive: PacketReceiveFn,
    packet_ack: PacketAckFn,
    packet_timeout: PacketTimeoutFn,
}

pub struct ContractWrapper {
    instantiate: InstantiateFn,
    execute: ExecuteFn,
    query: QueryFn,
    ibc: Option<IbcEntryPoints>,
}

fn to_report(e: impl Display) -> Report {
    eyre!("{}", e)
}

impl ContractWrapper {
    pub fn new<T1, T2, T3, E1, E2, E3>(
        execute: fn(DepsMut, Env, MessageInfo, T1) -> Result<Response, E1>,
        instantiate: fn(DepsMut, Env, MessageInfo, T2) -> Result<Response, E2>,
        query: fn(Deps, Env, T3) -> Result<Binary, E3>,
    ) -> Self
    where
        T1: DeserializeOwned + 'static,
        T2: DeserializeOwned + 'static,
        T3: DeserializeOwned + 'static,
        E1: Display + 'static,
        E2: Display + 'static,
        E3: Display + 'static,
    {
        Self {
            instantiate: Box::new(move |deps, env, info, msg| {
                let msg: T2 = from_json(msg).map_err(to_report)?;
                instantiate(deps, env, info, msg).map_err(to_report)
            }),
            execute: Box::new(move |deps, env, info, msg| {
                let msg: T1 = from_json(msg).map_err(to_report)?;
                execute(deps, env, info, msg).map_err(to_report)
            }),
            query: Box::new(move |deps, env, msg| {
                let msg: T3 = from_json(msg).map_err(to_report)?;
                query(deps, env, msg).map_err(to_report)
            }),
            ibc: None,
        }
    }

    /// Attach the six IBC entry points. Packet receive usually has its own
    /// error type, as contracts are expected to turn failures into error
    /// acknowledgements instead of failing the transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn with_ibc<E1, E2>(
        self,
        channel_open: fn(DepsMut, Env, IbcChannelOpenMsg) -> Result<IbcChannelOpenResponse, E1>,
        channel_connect: fn(DepsMut, Env, IbcChannelConnectMsg) -> Result<IbcBasicResponse, E1>,
        channel_close: fn(DepsMut, Env, IbcChannelCloseMsg) -> Result<IbcBasicResponse, E1>,
        packet_receive: fn(DepsMut, Env, IbcPacketReceiveMsg) -> Result<IbcReceiveResponse, E2>,
        packet_ack: fn(DepsMut, Env, IbcPacketAckMsg) -> Result<IbcBasicResponse, E1>,
        packet_timeout: fn(DepsMut, Env, IbcPacketTimeoutMsg) -> Result<IbcBasicResponse, E1>,
    ) -> Self
    where
        E1: Display + 'static,
        E2: Display + 'static,
    {
        let ibc = IbcEntryPoints {
            channel_open: Box::new(move |deps, env, msg| {
                channel_open(deps, env, msg).map_err(to_report)
            }),
            channel_connect: Box::new(move |deps, env, msg| {
                channel_connect(deps, env, msg).map_err(to_report)
            }),
            channel_close: Box::new(move |deps, env, msg| {
                channel_close(deps, env, msg).map_err(to_report)
            }),
            packet_receive: Box::new(move |deps, env, msg| {
                packet_receive(deps, env, msg).map_err(to_report)
            }),
            packet_ack: Box::new(move |deps, env, msg| {
                packet_ack(deps, env, msg).map_err(to_report)
            }),
            packet_timeout: Box::new(move |deps, env, msg| {
                packet_timeout(deps, env, msg).map_err(to_report)
            }),
        };

        Self {
            ibc: Some(ibc),
            ..self
        }
    }

    fn ibc_entry_points(&self) -> Result<&IbcEntryPoints, Report> {
        self.ibc
            .as_ref()
            .ok_or_else(|| eyre!("contract does not export IBC entry points"))
    }
}

impl Contract for ContractWrapper {
    fn instantiate(
        &self,
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        msg: &[u8],
    ) -> Result<Response, Report> {
        (self.instantiate)(deps, env, info, msg)
    }

    fn execute(
        &self,
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        msg: &[u8],
    ) -> Result<Response, Report> {
        (self.execute)(deps, env, info, msg)
    }

    fn query(&self, deps: Deps, env: Env, msg: &[u8]) -> Result<Binary, Report> {
        (self.query)(deps, env, msg)
    }

    fn has_ibc(&self) -> bool {
        self.ibc.is_some()
    }

    fn ibc_channel_open(
        &self,
        deps: DepsMut,
        env: Env,
        msg: IbcChannelOpenMsg,
    ) -> Result<IbcChannelOpenResponse, Report> {
        (self.ibc_entry_points()?.channel_open)(deps, env, msg)
    }

    fn ibc_channel_connect(
        &self,
        deps: DepsMut,
        env: Env,
        msg: IbcChannelConnectMsg,
    ) -> Result<IbcBasicResponse, Report> {
        (self.ibc_entry_points()?.channel_connect)(deps, env, msg)
    }

    fn ibc_channel_close(
        &self,
        deps: DepsMut,
        env: Env,
        msg: IbcChannelCloseMsg,
    ) -> Result<IbcBasicResponse, Report> {
        (self.ibc_entry_points()?.channel_close)(deps, env, msg)
    }

    fn ibc_packet_receive(
        &self,
        deps: DepsMut,
        env: Env,
        msg: IbcPacketReceiveMsg,
    ) -> Result<IbcReceiveResponse, Report> {
        (self.ibc_entry_points()?.packet_receive)(deps, env, msg)
    }

    fn ibc_packet_ack(
        &self,
        deps: DepsMut,
        env: Env,
        msg: IbcPacketAckMsg,
    ) -> Result<IbcBasicResponse, Report> {
        (self.ibc_entry_points()?.packet_ack)(deps, env, msg)
    }

    fn ibc_packet_timeout(
        &self,
        deps: DepsMut,
        env: Env,
        msg: IbcPacketTimeoutMsg,
    ) -> Result<IbcBasicResponse, Report> {
        (self.ibc_entry_points()?.packet_timeout)(deps, env, msg)
    }
}
