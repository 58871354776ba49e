use cosmwasm_schema::cw_serde;
use cosmwasm_std::{to_json_binary, Binary};

/// Acknowledgement written for every received packet. Mirrors the
/// `Acknowledgement` message of ICS-04 so that relayers and explorers
/// can decode it.
#[cw_serde]
pub enum Ack {
    Result(Binary),
    Error(String),
}

pub fn make_ack_success() -> Binary {
    let res = Ack::Result(b"1".into());
    // serializing a two-variant enum of a binary or a string cannot fail
    to_json_binary(&res).unwrap_or_default()
}

pub fn make_ack_fail(err: String) -> Binary {
    let res = Ack::Error(err);
    to_json_binary(&res).unwrap_or_default()
}
