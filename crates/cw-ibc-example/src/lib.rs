//! A counter that is incremented over IBC.
//!
//! Two instances of this contract connected by a `counter-1` channel can
//! ask each other to increment the counter kept for their end of the
//! channel. See [`contract::execute`] for the sending side and
//! [`ibc::ibc_packet_receive`] for the receiving side.

pub mod ack;
pub mod contract;
mod error;
pub mod ibc;
pub mod msg;
pub mod state;

pub use crate::error::{ContractError, Never};
