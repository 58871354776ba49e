//! Error type used for the tests.

use core::convert::From;
use cosmwasm_std::StdError;
use eyre::Report;
use flex_error::{define_error, TraceError};
use std::io::{Error as IoError, ErrorKind as IoErrorKind};

define_error! {
    Error {
        Generic
            [ TraceError<Report> ]
            | _ | { "generic error" },

        Assertion
            { message: String }
            | e | { format_args!("assertion failure: {}", e.message) },

        Io
            [ TraceError<IoError> ]
            | _ | { "io error"},

        CommandNotFound
            { command: String }
            [ TraceError<IoError> ]
            | e | { format_args!("failed to execute command: {}. make sure it is available in $PATH", e.command) },

        Std
            [ TraceError<StdError> ]
            | _ | { "cosmwasm standard library error" },

        Contract
            { address: String, message: String }
            | e | {
                format_args!("contract {} returned an error: {}", e.address, e.message)
            },

        TxFailed
            { code: u64, raw_log: String }
            | e | {
                format_args!("transaction failed with code {}: {}", e.code, e.raw_log)
            },

        UnknownChain
            { chain_id: String }
            | e | { format_args!("no chain with id {}", e.chain_id) },

        UnknownCode
            { chain_id: String, code_id: u64 }
            | e | { format_args!("no code with id {} stored on chain {}", e.code_id, e.chain_id) },

        UnknownContract
            { chain_id: String, address: String }
            | e | { format_args!("no contract at {} on chain {}", e.address, e.chain_id) },

        UnknownAccount
            { chain_id: String, address: String }
            | e | { format_args!("no account {} on chain {}", e.address, e.chain_id) },

        UnknownClient
            { chain_id: String, client_id: String }
            | e | { format_args!("no client {} on chain {}", e.client_id, e.chain_id) },

        UnknownConnection
            { chain_id: String, connection_id: String }
            | e | { format_args!("no connection {} on chain {}", e.connection_id, e.chain_id) },

        UnknownChannel
            { chain_id: String, port_id: String, channel_id: String }
            | e | {
                format_args!("no channel {}/{} on chain {}", e.port_id, e.channel_id, e.chain_id)
            },

        MissingEndpointId
            { chain_id: String, kind: String }
            | e | {
                format_args!("path endpoint on chain {} has no {} yet", e.chain_id, e.kind)
            },

        AccountSequenceMismatch
            { address: String, expected: u64, actual: u64 }
            | e | {
                format_args!("account sequence mismatch for {}: expected {}, got {}",
                    e.address, e.expected, e.actual)
            },

        InvalidSignature
            { address: String }
            | e | { format_args!("signature verification failed for {}", e.address) },

        InsufficientFunds
            { address: String, needed: String }
            | e | { format_args!("{} has insufficient funds, needed {}", e.address, e.needed) },

        ClientNotActive
            { chain_id: String, client_id: String, status: String }
            | e | {
                format_args!("client {} on chain {} is not active, status: {}",
                    e.client_id, e.chain_id, e.status)
            },

        ConnectionNotOpen
            { chain_id: String, connection_id: String }
            | e | {
                format_args!("connection {} on chain {} is not open", e.connection_id, e.chain_id)
            },

        ChannelNotOpen
            { chain_id: String, port_id: String, channel_id: String }
            | e | {
                format_args!("channel {}/{} on chain {} is not open",
                    e.port_id, e.channel_id, e.chain_id)
            },

        PacketTimedOut
            { chain_id: String, sequence: u64 }
            | e | {
                format_args!("packet with sequence {} has timed out on chain {}",
                    e.sequence, e.chain_id)
            },

        PacketAlreadyReceived
            { chain_id: String, sequence: u64 }
            | e | {
                format_args!("packet with sequence {} was already received on chain {}",
                    e.sequence, e.chain_id)
            },

        UnsupportedMessage
            { message: String }
            | e | { format_args!("message is not supported by the simulated chain: {}", e.message) },

        Relayer
            { message: String }
            | e | { format_args!("relayer command failed: {}", e.message) },

        PoisonedMutex
            | _ | { "poisoned mutex" },
    }
}

pub fn handle_generic_error(e: impl Into<Report>) -> Error {
    Error::generic(e.into())
}

pub fn handle_exec_error(command_path: &str) -> impl FnOnce(IoError) -> Error + '_ {
    |e| match e.kind() {
        IoErrorKind::NotFound => Error::command_not_found(command_path.to_string(), e),
        _ => Error::io(e),
    }
}

impl From<Report> for Error {
    fn from(e: Report) -> Self {
        Error::generic(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::io(e)
    }
}

impl From<StdError> for Error {
    fn from(e: StdError) -> Self {
        Error::std(e)
    }
}
