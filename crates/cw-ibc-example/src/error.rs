use cosmwasm_std::StdError;
use thiserror::Error;

/// Error type for entry points that must not fail, such as packet receive.
#[derive(Error, Debug)]
pub enum Never {}

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Only unordered channels are supported.")]
    OrderedChannel {},

    #[error("Invalid IBC channel version. Got ({actual}), expected ({expected}).")]
    InvalidVersion { actual: String, expected: String },
}
