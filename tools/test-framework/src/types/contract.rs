/*!
   JSON shapes of the counter contract API, as seen from the command
   line of a chain daemon.

   The chain CLI wraps smart query results in a `{"data": ...}` envelope
   and dumps raw contract storage as hex encoded keys with base64 encoded
   values, so these mirror types are kept separate from the contract's
   own message types.
*/

use core::fmt::{self, Display};
use serde::{Deserialize, Serialize};
use subtle_encoding::{base64, hex};

use crate::error::{handle_generic_error, Error};

/**
   A smart query sent to the contract. Exactly one of the fields is
   expected to be set.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryMsg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get_count: Option<GetCount>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub get_timeout_count: Option<GetCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCount {
    pub channel: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub data: GetCountQuery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCountQuery {
    pub count: u32,
}

/// One raw storage entry of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvPair {
    /// Hex encoded storage key.
    pub key: String,

    /// Base64 encoded value.
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractStateResp {
    #[serde(default)]
    pub models: Vec<KvPair>,
}

impl QueryMsg {
    pub fn get_count(channel: &str) -> Self {
        Self {
            get_count: Some(GetCount {
                channel: channel.to_string(),
            }),
            get_timeout_count: None,
        }
    }

    pub fn get_timeout_count(channel: &str) -> Self {
        Self {
            get_count: None,
            get_timeout_count: Some(GetCount {
                channel: channel.to_string(),
            }),
        }
    }
}

impl KvPair {
    /**
       Decode the hex key into its raw bytes, rendered lossily as UTF-8.
       Keys written by `cw-storage-plus` maps carry a two byte length
       prefix before the namespace, which shows up as control characters.
    */
    pub fn decoded_key(&self) -> Result<String, Error> {
        let bytes = hex::decode(self.key.to_lowercase().as_bytes())
            .map_err(handle_generic_error)?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn decoded_value(&self) -> Result<String, Error> {
        let bytes = base64::decode(self.value.as_bytes()).map_err(handle_generic_error)?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Display for KvPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.decoded_key(), self.decoded_value()) {
            (Ok(key), Ok(value)) => write!(f, "{key:?} => {value}"),
            _ => write!(f, "{} => {}", self.key, self.value),
        }
    }
}
