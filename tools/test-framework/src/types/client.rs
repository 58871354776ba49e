/*!
   Status of a light client, as reported by the `ClientStatus` query of
   the IBC client module.
*/

use core::fmt::{self, Display};
use core::str::FromStr;
use eyre::eyre;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    Active,
    Expired,
    Frozen,
    Unknown,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Expired => "Expired",
            Self::Frozen => "Frozen",
            Self::Unknown => "Unknown",
        }
    }
}

impl Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClientStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Expired" => Ok(Self::Expired),
            "Frozen" => Ok(Self::Frozen),
            "Unknown" | "Unauthorized" => Ok(Self::Unknown),
            other => Err(Error::generic(eyre!("unknown client status: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grpc_status_strings() {
        assert_eq!("Expired".parse::<ClientStatus>().unwrap(), ClientStatus::Expired);
        assert_eq!("Active".parse::<ClientStatus>().unwrap(), ClientStatus::Active);
        assert!("expired".parse::<ClientStatus>().is_err());
        assert_eq!(ClientStatus::Frozen.to_string(), "Frozen");
    }
}
