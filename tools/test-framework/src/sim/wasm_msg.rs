/*!
   Messages accepted by a simulated chain, and the builders that create
   them on behalf of an [`Account`].
*/

use cosmwasm_std::{to_json_binary, Binary, Coin};
use serde::Serialize;

use crate::error::Error;
use crate::sim::account::Account;

/// Label given to every contract instantiated through [`Account::wasm_instantiate`].
pub const DEFAULT_LABEL: &str = "🌀";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimMsg {
    ExecuteContract {
        sender: String,
        contract: String,
        msg: Binary,
        funds: Vec<Coin>,
    },
    InstantiateContract {
        sender: String,
        admin: Option<String>,
        code_id: u64,
        label: String,
        msg: Binary,
        funds: Vec<Coin>,
    },
    BankSend {
        from_address: String,
        to_address: String,
        amount: Vec<Coin>,
    },
}

impl SimMsg {
    /// The address that has to sign a transaction carrying this message.
    pub fn signer(&self) -> &str {
        match self {
            Self::ExecuteContract { sender, .. } => sender,
            Self::InstantiateContract { sender, .. } => sender,
            Self::BankSend { from_address, .. } => from_address,
        }
    }
}

impl Account {
    pub fn wasm_execute(
        &self,
        contract: &str,
        msg: &impl Serialize,
        funds: Vec<Coin>,
    ) -> Result<SimMsg, Error> {
        Ok(SimMsg::ExecuteContract {
            sender: self.address().to_string(),
            contract: contract.to_string(),
            msg: to_json_binary(msg)?,
            funds,
        })
    }

    pub fn wasm_instantiate(
        &self,
        code_id: u64,
        msg: &impl Serialize,
        admin: Option<&str>,
        funds: Vec<Coin>,
    ) -> Result<SimMsg, Error> {
        Ok(SimMsg::InstantiateContract {
            sender: self.address().to_string(),
            admin: admin.map(ToString::to_string),
            code_id,
            label: DEFAULT_LABEL.to_string(),
            msg: to_json_binary(msg)?,
            funds,
        })
    }

    pub fn bank_send(&self, to_address: &str, amount: Vec<Coin>) -> SimMsg {
        SimMsg::BankSend {
            from_address: self.address().to_string(),
            to_address: to_address.to_string(),
            amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::from_json;
    use cw_ibc_example::msg::ExecuteMsg;

    use crate::sim::chain::SimChain;
    use crate::sim::clock::MockClock;
    use ibc_relayer_types::core::ics24_host::identifier::ChainId;

    #[test]
    fn execute_message_is_signed_by_the_account() -> Result<(), Error> {
        let mut chain = SimChain::new(ChainId::from_string("testchain0"), MockClock::default())?;
        let account = Account::generate(&mut chain)?;

        let msg = account.wasm_execute(
            "cosmos1contract",
            &ExecuteMsg::Increment {
                channel: "channel-0".into(),
            },
            vec![],
        )?;

        assert_eq!(msg.signer(), account.address());

        match msg {
            SimMsg::ExecuteContract { msg, .. } => {
                let parsed: ExecuteMsg = from_json(&msg)?;
                assert_eq!(
                    parsed,
                    ExecuteMsg::Increment {
                        channel: "channel-0".into()
                    }
                );
            }
            other => panic!("unexpected message {other:?}"),
        }

        Ok(())
    }

    #[test]
    fn instantiate_message_uses_default_label() -> Result<(), Error> {
        let mut chain = SimChain::new(ChainId::from_string("testchain0"), MockClock::default())?;
        let account = Account::generate(&mut chain)?;

        let msg = account.wasm_instantiate(1, &serde_json::json!({}), None, vec![])?;

        match msg {
            SimMsg::InstantiateContract { label, admin, .. } => {
                assert_eq!(label, DEFAULT_LABEL);
                assert_eq!(admin, None);
            }
            other => panic!("unexpected message {other:?}"),
        }

        Ok(())
    }
}
