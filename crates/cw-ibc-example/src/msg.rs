use cosmwasm_schema::{cw_serde, QueryResponses};

#[cw_serde]
pub struct InstantiateMsg {}

#[cw_serde]
pub enum ExecuteMsg {
    /// Ask the contract on the other end of `channel` to increment
    /// its counter.
    Increment { channel: String },
}

/// Packet payload sent between two instances of the contract.
#[cw_serde]
pub enum IbcExecuteMsg {
    Increment {},
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Number of increments received on the local channel `channel`.
    #[returns(GetCountResponse)]
    GetCount { channel: String },

    /// Number of increments sent on the local channel `channel` that
    /// timed out.
    #[returns(GetCountResponse)]
    GetTimeoutCount { channel: String },
}

#[cw_serde]
pub struct GetCountResponse {
    pub count: u32,
}
