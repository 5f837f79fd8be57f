//! Wire messages processed by the Registration Service, and the query
//! surface exposed alongside it (§6). Shaped the way the teacher's
//! contract crates shape their `msg.rs` modules
//! (`ExecuteMsg`/response structs, `QueryResponses` derive).

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Coin};

use crate::params::Params;

#[cw_serde]
pub struct RegisterAccount {
    pub sender: Addr,
    pub code_id: u64,
    pub init_msg: Binary,
    pub funds: Vec<Coin>,
    pub salt: Binary,
}

#[cw_serde]
pub struct RegisterAccountResponse {
    pub address: Addr,
    pub data: Option<Binary>,
}

#[cw_serde]
pub struct MigrateAccount {
    pub sender: Addr,
    pub code_id: u64,
    pub msg: Binary,
}

#[cw_serde]
pub struct MigrateAccountResponse {
    pub data: Option<Binary>,
}

#[cw_serde]
pub struct UpdateParams {
    pub sender: Addr,
    pub params: Params,
}

#[cw_serde]
pub struct UpdateParamsResponse {}

#[cw_serde]
pub struct GenesisState {
    pub params: Params,
    pub next_account_id: u64,
}

impl GenesisState {
    pub fn default_with_authority() -> Self {
        Self {
            params: Params::default_allow_all(),
            next_account_id: 1,
        }
    }
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Params)]
    Params {},
    #[returns(u64)]
    NextAccountId {},
}
