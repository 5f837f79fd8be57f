//! Genesis import/export for the Module State Store. Only `Params` and
//! `NextAccountId` are genesis-managed state; `CurrentSignerSlot` is
//! transient and never appears in a genesis file.

use cosmwasm_std::Storage;

use crate::error::ContractError;
use crate::msg::GenesisState;
use crate::state;

/// Missing `Params` at genesis-init time is a bootstrap invariant
/// violation and, per §7, the one class of failure this module treats
/// as fatal rather than a recoverable error surfaced to a caller.
pub fn init_genesis(storage: &mut dyn Storage, gs: &GenesisState) -> Result<(), ContractError> {
    state::set_params(storage, &gs.params)?;
    state::set_next_id(storage, gs.next_account_id);
    Ok(())
}

pub fn export_genesis(storage: &dyn Storage) -> Result<GenesisState, ContractError> {
    Ok(GenesisState {
        params: state::get_params(storage)?,
        next_account_id: state::get_next_id(storage),
    })
}
