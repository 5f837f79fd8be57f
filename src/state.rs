//! Module State Store (MSS): a keyed persistent map under a dedicated
//! namespace holding module params, the next-account-id counter, and the
//! transient current-signer slot.
//!
//! Keys are the fixed single-byte prefixes from
//! `original_source/x/abstractaccount/types/keys.go` rather than
//! `cw-storage-plus::Item`, whose namespace hashing would not reproduce
//! them (see DESIGN.md).

use cosmwasm_std::{Addr, Storage};

use crate::error::ContractError;
use crate::params::Params;

const KEY_PARAMS: &[u8] = &[0x00];
const KEY_NEXT_ACCOUNT_ID: &[u8] = &[0x01];
const KEY_SIGNER_ADDRESS: &[u8] = &[0x02];

/// Fails with `ParamsNotFound` if the store lacks Params, a bootstrap
/// invariant violation, not a recoverable runtime condition.
pub fn get_params(store: &dyn Storage) -> Result<Params, ContractError> {
    let bz = store
        .get(KEY_PARAMS)
        .ok_or(ContractError::ParamsNotFound)?;
    serde_json::from_slice(&bz).map_err(|e| ContractError::ParsingParams(e.to_string()))
}

/// Validates `params` before writing it, so an invalid value never
/// reaches storage.
pub fn set_params(store: &mut dyn Storage, params: &Params) -> Result<(), ContractError> {
    params.validate()?;

    let bz = serde_json::to_vec(params).map_err(|e| ContractError::ParsingParams(e.to_string()))?;
    store.set(KEY_PARAMS, &bz);

    Ok(())
}

pub fn get_next_id(store: &dyn Storage) -> u64 {
    match store.get(KEY_NEXT_ACCOUNT_ID) {
        Some(bz) => u64::from_be_bytes(bz.try_into().unwrap_or_default()),
        None => 0,
    }
}

pub fn set_next_id(store: &mut dyn Storage, id: u64) {
    store.set(KEY_NEXT_ACCOUNT_ID, &id.to_be_bytes());
}

/// Reads the current counter, then stores `counter + 1`; returns the
/// value read. Every successful `Register` calls this exactly once, so
/// `NextAccountId` strictly increases by one per registration.
pub fn get_and_increment_next_id(store: &mut dyn Storage) -> u64 {
    let id = get_next_id(store);
    set_next_id(store, id + 1);
    id
}

pub fn get_signer(store: &dyn Storage) -> Option<Addr> {
    store
        .get(KEY_SIGNER_ADDRESS)
        .map(|bz| Addr::unchecked(String::from_utf8_lossy(&bz).into_owned()))
}

pub fn set_signer(store: &mut dyn Storage, signer: &Addr) {
    store.set(KEY_SIGNER_ADDRESS, signer.as_bytes());
}

pub fn delete_signer(store: &mut dyn Storage) {
    store.remove(KEY_SIGNER_ADDRESS);
}
