//! Module parameters: the code-ID allow-list and the before/after-tx gas caps.

use cosmwasm_schema::cw_serde;

use crate::error::ContractError;

/// Gas budget a contract's `sudo` entry point is allowed to burn on a
/// before-tx or after-tx hook before this module treats it the same way
/// the original Go module did: 2,000,000 (`original_source/x/abstractaccount/types/params.go`).
pub const DEFAULT_MAX_GAS: u64 = 2_000_000;

#[cw_serde]
pub struct Params {
    /// If true, any code ID may be registered/migrated to, and
    /// `allowed_code_ids` must be empty.
    pub allow_all_code_ids: bool,
    /// Strictly ascending, no zeros. Ignored (must be empty) when
    /// `allow_all_code_ids` is set.
    pub allowed_code_ids: Vec<u64>,
    pub max_gas_before: u64,
    pub max_gas_after: u64,
}

impl Params {
    pub fn new_allow_all(max_gas_before: u64, max_gas_after: u64) -> Self {
        Self {
            allow_all_code_ids: true,
            allowed_code_ids: vec![],
            max_gas_before,
            max_gas_after,
        }
    }

    pub fn new_with_allow_list(
        allowed_code_ids: Vec<u64>,
        max_gas_before: u64,
        max_gas_after: u64,
    ) -> Self {
        Self {
            allow_all_code_ids: false,
            allowed_code_ids,
            max_gas_before,
            max_gas_after,
        }
    }

    pub fn default_allow_all() -> Self {
        Self::new_allow_all(DEFAULT_MAX_GAS, DEFAULT_MAX_GAS)
    }

    /// IsAllowed(x) = true iff allow_all ∨ x ∈ allowed_code_ids.
    pub fn is_allowed(&self, code_id: u64) -> bool {
        self.allow_all_code_ids || self.allowed_code_ids.binary_search(&code_id).is_ok()
    }

    /// Validates the allow-list shape and the gas caps. Called from
    /// `set_params` before every write, so an invalid `Params` value can
    /// never reach storage.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.allow_all_code_ids && !self.allowed_code_ids.is_empty() {
            return Err(ContractError::InvalidAllowList(
                "allowed_code_ids must be empty when allow_all_code_ids is set".to_string(),
            ));
        }

        if !self.allow_all_code_ids {
            if self.allowed_code_ids.iter().any(|id| *id == 0) {
                return Err(ContractError::InvalidAllowList(
                    "allowed_code_ids must not contain zero".to_string(),
                ));
            }

            if !self.allowed_code_ids.windows(2).all(|w| w[0] < w[1]) {
                return Err(ContractError::InvalidAllowList(
                    "allowed_code_ids must be strictly ascending with no duplicates".to_string(),
                ));
            }
        }

        if self.max_gas_before == 0 || self.max_gas_after == 0 {
            return Err(ContractError::ZeroMaxGas);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_all_accepts_everything() {
        let p = Params::default_allow_all();
        assert!(p.is_allowed(1));
        assert!(p.is_allowed(999_999));
    }

    #[test]
    fn allow_list_semantics() {
        let p = Params::new_with_allow_list(vec![888, 999], 1, 1);
        assert!(!p.is_allowed(1));
        assert!(p.is_allowed(888));
        assert!(p.is_allowed(999));
    }

    #[test]
    fn rejects_unsorted_allow_list() {
        let p = Params::new_with_allow_list(vec![999, 888], 1, 1);
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_allow_list() {
        let p = Params::new_with_allow_list(vec![1, 1], 1, 1);
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_zero_in_allow_list() {
        let p = Params::new_with_allow_list(vec![0, 1], 1, 1);
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_allow_list_with_allow_all() {
        let mut p = Params::default_allow_all();
        p.allowed_code_ids.push(1);
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_zero_max_gas() {
        let mut p = Params::default_allow_all();
        p.max_gas_before = 0;
        assert_eq!(p.validate().unwrap_err(), ContractError::ZeroMaxGas);
    }

    #[test]
    fn round_trip_via_validate() {
        let p = Params::new_with_allow_list(vec![1, 2, 3], 100, 200);
        assert!(p.validate().is_ok());
    }
}
