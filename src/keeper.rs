//! Registration Service (RS): instantiates a contract, yields a
//! deterministic address, and overlays the account-type metadata on
//! the resulting account record (§4.3).

use cosmwasm_std::{Addr, Event, Storage};

use crate::account::{AccountVariant, AbstractAccountRecord};
use crate::error::ContractError;
use crate::events::{ATTR_CODE_ID, ATTR_CONTRACT_ADDR, ATTR_CREATOR, EVENT_TYPE_ACCOUNT_MIGRATED, EVENT_TYPE_ACCOUNT_REGISTERED};
use crate::host::{AccountKeeper, ContractRuntime, Funds};
use crate::msg::{
    MigrateAccount, MigrateAccountResponse, RegisterAccount, RegisterAccountResponse,
    UpdateParams, UpdateParamsResponse,
};
use crate::params::Params;
use crate::state;

/// Fixed configuration the embedding host wires in at construction
/// time: the address permitted to `UpdateParams`, and this module's
/// own address, which is always the `admin` on every contract it
/// instantiates or migrates (§9 Open Question (a)).
pub struct Keeper {
    pub authority: Addr,
    pub module_address: Addr,
}

impl Keeper {
    pub fn new(authority: Addr, module_address: Addr) -> Self {
        Self {
            authority,
            module_address,
        }
    }

    /// Register: instantiate a contract, overlay an
    /// `AbstractAccountRecord` on the resulting account (§4.3).
    pub fn register(
        &self,
        storage: &mut dyn Storage,
        account_keeper: &dyn AccountKeeper,
        contract_runtime: &dyn ContractRuntime,
        msg: RegisterAccount,
    ) -> Result<(RegisterAccountResponse, Vec<Event>), ContractError> {
        let params = state::get_params(storage)?;
        if !params.is_allowed(msg.code_id) {
            return Err(ContractError::NotAllowedCodeId {
                code_id: msg.code_id,
            });
        }

        let id = state::get_and_increment_next_id(storage);
        let label = format!("abstractaccount/{id}");

        let (contract_addr, data) = contract_runtime.instantiate2(
            &msg.sender,
            &self.module_address,
            msg.code_id,
            &msg.init_msg,
            &Funds(msg.funds.clone()),
            &msg.salt,
            &label,
        )?;

        // The instantiation above must have produced the host's default
        // base-account variant; anything else is a host invariant
        // violation (§4.3 step 3).
        let base = account_keeper
            .get_account(&contract_addr)
            .and_then(|acc| acc.as_base().cloned())
            .ok_or(ContractError::NotBaseAccount)?;

        let ar = AbstractAccountRecord::from_base_account(&base);
        account_keeper.set_account(AccountVariant::Abstract(ar));

        tracing::info!(
            creator = %msg.sender,
            code_id = msg.code_id,
            contract_addr = %contract_addr,
            "abstract account registered",
        );

        let event = Event::new(EVENT_TYPE_ACCOUNT_REGISTERED)
            .add_attribute(ATTR_CREATOR, msg.sender.to_string())
            .add_attribute(ATTR_CODE_ID, msg.code_id.to_string())
            .add_attribute(ATTR_CONTRACT_ADDR, contract_addr.to_string());

        Ok((
            RegisterAccountResponse {
                address: contract_addr,
                data: Some(data),
            },
            vec![event],
        ))
    }

    /// Migrate: the module is always `admin`, enforcing the code-ID
    /// allow-list policy on every migration the same way it's enforced
    /// on registration (§9 Open Question (a): an earlier revision set
    /// the contract itself as admin; this one does not).
    pub fn migrate(
        &self,
        storage: &dyn Storage,
        account_keeper: &dyn AccountKeeper,
        contract_runtime: &dyn ContractRuntime,
        msg: MigrateAccount,
    ) -> Result<(MigrateAccountResponse, Vec<Event>), ContractError> {
        let params = state::get_params(storage)?;
        if !params.is_allowed(msg.code_id) {
            return Err(ContractError::NotAllowedCodeId {
                code_id: msg.code_id,
            });
        }

        // `caller is the account itself`: the normal tx-authentication
        // pipeline (AP) already guarantees `msg.sender` is the tx signer,
        // so this check only needs to assert that signer is an AR.
        account_keeper
            .get_account(&msg.sender)
            .and_then(|acc| acc.as_abstract().cloned())
            .ok_or_else(|| ContractError::NotAbstractAccount {
                address: msg.sender.clone(),
            })?;

        let data = contract_runtime.migrate(
            &self.module_address,
            &msg.sender,
            msg.code_id,
            &msg.msg,
        )?;

        let event = Event::new(EVENT_TYPE_ACCOUNT_MIGRATED)
            .add_attribute(ATTR_CONTRACT_ADDR, msg.sender.to_string())
            .add_attribute(ATTR_CODE_ID, msg.code_id.to_string());

        Ok((MigrateAccountResponse { data: Some(data) }, vec![event]))
    }

    /// UpdateParams: only the configured authority may call this.
    pub fn update_params(
        &self,
        storage: &mut dyn Storage,
        msg: UpdateParams,
    ) -> Result<(UpdateParamsResponse, Vec<Event>), ContractError> {
        if msg.sender != self.authority {
            return Err(ContractError::Unauthorized);
        }

        state::set_params(storage, &msg.params)?;

        Ok((UpdateParamsResponse {}, vec![]))
    }

    pub fn query_params(&self, storage: &dyn Storage) -> Result<Params, ContractError> {
        state::get_params(storage)
    }

    pub fn query_next_account_id(&self, storage: &dyn Storage) -> u64 {
        state::get_next_id(storage)
    }
}
