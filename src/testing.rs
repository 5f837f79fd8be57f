//! Test doubles for the host collaborators defined in `host.rs`:
//! an in-memory account registry and a contract runtime whose `sudo`
//! behavior is configured per test. Not wired to any real contract
//! execution environment: the actual wasmd-like host is out of scope
//! (§1) and gets its own implementation outside this crate.

use std::cell::RefCell;
use std::collections::HashMap;

use cosmwasm_std::{Addr, Binary, Event};

use crate::account::AccountVariant;
use crate::error::ContractError;
use crate::host::{
    AccountKeeper, ContractRuntime, DefaultSigVerifier, Funds, SignMode, SignModeHandler,
    SignerData, Tx,
};
use crate::sudo::{AccountSudoMsg, TypedAny};

/// A `DefaultSigVerifier` that always succeeds, for scenarios where the
/// fallback path's own correctness isn't under test.
pub struct AcceptAllVerifier;

impl DefaultSigVerifier for AcceptAllVerifier {
    fn verify(&self, _tx: &dyn Tx, _simulate: bool) -> Result<Vec<Event>, ContractError> {
        Ok(vec![Event::new("default_verified")])
    }
}

/// A `DefaultSigVerifier` that always fails, for asserting an AR
/// transaction never reaches the fallback path.
pub struct RejectingVerifier;

impl DefaultSigVerifier for RejectingVerifier {
    fn verify(&self, _tx: &dyn Tx, _simulate: bool) -> Result<Vec<Event>, ContractError> {
        Err(ContractError::Std(cosmwasm_std::StdError::generic_err(
            "default verifier should not have been invoked",
        )))
    }
}

/// A fixed transaction fixture: one message, a declared signer list, and
/// (optionally) signatures. Mirrors the shape `FixedTx` test doubles
/// take in the teacher's contract test modules.
#[derive(Clone)]
pub struct FixtureTx {
    pub msgs: Vec<TypedAny>,
    pub signers: Vec<Addr>,
    pub signatures: Option<Vec<crate::host::SignatureV2>>,
}

impl Tx for FixtureTx {
    fn get_msgs(&self) -> Vec<TypedAny> {
        self.msgs.clone()
    }

    fn get_signers(&self) -> Vec<Addr> {
        self.signers.clone()
    }

    fn get_signatures_v2(&self) -> Option<Vec<crate::host::SignatureV2>> {
        self.signatures.clone()
    }
}

/// Derives sign bytes as `"{chain_id}/{account_number}/{sequence}"`.
/// Deterministic and sufficient to distinguish every wrong-{key, chain
/// id, account number, sequence} scenario without a real signing
/// scheme wired in.
pub struct FixtureSignModeHandler;

impl SignModeHandler for FixtureSignModeHandler {
    fn get_sign_bytes(
        &self,
        _sign_mode: SignMode,
        signer_data: &SignerData,
        _tx: &dyn Tx,
    ) -> Result<Vec<u8>, ContractError> {
        Ok(format!(
            "{}/{}/{}",
            signer_data.chain_id, signer_data.account_number, signer_data.sequence
        )
        .into_bytes())
    }
}

/// An in-memory stand-in for the host's account registry.
#[derive(Default)]
pub struct MockAccountKeeper {
    accounts: RefCell<HashMap<Addr, AccountVariant>>,
}

impl MockAccountKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: AccountVariant) {
        let addr = account.address().cloned().expect("account must have an address");
        self.accounts.borrow_mut().insert(addr, account);
    }
}

impl AccountKeeper for MockAccountKeeper {
    fn get_account(&self, address: &Addr) -> Option<AccountVariant> {
        self.accounts.borrow().get(address).cloned()
    }

    fn set_account(&self, account: AccountVariant) {
        self.insert(account);
    }
}

/// A configurable contract runtime. `instantiate2` always succeeds;
/// the address it returns for a given label defaults to
/// `"contract-{label}"` unless overridden with
/// [`MockContractRuntime::set_instantiated_address`]. Tests that read
/// the account back out of a [`MockAccountKeeper`] afterwards (as the
/// real Registration Service does) need to pre-seed a `BaseAccount` at
/// that same address, modeling the host auto-creating one the first
/// time an address is touched. `sudo`'s behavior for a given contract
/// address is set by [`MockContractRuntime::expect_credential_check`],
/// [`MockContractRuntime::expect_gas_cost`], or
/// [`MockContractRuntime::expect_always_accept`].
pub struct MockContractRuntime {
    next_instantiated: RefCell<HashMap<String, Addr>>,
    sudo_behavior: RefCell<HashMap<Addr, SudoBehavior>>,
}

enum SudoBehavior {
    /// Accept only when the `BeforeTx`'s `tx_bytes` matches exactly, or
    /// unconditionally accept `AfterTx` / `simulate` calls.
    AcceptMatchingTxBytes { expected_tx_bytes: Vec<u8> },
    /// Simulate a gas-hungry contract: any call costs `gas_cost`, and
    /// fails with `OutOfGas` if the caller's limit is lower.
    CostsGas { gas_cost: u64 },
    /// Always succeeds with no events.
    AlwaysAccept,
}

impl Default for MockContractRuntime {
    fn default() -> Self {
        Self {
            next_instantiated: RefCell::new(HashMap::new()),
            sudo_behavior: RefCell::new(HashMap::new()),
        }
    }
}

impl MockContractRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the address `instantiate2` returns for `label`, so a test
    /// can pre-seed a matching `BaseAccount` in a `MockAccountKeeper`
    /// before calling the Registration Service.
    pub fn set_instantiated_address(&self, label: &str, addr: Addr) {
        self.next_instantiated
            .borrow_mut()
            .insert(label.to_string(), addr);
    }

    /// Configures `contract_addr`'s `sudo` to accept only `BeforeTx`
    /// calls whose `tx_bytes` equal `expected_tx_bytes` (modeling a
    /// contract that verifies a credential against the sign bytes it
    /// was given); `AfterTx` and `simulate` calls always succeed.
    pub fn expect_credential_check(&self, contract_addr: Addr, expected_tx_bytes: Vec<u8>) {
        self.sudo_behavior.borrow_mut().insert(
            contract_addr,
            SudoBehavior::AcceptMatchingTxBytes { expected_tx_bytes },
        );
    }

    pub fn expect_gas_cost(&self, contract_addr: Addr, gas_cost: u64) {
        self.sudo_behavior
            .borrow_mut()
            .insert(contract_addr, SudoBehavior::CostsGas { gas_cost });
    }

    pub fn expect_always_accept(&self, contract_addr: Addr) {
        self.sudo_behavior
            .borrow_mut()
            .insert(contract_addr, SudoBehavior::AlwaysAccept);
    }
}

impl ContractRuntime for MockContractRuntime {
    fn instantiate2(
        &self,
        _sender: &Addr,
        _admin: &Addr,
        _code_id: u64,
        _init_msg: &Binary,
        _funds: &Funds,
        _salt: &Binary,
        label: &str,
    ) -> Result<(Addr, Binary), ContractError> {
        let addr = self
            .next_instantiated
            .borrow()
            .get(label)
            .cloned()
            .unwrap_or_else(|| Addr::unchecked(format!("contract-{label}")));
        Ok((addr, Binary::default()))
    }

    fn migrate(
        &self,
        _admin: &Addr,
        _contract_addr: &Addr,
        _new_code_id: u64,
        _migrate_msg: &Binary,
    ) -> Result<Binary, ContractError> {
        Ok(Binary::default())
    }

    fn sudo(
        &self,
        contract_addr: &Addr,
        msg: &AccountSudoMsg,
        gas_limit: u64,
    ) -> Result<Vec<Event>, ContractError> {
        let behavior = self.sudo_behavior.borrow();
        match behavior.get(contract_addr) {
            Some(SudoBehavior::CostsGas { gas_cost }) => {
                if *gas_cost > gas_limit {
                    return Err(ContractError::OutOfGas {
                        limit: gas_limit,
                        consumed: *gas_cost,
                    });
                }
                Ok(vec![])
            }
            Some(SudoBehavior::AcceptMatchingTxBytes { expected_tx_bytes }) => match msg {
                AccountSudoMsg::BeforeTx(before) => {
                    if before.simulate || before.tx_bytes.as_slice() == expected_tx_bytes.as_slice()
                    {
                        Ok(vec![Event::new("wasm-before_tx")])
                    } else {
                        Err(ContractError::Std(cosmwasm_std::StdError::generic_err(
                            "credential rejected",
                        )))
                    }
                }
                AccountSudoMsg::AfterTx(_) => Ok(vec![Event::new("wasm-after_tx")]),
            },
            Some(SudoBehavior::AlwaysAccept) | None => Ok(vec![]),
        }
    }
}
