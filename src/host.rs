//! Seams to the host framework's collaborators: the existing contract
//! runtime and the account registry (§1: "the core composes with an
//! existing contract runtime and account registry", both explicitly
//! out of scope). This crate depends only on these trait boundaries;
//! production wiring against a real wasmd-like host, and test doubles
//! for local development, both live outside `lib.rs`'s surface
//! (doubles are in `testing.rs`).

use cosmwasm_std::{Addr, Binary, Coin, Event};

use crate::account::{AccountVariant, PublicKey};
use crate::error::ContractError;
use crate::sudo::{AccountSudoMsg, TypedAny};

/// The sign mode a signature was produced under. Only `Direct` is
/// exercised by this crate's tests; the others exist so `SignerData`
/// and `SignModeHandler` are total over the host's real sign-mode set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignMode {
    Direct,
    Textual,
    LegacyAminoJson,
}

/// The signature-data layout carried in a signer's signature slot.
/// AP requires the single-signature variant (§4.4 step 5); any other
/// shape fails with `NotSingleSignature`.
#[derive(Clone, Debug, PartialEq)]
pub enum SignatureData {
    Single {
        sign_mode: SignMode,
        signature: Binary,
    },
    Multi,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignatureV2 {
    pub public_key: PublicKey,
    pub data: SignatureData,
    pub sequence: u64,
}

/// Inputs to sign-bytes derivation: {address, chain-id, account-number,
/// sequence, pubkey} per §4.4 step 5.
#[derive(Clone, Debug, PartialEq)]
pub struct SignerData {
    pub address: Addr,
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
    pub public_key: PublicKey,
}

/// A transaction, as presented to AP. Mirrors the Go `sdk.Tx`
/// interface's relevant slice: the messages it carries, its declared
/// signers, and (when it is signature-verifiable at all) its
/// signatures.
pub trait Tx {
    fn get_msgs(&self) -> Vec<TypedAny>;
    fn get_signers(&self) -> Vec<Addr>;

    /// `None` means the tx doesn't expose the signature-verifiable
    /// capability at all (classification fails with `TxDecode`, §4.4
    /// Failure semantics).
    fn get_signatures_v2(&self) -> Option<Vec<SignatureV2>>;
}

/// Derives the canonical sign-bytes for a given sign mode, signer data,
/// and tx. An external collaborator: the host already has one per sign
/// mode it supports (DIRECT, TEXTUAL, LEGACY_AMINO_JSON, ...).
pub trait SignModeHandler {
    fn get_sign_bytes(
        &self,
        sign_mode: SignMode,
        signer_data: &SignerData,
        tx: &dyn Tx,
    ) -> Result<Vec<u8>, ContractError>;
}

/// The default signature-verification interceptor AP falls through to
/// for non-AR transactions (§4.4 step 2, "Fallback fidelity" in §8).
pub trait DefaultSigVerifier {
    fn verify(&self, tx: &dyn Tx, simulate: bool) -> Result<Vec<Event>, ContractError>;
}

/// The host's account registry. `get_account`/`set_account` are the
/// only two operations this module needs from it; both the Registration
/// Service (writing an `AbstractAccountRecord` over a freshly
/// instantiated `BaseAccount`) and AP (reading a signer's account to
/// classify and sequence-check it) go through this seam.
pub trait AccountKeeper {
    fn get_account(&self, address: &Addr) -> Option<AccountVariant>;
    fn set_account(&self, account: AccountVariant);
}

/// Funds attached to a contract instantiation, as a newtype so
/// `ContractRuntime::instantiate2`'s signature reads like the rest of
/// this crate's domain types rather than a bare `Vec<Coin>`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Funds(pub Vec<Coin>);

/// The result of a single `sudo` call: events the contract chose to
/// emit. The gas-metered, cache-and-commit-on-success /
/// discard-on-failure discipline (§5, §9) is this trait's
/// responsibility to uphold: a real implementation wraps its own
/// cached sub-context around the call; the signature here only
/// captures the caller-visible contract: `Ok` carries events to merge,
/// `Err` means nothing the contract did persists.
pub trait ContractRuntime {
    /// Deterministic-address instantiation (§4.3 step 2): address is
    /// derived from code, sender and salt; `admin` is always this
    /// module's own address; `fix_msg` is always false.
    fn instantiate2(
        &self,
        sender: &Addr,
        admin: &Addr,
        code_id: u64,
        init_msg: &Binary,
        funds: &Funds,
        salt: &Binary,
        label: &str,
    ) -> Result<(Addr, Binary), ContractError>;

    fn migrate(
        &self,
        admin: &Addr,
        contract_addr: &Addr,
        new_code_id: u64,
        migrate_msg: &Binary,
    ) -> Result<Binary, ContractError>;

    /// Invokes the contract's privileged `sudo` entry point, bounded by
    /// `gas_limit`. Exceeding it surfaces as `ContractError::OutOfGas`.
    fn sudo(
        &self,
        contract_addr: &Addr,
        msg: &AccountSudoMsg,
        gas_limit: u64,
    ) -> Result<Vec<Event>, ContractError>;
}

/// Calls `runtime.sudo` under `gas_limit`. The single call site
/// `before_tx` and `after_tx` both use, so the gas-bounded dispatch and
/// its logging are written once (§9 "Scoped gas-metered sub-context").
pub fn sudo_with_gas_limit(
    runtime: &dyn ContractRuntime,
    contract_addr: &Addr,
    msg: &AccountSudoMsg,
    gas_limit: u64,
) -> Result<Vec<Event>, ContractError> {
    tracing::debug!(contract = %contract_addr, gas_limit, "dispatching sudo call");

    match runtime.sudo(contract_addr, msg, gas_limit) {
        Ok(events) => {
            tracing::debug!(contract = %contract_addr, events = events.len(), "sudo call succeeded");
            Ok(events)
        }
        Err(err) => {
            tracing::debug!(contract = %contract_addr, %err, "sudo call failed");
            Err(err)
        }
    }
}
