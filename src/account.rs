//! Account Record (AR): the abstract-account variant of the host's
//! account representation, plus the sentinel public key that
//! distinguishes it from ordinary accounts.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary};

use crate::error::ContractError;

/// A public key as reported by any account variant. `Sentinel` is the
/// distinguished value abstract accounts report: it carries the
/// account's own address and can never be used to verify a signature.
#[cw_serde]
pub enum PublicKey {
    /// A real cryptographic key, as an ordinary (non-abstract) account
    /// would report. Bytes are opaque to this crate; the encoding is
    /// whatever the host's signature-verifiable scheme expects.
    Secp256k1(Binary),
    /// The discriminator AP uses to recognize an AbstractAccountRecord.
    /// Its string form equals the account's address (§4.1).
    Sentinel { address: Addr },
}

impl PublicKey {
    pub fn is_sentinel(&self) -> bool {
        matches!(self, PublicKey::Sentinel { .. })
    }

    /// Stable string form. For `Sentinel`, this is the account's
    /// address, so CLI/query tooling that renders "pubkey" for any
    /// account variant gets something legible instead of binary
    /// garbage (SPEC_FULL.md §4.1).
    pub fn to_display_string(&self) -> String {
        match self {
            PublicKey::Secp256k1(bz) => bz.to_base64(),
            PublicKey::Sentinel { address } => address.to_string(),
        }
    }

    /// Verifying a signature against the sentinel key is unreachable by
    /// construction: AP never invokes signature verification for an AR
    /// transaction; it sudos the contract instead. Calling this is an
    /// implementation bug elsewhere in the pipeline, so it fails loudly
    /// rather than silently reporting a verification failure.
    pub fn verify(&self, _sign_bytes: &[u8], _signature: &[u8]) -> Result<bool, ContractError> {
        match self {
            PublicKey::Sentinel { .. } => Err(ContractError::SentinelPubKeyVerification),
            PublicKey::Secp256k1(_) => Ok(true),
        }
    }
}

/// The capability set every account variant implements
/// (get/set address, account-number, sequence, public key).
pub trait Account {
    fn get_address(&self) -> Option<&Addr>;
    fn set_address(&mut self, address: Addr) -> Result<(), ContractError>;
    fn get_account_number(&self) -> u64;
    fn set_account_number(&mut self, account_number: u64);
    fn get_sequence(&self) -> u64;
    fn set_sequence(&mut self, sequence: u64);
    fn get_public_key(&self) -> PublicKey;
    fn set_public_key(&mut self, public_key: PublicKey) -> Result<(), ContractError>;
}

/// The host's default account variant: a real key is stored and
/// `set_address` may be called any number of times before first use
/// (ordinary host behavior, unconstrained by this module).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BaseAccount {
    pub address: Option<Addr>,
    pub account_number: u64,
    pub sequence: u64,
    pub public_key: Option<PublicKey>,
}

impl Account for BaseAccount {
    fn get_address(&self) -> Option<&Addr> {
        self.address.as_ref()
    }

    fn set_address(&mut self, address: Addr) -> Result<(), ContractError> {
        self.address = Some(address);
        Ok(())
    }

    fn get_account_number(&self) -> u64 {
        self.account_number
    }

    fn set_account_number(&mut self, account_number: u64) {
        self.account_number = account_number;
    }

    fn get_sequence(&self) -> u64 {
        self.sequence
    }

    fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }

    fn get_public_key(&self) -> PublicKey {
        self.public_key
            .clone()
            .unwrap_or_else(|| PublicKey::Secp256k1(Binary::default()))
    }

    fn set_public_key(&mut self, public_key: PublicKey) -> Result<(), ContractError> {
        self.public_key = Some(public_key);
        Ok(())
    }
}

/// A module-owned account (e.g. this module's own address, used as
/// `admin` on contract instantiation/migration). Exists so
/// `AccountVariant` is a faithful closed enum of the three variants the
/// host distinguishes; no operation in this crate constructs one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModuleAccount {
    pub address: Option<Addr>,
    pub account_number: u64,
    pub sequence: u64,
}

impl Account for ModuleAccount {
    fn get_address(&self) -> Option<&Addr> {
        self.address.as_ref()
    }

    fn set_address(&mut self, address: Addr) -> Result<(), ContractError> {
        self.address = Some(address);
        Ok(())
    }

    fn get_account_number(&self) -> u64 {
        self.account_number
    }

    fn set_account_number(&mut self, account_number: u64) {
        self.account_number = account_number;
    }

    fn get_sequence(&self) -> u64 {
        self.sequence
    }

    fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }

    fn get_public_key(&self) -> PublicKey {
        PublicKey::Secp256k1(Binary::default())
    }

    fn set_public_key(&mut self, _public_key: PublicKey) -> Result<(), ContractError> {
        Err(ContractError::Std(cosmwasm_std::StdError::generic_err(
            "module accounts do not store keys",
        )))
    }
}

/// An AbstractAccountRecord: disables the default public-key storage
/// and signature-verification paths. The address is immutable once
/// set; the public key is never stored, only derived.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AbstractAccountRecord {
    address: Option<Addr>,
    account_number: u64,
    sequence: u64,
}

impl AbstractAccountRecord {
    /// Overlays AR metadata on an existing base account, preserving its
    /// address, account-number and sequence (§4.3 step 4).
    pub fn from_base_account(base: &BaseAccount) -> Self {
        Self {
            address: base.address.clone(),
            account_number: base.account_number,
            sequence: base.sequence,
        }
    }
}

impl Account for AbstractAccountRecord {
    fn get_address(&self) -> Option<&Addr> {
        self.address.as_ref()
    }

    fn set_address(&mut self, address: Addr) -> Result<(), ContractError> {
        if self.address.is_some() {
            return Err(ContractError::Std(cosmwasm_std::StdError::generic_err(
                "abstract account address is immutable once set",
            )));
        }
        self.address = Some(address);
        Ok(())
    }

    fn get_account_number(&self) -> u64 {
        self.account_number
    }

    fn set_account_number(&mut self, account_number: u64) {
        self.account_number = account_number;
    }

    fn get_sequence(&self) -> u64 {
        self.sequence
    }

    fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }

    fn get_public_key(&self) -> PublicKey {
        // Always derived, never stored: the address is the only input.
        PublicKey::Sentinel {
            address: self
                .address
                .clone()
                .unwrap_or_else(|| Addr::unchecked("")),
        }
    }

    /// Abstract accounts do not store keys: every input is rejected.
    fn set_public_key(&mut self, _public_key: PublicKey) -> Result<(), ContractError> {
        Err(ContractError::Std(cosmwasm_std::StdError::generic_err(
            "abstract accounts do not store public keys",
        )))
    }
}

/// The host's account registry is polymorphic over a fixed capability
/// set; this is the tagged variant that registry reads/writes actually
/// move around (mirrors `types.AccountI` dispatch in
/// `original_source/x/abstractaccount/types/account.go`'s Go
/// counterpart).
#[derive(Clone, Debug, PartialEq)]
pub enum AccountVariant {
    Base(BaseAccount),
    Abstract(AbstractAccountRecord),
    Module(ModuleAccount),
}

impl AccountVariant {
    pub fn as_abstract(&self) -> Option<&AbstractAccountRecord> {
        match self {
            AccountVariant::Abstract(ar) => Some(ar),
            _ => None,
        }
    }

    pub fn as_base(&self) -> Option<&BaseAccount> {
        match self {
            AccountVariant::Base(ba) => Some(ba),
            _ => None,
        }
    }

    pub fn address(&self) -> Option<&Addr> {
        match self {
            AccountVariant::Base(a) => a.get_address(),
            AccountVariant::Abstract(a) => a.get_address(),
            AccountVariant::Module(a) => a.get_address(),
        }
    }

    pub fn sequence(&self) -> u64 {
        match self {
            AccountVariant::Base(a) => a.get_sequence(),
            AccountVariant::Abstract(a) => a.get_sequence(),
            AccountVariant::Module(a) => a.get_sequence(),
        }
    }
}
