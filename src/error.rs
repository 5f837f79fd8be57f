use cosmwasm_std::{Addr, StdError};
use thiserror::Error;

/// Errors surfaced by the registration service and the authentication
/// pipeline. Never panicked in non-bootstrap code paths (§7).
#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("invalid allow list: {0}")]
    InvalidAllowList(String),

    #[error("account {address} is not an abstract account")]
    NotAbstractAccount { address: Addr },

    #[error("code id {code_id} is not allowed for account registration/migration")]
    NotAllowedCodeId { code_id: u64 },

    #[error("contract instantiation did not produce a base account")]
    NotBaseAccount,

    #[error("signature is not a single-signature SignatureData")]
    NotSingleSignature,

    #[error("failed to parse params: {0}")]
    ParsingParams(String),

    #[error("max_gas_before and max_gas_after must both be greater than zero")]
    ZeroMaxGas,

    #[error("unauthorized: sender is not the configured authority")]
    Unauthorized,

    #[error("account sequence mismatch, expected {expected}, got {actual}")]
    WrongSequence { expected: u64, actual: u64 },

    #[error("tx is not a signature-verifiable transaction")]
    TxDecode,

    #[error("sentinel public key can never be used to verify a signature")]
    SentinelPubKeyVerification,

    #[error("module params have not been initialized")]
    ParamsNotFound,

    /// Not one of the nine numbered module error codes (§7): this is
    /// the pipeline-level condition from the Failure-semantics table,
    /// "exceeds gas cap → out-of-gas, abort tx". It is its own variant
    /// so a gas-cap failure is distinguishable from a contract-raised
    /// error at the sudo call site.
    #[error("sudo call exceeded its gas limit: used {consumed}, limit {limit}")]
    OutOfGas { limit: u64, consumed: u64 },
}
