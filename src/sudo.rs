//! The sudo payload schema (§6): a public wire contract between this
//! module and user-written account contracts. `Binary` fields
//! (de)serialize as base64 strings, matching `cosmwasm_std::Binary`'s
//! own JSON representation, so this is interchangeable with any other
//! CosmWasm message the contract already handles.
//!
//! This schema must not drift without a versioning story (§9): it is
//! read by contract code this crate does not control.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Binary;
use serde::{Deserialize, Serialize};

/// A type-tagged protobuf message, the JSON-safe analogue of
/// `cosmos_sdk_proto`/`prost_types`'s `Any`. Every message in a tx is
/// converted to one of these before being handed to the contract.
#[cw_serde]
pub struct TypedAny {
    pub type_url: String,
    pub value: Binary,
}

impl From<prost_types::Any> for TypedAny {
    fn from(any: prost_types::Any) -> Self {
        TypedAny {
            type_url: any.type_url,
            value: Binary::from(any.value),
        }
    }
}

impl From<TypedAny> for prost_types::Any {
    fn from(any: TypedAny) -> Self {
        prost_types::Any {
            type_url: any.type_url,
            value: any.value.to_vec(),
        }
    }
}

#[cw_serde]
pub struct BeforeTx {
    pub msgs: Vec<TypedAny>,
    pub tx_bytes: Binary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cred_bytes: Option<Binary>,
    pub simulate: bool,
}

#[cw_serde]
pub struct AfterTx {
    pub simulate: bool,
}

/// Exactly one of `before_tx`/`after_tx` is populated per call: this is
/// the Rust rendition of the Go wasmbinding `AccountSudoMsg` struct with
/// two `omitempty` pointer fields; here the externally-tagged enum
/// enforces the "exactly one" invariant at the type level instead of by
/// convention.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountSudoMsg {
    BeforeTx(BeforeTx),
    AfterTx(AfterTx),
}
