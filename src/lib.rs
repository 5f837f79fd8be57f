//! Account-abstraction core: an account record that disables default
//! signature verification, a registration service that instantiates
//! account contracts, and an authentication pipeline that delegates
//! transaction authentication to those contracts' privileged `sudo`
//! entry points.
//!
//! Surrounding scaffolding (CLI wrappers, wire-format registration
//! with a specific host framework, chain bootstrapping) is out of
//! scope; this crate exposes trait seams (`host`) for a host to wire
//! in instead.

pub mod account;
pub mod ante;
pub mod error;
pub mod events;
pub mod genesis;
pub mod host;
pub mod keeper;
pub mod msg;
pub mod params;
pub mod state;
pub mod sudo;

pub mod testing;

pub use account::{AbstractAccountRecord, Account, AccountVariant, BaseAccount, PublicKey};
pub use error::ContractError;
pub use keeper::Keeper;
pub use params::Params;
