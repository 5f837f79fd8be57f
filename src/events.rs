//! Event names and attribute keys emitted by the registration service.
//! Mirrors `original_source/x/abstractaccount/types/events.go`.

pub const EVENT_TYPE_ACCOUNT_REGISTERED: &str = "account_registered";
pub const EVENT_TYPE_ACCOUNT_MIGRATED: &str = "account_migrated";

pub const ATTR_CREATOR: &str = "creator";
pub const ATTR_CODE_ID: &str = "code_id";
pub const ATTR_CONTRACT_ADDR: &str = "contract_addr";
