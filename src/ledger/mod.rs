//! Balance ledger: bounds-checked atomic balance mutations with an
//! immutable audit journal.
//!
//! Money only ever moves through [`LedgerManager::apply`] and its four
//! thin wrappers (bet/blind/win/refund), so a balance change and its
//! journal entry always appear together or not at all.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{LedgerError, LedgerResult};
pub use manager::{LedgerConfig, LedgerManager};
pub use models::{EntryKind, LedgerEntry};
