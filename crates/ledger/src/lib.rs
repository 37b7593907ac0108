//! Collaborator ledgers for Civitas
//!
//! The governance core talks to three collaborator ledgers, all carried
//! here: the fungible token ledger, the lock vault (the earlier-generation
//! voting weight source), and the treasury that passed proposals draw
//! funds from.

pub mod error;
pub mod events;
pub mod lock;
pub mod token;
pub mod treasury;

// Re-exports
pub use error::{LedgerError, LedgerResult};
pub use events::LedgerEvent;
pub use lock::{LockVault, TokenLock, MAX_LOCK_DURATION_SECS};
pub use token::TokenLedger;
pub use treasury::{Treasury, TxRecord, MAX_INFORMATION_LENGTH};
