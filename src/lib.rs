//! Civitas
//!
//! A reputation-weighted governance engine for a non-profit DAO: a
//! decaying, peer-evaluated reputation ledger and a proposal lifecycle
//! engine that gates proposing, voting, and execution by live reputation
//! weight, together with the collaborator ledgers the system talks to.

/// Module version information
pub mod version {
    /// The current version of the Civitas library
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Re-export shared primitives
pub mod common {
    pub use civitas_common::*;
}

/// Re-export the reputation ledger
pub mod reputation {
    pub use civitas_reputation::*;
}

/// Re-export the governance engine
pub mod governance {
    pub use civitas_governance::*;
}

/// Re-export the collaborator ledgers
pub mod ledger {
    pub use civitas_ledger::*;
}
