//! Shared primitives for the Civitas governance engine
//!
//! This crate provides the small set of types every other Civitas crate
//! builds on: opaque account identities, the host-chain view (logical block
//! height and wall clock), day-granular time arithmetic, and the voting
//! weight seam the governance engine is written against.

pub mod host;
pub mod identity;
pub mod time;
pub mod weight;

// Re-exports
pub use host::{ChainHost, SimulatedChain};
pub use identity::AccountId;
pub use time::{day_floor, days, ONE_DAY_SECS};
pub use weight::WeightProvider;
