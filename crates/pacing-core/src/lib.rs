//! pacing-core
//!
//! Budget and dayparting enforcement for campaigns.
//! Depends on pacing-domain. No CLI, no terminal I/O, no file persistence.

pub mod dayparting;
pub mod error;
pub mod ledger;
pub mod memory_store;
pub mod policy;
pub mod public_api;
pub mod reconcile;
pub mod reset;
pub mod storage;
pub mod time;


pub use dayparting::*;
pub use error::CoreError;
pub use ledger::*;
pub use memory_store::InMemoryStore;
pub use policy::*;
pub use public_api::*;
pub use reconcile::*;
pub use reset::*;
pub use storage::{snapshot_warnings, PacingStore, SpendPeriod, StoreSnapshot};
pub use time::{Clock, FixedClock, SystemClock};

/// Retry budget for optimistic-concurrency conflicts when none is configured.
pub const DEFAULT_CONFLICT_RETRIES: u32 = 3;
