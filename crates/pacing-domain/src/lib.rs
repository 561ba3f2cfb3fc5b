//! pacing-domain
//!
//! Pure domain models (Brand, Campaign, SpendLog, DaypartingSchedule).
//! No I/O, no clocks, no storage. Only data types and derived properties.

pub mod brand;
pub mod campaign;
pub mod common;
pub mod schedule;
pub mod spend;

pub use brand::*;
pub use campaign::*;
pub use common::*;
pub use schedule::*;
pub use spend::*;
