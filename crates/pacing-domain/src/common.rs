//! Shared traits for pacing entities.

use uuid::Uuid;

/// Exposes a stable identifier for entities held by a store.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Entities guarded by an optimistic-concurrency counter.
pub trait Versioned {
    fn version(&self) -> u64;
}
