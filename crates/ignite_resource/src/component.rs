//! Component-kind presence tracking.
//!
//! The engine's component system attaches named component kinds to entities;
//! this module only cares about a coarse, process-wide signal: has a kind
//! *ever* been attached to *any* entity. Eager init routines use that flag
//! as their trigger — a bullet-pool allocator, say, stays dormant until the
//! first entity gains a `"bullet"` component.
//!
//! The flag is set by the external component system via
//! [`ComponentKinds::mark_seen`] and is never cleared. It is not a live
//! query of current entities.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ResourceError;

/// A unique identifier for a component kind, derived from its string name
/// using the FNV-1a 64-bit hash algorithm (the same derivation as
/// [`ResourceId`](crate::ResourceId), over a separate namespace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentKindId(pub u64);

impl ComponentKindId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentKindId`] from a kind's string name.
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }
}

impl std::fmt::Display for ComponentKindId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ComponentKindId({:#018x})", self.0)
    }
}

/// Tracks which component kinds have ever been used, process-wide.
#[derive(Debug, Default)]
pub struct ComponentKinds {
    /// Defined kind names keyed by id, for duplicate and collision checks.
    names: HashMap<ComponentKindId, &'static str>,
    /// Kinds that have ever been attached to any entity. Never cleared.
    seen: HashSet<ComponentKindId>,
}

impl ComponentKinds {
    /// Create a new empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
            seen: HashSet::new(),
        }
    }

    /// Define a component kind by name, reserving its id.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::DuplicateKind`] if the name is already defined.
    /// - [`ResourceError::KindCollision`] if a different name hashes to the
    ///   same id.
    pub fn define(&mut self, name: &'static str) -> Result<ComponentKindId, ResourceError> {
        let id = ComponentKindId::from_name(name);

        if let Some(&existing) = self.names.get(&id) {
            if existing == name {
                return Err(ResourceError::DuplicateKind { name });
            }
            return Err(ResourceError::KindCollision { name, existing, id });
        }

        self.names.insert(id, name);
        debug!(kind = name, %id, "component kind defined");
        Ok(id)
    }

    /// Record that some entity has acquired this component kind.
    ///
    /// Idempotent. Called by the component system, never by the scheduler.
    /// Kinds that were never defined may still be marked — the tracker is
    /// independent of every other registry.
    pub fn mark_seen(&mut self, id: ComponentKindId) {
        if self.seen.insert(id) {
            debug!(%id, kind = self.names.get(&id).copied().unwrap_or("<undefined>"),
                "component kind seen for the first time");
        }
    }

    /// Returns `true` if the kind has ever been attached to any entity.
    #[must_use]
    pub fn is_seen(&self, id: ComponentKindId) -> bool {
        self.seen.contains(&id)
    }

    /// Returns the defined name for `id`, if any.
    #[must_use]
    pub fn name_of(&self, id: ComponentKindId) -> Option<&'static str> {
        self.names.get(&id).copied()
    }

    /// Returns the number of kinds ever seen.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
