//! Init routine model: identity, declared inputs/outputs, and outcomes.
//!
//! An init routine is registered once at load time and runs at most once,
//! process-wide. Its body receives the current resource set and either
//! completes immediately or suspends into a future — the distinction is an
//! explicit tagged union ([`InitOutcome`]) so suspension points are visible
//! in the type system rather than inferred at runtime.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use ignite_resource::{ComponentKindId, ResourceId, ResourceRegistry};

/// A unique identifier for an init routine, assigned monotonically at
/// registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct InitId(pub u64);

impl std::fmt::Display for InitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InitId({})", self.0)
    }
}

/// Writes a deferred routine's provided resources into the registry once
/// its future has settled.
pub type ApplyFn = Box<dyn FnOnce(&mut ResourceRegistry) + Send>;

/// The suspended remainder of a deferred init routine.
pub type DeferredInit = Pin<Box<dyn Future<Output = ApplyFn> + Send>>;

/// An init routine body: runs against the current resource set, at most once.
pub type InitBody = Box<dyn FnOnce(&mut ResourceRegistry) -> InitOutcome + Send>;

/// The result of invoking an init routine body.
pub enum InitOutcome {
    /// The routine finished synchronously; its provided resources have
    /// already been written into the registry by the body.
    Immediate,
    /// The routine suspended. The scheduler polls the future cooperatively,
    /// once per pass, and applies the settled [`ApplyFn`] to the registry —
    /// the provided resources appear only then.
    Deferred(DeferredInit),
}

impl InitOutcome {
    /// Wrap a future as a deferred outcome.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = ApplyFn> + Send + 'static,
    {
        Self::Deferred(Box::pin(future))
    }
}

impl std::fmt::Debug for InitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate => f.write_str("Immediate"),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Declares an init routine's inputs and outputs.
///
/// Built up in consuming-builder style before registration:
///
/// ```rust
/// use ignite_resource::{ComponentKindId, ResourceId};
/// use ignite_sched::InitDescriptor;
///
/// let desc = InitDescriptor::new()
///     .named("bullet-pool")
///     .triggered_by(ComponentKindId::from_name("bullet"))
///     .requires(ResourceId::from_name("PhysicsWorld"))
///     .provides(ResourceId::from_name("BulletPool"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InitDescriptor {
    /// Optional human-readable name, for diagnostics only.
    pub name: Option<String>,
    /// Resources that must be present before the routine runs.
    pub requires: Vec<ResourceId>,
    /// Resources the routine promises to provide.
    pub provides: Vec<ResourceId>,
    /// Component kinds that must have been seen before the routine (or any
    /// of its dependency promotions) fires. Eager registrations only.
    pub component_kinds: Vec<ComponentKindId>,
}

impl InitDescriptor {
    /// Create an empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a diagnostic name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a required resource.
    #[must_use]
    pub fn requires(mut self, id: ResourceId) -> Self {
        self.requires.push(id);
        self
    }

    /// Add a provided resource.
    #[must_use]
    pub fn provides(mut self, id: ResourceId) -> Self {
        self.provides.push(id);
        self
    }

    /// Add a component-kind trigger.
    #[must_use]
    pub fn triggered_by(mut self, kind: ComponentKindId) -> Self {
        self.component_kinds.push(kind);
        self
    }
}

/// Lifecycle state of a registered init routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutineState {
    /// Registered, not yet started.
    Pending,
    /// Body invoked; either executing now or suspended in a deferred future.
    Running,
    /// Finished, never to run again.
    Finished,
}

/// A registered init routine and its run state.
pub(crate) struct InitRoutine {
    pub id: InitId,
    pub name: Option<String>,
    pub requires: Vec<ResourceId>,
    pub provides: Vec<ResourceId>,
    pub component_kinds: Vec<ComponentKindId>,
    /// Taken when the routine starts, so a second start is impossible.
    pub body: Option<InitBody>,
    pub state: RoutineState,
    /// Set when the body is invoked; the routine's clock keeps running
    /// while it is suspended, so overlapping routines each accumulate
    /// wall-clock time independently.
    pub started_at: Option<Instant>,
    pub elapsed: Duration,
}

impl InitRoutine {
    /// Diagnostic label: the given name, or a synthesized one.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("init#{}", self.id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builder_accumulates() {
        let foo = ResourceId::from_name("Foo");
        let bar = ResourceId::from_name("Bar");
        let bullet = ComponentKindId::from_name("bullet");

        let desc = InitDescriptor::new()
            .named("demo")
            .requires(foo)
            .provides(bar)
            .triggered_by(bullet);

        assert_eq!(desc.name.as_deref(), Some("demo"));
        assert_eq!(desc.requires, vec![foo]);
        assert_eq!(desc.provides, vec![bar]);
        assert_eq!(desc.component_kinds, vec![bullet]);
    }

    #[test]
    fn test_outcome_debug() {
        assert_eq!(format!("{:?}", InitOutcome::Immediate), "Immediate");
        let deferred = InitOutcome::deferred(futures::future::pending::<ApplyFn>());
        assert_eq!(format!("{deferred:?}"), "Deferred(..)");
    }

    #[test]
    fn test_init_id_display() {
        assert_eq!(InitId(7).to_string(), "InitId(7)");
    }
}
