//! Scheduler-layer error types.
//!
//! All variants are registration-time programmer errors. They surface
//! immediately at the offending call and are never queued or deferred.

use ignite_resource::ResourceId;

use crate::routine::InitId;

/// Errors that can occur while registering init routines.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchedError {
    /// A lazy registration declared no provided resources. A lazy routine's
    /// entire purpose is to be summoned on demand, so it must have
    /// something others can request.
    #[error("lazy init routine `{name}` must provide at least one resource")]
    NoProvides {
        /// Diagnostic label of the offending registration.
        name: String,
    },

    /// Two lazy registrations declared the same provided resource, which
    /// would make the producer ambiguous.
    #[error("{resource} already has a pending lazy producer ({claimed_by})")]
    DuplicateProducer {
        /// The contested resource.
        resource: ResourceId,
        /// The lazy registration that already claims it.
        claimed_by: InitId,
    },

    /// A lazy registration carried a component-kind trigger. Triggers are
    /// only meaningful for eager registrations — a lazy routine wakes on
    /// demand for its outputs, never on component presence.
    #[error("lazy init routine `{name}` cannot declare a component-kind trigger")]
    LazyComponentTrigger {
        /// Diagnostic label of the offending registration.
        name: String,
    },
}
