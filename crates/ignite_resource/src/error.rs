//! Resource-layer error types.
//!
//! Every variant here is a programming error in registration or construction
//! ordering, not a transient condition — callers are expected to fail fast
//! rather than retry.

use crate::component::ComponentKindId;
use crate::resource::ResourceId;

/// Errors that can occur while defining or constructing resources and
/// component kinds.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResourceError {
    /// The resource name has already been defined.
    #[error("resource `{name}` is already defined")]
    DuplicateDefinition {
        /// The offending resource name.
        name: &'static str,
    },

    /// Two distinct resource names hash to the same id.
    #[error("resource `{name}` collides with `{existing}` under {id}")]
    IdCollision {
        /// The name being defined.
        name: &'static str,
        /// The previously defined name occupying the id.
        existing: &'static str,
        /// The contested id.
        id: ResourceId,
    },

    /// The resource was used before being defined.
    #[error("resource `{name}` has not been defined")]
    Undefined {
        /// The resource name.
        name: &'static str,
    },

    /// A value already exists for this resource; it must be removed before
    /// it can be added again.
    #[error("resource `{name}` is already constructed")]
    AlreadyConstructed {
        /// The resource name.
        name: &'static str,
    },

    /// No value exists for this resource.
    #[error("resource `{name}` is not present")]
    NotPresent {
        /// The resource name.
        name: &'static str,
    },

    /// The component kind name has already been defined.
    #[error("component kind `{name}` is already defined")]
    DuplicateKind {
        /// The offending kind name.
        name: &'static str,
    },

    /// Two distinct component kind names hash to the same id.
    #[error("component kind `{name}` collides with `{existing}` under {id}")]
    KindCollision {
        /// The name being defined.
        name: &'static str,
        /// The previously defined name occupying the id.
        existing: &'static str,
        /// The contested id.
        id: ComponentKindId,
    },
}
