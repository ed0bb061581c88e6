//! Core [`Resource`] trait and name-derived identity.
//!
//! A resource is a process-wide, singleton, named value constructed at most
//! once. Subsystems are written independently and in arbitrary module order,
//! so resource identity cannot rely on registration sequence — instead
//! [`ResourceId`] is derived from the resource's **string name** using the
//! FNV-1a 64-bit hash algorithm. This is deterministic and order-neutral:
//! any subsystem can compute the id for a name without coordination.
//!
//! Hash collisions between distinct names are not assumed away — they are
//! detected and rejected at definition time by
//! [`ResourceRegistry::define`](crate::ResourceRegistry::define).

use serde::{Deserialize, Serialize};

/// A unique identifier for a resource, derived from its string name using
/// the FNV-1a 64-bit hash algorithm.
///
/// The id is deterministic: any call site that applies FNV-1a to the same
/// UTF-8 name bytes will produce the same `ResourceId`, regardless of
/// module load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

impl ResourceId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ResourceId`] from a resource's string name using the
    /// FNV-1a 64-bit hash algorithm.
    ///
    /// # Algorithm (FNV-1a 64-bit)
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325          (offset basis)
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3  (prime)
    /// return hash
    /// ```
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

    /// Compute the [`ResourceId`] for a Rust resource type `R`.
    ///
    /// This hashes `R::type_name()` with FNV-1a, producing the same result
    /// as [`ResourceId::from_name`] with the same string.
    #[must_use]
    pub fn of<R: Resource>() -> Self {
        Self::from_name(R::type_name())
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ResourceId({:#018x})", self.0)
    }
}

/// The core resource trait.
///
/// A resource declares its name (the source of its [`ResourceId`]), an
/// explicit parameter struct, and a builder that constructs the value from
/// those parameters. The registry invokes [`Resource::build`] exactly once
/// per resource; construction parameters travel through `Params` rather
/// than loose argument lists so the builder signature is fully typed.
///
/// Resources must be `Send + 'static` so deferred init routines can finish
/// constructing them off the main control path.
///
/// # Examples
///
/// ```rust
/// use ignite_resource::Resource;
///
/// struct AudioMixer {
///     channels: usize,
/// }
///
/// struct AudioMixerParams {
///     channels: usize,
/// }
///
/// impl Resource for AudioMixer {
///     type Params = AudioMixerParams;
///
///     fn type_name() -> &'static str { "AudioMixer" }
///
///     fn build(params: AudioMixerParams) -> Self {
///         Self { channels: params.channels }
///     }
/// }
/// ```
pub trait Resource: Send + 'static {
    /// Construction parameters for this resource.
    type Params;

    /// A human-readable name for this resource. Must be globally unique.
    fn type_name() -> &'static str;

    /// Construct the resource value from its parameters.
    fn build(params: Self::Params) -> Self;

    /// Returns the [`ResourceId`] for this resource.
    ///
    /// The default implementation hashes [`Resource::type_name()`] with
    /// FNV-1a 64-bit.
    fn resource_id() -> ResourceId {
        ResourceId::from_name(Self::type_name())
    }
}
