//! # ignite_resource
//!
//! Resource identity and storage for the engine runtime.
//!
//! A **resource** is a process-wide, singleton, named value constructed at
//! most once — a renderer, a physics world, an asset catalog. Subsystems
//! define resources independently and in arbitrary module order, so
//! identity is derived deterministically from the resource's string name
//! (FNV-1a 64-bit) instead of from registration sequence.
//!
//! This crate provides:
//!
//! - [`Resource`] trait — name, typed construction parameters, builder.
//! - [`ResourceId`] / [`ComponentKindId`] — FNV-1a name-derived ids with
//!   collision detection at definition time.
//! - [`ResourceRegistry`] — define/add/ensure/remove/get over singleton
//!   values, plus the permanent "ever seen" set.
//! - [`ComponentKinds`] — the process-wide "has this component kind ever
//!   been used" tracker that gates eager init routines.

pub mod component;
pub mod error;
pub mod registry;
pub mod resource;

pub use component::{ComponentKindId, ComponentKinds};
pub use error::ResourceError;
pub use registry::ResourceRegistry;
pub use resource::{Resource, ResourceId};
