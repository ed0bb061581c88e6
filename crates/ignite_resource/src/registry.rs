//! Singleton resource storage.
//!
//! The [`ResourceRegistry`] owns every constructed resource value, keyed by
//! [`ResourceId`]. Presence in the map is the **authoritative** signal that
//! a resource exists — callers must never infer existence from a producer
//! having been invoked.
//!
//! Alongside the live values the registry keeps a permanent `seen` set: the
//! id of every resource that has *ever* been constructed. Removing a value
//! does not clear its seen flag, so a resource, once observed, stays known
//! to be constructible.

use std::any::Any;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::ResourceError;
use crate::resource::{Resource, ResourceId};

/// Owns resource definitions, constructed values, and the permanent seen set.
///
/// All mutation is synchronous (`add`/`ensure`/`remove`), so there is no
/// read/write race even while producers are suspended mid-construction.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    /// Defined resource names keyed by id, for duplicate and collision checks.
    names: HashMap<ResourceId, &'static str>,
    /// Constructed values keyed by id.
    values: HashMap<ResourceId, Box<dyn Any + Send>>,
    /// Every id that has ever held a value. Never cleared.
    seen: HashSet<ResourceId>,
}

impl ResourceRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
            values: HashMap::new(),
            seen: HashSet::new(),
        }
    }

    /// Define the resource type `R`, reserving its id.
    ///
    /// Definition must happen once, at load time, before any scheduling.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::DuplicateDefinition`] if `R` is already defined.
    /// - [`ResourceError::IdCollision`] if a *different* name hashes to the
    ///   same id — the hash-collision invariant is checked here rather than
    ///   assumed rare.
    pub fn define<R: Resource>(&mut self) -> Result<ResourceId, ResourceError> {
        let id = ResourceId::of::<R>();
        let name = R::type_name();

        if let Some(&existing) = self.names.get(&id) {
            if existing == name {
                return Err(ResourceError::DuplicateDefinition { name });
            }
            return Err(ResourceError::IdCollision { name, existing, id });
        }

        self.names.insert(id, name);
        debug!(resource = name, %id, "resource defined");
        Ok(id)
    }

    /// Construct `R` from `params` and store it.
    ///
    /// Marks the id as seen and returns a reference to the stored value.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::Undefined`] if `R` was never defined.
    /// - [`ResourceError::AlreadyConstructed`] if a value already exists —
    ///   a resource may be added only once unless explicitly removed first.
    pub fn add<R: Resource>(&mut self, params: R::Params) -> Result<&R, ResourceError> {
        let id = ResourceId::of::<R>();
        let name = R::type_name();

        if !self.names.contains_key(&id) {
            return Err(ResourceError::Undefined { name });
        }
        if self.values.contains_key(&id) {
            return Err(ResourceError::AlreadyConstructed { name });
        }

        let value = R::build(params);
        self.values.insert(id, Box::new(value));
        self.seen.insert(id);
        debug!(resource = name, %id, "resource constructed");

        match self.value_ref::<R>(id) {
            Some(v) => Ok(v),
            None => unreachable!("value for `{name}` was just inserted"),
        }
    }

    /// Return the existing value for `R`, constructing it from `params` if
    /// absent.
    ///
    /// On the happy path (value present) this has no side effects; `params`
    /// is simply dropped. Used by callers that do not care who constructs
    /// first.
    ///
    /// # Errors
    ///
    /// Same as [`ResourceRegistry::add`], minus `AlreadyConstructed`.
    pub fn ensure<R: Resource>(&mut self, params: R::Params) -> Result<&R, ResourceError> {
        let id = ResourceId::of::<R>();
        if self.values.contains_key(&id) {
            return match self.value_ref::<R>(id) {
                Some(v) => Ok(v),
                None => unreachable!("present value for `{}` has its own type", R::type_name()),
            };
        }
        self.add(params)
    }

    /// Remove and return the current value for `R`.
    ///
    /// The seen flag stays set.
    ///
    /// # Errors
    ///
    /// [`ResourceError::NotPresent`] if no value exists.
    pub fn remove<R: Resource>(&mut self) -> Result<R, ResourceError> {
        let id = ResourceId::of::<R>();
        let name = R::type_name();
        let boxed = self
            .values
            .remove(&id)
            .ok_or(ResourceError::NotPresent { name })?;
        debug!(resource = name, %id, "resource removed");
        match boxed.downcast::<R>() {
            Ok(v) => Ok(*v),
            Err(_) => unreachable!("value under the id of `{name}` has its own type"),
        }
    }

    /// Returns the current value for `R`, if present.
    #[must_use]
    pub fn get<R: Resource>(&self) -> Option<&R> {
        self.value_ref(ResourceId::of::<R>())
    }

    /// Returns a mutable reference to the current value for `R`, if present.
    pub fn get_mut<R: Resource>(&mut self) -> Option<&mut R> {
        self.values
            .get_mut(&ResourceId::of::<R>())
            .and_then(|v| v.downcast_mut::<R>())
    }

    /// Returns `true` if a value for `R` is currently present.
    #[must_use]
    pub fn contains<R: Resource>(&self) -> bool {
        self.contains_id(ResourceId::of::<R>())
    }

    /// Returns `true` if a value for `id` is currently present.
    #[must_use]
    pub fn contains_id(&self, id: ResourceId) -> bool {
        self.values.contains_key(&id)
    }

    /// Returns `true` if `id` has ever held a value, even if since removed.
    #[must_use]
    pub fn ever_seen(&self, id: ResourceId) -> bool {
        self.seen.contains(&id)
    }

    /// Returns the defined name for `id`, if any.
    #[must_use]
    pub fn name_of(&self, id: ResourceId) -> Option<&'static str> {
        self.names.get(&id).copied()
    }

    /// Returns the number of resources currently present.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.values.len()
    }

    /// Returns the number of defined resources.
    #[must_use]
    pub fn defined_count(&self) -> usize {
        self.names.len()
    }

    fn value_ref<R: Resource>(&self, id: ResourceId) -> Option<&R> {
        self.values.get(&id).and_then(|v| v.downcast_ref::<R>())
    }
}
