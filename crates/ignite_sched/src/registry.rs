//! Init function registry — pending-lazy index and pending-eager queue.
//!
//! Every registered routine lives here for the life of the process, together
//! with its run state. Routines are **lazy** (dormant until something
//! demands one of their provided resources) or **eager** (queued to run as
//! soon as their trigger condition holds). Promotion moves a lazy routine
//! into the eager queue; nothing ever moves the other way.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use ignite_resource::{ResourceId, ResourceRegistry};

use crate::error::SchedError;
use crate::routine::{InitBody, InitDescriptor, InitId, InitOutcome, InitRoutine, RoutineState};

/// Registry of all init routines known to the scheduler.
#[derive(Default)]
pub struct InitRegistry {
    /// Next id to assign. Ids are monotone and never reused.
    next_id: u64,
    /// Every registration ever made, keyed by id.
    routines: HashMap<InitId, InitRoutine>,
    /// Pending lazy producers: provided resource id → the single lazy
    /// registration producing it. Entries leave on promotion.
    lazy_index: HashMap<ResourceId, InitId>,
    /// Pending eager registrations in insertion order. Entries leave when
    /// the routine starts.
    eager_queue: Vec<InitId>,
}

impl InitRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lazy init routine.
    ///
    /// The routine stays dormant until one of its provided resources is
    /// demanded, at which point it is promoted into the eager queue.
    ///
    /// # Errors
    ///
    /// - [`SchedError::NoProvides`] if the descriptor provides nothing.
    /// - [`SchedError::LazyComponentTrigger`] if the descriptor carries a
    ///   component-kind trigger.
    /// - [`SchedError::DuplicateProducer`] if a provided resource is already
    ///   claimed by another pending lazy registration.
    pub fn register_lazy(
        &mut self,
        desc: InitDescriptor,
        body: impl FnOnce(&mut ResourceRegistry) -> InitOutcome + Send + 'static,
    ) -> Result<InitId, SchedError> {
        let label = desc.name.clone().unwrap_or_else(|| "<unnamed>".to_string());

        if desc.provides.is_empty() {
            return Err(SchedError::NoProvides { name: label });
        }
        if !desc.component_kinds.is_empty() {
            return Err(SchedError::LazyComponentTrigger { name: label });
        }
        for &resource in &desc.provides {
            if let Some(&claimed_by) = self.lazy_index.get(&resource) {
                return Err(SchedError::DuplicateProducer {
                    resource,
                    claimed_by,
                });
            }
        }

        let provides = desc.provides.clone();
        let id = self.insert(desc, Box::new(body));
        for resource in provides {
            self.lazy_index.insert(resource, id);
        }
        debug!(%id, routine = %label, "lazy init routine registered");
        Ok(id)
    }

    /// Register an eager init routine.
    ///
    /// The routine is queued immediately; it runs once its component-kind
    /// trigger (if any) has fired and its required resources are present.
    pub fn register_eager(
        &mut self,
        desc: InitDescriptor,
        body: impl FnOnce(&mut ResourceRegistry) -> InitOutcome + Send + 'static,
    ) -> Result<InitId, SchedError> {
        let label = desc.name.clone().unwrap_or_else(|| "<unnamed>".to_string());
        let id = self.insert(desc, Box::new(body));
        self.eager_queue.push(id);
        debug!(%id, routine = %label, "eager init routine registered");
        Ok(id)
    }

    /// Promote the lazy producer of `resource` into the eager queue.
    ///
    /// The registration is removed from the pending-lazy index under **all**
    /// of its provided resource ids — once forced, it is no longer
    /// independently summon-able under any of them. Returns `false` when
    /// `resource` has no pending lazy producer (it may already be eager, or
    /// it may be a plain externally-populated resource).
    pub fn force_promotion(&mut self, resource: ResourceId) -> bool {
        let Some(&id) = self.lazy_index.get(&resource) else {
            return false;
        };
        let provides = match self.routines.get(&id) {
            Some(r) => r.provides.clone(),
            None => unreachable!("lazy index points at unknown routine {id}"),
        };
        for provided in &provides {
            self.lazy_index.remove(provided);
        }
        self.eager_queue.push(id);
        debug!(%id, %resource, "lazy init routine promoted to eager");
        true
    }

    /// Begin running a pending routine: remove it from the eager queue,
    /// mark it running, start its clock, and hand back the body.
    ///
    /// The body is physically taken out of the registration, so a second
    /// begin for the same id is impossible by construction.
    pub(crate) fn begin(&mut self, id: InitId) -> InitBody {
        self.eager_queue.retain(|&queued| queued != id);
        let routine = match self.routines.get_mut(&id) {
            Some(r) => r,
            None => unreachable!("begin called for unknown routine {id}"),
        };
        assert_eq!(
            routine.state,
            RoutineState::Pending,
            "init routine `{}` started twice",
            routine.label()
        );
        routine.state = RoutineState::Running;
        routine.started_at = Some(Instant::now());
        match routine.body.take() {
            Some(body) => body,
            None => unreachable!("pending routine {id} has a body"),
        }
    }

    /// Mark a running routine finished and stop its clock.
    pub(crate) fn complete(&mut self, id: InitId) {
        let routine = match self.routines.get_mut(&id) {
            Some(r) => r,
            None => unreachable!("complete called for unknown routine {id}"),
        };
        assert_eq!(
            routine.state,
            RoutineState::Running,
            "init routine `{}` completed without running",
            routine.label()
        );
        routine.state = RoutineState::Finished;
        routine.elapsed = routine
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or(Duration::ZERO);
    }

    /// Snapshot of the pending eager queue, in insertion order.
    ///
    /// Passes iterate the snapshot so routines promoted mid-pass are picked
    /// up on the next pass, never re-entrantly within the current one.
    #[must_use]
    pub(crate) fn eager_snapshot(&self) -> Vec<InitId> {
        self.eager_queue.clone()
    }

    pub(crate) fn routine(&self, id: InitId) -> Option<&InitRoutine> {
        self.routines.get(&id)
    }

    pub(crate) fn routines_iter(&self) -> impl Iterator<Item = &InitRoutine> {
        self.routines.values()
    }

    /// Returns the state of a registration.
    #[must_use]
    pub fn state_of(&self, id: InitId) -> Option<RoutineState> {
        self.routines.get(&id).map(|r| r.state)
    }

    /// Returns the total number of registrations ever made.
    #[must_use]
    pub fn routine_count(&self) -> usize {
        self.routines.len()
    }

    /// Returns the number of resources with a pending lazy producer.
    #[must_use]
    pub fn pending_lazy_count(&self) -> usize {
        self.lazy_index.len()
    }

    /// Returns the number of registrations waiting in the eager queue.
    #[must_use]
    pub fn pending_eager_count(&self) -> usize {
        self.eager_queue.len()
    }

    /// Returns `true` if `resource` currently has a pending lazy producer.
    #[must_use]
    pub fn has_lazy_producer(&self, resource: ResourceId) -> bool {
        self.lazy_index.contains_key(&resource)
    }

    fn insert(&mut self, desc: InitDescriptor, body: InitBody) -> InitId {
        let id = InitId(self.next_id);
        self.next_id += 1;
        let previous = self.routines.insert(
            id,
            InitRoutine {
                id,
                name: desc.name,
                requires: desc.requires,
                provides: desc.provides,
                component_kinds: desc.component_kinds,
                body: Some(body),
                state: RoutineState::Pending,
                started_at: None,
                elapsed: Duration::ZERO,
            },
        );
        assert!(previous.is_none(), "init routine id {id} registered twice");
        id
    }
}
