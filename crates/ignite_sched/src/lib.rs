//! # ignite_sched
//!
//! Dependency-driven init scheduling for the engine runtime.
//!
//! Subsystems register **init routines** at load time, in arbitrary order:
//! each declares the resources it requires, the resources it promises to
//! provide, and whether it is **eager** (runs as soon as its trigger
//! condition holds) or **lazy** (dormant until something demands one of its
//! outputs). Every tick the [`Scheduler`] discovers which routines are
//! ready, runs each exactly once, and propagates readiness to waiters.
//!
//! ## Usage
//!
//! ```rust
//! use ignite_resource::{Resource, ResourceId};
//! use ignite_sched::{InitDescriptor, InitOutcome, Scheduler};
//!
//! struct PhysicsWorld;
//!
//! impl Resource for PhysicsWorld {
//!     type Params = ();
//!     fn type_name() -> &'static str { "PhysicsWorld" }
//!     fn build((): ()) -> Self { Self }
//! }
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.resources_mut().define::<PhysicsWorld>().unwrap();
//!
//! scheduler.register_lazy(
//!     InitDescriptor::new()
//!         .named("physics-world")
//!         .provides(ResourceId::of::<PhysicsWorld>()),
//!     |reg| {
//!         reg.add::<PhysicsWorld>(()).unwrap();
//!         InitOutcome::Immediate
//!     },
//! ).unwrap();
//!
//! // Demand wakes the producer; one tick later the resource exists.
//! let ready = scheduler.when_ready(&[ResourceId::of::<PhysicsWorld>()]);
//! scheduler.step();
//! assert!(scheduler.resources().contains::<PhysicsWorld>());
//! # drop(ready);
//! ```

pub mod error;
pub mod phase;
pub mod registry;
pub mod routine;
pub mod scheduler;
pub mod waiter;

pub use error::SchedError;
pub use phase::{Phase, PhaseSchedule};
pub use registry::InitRegistry;
pub use routine::{
    ApplyFn, DeferredInit, InitBody, InitDescriptor, InitId, InitOutcome, RoutineState,
};
pub use scheduler::{MissingResource, RoutineTiming, Scheduler, StalledWaiter, log_summary};
pub use waiter::{ReadyWaiter, WaiterId, WhenReady};
