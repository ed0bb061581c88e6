//! The scheduler object and its per-tick passes.
//!
//! [`Scheduler`] owns all runtime state: the resource registry, the
//! component-kind presence tracker, the init-function registry, the waiter
//! queue, and the deferred routines still in flight. Subsystems receive a
//! reference to it — there is no ambient global state.
//!
//! Execution is single-threaded and cooperative. [`Scheduler::advance`] and
//! [`Scheduler::resolve_pass`] are ordinary synchronous functions; the only
//! concurrency-like behavior is that a routine body may return a deferred
//! future, which the scheduler polls once per pass without ever blocking.
//! [`Scheduler::step`] is the per-tick entry point: it repeats both passes
//! until a full pass makes no progress, then yields back to the caller.

use std::task::{Context, Poll};
use std::time::Duration;

use futures::task::noop_waker_ref;
use serde::Serialize;
use tracing::{debug, info};

use ignite_resource::{ComponentKindId, ComponentKinds, ResourceId, ResourceRegistry};

use crate::error::SchedError;
use crate::registry::InitRegistry;
use crate::routine::{DeferredInit, InitDescriptor, InitId, InitOutcome, RoutineState};
use crate::waiter::{ReadyWaiter, WaiterId, WhenReady};

/// A deferred routine whose future has not yet settled.
struct InFlight {
    id: InitId,
    future: DeferredInit,
}

/// Per-routine entry in the cumulative timing report.
///
/// `elapsed` is wall-clock time from body start to finish (or to now, for a
/// routine still in flight). Suspended time counts: two overlapping
/// deferred routines each accumulate the full span they were active.
#[derive(Debug, Clone, Serialize)]
pub struct RoutineTiming {
    /// The routine's registration id.
    pub id: InitId,
    /// Diagnostic label.
    pub name: String,
    /// Current lifecycle state.
    pub state: RoutineState,
    /// Cumulative wall-clock time attributed to the routine.
    pub elapsed: Duration,
}

/// A resource missing for a stalled waiter.
#[derive(Debug, Clone, Serialize)]
pub struct MissingResource {
    /// The defined name, when the resource was ever defined.
    pub name: Option<&'static str>,
    /// The awaited id.
    pub id: ResourceId,
    /// Whether the resource has ever been constructed. `true` means it was
    /// removed; `false` means no producer has delivered it yet.
    pub ever_seen: bool,
}

/// A waiter entry that has been pending longer than the caller's threshold.
#[derive(Debug, Clone, Serialize)]
pub struct StalledWaiter {
    /// The waiter entry id.
    pub id: WaiterId,
    /// Ticks since the request was queued.
    pub age_ticks: u64,
    /// The resources still missing.
    pub missing: Vec<MissingResource>,
}

/// Owns all scheduling state and drives init routines to completion.
#[derive(Default)]
pub struct Scheduler {
    resources: ResourceRegistry,
    components: ComponentKinds,
    inits: InitRegistry,
    waiters: ReadyWaiter,
    in_flight: Vec<InFlight>,
    /// Completed `step()` calls. Drives waiter-age diagnostics only.
    tick: u64,
}

impl Scheduler {
    /// Create a new scheduler with empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a reference to the resource registry.
    #[must_use]
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Returns a mutable reference to the resource registry.
    pub fn resources_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.resources
    }

    /// Returns a reference to the component-kind presence tracker.
    #[must_use]
    pub fn components(&self) -> &ComponentKinds {
        &self.components
    }

    /// Returns a mutable reference to the component-kind presence tracker.
    pub fn components_mut(&mut self) -> &mut ComponentKinds {
        &mut self.components
    }

    /// Returns a reference to the init-function registry.
    #[must_use]
    pub fn inits(&self) -> &InitRegistry {
        &self.inits
    }

    /// Record that some entity has acquired a component kind.
    ///
    /// The single entry point for the external component system; the
    /// scheduler itself only ever reads the flag.
    pub fn mark_component_seen(&mut self, kind: ComponentKindId) {
        self.components.mark_seen(kind);
    }

    /// Register a lazy init routine. See [`InitRegistry::register_lazy`].
    ///
    /// # Errors
    ///
    /// Propagates the registration errors of [`InitRegistry::register_lazy`].
    pub fn register_lazy(
        &mut self,
        desc: InitDescriptor,
        body: impl FnOnce(&mut ResourceRegistry) -> InitOutcome + Send + 'static,
    ) -> Result<InitId, SchedError> {
        self.inits.register_lazy(desc, body)
    }

    /// Register an eager init routine. See [`InitRegistry::register_eager`].
    ///
    /// # Errors
    ///
    /// Propagates the registration errors of [`InitRegistry::register_eager`].
    pub fn register_eager(
        &mut self,
        desc: InitDescriptor,
        body: impl FnOnce(&mut ResourceRegistry) -> InitOutcome + Send + 'static,
    ) -> Result<InitId, SchedError> {
        self.inits.register_eager(desc, body)
    }

    /// Ask to be notified once every resource in `awaited` is present.
    ///
    /// If all are already present (or `awaited` is empty) the returned
    /// future resolves on its first poll, without waiting for a tick.
    /// Otherwise the request is queued, and demand is propagated at once:
    /// each missing resource's lazy producer (if any) is promoted to eager
    /// so the next pass can start constructing it.
    pub fn when_ready(&mut self, awaited: &[ResourceId]) -> WhenReady {
        let missing: Vec<ResourceId> = awaited
            .iter()
            .copied()
            .filter(|&id| !self.resources.contains_id(id))
            .collect();
        if missing.is_empty() {
            return WhenReady::ready();
        }
        for &id in &missing {
            self.inits.force_promotion(id);
        }
        debug!(
            awaited = awaited.len(),
            missing = missing.len(),
            tick = self.tick,
            "readiness request queued"
        );
        self.waiters.enqueue(awaited.to_vec(), self.tick)
    }

    /// Advance pending eager routines as far as currently possible.
    ///
    /// One pass over a snapshot of the eager queue: settled deferred
    /// routines are applied first, then each queued routine is checked —
    /// component-kind trigger, then required resources (missing ones have
    /// their lazy producers promoted), then run. Routines promoted during
    /// the pass are picked up on the next call, not re-entrantly.
    ///
    /// Returns whether any promotion, run, or settle occurred.
    pub fn advance(&mut self) -> bool {
        let mut progress = self.settle_deferred();

        for id in self.inits.eager_snapshot() {
            let (kinds, requires) = match self.inits.routine(id) {
                Some(routine) => (routine.component_kinds.clone(), routine.requires.clone()),
                None => continue,
            };

            // An eager routine whose component trigger has not fired stays
            // fully dormant: it must not force its resource dependencies
            // into existence either.
            if !kinds.iter().all(|&kind| self.components.is_seen(kind)) {
                continue;
            }

            let missing: Vec<ResourceId> = requires
                .iter()
                .copied()
                .filter(|&resource| !self.resources.contains_id(resource))
                .collect();
            if !missing.is_empty() {
                for resource in missing {
                    if self.inits.force_promotion(resource) {
                        progress = true;
                    }
                }
                continue;
            }

            let body = self.inits.begin(id);
            debug!(%id, "init routine started");
            match body(&mut self.resources) {
                InitOutcome::Immediate => {
                    self.inits.complete(id);
                    self.assert_provided(id);
                    debug!(%id, "init routine finished");
                }
                InitOutcome::Deferred(future) => {
                    debug!(%id, "init routine deferred");
                    self.in_flight.push(InFlight { id, future });
                }
            }
            progress = true;
        }

        progress
    }

    /// Resolve queued readiness requests against the current resource set.
    ///
    /// Entries whose resources are all present are removed and notified;
    /// for each resource still missing from an unmet entry, its lazy
    /// producer (if any) is promoted. Returns whether any entry resolved or
    /// any promotion occurred.
    pub fn resolve_pass(&mut self) -> bool {
        let mut progress = false;

        for entry in self.waiters.take_entries() {
            let missing: Vec<ResourceId> = entry
                .awaited
                .iter()
                .copied()
                .filter(|&id| !self.resources.contains_id(id))
                .collect();

            if missing.is_empty() {
                debug!(waiter = %entry.id, "readiness request resolved");
                // The requester may have dropped its future; that is its
                // own business.
                let _ = entry.notify.send(());
                progress = true;
            } else {
                for &resource in &missing {
                    if self.inits.force_promotion(resource) {
                        progress = true;
                    }
                }
                self.waiters.requeue(entry);
            }
        }

        progress
    }

    /// Run one tick of the scheduler: repeat `advance` + `resolve_pass`
    /// until a full pass makes no progress.
    ///
    /// Termination is guaranteed: every iteration that reports progress has
    /// run a routine, promoted a lazy registration, settled a future, or
    /// resolved a waiter, and each of those is exactly-once. Deferred
    /// routines that have not settled carry over to later ticks.
    ///
    /// Returns whether anything at all happened this tick.
    pub fn step(&mut self) -> bool {
        self.tick += 1;
        let mut any = false;
        loop {
            let mut progress = self.advance();
            if self.resolve_pass() {
                progress = true;
            }
            if !progress {
                break;
            }
            any = true;
        }
        any
    }

    /// Completed `step()` calls so far.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Returns the number of deferred routines still in flight.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns the number of unresolved readiness requests.
    #[must_use]
    pub fn pending_waiter_count(&self) -> usize {
        self.waiters.pending_count()
    }

    /// Cumulative per-routine wall-clock report, longest first.
    ///
    /// Purely observational; nothing in the scheduler reads it back.
    #[must_use]
    pub fn timing_report(&self) -> Vec<RoutineTiming> {
        let mut report: Vec<RoutineTiming> = self
            .inits
            .routines_iter()
            .map(|routine| RoutineTiming {
                id: routine.id,
                name: routine.label(),
                state: routine.state,
                elapsed: match routine.state {
                    RoutineState::Running => routine
                        .started_at
                        .map(|started| started.elapsed())
                        .unwrap_or(Duration::ZERO),
                    _ => routine.elapsed,
                },
            })
            .collect();
        report.sort_by(|a, b| b.elapsed.cmp(&a.elapsed).then(a.id.cmp(&b.id)));
        report
    }

    /// Waiter entries pending for at least `min_age_ticks` ticks, with the
    /// resources they are still missing.
    ///
    /// Observational only: the core contract for an unproducible resource
    /// remains an indefinite silent wait.
    #[must_use]
    pub fn stalled_waiters(&self, min_age_ticks: u64) -> Vec<StalledWaiter> {
        self.waiters
            .entries()
            .iter()
            .filter(|entry| self.tick.saturating_sub(entry.created_tick) >= min_age_ticks)
            .map(|entry| StalledWaiter {
                id: entry.id,
                age_ticks: self.tick.saturating_sub(entry.created_tick),
                missing: entry
                    .awaited
                    .iter()
                    .copied()
                    .filter(|&id| !self.resources.contains_id(id))
                    .map(|id| MissingResource {
                        name: self.resources.name_of(id),
                        id,
                        ever_seen: self.resources.ever_seen(id),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Poll every in-flight deferred routine once and apply the ones that
    /// settled. Never blocks.
    fn settle_deferred(&mut self) -> bool {
        if self.in_flight.is_empty() {
            return false;
        }

        let mut progress = false;
        let mut cx = Context::from_waker(noop_waker_ref());
        let mut still_pending = Vec::with_capacity(self.in_flight.len());

        for mut flight in std::mem::take(&mut self.in_flight) {
            match flight.future.as_mut().poll(&mut cx) {
                Poll::Ready(apply) => {
                    apply(&mut self.resources);
                    self.inits.complete(flight.id);
                    self.assert_provided(flight.id);
                    debug!(id = %flight.id, "deferred init routine settled");
                    progress = true;
                }
                Poll::Pending => still_pending.push(flight),
            }
        }

        self.in_flight = still_pending;
        progress
    }

    /// A routine that finishes without populating a resource it declared is
    /// a hard program error — dependents would observe a resource that
    /// claims to exist but doesn't.
    fn assert_provided(&self, id: InitId) {
        let Some(routine) = self.inits.routine(id) else {
            return;
        };
        for &provided in &routine.provides {
            assert!(
                self.resources.contains_id(provided),
                "init routine `{}` finished without providing resource `{}`",
                routine.label(),
                self.resources.name_of(provided).unwrap_or("<undefined>"),
            );
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("tick", &self.tick)
            .field("pending_eager", &self.inits.pending_eager_count())
            .field("pending_lazy", &self.inits.pending_lazy_count())
            .field("in_flight", &self.in_flight.len())
            .field("waiters", &self.waiters.pending_count())
            .finish()
    }
}

/// Log a one-line summary of scheduler occupancy at `info` level.
///
/// Handy for drivers that want a heartbeat without walking the reports.
pub fn log_summary(scheduler: &Scheduler) {
    info!(
        tick = scheduler.current_tick(),
        resources = scheduler.resources().present_count(),
        pending_eager = scheduler.inits().pending_eager_count(),
        pending_lazy = scheduler.inits().pending_lazy_count(),
        in_flight = scheduler.in_flight_count(),
        waiters = scheduler.pending_waiter_count(),
        "scheduler summary"
    );
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::task::Poll;

    use futures::channel::oneshot;
    use futures::task::noop_waker_ref;

    use ignite_resource::Resource;

    use super::*;
    use crate::routine::ApplyFn;

    struct Foo;

    impl Resource for Foo {
        type Params = ();

        fn type_name() -> &'static str {
            "Foo"
        }

        fn build((): ()) -> Self {
            Self
        }
    }

    struct Bar;

    impl Resource for Bar {
        type Params = ();

        fn type_name() -> &'static str {
            "Bar"
        }

        fn build((): ()) -> Self {
            Self
        }
    }

    struct Baz;

    impl Resource for Baz {
        type Params = ();

        fn type_name() -> &'static str {
            "Baz"
        }

        fn build((): ()) -> Self {
            Self
        }
    }

    struct Asset {
        bytes: u32,
    }

    impl Resource for Asset {
        type Params = u32;

        fn type_name() -> &'static str {
            "Asset"
        }

        fn build(bytes: u32) -> Self {
            Self { bytes }
        }
    }

    fn poll_ready(future: &mut WhenReady) -> Poll<()> {
        let mut cx = std::task::Context::from_waker(noop_waker_ref());
        Pin::new(future).poll(&mut cx)
    }

    #[test]
    fn test_waiter_demand_wakes_lazy_producer() {
        // Foo is provided lazily; a readiness request forces the producer
        // awake, and one advance + resolve cycle later the waiter resolves.
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Foo>().unwrap();

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        sched
            .register_lazy(
                InitDescriptor::new()
                    .named("provide-foo")
                    .provides(ResourceId::of::<Foo>()),
                move |reg| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    reg.add::<Foo>(()).unwrap();
                    InitOutcome::Immediate
                },
            )
            .unwrap();

        let mut future = sched.when_ready(&[ResourceId::of::<Foo>()]);
        assert_eq!(poll_ready(&mut future), Poll::Pending);

        assert!(sched.advance());
        assert!(sched.resolve_pass());

        assert_eq!(poll_ready(&mut future), Poll::Ready(()));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(sched.resources().contains::<Foo>());
    }

    #[test]
    fn test_component_gated_chain() {
        // Eager G needs the "bullet" kind and resource Bar; Bar comes from
        // lazy H. Nothing moves until a bullet exists.
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Bar>().unwrap();
        let bullet = sched.components_mut().define("bullet").unwrap();

        let order = Arc::new(Mutex::new(Vec::new()));

        let log = order.clone();
        sched
            .register_lazy(
                InitDescriptor::new()
                    .named("h")
                    .provides(ResourceId::of::<Bar>()),
                move |reg| {
                    log.lock().unwrap().push("h");
                    reg.add::<Bar>(()).unwrap();
                    InitOutcome::Immediate
                },
            )
            .unwrap();

        let log = order.clone();
        sched
            .register_eager(
                InitDescriptor::new()
                    .named("g")
                    .triggered_by(bullet)
                    .requires(ResourceId::of::<Bar>()),
                move |_reg| {
                    log.lock().unwrap().push("g");
                    InitOutcome::Immediate
                },
            )
            .unwrap();

        // No bullet yet: repeated passes make no progress and H stays lazy.
        for _ in 0..3 {
            assert!(!sched.advance());
        }
        assert!(sched.inits().has_lazy_producer(ResourceId::of::<Bar>()));
        assert!(order.lock().unwrap().is_empty());

        sched.mark_component_seen(bullet);

        // Promotion, then H, then G, across successive passes.
        while sched.advance() {}
        assert_eq!(*order.lock().unwrap(), vec!["h", "g"]);
    }

    #[test]
    fn test_exactly_once_execution() {
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Foo>().unwrap();

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        sched
            .register_eager(
                InitDescriptor::new().provides(ResourceId::of::<Foo>()),
                move |reg| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    reg.add::<Foo>(()).unwrap();
                    InitOutcome::Immediate
                },
            )
            .unwrap();

        for _ in 0..5 {
            sched.advance();
            sched.resolve_pass();
        }
        // Requesting the resource again must not re-run the routine.
        let mut future = sched.when_ready(&[ResourceId::of::<Foo>()]);
        assert_eq!(poll_ready(&mut future), Poll::Ready(()));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_premature_production() {
        // An eager routine with an unfired trigger must not wake the lazy
        // producer of its resource dependencies.
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Bar>().unwrap();
        let bullet = sched.components_mut().define("bullet").unwrap();

        let h_runs = Arc::new(AtomicUsize::new(0));
        let counter = h_runs.clone();
        sched
            .register_lazy(
                InitDescriptor::new().provides(ResourceId::of::<Bar>()),
                move |reg| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    reg.add::<Bar>(()).unwrap();
                    InitOutcome::Immediate
                },
            )
            .unwrap();
        sched
            .register_eager(
                InitDescriptor::new()
                    .triggered_by(bullet)
                    .requires(ResourceId::of::<Bar>()),
                |_reg| InitOutcome::Immediate,
            )
            .unwrap();

        for _ in 0..4 {
            sched.advance();
        }
        assert_eq!(h_runs.load(Ordering::SeqCst), 0);
        assert!(sched.inits().has_lazy_producer(ResourceId::of::<Bar>()));
    }

    #[test]
    fn test_when_ready_empty_resolves_immediately() {
        let mut sched = Scheduler::new();
        let mut future = sched.when_ready(&[]);
        assert_eq!(poll_ready(&mut future), Poll::Ready(()));
    }

    #[test]
    fn test_when_ready_present_resolves_without_a_tick() {
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Foo>().unwrap();
        sched.resources_mut().add::<Foo>(()).unwrap();

        let mut future = sched.when_ready(&[ResourceId::of::<Foo>()]);
        assert_eq!(poll_ready(&mut future), Poll::Ready(()));
        assert_eq!(sched.pending_waiter_count(), 0);
    }

    #[test]
    fn test_readiness_implies_presence() {
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Foo>().unwrap();
        sched.resources_mut().define::<Bar>().unwrap();

        sched
            .register_lazy(
                InitDescriptor::new().provides(ResourceId::of::<Foo>()),
                |reg| {
                    reg.add::<Foo>(()).unwrap();
                    InitOutcome::Immediate
                },
            )
            .unwrap();
        sched
            .register_lazy(
                InitDescriptor::new().provides(ResourceId::of::<Bar>()),
                |reg| {
                    reg.add::<Bar>(()).unwrap();
                    InitOutcome::Immediate
                },
            )
            .unwrap();

        let awaited = [ResourceId::of::<Foo>(), ResourceId::of::<Bar>()];
        let mut future = sched.when_ready(&awaited);
        sched.step();

        assert_eq!(poll_ready(&mut future), Poll::Ready(()));
        for id in awaited {
            assert!(sched.resources().contains_id(id));
        }
    }

    #[test]
    fn test_deferred_routine_settles_later() {
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Asset>().unwrap();

        let (sender, receiver) = oneshot::channel::<u32>();
        sched
            .register_eager(
                InitDescriptor::new()
                    .named("load-asset")
                    .provides(ResourceId::of::<Asset>()),
                move |_reg| {
                    InitOutcome::deferred(async move {
                        let bytes = receiver.await.unwrap_or(0);
                        let apply: ApplyFn = Box::new(move |reg| {
                            reg.add::<Asset>(bytes).unwrap();
                        });
                        apply
                    })
                },
            )
            .unwrap();

        // The body starts, suspends, and the scheduler moves on.
        assert!(sched.advance());
        assert_eq!(sched.in_flight_count(), 1);
        assert!(!sched.resources().contains::<Asset>());

        // Still pending: later passes are no-ops for this routine.
        assert!(!sched.advance());

        sender.send(1024).unwrap();
        assert!(sched.advance());
        assert_eq!(sched.in_flight_count(), 0);
        assert_eq!(sched.resources().get::<Asset>().unwrap().bytes, 1024);
    }

    #[test]
    fn test_never_settling_routine() {
        // A routine that never settles: marked started, never re-run, and
        // the scheduler itself never blocks.
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Foo>().unwrap();

        let starts = Arc::new(AtomicUsize::new(0));
        let counter = starts.clone();
        let id = sched
            .register_eager(
                InitDescriptor::new()
                    .named("stuck")
                    .provides(ResourceId::of::<Foo>()),
                move |_reg| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    InitOutcome::deferred(futures::future::pending::<ApplyFn>())
                },
            )
            .unwrap();

        let mut future = sched.when_ready(&[ResourceId::of::<Foo>()]);

        sched.step();
        for _ in 0..5 {
            assert!(!sched.step());
        }

        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(sched.inits().state_of(id), Some(RoutineState::Running));
        assert_eq!(sched.in_flight_count(), 1);
        assert_eq!(poll_ready(&mut future), Poll::Pending);
    }

    #[test]
    fn test_lazy_chain_needs_one_advance_per_link() {
        // Foo ← Bar ← Baz: each advance wakes or runs exactly one link, so
        // the chain needs one pass per routine plus the promotion passes.
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Foo>().unwrap();
        sched.resources_mut().define::<Bar>().unwrap();
        sched.resources_mut().define::<Baz>().unwrap();

        sched
            .register_lazy(
                InitDescriptor::new().provides(ResourceId::of::<Foo>()),
                |reg| {
                    reg.add::<Foo>(()).unwrap();
                    InitOutcome::Immediate
                },
            )
            .unwrap();
        sched
            .register_lazy(
                InitDescriptor::new()
                    .requires(ResourceId::of::<Foo>())
                    .provides(ResourceId::of::<Bar>()),
                |reg| {
                    reg.add::<Bar>(()).unwrap();
                    InitOutcome::Immediate
                },
            )
            .unwrap();
        sched
            .register_lazy(
                InitDescriptor::new()
                    .requires(ResourceId::of::<Bar>())
                    .provides(ResourceId::of::<Baz>()),
                |reg| {
                    reg.add::<Baz>(()).unwrap();
                    InitOutcome::Immediate
                },
            )
            .unwrap();

        let mut future = sched.when_ready(&[ResourceId::of::<Baz>()]);

        let mut passes = 0;
        while poll_ready(&mut future) == Poll::Pending {
            assert!(passes < 10, "chain did not converge");
            sched.advance();
            sched.resolve_pass();
            passes += 1;
        }
        assert!(passes > 1, "a chain cannot finish in a single pass");
        assert!(sched.resources().contains::<Baz>());
    }

    #[test]
    fn test_step_drains_a_chain_in_one_tick() {
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Foo>().unwrap();
        sched.resources_mut().define::<Bar>().unwrap();

        sched
            .register_lazy(
                InitDescriptor::new().provides(ResourceId::of::<Foo>()),
                |reg| {
                    reg.add::<Foo>(()).unwrap();
                    InitOutcome::Immediate
                },
            )
            .unwrap();
        sched
            .register_lazy(
                InitDescriptor::new()
                    .requires(ResourceId::of::<Foo>())
                    .provides(ResourceId::of::<Bar>()),
                |reg| {
                    reg.add::<Bar>(()).unwrap();
                    InitOutcome::Immediate
                },
            )
            .unwrap();

        let mut future = sched.when_ready(&[ResourceId::of::<Bar>()]);
        assert!(sched.step());
        assert_eq!(poll_ready(&mut future), Poll::Ready(()));
        assert_eq!(sched.current_tick(), 1);

        // Nothing left to do.
        assert!(!sched.step());
    }

    #[test]
    #[should_panic(expected = "finished without providing")]
    fn test_broken_provider_panics() {
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Foo>().unwrap();
        sched
            .register_eager(
                InitDescriptor::new()
                    .named("liar")
                    .provides(ResourceId::of::<Foo>()),
                |_reg| InitOutcome::Immediate,
            )
            .unwrap();
        sched.advance();
    }

    #[test]
    fn test_timing_report_states() {
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Foo>().unwrap();
        sched.resources_mut().define::<Bar>().unwrap();

        // One routine finishes, one never starts, one suspends forever.
        sched
            .register_eager(InitDescriptor::new().named("done"), |_reg| {
                InitOutcome::Immediate
            })
            .unwrap();
        sched
            .register_lazy(
                InitDescriptor::new()
                    .named("dormant")
                    .provides(ResourceId::of::<Bar>()),
                |reg| {
                    reg.add::<Bar>(()).unwrap();
                    InitOutcome::Immediate
                },
            )
            .unwrap();
        sched
            .register_eager(
                InitDescriptor::new()
                    .named("suspended")
                    .provides(ResourceId::of::<Foo>()),
                |_reg| InitOutcome::deferred(futures::future::pending::<ApplyFn>()),
            )
            .unwrap();

        sched.step();

        let report = sched.timing_report();
        assert_eq!(report.len(), 3);
        let state_of = |name: &str| {
            report
                .iter()
                .find(|t| t.name == name)
                .map(|t| t.state)
                .unwrap()
        };
        assert_eq!(state_of("done"), RoutineState::Finished);
        assert_eq!(state_of("dormant"), RoutineState::Pending);
        assert_eq!(state_of("suspended"), RoutineState::Running);
    }

    #[test]
    fn test_stalled_waiter_report() {
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Foo>().unwrap();

        // Nobody produces Foo: the waiter stalls silently.
        let _future = sched.when_ready(&[ResourceId::of::<Foo>()]);
        for _ in 0..3 {
            sched.step();
        }

        assert!(sched.stalled_waiters(5).is_empty());
        let stalled = sched.stalled_waiters(2);
        assert_eq!(stalled.len(), 1);
        assert_eq!(stalled[0].age_ticks, 3);
        assert_eq!(stalled[0].missing.len(), 1);
        assert_eq!(stalled[0].missing[0].name, Some("Foo"));
        assert!(!stalled[0].missing[0].ever_seen);
    }

    #[test]
    fn test_removed_resource_reports_ever_seen() {
        let mut sched = Scheduler::new();
        sched.resources_mut().define::<Foo>().unwrap();
        sched.resources_mut().add::<Foo>(()).unwrap();
        sched.resources_mut().remove::<Foo>().unwrap();

        let _future = sched.when_ready(&[ResourceId::of::<Foo>()]);
        sched.step();

        let stalled = sched.stalled_waiters(0);
        assert_eq!(stalled.len(), 1);
        assert!(stalled[0].missing[0].ever_seen);
    }
}
