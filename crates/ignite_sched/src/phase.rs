//! Tick phase ordering.
//!
//! Per-tick systems are registered independently and in arbitrary module
//! order, so their execution sequence within a tick cannot depend on
//! registration order. [`Phase`] is a fixed, totally-ordered enumeration of
//! coarse execution phases used purely as a sort key — it carries no
//! dependency-resolution logic of its own.
//!
//! The init scheduler's [`Scheduler::step`] is itself a per-tick system,
//! conventionally registered at [`Phase::SimulationBegin`].

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::scheduler::Scheduler;

/// Coarse execution phases of one engine tick, in execution order.
///
/// The discriminant is the sort key; the derived `Ord` follows declaration
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Phase {
    /// Drain inbound network messages.
    NetworkIntake,
    /// World simulation: bring pending state changes into effect.
    SimulationBegin,
    /// World simulation: main update.
    SimulationUpdate,
    /// World simulation: post-update bookkeeping.
    SimulationEnd,
    /// Sample input devices.
    InputRead,
    /// Gameplay logic.
    Gameplay,
    /// Physics: broadphase pair collection.
    PhysicsBroadphase,
    /// Physics: narrowphase contact generation.
    PhysicsNarrowphase,
    /// Physics: constraint and contact resolution.
    PhysicsResolve,
    /// Render: visibility and draw-list preparation.
    RenderPrepare,
    /// Render: command submission.
    RenderDraw,
    /// Render: present the frame.
    RenderPresent,
}

impl Phase {
    /// Every phase, in execution order.
    pub const ALL: [Phase; 12] = [
        Phase::NetworkIntake,
        Phase::SimulationBegin,
        Phase::SimulationUpdate,
        Phase::SimulationEnd,
        Phase::InputRead,
        Phase::Gameplay,
        Phase::PhysicsBroadphase,
        Phase::PhysicsNarrowphase,
        Phase::PhysicsResolve,
        Phase::RenderPrepare,
        Phase::RenderDraw,
        Phase::RenderPresent,
    ];

    /// Position of this phase in the total order.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// A short lowercase name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::NetworkIntake => "network-intake",
            Phase::SimulationBegin => "simulation-begin",
            Phase::SimulationUpdate => "simulation-update",
            Phase::SimulationEnd => "simulation-end",
            Phase::InputRead => "input-read",
            Phase::Gameplay => "gameplay",
            Phase::PhysicsBroadphase => "physics-broadphase",
            Phase::PhysicsNarrowphase => "physics-narrowphase",
            Phase::PhysicsResolve => "physics-resolve",
            Phase::RenderPrepare => "render-prepare",
            Phase::RenderDraw => "render-draw",
            Phase::RenderPresent => "render-present",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A per-tick system slotted into a phase.
struct PhaseSystem {
    phase: Phase,
    name: &'static str,
    func: Box<dyn FnMut(&mut Scheduler) + Send>,
}

/// Runs registered per-tick systems in phase order.
///
/// Systems in the same phase run in registration order; across phases the
/// [`Phase`] total order decides, regardless of registration order.
#[derive(Default)]
pub struct PhaseSchedule {
    systems: Vec<PhaseSystem>,
}

impl PhaseSchedule {
    /// Create an empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a per-tick system in `phase`.
    pub fn add_system(
        &mut self,
        phase: Phase,
        name: &'static str,
        func: impl FnMut(&mut Scheduler) + Send + 'static,
    ) {
        self.systems.push(PhaseSystem {
            phase,
            name,
            func: Box::new(func),
        });
        // Stable sort: insertion order survives within a phase.
        self.systems.sort_by_key(|system| system.phase.ordinal());
    }

    /// Run every system once, in phase order.
    pub fn run_tick(&mut self, scheduler: &mut Scheduler) {
        for system in &mut self.systems {
            trace!(phase = %system.phase, system = system.name, "running system");
            (system.func)(scheduler);
        }
    }

    /// Returns the number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Returns the registered system names in execution order.
    #[must_use]
    pub fn execution_order(&self) -> Vec<&'static str> {
        self.systems.iter().map(|system| system.name).collect()
    }
}
