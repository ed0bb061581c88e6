//! Fixed-timestep tick loop.
//!
//! Owns the [`Scheduler`] and a [`PhaseSchedule`] and runs them at a target
//! rate. The init scheduler's `step()` is registered as an ordinary per-tick
//! system at [`Phase::SimulationBegin`], so init work advances at a fixed
//! point in the phase order like everything else.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use ignite_sched::{Phase, PhaseSchedule, Scheduler};

/// How often the loop checks for stalled waiters, in ticks.
const STALL_CHECK_EVERY: u64 = 60;

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// Warn about waiters pending longer than this many ticks.
    pub stall_warn_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
            stall_warn_ticks: 120,
        }
    }
}

/// The tick loop state.
pub struct TickLoop {
    config: TickConfig,
    scheduler: Scheduler,
    schedule: PhaseSchedule,
}

impl TickLoop {
    /// Create a new tick loop with the given configuration.
    ///
    /// The init scheduler is pre-registered at [`Phase::SimulationBegin`].
    #[must_use]
    pub fn new(config: TickConfig) -> Self {
        let mut schedule = PhaseSchedule::new();
        schedule.add_system(Phase::SimulationBegin, "init-scheduler", |scheduler| {
            scheduler.step();
        });
        Self {
            config,
            scheduler: Scheduler::new(),
            schedule,
        }
    }

    /// Returns a reference to the scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Returns a mutable reference to the scheduler.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Returns a mutable reference to the phase schedule.
    pub fn schedule_mut(&mut self) -> &mut PhaseSchedule {
        &mut self.schedule
    }

    /// Run one tick: every registered system once, in phase order.
    pub fn tick(&mut self) {
        self.schedule.run_tick(&mut self.scheduler);
    }

    /// Run the tick loop for the configured number of ticks, or indefinitely.
    ///
    /// This is a blocking loop; each tick is rate-limited to the configured
    /// budget, with a warning when a tick overruns it.
    pub fn run(&mut self) {
        let tick_duration = Duration::from_secs_f64(1.0 / self.config.tick_rate);
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            self.tick();

            tick_count += 1;
            if tick_count % STALL_CHECK_EVERY == 0 {
                self.report_stalled();
            }
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.scheduler.current_tick(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
    }

    /// Warn about readiness requests that have been pending suspiciously
    /// long. Observational only — nothing is cancelled.
    fn report_stalled(&self) {
        for stalled in self.scheduler.stalled_waiters(self.config.stall_warn_ticks) {
            warn!(
                waiter = %stalled.id,
                age_ticks = stalled.age_ticks,
                missing = ?stalled.missing,
                "readiness request has been pending for a long time"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_advances_scheduler() {
        let mut tick_loop = TickLoop::new(TickConfig::default());
        assert_eq!(tick_loop.scheduler().current_tick(), 0);
        tick_loop.tick();
        assert_eq!(tick_loop.scheduler().current_tick(), 1);
        tick_loop.tick();
        assert_eq!(tick_loop.scheduler().current_tick(), 2);
    }

    #[test]
    fn test_run_limited_ticks() {
        let config = TickConfig {
            tick_rate: 1000.0, // fast for testing
            max_ticks: 5,
            stall_warn_ticks: 120,
        };
        let mut tick_loop = TickLoop::new(config);
        tick_loop.run();
        assert_eq!(tick_loop.scheduler().current_tick(), 5);
    }

    #[test]
    fn test_extra_systems_run_after_init_scheduler() {
        let mut tick_loop = TickLoop::new(TickConfig::default());
        tick_loop
            .schedule_mut()
            .add_system(Phase::Gameplay, "game", |_| {});
        assert_eq!(
            tick_loop.schedule_mut().execution_order(),
            vec!["init-scheduler", "game"]
        );
    }
}
