//! Fixed-timestep tick loop for deterministic simulation.
//!
//! The [`TickLoop`] owns the [`World`] and the [`Schedule`]. Each tick:
//!
//! 1. Every system runs once, in declaration order, with `&mut World` and the
//!    same `dt`. Component writes are visible to later systems immediately.
//! 2. The event bus discards every event still pending, so events live for
//!    exactly one tick.
//! 3. The tick counter advances.
//!
//! If a system fails, the tick stops right there: later systems are skipped,
//! earlier writes stay in the world (there is no rollback), the event bus is
//! left as it was, and the tick counter does not move. The caller decides
//! whether a world in that state is worth continuing.
//!
//! # Example
//!
//! ```
//! use ledge_engine::prelude::*;
//!
//! let mut world = World::new();
//! let e = world.create_entity().unwrap();
//! world.add(e, Position::new(0.0, 0.0)).unwrap();
//! world.add(e, Velocity::new(1.0, 0.0)).unwrap();
//!
//! let schedule = Schedule::builder()
//!     .with_system("integrate", |world, dt| {
//!         let stores = world.stores_mut();
//!         for (entity, pos) in stores.positions.iter_mut() {
//!             if let Ok(vel) = stores.velocities.get(entity) {
//!                 pos.x += vel.x * dt;
//!                 pos.y += vel.y * dt;
//!             }
//!         }
//!         Ok(())
//!     })
//!     .build();
//!
//! let mut tick_loop = TickLoop::new(world, schedule, EngineConfig::default());
//! tick_loop.fixed_update(1.0).unwrap();
//!
//! assert_eq!(tick_loop.world().get::<Position>(e), Ok(&Position::new(1.0, 0.0)));
//! assert_eq!(tick_loop.tick_count(), 1);
//! ```

use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::events::EndOfTick;
use crate::schedule::Schedule;
use crate::world::World;

// ---------------------------------------------------------------------------
// TickError
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A system returned an error; the tick was aborted after it.
    #[error("system '{system}' failed during tick {tick}")]
    SystemFailed {
        system: String,
        tick: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing and event counts for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time per system, in schedule order.
    pub system_times: Vec<Duration>,
    /// Total time for the tick.
    pub total_time: Duration,
    /// Event bus report from the end of the tick.
    pub events: EndOfTick,
}

// ---------------------------------------------------------------------------
// TickLoop
// ---------------------------------------------------------------------------

/// The deterministic fixed-timestep driver.
///
/// # Determinism Guarantee
///
/// Given the same initial [`World`], the same [`Schedule`] and the same
/// sequence of `dt` values, the loop produces identical worlds. This holds
/// because:
///
/// - system order is fixed at build time;
/// - everything runs on the calling thread with no suspension points;
/// - randomness comes from the world's seeded streams;
/// - simulation time is `tick_count * fixed_dt`, not an accumulated sum.
pub struct TickLoop {
    world: World,
    schedule: Schedule,
    tick_counter: u64,
    fixed_dt: f32,
    config: EngineConfig,
    last_diagnostics: TickDiagnostics,
}

impl TickLoop {
    /// Create a loop around an existing world.
    ///
    /// # Panics
    ///
    /// Panics if the configured step is not positive and finite.
    pub fn new(world: World, schedule: Schedule, config: EngineConfig) -> Self {
        let fixed_dt = config.fixed_dt();
        assert!(
            fixed_dt > 0.0 && fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {fixed_dt}"
        );
        let system_count = schedule.len();
        Self {
            world,
            schedule,
            tick_counter: 0,
            fixed_dt,
            config,
            last_diagnostics: TickDiagnostics {
                system_times: Vec::with_capacity(system_count),
                ..Default::default()
            },
        }
    }

    /// Build a fresh world from `config` and wrap it.
    pub fn from_config(schedule: Schedule, config: EngineConfig) -> Self {
        let world = World::with_config(&config);
        Self::new(world, schedule, config)
    }

    /// Run one tick with step `dt` (seconds).
    ///
    /// See the module docs for what happens when a system fails.
    pub fn fixed_update(&mut self, dt: f32) -> Result<(), TickError> {
        debug_assert!(dt.is_finite() && dt >= 0.0, "dt must be finite and non-negative");
        let tick = self.tick_counter;
        let _span = tracing::debug_span!("tick", tick).entered();
        let tick_start = Instant::now();

        self.last_diagnostics.events = EndOfTick::default();
        self.last_diagnostics.total_time = Duration::ZERO;
        let times = &mut self.last_diagnostics.system_times;
        times.clear();
        for system in self.schedule.systems_mut() {
            let sys_start = Instant::now();
            tracing::trace!(system = %system.name, "running system");
            if let Err(err) = (system.func)(&mut self.world, dt) {
                tracing::error!(system = %system.name, tick, error = %err, "system failed; tick aborted");
                self.last_diagnostics.total_time = tick_start.elapsed();
                return Err(TickError::SystemFailed {
                    system: system.name.clone(),
                    tick,
                    source: err.into(),
                });
            }
            times.push(sys_start.elapsed());
        }

        self.last_diagnostics.events = self.world.events_mut().process_end_of_tick();
        self.tick_counter += 1;
        self.last_diagnostics.total_time = tick_start.elapsed();
        Ok(())
    }

    /// Run one tick with the configured step.
    pub fn tick(&mut self) -> Result<(), TickError> {
        self.fixed_update(self.fixed_dt)
    }

    /// Run `count` ticks with the configured step, stopping at the first
    /// failure.
    pub fn run_ticks(&mut self, count: u64) -> Result<(), TickError> {
        for _ in 0..count {
            self.tick()?;
        }
        Ok(())
    }

    // -- accessors ----------------------------------------------------------

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulation time in seconds, assuming every tick used the configured
    /// step.
    ///
    /// Computed as `tick_count * fixed_dt` to avoid floating-point drift from
    /// repeated addition.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.fixed_dt as f64
    }

    /// Seconds per tick.
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world between ticks (setup, tests, host input).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Diagnostics from the last tick. After a failed tick, `system_times`
    /// covers only the systems that completed, `total_time` runs up to the
    /// failure and `events` is empty since the bus was not processed.
    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }

    /// Tear down the loop and keep the world.
    pub fn into_world(self) -> World {
        self.world
    }
}

impl std::fmt::Debug for TickLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickLoop")
            .field("tick", &self.tick_counter)
            .field("fixed_dt", &self.fixed_dt)
            .field("schedule", &self.schedule)
            .field("world", &self.world)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
