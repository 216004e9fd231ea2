//! Ledge Engine -- deterministic simulation core for a 2D platformer.
//!
//! This crate builds on [`ledge_ecs`] to provide the game-facing layer:
//!
//! - the closed set of gameplay [`components`];
//! - the per-tick [`events`] bus;
//! - the [`World`](world::World) that owns entities, stores, events and RNG;
//! - an ordered [`Schedule`](schedule::Schedule) of systems;
//! - the fixed-timestep [`TickLoop`](tick::TickLoop) that drives it all.
//!
//! Rendering, audio, input and asset loading are left to the host; the engine
//! runs headless and single-threaded.
//!
//! # Quick Start
//!
//! ```
//! use ledge_engine::prelude::*;
//!
//! let config = EngineConfig::default();
//! let mut world = World::with_config(&config);
//!
//! let player = world.create_entity().unwrap();
//! world.add(player, Position::new(0.0, 0.0)).unwrap();
//! world.add(player, Velocity::new(60.0, 0.0)).unwrap();
//!
//! let schedule = Schedule::builder()
//!     .with_system("integrate", |world, dt| {
//!         let stores = world.stores_mut();
//!         for (entity, pos) in stores.positions.iter_mut() {
//!             if let Ok(vel) = stores.velocities.get(entity) {
//!                 pos.x += vel.x * dt;
//!             }
//!         }
//!         Ok(())
//!     })
//!     .build();
//!
//! let mut tick_loop = TickLoop::new(world, schedule, config);
//! tick_loop.run_ticks(120).unwrap();
//! assert_eq!(tick_loop.tick_count(), 120);
//! ```

#![deny(unsafe_code)]

pub mod components;
pub mod config;
pub mod events;
pub mod rng;
pub mod schedule;
pub mod tick;
pub mod world;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use ledge_ecs;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    // Re-export everything from the ECS prelude.
    pub use ledge_ecs::prelude::*;

    pub use crate::components::*;
    pub use crate::config::{ConfigError, EngineConfig, FramerateMode, DEFAULT_SEED};
    pub use crate::events::{
        Consumable, EndOfTick, Event, EventBus, FlowEvent, FlowEventKind, PlayerDamaged,
        PlayerJumped, PlayerLanded,
    };
    pub use crate::rng::{resolve_seed, RngStream, RngStreams};
    pub use crate::schedule::{Schedule, ScheduleBuilder, SystemFn};
    pub use crate::tick::{TickDiagnostics, TickError, TickLoop};
    pub use crate::world::{Component, ComponentStores, World};
}
