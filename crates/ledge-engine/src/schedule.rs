//! The fixed, ordered list of simulation systems.
//!
//! A [`Schedule`] is assembled once with a [`ScheduleBuilder`] and cannot be
//! reordered afterwards. Declaration order is execution order, which is what
//! makes a tick reproducible: the same world, the same schedule and the same
//! `dt` always produce the same result.
//!
//! ```
//! use ledge_engine::prelude::*;
//!
//! let schedule = Schedule::builder()
//!     .with_system("player_controller", |_world, _dt| Ok(()))
//!     .with_system("physics", |_world, _dt| Ok(()))
//!     .with_system_after("camera", &["physics"], |_world, _dt| Ok(()))
//!     .build();
//!
//! assert_eq!(schedule.system_names(), vec!["player_controller", "physics", "camera"]);
//! ```

use std::fmt;

use crate::world::World;

/// A simulation system: called once per tick with the world and the step.
///
/// Returning an error aborts the tick (see
/// [`TickLoop::fixed_update`](crate::tick::TickLoop::fixed_update)).
pub type SystemFn = Box<dyn FnMut(&mut World, f32) -> anyhow::Result<()>>;

/// A named system in the schedule.
pub(crate) struct RegisteredSystem {
    pub(crate) name: String,
    pub(crate) func: SystemFn,
}

// ---------------------------------------------------------------------------
// ScheduleBuilder
// ---------------------------------------------------------------------------

/// Collects systems in declaration order.
#[derive(Default)]
pub struct ScheduleBuilder {
    systems: Vec<RegisteredSystem>,
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a system.
    ///
    /// # Panics
    ///
    /// Panics if a system with the same name was already added.
    pub fn with_system<F>(self, name: &str, func: F) -> Self
    where
        F: FnMut(&mut World, f32) -> anyhow::Result<()> + 'static,
    {
        self.with_system_after(name, &[], func)
    }

    /// Append a system that must run after each system named in `after`.
    ///
    /// Since declaration order is execution order, every name in `after` must
    /// already have been added.
    ///
    /// # Panics
    ///
    /// - If any system in `after` has not been added yet.
    /// - If a system with the same name was already added.
    pub fn with_system_after<F>(mut self, name: &str, after: &[&str], func: F) -> Self
    where
        F: FnMut(&mut World, f32) -> anyhow::Result<()> + 'static,
    {
        for dep in after {
            assert!(
                self.systems.iter().any(|s| s.name == *dep),
                "system '{name}' must run after '{dep}', but '{dep}' has not been added before it"
            );
        }
        assert!(
            !self.systems.iter().any(|s| s.name == name),
            "duplicate system name: {name:?}"
        );
        self.systems.push(RegisteredSystem {
            name: name.to_owned(),
            func: Box::new(func),
        });
        self
    }

    pub fn build(self) -> Schedule {
        tracing::debug!(systems = self.systems.len(), "schedule built");
        Schedule {
            systems: self.systems,
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Systems in execution order.
#[derive(Default)]
pub struct Schedule {
    systems: Vec<RegisteredSystem>,
}

impl Schedule {
    pub fn builder() -> ScheduleBuilder {
        ScheduleBuilder::new()
    }

    /// A schedule with no systems; ticks only reset the event bus.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// System names in execution order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name.as_str()).collect()
    }

    pub(crate) fn systems_mut(&mut self) -> &mut [RegisteredSystem] {
        &mut self.systems
    }
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schedule")
            .field("systems", &self.system_names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
