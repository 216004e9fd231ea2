//! Ledge ECS -- dense component storage with generational entity handles.
//!
//! This crate is the domain-free core of the Ledge simulation:
//!
//! - [`Entity`](entity::Entity) handles pair a slot with a generation so that
//!   handles outliving their entity are detected instead of aliasing the
//!   slot's next occupant.
//! - [`EntityAllocator`](entity::EntityAllocator) issues handles from a fixed
//!   capacity table.
//! - [`ComponentStore`](store::ComponentStore) packs one component type
//!   densely with O(1) add/remove via swap-remove.
//! - [`EventQueue`](event::EventQueue) is an allocation-free ring buffer that
//!   drops events under pressure.
//!
//! There is no type-erased registry: a world owns one statically typed store
//! per component type.
//!
//! # Quick Start
//!
//! ```
//! use ledge_ecs::prelude::*;
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut entities = EntityAllocator::new(16);
//! let mut positions = ComponentStore::new();
//!
//! let e = entities.allocate().unwrap();
//! positions.add(e, Position { x: 0.0, y: 0.0 }).unwrap();
//! positions.get_mut(e).unwrap().x = 4.0;
//!
//! assert_eq!(positions.get(e), Ok(&Position { x: 4.0, y: 0.0 }));
//! ```

#![deny(unsafe_code)]

pub mod entity;
pub mod event;
pub mod store;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by entity and component operations.
///
/// Every variant is recoverable; a failed operation leaves the allocator or
/// store it was called on unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The handle is the invalid sentinel, has generation 0, or its slot is
    /// outside the entity table.
    #[error("entity {entity:?} is not a valid handle")]
    InvalidEntity { entity: entity::Entity },

    /// The handle's generation does not match the slot's current generation
    /// (the entity was destroyed, possibly with the slot reused).
    #[error("entity {entity:?} is stale (destroyed or slot reused)")]
    StaleEntity { entity: entity::Entity },

    /// The entity already has a value of this component type.
    #[error("entity {entity:?} already has component {component}")]
    DuplicateComponent {
        entity: entity::Entity,
        component: &'static str,
    },

    /// The entity has no value of this component type.
    #[error("entity {entity:?} has no component {component}")]
    MissingComponent {
        entity: entity::Entity,
        component: &'static str,
    },

    /// Every entity slot is in use.
    #[error("entity capacity of {capacity} exceeded")]
    CapacityExceeded { capacity: u32 },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::entity::{Entity, EntityAllocator, DEFAULT_MAX_ENTITIES};
    pub use crate::event::{EventQueue, DEFAULT_EVENT_CAPACITY};
    pub use crate::store::ComponentStore;
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
