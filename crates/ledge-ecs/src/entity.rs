//! Entity handles and slot allocation.
//!
//! An [`Entity`] is a 64-bit handle that packs a *generation* counter in the
//! high 32 bits and a *slot* in the low 32 bits. The slot indexes the fixed
//! capacity entity table; the generation is bumped every time the slot is
//! released, so handles that outlive their entity are detected immediately.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::EcsError;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A generational entity handle.
///
/// Layout: `[generation: u32 | slot: u32]`
///
/// A handle is *valid* when its generation is non-zero and its slot is not the
/// sentinel slot. Validity says nothing about liveness: a valid handle may
/// still refer to an entity that has since been destroyed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity(u64);

impl Entity {
    /// Slot value reserved for [`Entity::INVALID`].
    pub const INVALID_SLOT: u32 = u32::MAX;

    /// The "no entity" sentinel.
    pub const INVALID: Entity = Entity::new(Self::INVALID_SLOT, 0);

    /// Construct an `Entity` from a slot and generation.
    #[inline]
    pub const fn new(slot: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | slot as u64)
    }

    /// The slot portion (low 32 bits).
    #[inline]
    pub const fn slot(self) -> u32 {
        self.0 as u32
    }

    /// The generation portion (high 32 bits).
    #[inline]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// `true` if the handle could have been issued by an allocator.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.generation() > 0 && self.slot() != Self::INVALID_SLOT
    }

    /// Raw `u64` representation.
    #[inline]
    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw `u64`.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            return f.write_str("Entity(INVALID)");
        }
        write!(f, "Entity({}v{})", self.slot(), self.generation())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.slot(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

/// Default maximum number of simultaneously live entities.
pub const DEFAULT_MAX_ENTITIES: u32 = 4096;

/// Hands out [`Entity`] handles from a fixed-capacity slot table.
///
/// Fresh slots are issued in increasing order until the high-water mark
/// reaches `capacity`. Released slots are queued FIFO and reused once the
/// fresh range is exhausted, so with no releases allocation is strictly
/// monotonic (`0, 1, 2, ...`) and the `capacity + 1`-th allocation fails.
#[derive(Debug)]
pub struct EntityAllocator {
    capacity: u32,
    /// Current generation for each slot below the high-water mark.
    generations: Vec<u32>,
    /// Whether the slot is currently alive.
    alive: Vec<bool>,
    /// Released slots awaiting reuse.
    free_slots: VecDeque<u32>,
    alive_count: usize,
}

impl EntityAllocator {
    /// Create an allocator that can hold at most `capacity` live entities.
    ///
    /// All bookkeeping is reserved up front.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or reaches the sentinel slot.
    pub fn new(capacity: u32) -> Self {
        assert!(
            capacity > 0 && capacity < Entity::INVALID_SLOT,
            "entity capacity must be in 1..{}, got {capacity}",
            Entity::INVALID_SLOT
        );
        Self {
            capacity,
            generations: Vec::with_capacity(capacity as usize),
            alive: Vec::with_capacity(capacity as usize),
            free_slots: VecDeque::with_capacity(capacity as usize),
            alive_count: 0,
        }
    }

    /// Allocate a fresh [`Entity`].
    ///
    /// Fails with [`EcsError::CapacityExceeded`] when every slot is live. A
    /// failed call leaves the allocator unchanged.
    pub fn allocate(&mut self) -> Result<Entity, EcsError> {
        let slot = if (self.generations.len() as u32) < self.capacity {
            let slot = self.generations.len() as u32;
            self.generations.push(1);
            self.alive.push(true);
            slot
        } else if let Some(slot) = self.free_slots.pop_front() {
            // Generation was already bumped when the slot was released.
            self.alive[slot as usize] = true;
            slot
        } else {
            return Err(EcsError::CapacityExceeded {
                capacity: self.capacity,
            });
        };
        self.alive_count += 1;
        Ok(Entity::new(slot, self.generations[slot as usize]))
    }

    /// Release an entity, bumping its slot generation so that every
    /// outstanding handle becomes stale.
    ///
    /// Returns `false` (and does nothing) if the handle is invalid, out of
    /// range, already released, or stale.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = entity.slot() as usize;
        self.alive[slot] = false;
        let generation = next_generation(self.generations[slot]);
        if generation < self.generations[slot] {
            tracing::debug!(slot, "entity generation wrapped around");
        }
        self.generations[slot] = generation;
        self.free_slots.push_back(entity.slot());
        self.alive_count -= 1;
        true
    }

    /// `true` if `entity` refers to a live entity whose generation matches
    /// the slot's current generation.
    pub fn is_alive(&self, entity: Entity) -> bool {
        if !entity.is_valid() {
            return false;
        }
        let slot = entity.slot() as usize;
        slot < self.generations.len()
            && self.alive[slot]
            && self.generations[slot] == entity.generation()
    }

    /// Check a handle, distinguishing malformed handles from stale ones.
    pub fn validate(&self, entity: Entity) -> Result<(), EcsError> {
        if !entity.is_valid() || entity.slot() >= self.capacity {
            return Err(EcsError::InvalidEntity { entity });
        }
        if !self.is_alive(entity) {
            return Err(EcsError::StaleEntity { entity });
        }
        Ok(())
    }

    /// The generation a slot currently carries, if the slot was ever issued.
    pub fn current_generation(&self, slot: u32) -> Option<u32> {
        self.generations.get(slot as usize).copied()
    }

    /// Number of currently live entities.
    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Maximum number of simultaneously live entities.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of slots ever issued.
    pub fn high_water_mark(&self) -> u32 {
        self.generations.len() as u32
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTITIES)
    }
}

/// Generation 0 is reserved for [`Entity::INVALID`], so wrap-around skips it.
fn next_generation(generation: u32) -> u32 {
    match generation.wrapping_add(1) {
        0 => 1,
        g => g,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
