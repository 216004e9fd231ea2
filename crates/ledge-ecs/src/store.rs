//! Dense, swap-remove storage for a single component type.
//!
//! A [`ComponentStore`] keeps every value of one component type packed in a
//! contiguous `Vec` with no gaps. Two index maps tie the dense array to entity
//! slots:
//!
//! - `sparse[slot]` holds the dense index of the slot's value (or
//!   [`ABSENT`]);
//! - `entities[index]` holds the full [`Entity`] handle the value was stored
//!   under.
//!
//! Removal moves the last value into the hole, so add and remove are O(1) and
//! iteration touches only live values. The price is that dense indices are
//! not stable: any removal may relocate one other value.
//!
//! The store remembers the generation each value was inserted with and
//! rejects handles from another generation with [`EcsError::StaleEntity`].
//! It does *not* know whether an entity is alive; that check belongs to the
//! owner of the [`EntityAllocator`](crate::entity::EntityAllocator).

use std::fmt;

use crate::entity::Entity;
use crate::EcsError;

/// Sparse-map marker for "no value stored for this slot".
const ABSENT: u32 = u32::MAX;

/// Smallest sparse table allocated on first growth.
const MIN_SPARSE_LEN: usize = 16;

// ---------------------------------------------------------------------------
// ComponentStore
// ---------------------------------------------------------------------------

/// Dense storage for values of type `T`, indexed by entity slot.
///
/// Every failing operation leaves the store exactly as it was.
pub struct ComponentStore<T> {
    /// Packed component values; `dense[i]` belongs to `entities[i]`.
    dense: Vec<T>,
    /// Dense index -> owning entity (slot and insertion generation).
    entities: Vec<Entity>,
    /// Slot -> dense index, or [`ABSENT`].
    sparse: Vec<u32>,
    /// Handles with `slot >= slot_limit` are rejected as invalid.
    slot_limit: u32,
}

impl<T> ComponentStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            entities: Vec::new(),
            sparse: Vec::new(),
            slot_limit: Entity::INVALID_SLOT,
        }
    }

    /// Create an empty store with room for `capacity` values and slots
    /// `0..capacity` before any reallocation.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
            sparse: vec![ABSENT; capacity],
            slot_limit: Entity::INVALID_SLOT,
        }
    }

    /// Reject handles whose slot is `>= limit` with
    /// [`EcsError::InvalidEntity`] instead of growing the sparse table.
    ///
    /// The owning world sets this to its entity capacity. Values already
    /// stored at or above the new limit stay reachable only through
    /// iteration.
    pub fn with_slot_limit(mut self, limit: u32) -> Self {
        self.slot_limit = limit;
        self
    }

    pub fn slot_limit(&self) -> u32 {
        self.slot_limit
    }

    #[inline]
    fn accepts(&self, entity: Entity) -> bool {
        entity.is_valid() && entity.slot() < self.slot_limit
    }

    fn component_name() -> &'static str {
        std::any::type_name::<T>()
    }

    /// Resolve a handle to its dense index.
    fn lookup(&self, entity: Entity) -> Result<usize, EcsError> {
        if !self.accepts(entity) {
            return Err(EcsError::InvalidEntity { entity });
        }
        let index = match self.sparse.get(entity.slot() as usize) {
            Some(&index) if index != ABSENT => index as usize,
            _ => {
                return Err(EcsError::MissingComponent {
                    entity,
                    component: Self::component_name(),
                })
            }
        };
        if self.entities[index] != entity {
            return Err(EcsError::StaleEntity { entity });
        }
        Ok(index)
    }

    /// `true` if a value is stored for exactly this handle (same slot and
    /// generation).
    pub fn has(&self, entity: Entity) -> bool {
        self.lookup(entity).is_ok()
    }

    /// Store `value` for `entity` and return a reference to it.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] for the sentinel, a generation-0 handle
    ///   or a slot at or past the [slot limit](Self::with_slot_limit).
    /// - [`EcsError::DuplicateComponent`] if the entity already has a value.
    /// - [`EcsError::StaleEntity`] if the slot holds a value stored under a
    ///   different generation.
    pub fn add(&mut self, entity: Entity, value: T) -> Result<&mut T, EcsError> {
        if !self.accepts(entity) {
            return Err(EcsError::InvalidEntity { entity });
        }
        let slot = entity.slot() as usize;
        if let Some(&existing) = self.sparse.get(slot) {
            if existing != ABSENT {
                return Err(if self.entities[existing as usize] == entity {
                    EcsError::DuplicateComponent {
                        entity,
                        component: Self::component_name(),
                    }
                } else {
                    EcsError::StaleEntity { entity }
                });
            }
        }

        if slot >= self.sparse.len() {
            let new_len = (slot + 1)
                .max(self.sparse.len() * 2)
                .max(MIN_SPARSE_LEN);
            self.sparse.resize(new_len, ABSENT);
        }

        let index = self.dense.len();
        self.dense.push(value);
        self.entities.push(entity);
        self.sparse[slot] = index as u32;
        Ok(&mut self.dense[index])
    }

    /// Shared access to the entity's value.
    pub fn get(&self, entity: Entity) -> Result<&T, EcsError> {
        let index = self.lookup(entity)?;
        Ok(&self.dense[index])
    }

    /// Exclusive access to the entity's value.
    pub fn get_mut(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        let index = self.lookup(entity)?;
        Ok(&mut self.dense[index])
    }

    /// Remove and return the entity's value.
    ///
    /// The last value in the dense array is moved into the freed position, so
    /// at most one other entity changes dense index.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if nothing is stored for the entity; the
    /// store is not modified.
    pub fn remove(&mut self, entity: Entity) -> Result<T, EcsError> {
        let index = self.lookup(entity)?;
        Ok(self.swap_remove(index))
    }

    /// Remove the entity's value if there is one.
    pub fn remove_if_present(&mut self, entity: Entity) -> Option<T> {
        self.lookup(entity).ok().map(|index| self.swap_remove(index))
    }

    /// Remove whatever value occupies `slot`, whichever generation it was
    /// stored under.
    ///
    /// Returns the handle the value was stored with, and the value.
    pub fn remove_slot(&mut self, slot: u32) -> Option<(Entity, T)> {
        let index = match self.sparse.get(slot as usize) {
            Some(&index) if index != ABSENT => index as usize,
            _ => return None,
        };
        let entity = self.entities[index];
        Some((entity, self.swap_remove(index)))
    }

    fn swap_remove(&mut self, index: usize) -> T {
        let removed = self.entities.swap_remove(index);
        let value = self.dense.swap_remove(index);
        self.sparse[removed.slot() as usize] = ABSENT;
        if let Some(moved) = self.entities.get(index) {
            self.sparse[moved.slot() as usize] = index as u32;
        }
        value
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// `true` if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// The entity owning the value at `index`, with its true generation.
    pub fn entity_at(&self, index: usize) -> Option<Entity> {
        self.entities.get(index).copied()
    }

    /// Current dense index of the entity's value.
    ///
    /// Only meaningful until the next add or remove on this store.
    pub fn dense_index(&self, entity: Entity) -> Option<usize> {
        self.lookup(entity).ok()
    }

    pub fn get_by_index(&self, index: usize) -> Option<&T> {
        self.dense.get(index)
    }

    pub fn get_by_index_mut(&mut self, index: usize) -> Option<&mut T> {
        self.dense.get_mut(index)
    }

    /// Entities currently holding a value, in dense order.
    ///
    /// The order changes whenever a value is removed. Calling this again
    /// restarts from the beginning.
    pub fn entities(&self) -> impl ExactSizeIterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    /// `(entity, &value)` pairs in dense order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Entity, &T)> + '_ {
        self.entities.iter().copied().zip(self.dense.iter())
    }

    /// `(entity, &mut value)` pairs in dense order.
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (Entity, &mut T)> + '_ {
        self.entities.iter().copied().zip(self.dense.iter_mut())
    }

    /// The packed values.
    pub fn values(&self) -> &[T] {
        &self.dense
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.dense
    }

    /// Drop every value, keeping allocated capacity.
    pub fn clear(&mut self) {
        for entity in self.entities.drain(..) {
            self.sparse[entity.slot() as usize] = ABSENT;
        }
        self.dense.clear();
    }
}

impl<T> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ComponentStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentStore")
            .field("component", &Self::component_name())
            .field("len", &self.dense.len())
            .field("sparse_len", &self.sparse.len())
            .field("slot_limit", &self.slot_limit)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Pos {
        x: f32,
        y: f32,
    }

    fn e(slot: u32) -> Entity {
        Entity::new(slot, 1)
    }

    /// Both index maps agree for every stored value.
    fn assert_consistent<T>(store: &ComponentStore<T>) {
        assert_eq!(store.dense.len(), store.entities.len());
        for (index, entity) in store.entities.iter().enumerate() {
            assert_eq!(store.sparse[entity.slot() as usize] as usize, index);
        }
        let mapped = store.sparse.iter().filter(|&&i| i != ABSENT).count();
        assert_eq!(mapped, store.len());
    }

    #[test]
    fn add_get_has() {
        let mut store = ComponentStore::new();
        let pos = store.add(e(3), Pos { x: 1.0, y: 2.0 }).unwrap();
        pos.x = 5.0;
        assert!(store.has(e(3)));
        assert!(!store.has(e(2)));
        assert_eq!(store.get(e(3)).unwrap(), &Pos { x: 5.0, y: 2.0 });
        assert_eq!(store.len(), 1);
        assert_consistent(&store);
    }

    #[test]
    fn duplicate_add_is_rejected_without_mutation() {
        let mut store = ComponentStore::new();
        store.add(e(0), Pos { x: 1.0, y: 1.0 }).unwrap();
        let err = store.add(e(0), Pos { x: 9.0, y: 9.0 }).unwrap_err();
        assert!(matches!(err, EcsError::DuplicateComponent { .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(e(0)).unwrap().x, 1.0);
    }

    #[test]
    fn invalid_entity_is_rejected() {
        let mut store = ComponentStore::<Pos>::new();
        assert_eq!(
            store.add(Entity::INVALID, Pos { x: 0.0, y: 0.0 }).unwrap_err(),
            EcsError::InvalidEntity {
                entity: Entity::INVALID
            }
        );
        assert!(!store.has(Entity::INVALID));
        assert!(store.is_empty());
        assert!(store.sparse.is_empty(), "failed add must not grow storage");
    }

    #[test]
    fn missing_component_errors() {
        let mut store = ComponentStore::<Pos>::new();
        assert!(matches!(
            store.get(e(1)),
            Err(EcsError::MissingComponent { .. })
        ));
        assert!(matches!(
            store.remove(e(1)),
            Err(EcsError::MissingComponent { .. })
        ));
        assert!(store.remove_if_present(e(1)).is_none());
    }

    #[test]
    fn remove_relocates_last_value() {
        let mut store = ComponentStore::new();
        for slot in 0..4 {
            store.add(e(slot), slot * 10).unwrap();
        }
        assert_eq!(store.remove(e(1)).unwrap(), 10);

        // Slot 3 moved into dense index 1 with its value intact.
        assert_eq!(store.entity_at(1), Some(e(3)));
        assert_eq!(store.dense_index(e(3)), Some(1));
        assert_eq!(*store.get(e(3)).unwrap(), 30);
        assert_eq!(*store.get(e(0)).unwrap(), 0);
        assert_eq!(*store.get(e(2)).unwrap(), 20);
        assert_eq!(store.len(), 3);
        assert_consistent(&store);
    }

    #[test]
    fn remove_last_value_relocates_nothing() {
        let mut store = ComponentStore::new();
        store.add(e(0), 'a').unwrap();
        store.add(e(1), 'b').unwrap();
        assert_eq!(store.remove(e(1)).unwrap(), 'b');
        assert_eq!(store.entity_at(0), Some(e(0)));
        assert_eq!(store.entity_at(1), None);
        assert_consistent(&store);
    }

    #[test]
    fn add_after_remove_succeeds() {
        let mut store = ComponentStore::new();
        store.add(e(5), 1u8).unwrap();
        store.add(e(6), 2u8).unwrap();
        store.remove(e(5)).unwrap();
        store.add(e(5), 3u8).unwrap();
        assert_eq!(*store.get(e(5)).unwrap(), 3);
        assert_eq!(store.dense_index(e(5)), Some(1));
        assert_consistent(&store);
    }

    #[test]
    fn stale_generation_is_rejected() {
        let mut store = ComponentStore::new();
        let old = Entity::new(2, 1);
        let new = Entity::new(2, 2);
        store.add(old, 7u32).unwrap();

        assert!(!store.has(new));
        assert_eq!(store.get(new), Err(EcsError::StaleEntity { entity: new }));
        assert_eq!(
            store.add(new, 8).unwrap_err(),
            EcsError::StaleEntity { entity: new }
        );
        assert_eq!(store.remove(new), Err(EcsError::StaleEntity { entity: new }));
        assert_eq!(*store.get(old).unwrap(), 7);
    }

    #[test]
    fn entity_at_reports_true_generation() {
        let mut store = ComponentStore::new();
        store.add(Entity::new(9, 4), ()).unwrap();
        assert_eq!(store.entity_at(0), Some(Entity::new(9, 4)));
    }

    #[test]
    fn sparse_grows_geometrically_for_high_slots() {
        let mut store = ComponentStore::new();
        store.add(e(0), 0).unwrap();
        assert_eq!(store.sparse.len(), MIN_SPARSE_LEN);
        store.add(e(100), 1).unwrap();
        assert_eq!(store.sparse.len(), 101);
        store.add(e(101), 2).unwrap();
        assert_eq!(store.sparse.len(), 202);
        assert_consistent(&store);
    }

    #[test]
    fn entities_iteration_is_restartable() {
        let mut store = ComponentStore::new();
        for slot in [4, 1, 7] {
            store.add(e(slot), slot).unwrap();
        }
        let first: Vec<_> = store.entities().collect();
        let second: Vec<_> = store.entities().collect();
        assert_eq!(first, vec![e(4), e(1), e(7)]);
        assert_eq!(first, second);

        store.remove(e(4)).unwrap();
        let after: Vec<_> = store.entities().collect();
        assert_eq!(after, vec![e(7), e(1)]);
    }

    #[test]
    fn iter_mut_updates_in_place() {
        let mut store = ComponentStore::new();
        store.add(e(0), Pos { x: 0.0, y: 0.0 }).unwrap();
        store.add(e(1), Pos { x: 1.0, y: 1.0 }).unwrap();
        for (_, pos) in store.iter_mut() {
            pos.x += 10.0;
        }
        let xs: Vec<f32> = store.values().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![10.0, 11.0]);
    }

    #[test]
    fn slot_limit_rejects_out_of_range_handles_without_growing() {
        let mut store = ComponentStore::<u8>::new().with_slot_limit(64);
        let far = Entity::new(u32::MAX - 1, 1);
        assert_eq!(
            store.add(far, 1).unwrap_err(),
            EcsError::InvalidEntity { entity: far }
        );
        assert_eq!(
            store.add(e(64), 1).unwrap_err(),
            EcsError::InvalidEntity { entity: e(64) }
        );
        assert!(store.sparse.is_empty());
        assert_eq!(store.get(e(64)), Err(EcsError::InvalidEntity { entity: e(64) }));

        store.add(e(63), 2).unwrap();
        assert_eq!(*store.get(e(63)).unwrap(), 2);
        assert_eq!(store.slot_limit(), 64);
    }

    #[test]
    fn remove_slot_ignores_generation() {
        let mut store = ComponentStore::new();
        let old = Entity::new(3, 1);
        store.add(e(0), 'a').unwrap();
        store.add(old, 'b').unwrap();
        store.add(e(5), 'c').unwrap();

        assert_eq!(store.remove_slot(3), Some((old, 'b')));
        assert_eq!(store.remove_slot(3), None);
        assert_eq!(store.remove_slot(1000), None);

        // The slot is free for a newer generation now.
        store.add(Entity::new(3, 2), 'd').unwrap();
        assert_eq!(store.len(), 3);
        assert_consistent(&store);
    }

    #[test]
    fn clear_resets_mappings() {
        let mut store = ComponentStore::with_capacity(8);
        store.add(e(1), 1).unwrap();
        store.add(e(2), 2).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert!(!store.has(e(1)));
        store.add(e(2), 3).unwrap();
        assert_consistent(&store);
    }
}
