//! The [`World`] is the composition root of the simulation. It owns the
//! entity allocator, one [`ComponentStore`] per component type, the
//! [`EventBus`] and the RNG streams.
//!
//! The component set is closed: [`ComponentStores`] has one named field per
//! type, and the [`Component`] trait maps each type to its field at compile
//! time. Systems that need several stores at once borrow them as disjoint
//! fields through [`World::stores_mut`].

use ledge_ecs::entity::{Entity, EntityAllocator};
use ledge_ecs::store::ComponentStore;
use ledge_ecs::EcsError;

use crate::components::*;
use crate::config::EngineConfig;
use crate::events::EventBus;
use crate::rng::RngStreams;

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A type with a dedicated store in [`ComponentStores`].
pub trait Component: Sized + 'static {
    /// Store field name, reported in component add/remove logs.
    const NAME: &'static str;

    fn store(stores: &ComponentStores) -> &ComponentStore<Self>;
    fn store_mut(stores: &mut ComponentStores) -> &mut ComponentStore<Self>;
}

macro_rules! component_stores {
    ($( $field:ident : $ty:ty = $capacity:expr ),* $(,)?) => {
        /// One dense store per component type.
        #[derive(Debug)]
        pub struct ComponentStores {
            $( pub $field: ComponentStore<$ty>, )*
        }

        impl ComponentStores {
            /// Stores pre-sized for a typical stage.
            pub fn new() -> Self {
                Self {
                    $( $field: ComponentStore::with_capacity($capacity), )*
                }
            }

            /// Stores that reject slots at or past `max_entities`.
            pub fn with_entity_capacity(max_entities: u32) -> Self {
                Self {
                    $(
                        $field: ComponentStore::with_capacity($capacity)
                            .with_slot_limit(max_entities),
                    )*
                }
            }

            /// Drop whatever occupies `slot` in every store, under any
            /// generation. Returns how many values were removed.
            fn purge_slot(&mut self, slot: u32) -> usize {
                let mut purged = 0;
                $(
                    if let Some((owner, _)) = self.$field.remove_slot(slot) {
                        tracing::warn!(
                            %owner,
                            component = stringify!($field),
                            "purged orphaned component from reused slot"
                        );
                        purged += 1;
                    }
                )*
                purged
            }

            /// Drop every value `entity` holds. Returns how many were removed.
            fn remove_all(&mut self, entity: Entity) -> usize {
                let mut removed = 0;
                $(
                    if self.$field.remove_if_present(entity).is_some() {
                        removed += 1;
                    }
                )*
                removed
            }

            /// Number of component values across all stores.
            pub fn total_len(&self) -> usize {
                0 $( + self.$field.len() )*
            }

            /// Names of the stores holding a value for `entity`.
            pub fn components_of(&self, entity: Entity) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(
                    if self.$field.has(entity) {
                        names.push(stringify!($field));
                    }
                )*
                names
            }
        }

        impl Default for ComponentStores {
            fn default() -> Self {
                Self::new()
            }
        }

        $(
            impl Component for $ty {
                const NAME: &'static str = stringify!($field);

                fn store(stores: &ComponentStores) -> &ComponentStore<Self> {
                    &stores.$field
                }

                fn store_mut(stores: &mut ComponentStores) -> &mut ComponentStore<Self> {
                    &mut stores.$field
                }
            }
        )*
    };
}

component_stores! {
    positions: Position = 256,
    velocities: Velocity = 256,
    colliders: Collider = 256,
    player_controllers: PlayerController = 16,
    ground_states: GroundState = 256,
    renderables: Renderable = 256,
    team_ups: TeamUp = 16,
    animations: Animation = 64,
    moving_platforms: MovingPlatform = 32,
    platform_riders: PlatformRider = 32,
    enemies: Enemy = 64,
    healths: Health = 128,
    invulnerabilities: Invulnerability = 128,
    water_volumes: WaterVolume = 16,
    swimmings: Swimming = 32,
    currencies: Currency = 16,
    xp_collectibles: XpCollectible = 256,
    xp_drops: XpDrop = 32,
    flags: Flag = 16,
    flows: Flow = 16,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Entities, their components, the event bus and the RNG streams.
pub struct World {
    entities: EntityAllocator,
    stores: ComponentStores,
    events: EventBus,
    rng: RngStreams,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entity_count", &self.entities.alive_count())
            .field("capacity", &self.entities.capacity())
            .field("component_count", &self.stores.total_len())
            .field("pending_events", &self.events.total_pending())
            .finish()
    }
}

impl World {
    /// A world with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// A world sized and seeded from `config`.
    ///
    /// # Panics
    ///
    /// Panics if `config` has a zero entity capacity or an event capacity
    /// below 2; run [`EngineConfig::validate`] first for a typed error.
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            entities: EntityAllocator::new(config.max_entities),
            stores: ComponentStores::with_entity_capacity(config.max_entities),
            events: EventBus::with_capacity(config.event_capacity),
            rng: RngStreams::new(config.seed),
        }
    }

    // -- entity lifecycle ---------------------------------------------------

    /// Allocate a new entity with no components.
    pub fn create_entity(&mut self) -> Result<Entity, EcsError> {
        match self.entities.allocate() {
            Ok(entity) => {
                // A stale handle written through `store_mut`/`stores_mut`
                // can leave a value behind in a freed slot.
                self.stores.purge_slot(entity.slot());
                tracing::debug!(%entity, "entity created");
                Ok(entity)
            }
            Err(err) => {
                tracing::warn!(capacity = self.entities.capacity(), "entity capacity exhausted");
                Err(err)
            }
        }
    }

    /// Destroy an entity and every component it holds.
    ///
    /// The slot's generation is bumped, so all copies of `entity` become
    /// stale. Returns `false` without doing anything if `entity` is invalid,
    /// out of range or already destroyed.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }
        let removed = self.stores.remove_all(entity);
        self.entities.deallocate(entity);
        tracing::debug!(%entity, components = removed, "entity destroyed");
        true
    }

    /// `true` if `entity` is live and not stale.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// Maximum number of simultaneously live entities.
    pub fn entity_capacity(&self) -> u32 {
        self.entities.capacity()
    }

    // -- component access ---------------------------------------------------

    /// Attach a component to a live entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] or [`EcsError::StaleEntity`] if the entity
    /// is not live, [`EcsError::DuplicateComponent`] if it already has one.
    pub fn add<T: Component>(&mut self, entity: Entity, value: T) -> Result<&mut T, EcsError> {
        self.entities.validate(entity)?;
        tracing::trace!(%entity, component = T::NAME, "component added");
        T::store_mut(&mut self.stores).add(entity, value)
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        self.entities.validate(entity)?;
        T::store(&self.stores).get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        self.entities.validate(entity)?;
        T::store_mut(&mut self.stores).get_mut(entity)
    }

    /// `true` if `entity` is live and has a `T`.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity) && T::store(&self.stores).has(entity)
    }

    /// Detach and return a component.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Result<T, EcsError> {
        self.entities.validate(entity)?;
        let value = T::store_mut(&mut self.stores).remove(entity)?;
        tracing::trace!(%entity, component = T::NAME, "component removed");
        Ok(value)
    }

    /// The store for `T`.
    pub fn store<T: Component>(&self) -> &ComponentStore<T> {
        T::store(&self.stores)
    }

    /// Mutable store for `T`.
    ///
    /// Writes through the store skip the liveness check done by
    /// [`World::add`]. A value written under a destroyed handle is dropped
    /// when its slot is next reused.
    pub fn store_mut<T: Component>(&mut self) -> &mut ComponentStore<T> {
        T::store_mut(&mut self.stores)
    }

    /// All stores, for reading several at once.
    pub fn stores(&self) -> &ComponentStores {
        &self.stores
    }

    /// All stores as disjoint fields, for systems that read one store while
    /// writing another.
    pub fn stores_mut(&mut self) -> &mut ComponentStores {
        &mut self.stores
    }

    // -- events and randomness ----------------------------------------------

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn rng(&self) -> &RngStreams {
        &self.rng
    }

    pub fn rng_mut(&mut self) -> &mut RngStreams {
        &mut self.rng
    }

    /// Split borrow of stores, events and RNG for systems that need all three.
    pub fn parts_mut(&mut self) -> (&mut ComponentStores, &mut EventBus, &mut RngStreams) {
        (&mut self.stores, &mut self.events, &mut self.rng)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
