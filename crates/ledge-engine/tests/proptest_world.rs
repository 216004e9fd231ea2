//! Property tests for world-level entity lifecycle.
//!
//! A random mix of creates, destroys, adds and removes is replayed against a
//! model; every handle ever issued is then checked so that destroyed handles
//! never observe a later occupant of their slot.

use std::collections::HashMap;

use ledge_engine::prelude::*;
use proptest::prelude::*;

const CAPACITY: u32 = 16;

#[derive(Debug, Clone)]
enum WorldOp {
    Create,
    /// Index into every handle issued so far (live or not).
    Destroy(usize),
    AddHealth(usize, i32),
    RemoveHealth(usize),
    AddPosition(usize),
}

fn world_op_strategy() -> impl Strategy<Value = WorldOp> {
    prop_oneof![
        3 => Just(WorldOp::Create),
        2 => any::<usize>().prop_map(WorldOp::Destroy),
        2 => (any::<usize>(), 1..100i32).prop_map(|(i, hp)| WorldOp::AddHealth(i, hp)),
        1 => any::<usize>().prop_map(WorldOp::RemoveHealth),
        1 => any::<usize>().prop_map(WorldOp::AddPosition),
    ]
}

fn small_world() -> World {
    World::with_config(&EngineConfig {
        max_entities: CAPACITY,
        ..Default::default()
    })
}

#[derive(Debug, Default)]
struct Model {
    /// Live handle -> health, if any.
    live: HashMap<Entity, Option<i32>>,
    positions: usize,
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1_000))]

    #[test]
    fn world_matches_model(ops in prop::collection::vec(world_op_strategy(), 1..200)) {
        let mut world = small_world();
        let mut model = Model::default();
        let mut issued: Vec<Entity> = Vec::new();

        for op in ops {
            match op {
                WorldOp::Create => match world.create_entity() {
                    Ok(e) => {
                        prop_assert!(model.live.len() < CAPACITY as usize);
                        prop_assert!(!issued.contains(&e), "handle {e} issued twice");
                        issued.push(e);
                        model.live.insert(e, None);
                    }
                    Err(err) => {
                        prop_assert_eq!(model.live.len(), CAPACITY as usize);
                        prop_assert_eq!(err, EcsError::CapacityExceeded { capacity: CAPACITY });
                    }
                },
                WorldOp::Destroy(i) if !issued.is_empty() => {
                    let e = issued[i % issued.len()];
                    let was_live = model.live.remove(&e).is_some();
                    if was_live && world.has::<Position>(e) {
                        model.positions -= 1;
                    }
                    prop_assert_eq!(world.destroy_entity(e), was_live);
                }
                WorldOp::AddHealth(i, hp) if !issued.is_empty() => {
                    let e = issued[i % issued.len()];
                    let result = world.add(e, Health::new(hp)).map(|h| h.current);
                    match model.live.get_mut(&e) {
                        None => {
                            let is_stale = matches!(result, Err(EcsError::StaleEntity { .. }));
                            prop_assert!(is_stale);
                        }
                        Some(health) if health.is_some() => {
                            let is_duplicate =
                                matches!(result, Err(EcsError::DuplicateComponent { .. }));
                            prop_assert!(is_duplicate);
                        }
                        Some(health) => {
                            prop_assert_eq!(result, Ok(hp));
                            *health = Some(hp);
                        }
                    }
                }
                WorldOp::RemoveHealth(i) if !issued.is_empty() => {
                    let e = issued[i % issued.len()];
                    let result = world.remove::<Health>(e).map(|h| h.current);
                    match model.live.get_mut(&e) {
                        None => {
                            let is_stale = matches!(result, Err(EcsError::StaleEntity { .. }));
                            prop_assert!(is_stale);
                        }
                        Some(health) => match health.take() {
                            Some(expected) => prop_assert_eq!(result, Ok(expected)),
                            None => {
                                let is_missing =
                                    matches!(result, Err(EcsError::MissingComponent { .. }));
                                prop_assert!(is_missing);
                            }
                        },
                    }
                }
                WorldOp::AddPosition(i) if !issued.is_empty() => {
                    let e = issued[i % issued.len()];
                    if world.add(e, Position::new(i as f32, 0.0)).is_ok() {
                        model.positions += 1;
                    }
                }
                _ => {}
            }

            prop_assert_eq!(world.entity_count(), model.live.len());
            prop_assert_eq!(world.store::<Health>().len(), model.live.values().flatten().count());
            prop_assert_eq!(world.store::<Position>().len(), model.positions);
        }

        // Every issued handle: live ones see their own data, dead ones see
        // nothing, even if their slot now holds a newer entity.
        for &e in &issued {
            match model.live.get(&e) {
                Some(hp) => {
                    prop_assert!(world.is_alive(e));
                    prop_assert_eq!(world.get::<Health>(e).ok().map(|h| h.current), *hp);
                }
                None => {
                    prop_assert!(!world.is_alive(e));
                    prop_assert!(!world.has::<Health>(e));
                    prop_assert!(!world.has::<Position>(e));
                    let is_stale = matches!(world.get::<Health>(e), Err(EcsError::StaleEntity { .. }));
                    prop_assert!(is_stale, "stale handle {} must not read its slot", e);
                }
            }
        }
    }
}

#[test]
fn capacity_is_a_ceiling_on_live_entities_not_on_creations() {
    let mut world = small_world();
    for round in 0..10 {
        let batch: Vec<Entity> = (0..CAPACITY)
            .map(|_| world.create_entity().unwrap())
            .collect();
        assert!(world.create_entity().is_err(), "round {round}");
        for e in batch {
            world.destroy_entity(e);
        }
        assert_eq!(world.entity_count(), 0);
    }
}
