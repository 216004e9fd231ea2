//! Headless run: two players bounce along the floor while coins rain down.
//!
//! Run with:
//!   cargo run --example headless_run -p ledge-engine [-- path/to/config.json]
//!
//! Set `RUST_LOG=ledge_engine=debug` to watch entities come and go.

use ledge_engine::prelude::*;

const FLOOR_Y: f32 = 200.0;
const RUN_SECONDS: u64 = 10;

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn jump_system(world: &mut World, _dt: f32) -> anyhow::Result<()> {
    let (stores, events, rng) = world.parts_mut();
    for (entity, ground) in stores.ground_states.iter() {
        if ground.is_grounded && rng.next_range(RngStream::Reward, 0, 30) == 0 {
            if let Ok(vel) = stores.velocities.get_mut(entity) {
                vel.y = -300.0;
                events.push(PlayerJumped {
                    entity,
                    velocity: vel.y,
                });
            }
        }
    }
    Ok(())
}

fn physics_system(world: &mut World, dt: f32) -> anyhow::Result<()> {
    let (stores, events, _) = world.parts_mut();
    for (entity, pos) in stores.positions.iter_mut() {
        let Ok(vel) = stores.velocities.get_mut(entity) else {
            continue;
        };
        if let Ok(ground) = stores.ground_states.get_mut(entity) {
            vel.y += 900.0 * dt;
            pos.x += vel.x * dt;
            pos.y += vel.y * dt;
            let landed = pos.y >= FLOOR_Y && !ground.is_grounded;
            ground.is_grounded = pos.y >= FLOOR_Y;
            if ground.is_grounded {
                pos.y = FLOOR_Y;
                vel.y = 0.0;
            }
            if landed {
                events.push(PlayerLanded {
                    entity,
                    position: Vec2::new(pos.x, pos.y),
                });
            }
        } else {
            pos.x += vel.x * dt;
            pos.y += vel.y * dt;
        }
    }
    Ok(())
}

fn flow_system(world: &mut World, _dt: f32) -> anyhow::Result<()> {
    let (stores, events, _) = world.parts_mut();
    while let Some(landed) = events.try_pop::<PlayerLanded>() {
        if let Ok(flow) = stores.flows.get_mut(landed.entity) {
            flow.apply(0.05);
            flow.combo += 1;
        }
    }
    Ok(())
}

fn coin_system(world: &mut World, _dt: f32) -> anyhow::Result<()> {
    if world.rng_mut().next_range(RngStream::WorldGen, 0, 20) == 0 {
        let x = world.rng_mut().next_f32(RngStream::Collectible) * 320.0;
        let coin = world.create_entity()?;
        world.add(coin, Position::new(x, 0.0))?;
        world.add(coin, Velocity::new(0.0, 60.0))?;
        world.add(coin, XpCollectible { value: 5, collected: false })?;
    }

    let fallen: Vec<Entity> = world
        .stores()
        .xp_collectibles
        .entities()
        .filter(|&e| world.get::<Position>(e).map_or(false, |p| p.y > FLOOR_Y))
        .collect();
    for coin in fallen {
        world.destroy_entity(coin);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    tracing::info!(?config, "starting headless run");

    let mut world = World::with_config(&config);
    for x in [16.0, 48.0] {
        let player = world.create_entity()?;
        world.add(player, Position::new(x, FLOOR_Y))?;
        world.add(player, Velocity::new(30.0, 0.0))?;
        world.add(player, GroundState::default())?;
        world.add(player, Flow::default())?;
    }

    let schedule = Schedule::builder()
        .with_system("jump", jump_system)
        .with_system("physics", physics_system)
        .with_system_after("flow", &["physics"], flow_system)
        .with_system("coins", coin_system)
        .build();

    let tick_rate = config.framerate_mode.tick_rate() as u64;
    let mut tick_loop = TickLoop::new(world, schedule, config);

    for second in 1..=RUN_SECONDS {
        tick_loop.run_ticks(tick_rate)?;
        let world = tick_loop.world();
        let diagnostics = tick_loop.last_diagnostics();
        tracing::info!(
            second,
            tick = tick_loop.tick_count(),
            entities = world.entity_count(),
            coins = world.store::<XpCollectible>().len(),
            tick_time_us = diagnostics.total_time.as_micros() as u64,
            "progress"
        );
    }

    for (player, flow) in tick_loop.world().stores().flows.iter() {
        tracing::info!(%player, flow = flow.flow, landings = flow.combo, "final flow");
    }
    Ok(())
}
