//! Quarry Runtime
//!
//! Minimal binary that boots the core and runs a short headless
//! simulation: a movement pass over position/velocity entities among
//! static block anchors, with a mid-run entity destruction to exercise
//! the scene-layer sweep.

use anyhow::Result;
use glam::Vec2;
use tracing::info;

use quarry_core::ecs::{ComponentRegistry, EntityAllocator, View};
use quarry_core::time::{FrameClock, TICK_DURATION, TICK_RATE_HZ};

#[derive(Debug, Clone, Copy)]
struct Position(Vec2);

#[derive(Debug, Clone, Copy)]
struct Velocity(Vec2);

#[derive(Debug, Clone, Copy)]
struct BlockAnchor {
    x: i32,
    y: i32,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Quarry Engine v{}", quarry_core::VERSION);
    let settings = quarry_services::settings::Settings::default();
    info!(
        width = settings.window.width,
        height = settings.window.height,
        fullscreen = settings.window.fullscreen,
        "settings loaded"
    );

    let mut allocator = EntityAllocator::new();
    let mut registry = ComponentRegistry::new();

    // A few movers and a row of static terrain blocks.
    let mut movers = Vec::new();
    for i in 0..4 {
        let entity = allocator.acquire();
        registry.add(entity, Position(Vec2::new(i as f32 * 2.0, 0.0)));
        registry.add(entity, Velocity(Vec2::new(1.0, 0.5 * i as f32)));
        movers.push(entity);
    }
    for x in 0..16 {
        let entity = allocator.acquire();
        registry.add(entity, Position(Vec2::new(x as f32, -1.0)));
        registry.add(entity, BlockAnchor { x, y: -1 });
    }
    info!(
        entities = allocator.count(),
        component_types = registry.type_count(),
        "world populated"
    );

    let dt = TICK_DURATION.as_secs_f32();
    let mut clock = FrameClock::new();
    for _ in 0..TICK_RATE_HZ {
        // Views are built at the start of the pass; structural changes made
        // during the tick only become visible to next tick's views.
        let moving = View::<(Position, Velocity)>::new(&registry);
        moving.for_each_mut(&mut registry, |_, (pos, vel): (&mut Position, &mut Velocity)| {
            pos.0 += vel.0 * dt;
        });
        clock.advance();

        // Halfway through, one mover falls out of the world.
        if clock.ticks() == u64::from(TICK_RATE_HZ / 2) {
            if let Some(entity) = movers.pop() {
                registry.remove_entity(entity);
                allocator.release(entity)?;
                info!(entity, "destroyed mover");
            }
        }
    }

    let moving = View::<(Position, Velocity)>::new(&registry);
    moving.for_each(&registry, |entity, (pos, _)| {
        info!(entity, x = pos.0.x, y = pos.0.y, "final position");
    });

    let blocks = View::<(BlockAnchor,)>::new(&registry);
    info!(
        ticks = clock.ticks(),
        movers = moving.len(),
        blocks = blocks.len(),
        live_entities = allocator.count(),
        "simulation finished"
    );
    Ok(())
}
