//! Headless DUSKVEIL simulation run
//!
//! Spawns a small scene and ticks the fixed-timestep loop without a
//! renderer, printing agent state transitions to stdout.

use std::time::Duration;

use bevy::time::TimeUpdateStrategy;
use bevy::prelude::*;

use duskveil_simulation::{
    create_headless_app, spawn_agent, Archetype, QuarryBundle, SpawnAgent,
};

fn main() {
    let seed = 42;
    println!("Starting DUSKVEIL headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_micros(
        16_667,
    )));

    app.world_mut().spawn(QuarryBundle::new(Vec3::new(6.0, 0.0, 0.0), 100));

    let mut commands = app.world_mut().commands();
    for (archetype, x) in [
        (Archetype::Aggressive, -8.0),
        (Archetype::Stalker, 0.0),
        (Archetype::Flee, 8.0),
    ] {
        let mut spawn = SpawnAgent {
            position: Vec3::new(x, 0.0, -10.0),
            waypoints: vec![Vec3::new(x, 0.0, -10.0), Vec3::new(x, 0.0, 10.0)],
            ..Default::default()
        };
        spawn.template.archetype = archetype;
        spawn_agent(&mut commands, spawn);
    }
    app.world_mut().flush();

    for tick in 0..1000 {
        app.update();

        if tick % 100 == 0 {
            let entity_count = app.world().entities().len();
            println!("Tick {}: {} entities", tick, entity_count);
        }
    }

    println!("Simulation complete!");
}
