//! Headless demo: one ship crossing an asteroid field to a drifting beacon
//!
//! Usage: `torus-nav-demo [snapshot.ron|snapshot.json] [config.ron]`

use std::env;
use std::process;

use torus_nav::nav::toroidal_distance;
use torus_nav::prelude::*;

/// Simulated ticks before giving up
const MAX_TICKS: u64 = 1800;
/// Seconds per tick
const DT: f32 = 1.0 / 30.0;
/// Speed limit applied when integrating the agent
const MAX_SPEED: f32 = 150.0;
/// Distance at which the target counts as reached
const CAPTURE_RADIUS: f32 = 15.0;

/// Built-in scenario used when no snapshot file is given
fn demo_snapshot() -> WorldSnapshot {
    let mut snapshot = WorldSnapshot::new(Vec2::new(1000.0, 1000.0), ObjectId(1));
    snapshot.add_object(WorldObject::new(
        1,
        ObjectKind::Ship { team: 0 },
        Vec2::new(120.0, 140.0),
        8.0,
    ));

    // A diagonal belt of rock between the ship and the beacon
    for i in 0..9u64 {
        let t = i as f32;
        snapshot.add_object(WorldObject::new(
            10 + i,
            ObjectKind::Asteroid { mineable: i % 3 == 0 },
            Vec2::new(300.0 + t * 55.0, 700.0 - t * 55.0),
            18.0,
        ));
    }

    snapshot.add_object(
        WorldObject::new(30, ObjectKind::Ship { team: 1 }, Vec2::new(500.0, 500.0), 10.0)
            .with_velocity(Vec2::new(0.0, 20.0)),
    );
    snapshot.add_object(WorldObject::new(
        40,
        ObjectKind::Base { team: 1 },
        Vec2::new(850.0, 200.0),
        20.0,
    ));
    snapshot.add_object(
        WorldObject::new(50, ObjectKind::Beacon, Vec2::new(880.0, 860.0), 5.0)
            .with_velocity(Vec2::new(-6.0, 4.0)),
    );
    snapshot
}

fn load_snapshot(path: Option<&String>) -> WorldSnapshot {
    let Some(path) = path else {
        log::info!("No snapshot given, using the built-in scenario");
        return demo_snapshot();
    };
    match WorldSnapshot::load(path) {
        Ok(snapshot) => {
            log::info!("Loaded snapshot {} ({} objects)", path, snapshot.objects.len());
            snapshot
        }
        Err(e) => {
            log::error!("Failed to load snapshot {}: {}", path, e);
            process::exit(1);
        }
    }
}

fn load_config(path: Option<&String>) -> NavConfig {
    let Some(path) = path else {
        return NavConfig::default();
    };
    match NavConfig::load_ron(path) {
        Ok(config) => {
            log::info!("Loaded config {}", path);
            config
        }
        Err(e) => {
            log::error!("Failed to load config {}: {}", path, e);
            process::exit(1);
        }
    }
}

/// Pick what to fly toward: the first beacon, or the far corner
fn current_target(snapshot: &WorldSnapshot) -> Target {
    snapshot
        .objects
        .iter()
        .find(|o| o.kind == ObjectKind::Beacon)
        .map_or(Target::Position(snapshot.arena * 0.9), Target::from_object)
}

fn run(mut snapshot: WorldSnapshot, config: NavConfig) {
    let agent_id = snapshot.agent_id;
    let mut nav = Navigator::new(agent_id, config);

    for _ in 0..MAX_TICKS {
        let target = current_target(&snapshot);
        let command = nav.tick(&snapshot, target);

        let Some(agent) = snapshot.object_mut(agent_id) else {
            log::error!("Agent {} is not in the snapshot", agent_id);
            return;
        };
        agent.velocity = (agent.velocity + command.acceleration() * DT).clamp_length_max(MAX_SPEED);
        snapshot.advance(DT);

        let Some(agent) = snapshot.agent() else {
            return;
        };
        let remaining = toroidal_distance(agent.position, target.position(), snapshot.arena);
        if snapshot.tick % 60 == 0 {
            log::info!(
                "Tick {}: agent at ({:.0}, {:.0}), {:.0} from target, {:?}",
                snapshot.tick,
                agent.position.x,
                agent.position.y,
                remaining,
                nav.follower().state()
            );
        }
        if remaining <= CAPTURE_RADIUS {
            log::info!("Target reached at tick {}", snapshot.tick);
            break;
        }
    }

    if let Some(route) = nav.last_route() {
        log::info!("Last route: {}", route.describe());
    }
    log::info!("{}", nav.stats().format_stats());
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let snapshot = load_snapshot(args.first());
    let config = load_config(args.get(1));

    run(snapshot, config);
}
