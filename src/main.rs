//! Grid Brawl headless demo
//!
//! Runs a seeded arena for a fixed number of ticks with random-walk bots
//! that occasionally shoot, then logs a summary. Steering here is
//! deliberately dumb; it exists to exercise the collision engine, not to
//! play well.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::cell::RefCell;
use std::rc::Rc;

use grid_brawl::config::SimConfig;
use grid_brawl::consts::*;
use grid_brawl::sim::{tick, ItemKind, Map, Resolver, World};

const TICKS: u64 = 3600;
const BOT_COUNT: usize = 4;

fn build_arena() -> Map {
    Map::from_rows(&[
        "################",
        "#..............#",
        "#..##......##..#",
        "#..##......##..#",
        "#......##......#",
        "#......##......#",
        "#..............#",
        "#..............#",
        "################",
    ])
}

fn main() {
    env_logger::init();

    let seed: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xB07_A12E4A);
    log::info!("Starting demo with seed {seed}");

    let config = SimConfig::load("grid-brawl.json");
    let map = build_arena();
    let mut world = World::with_config(map, config.clone());
    let mut rng = Pcg32::seed_from_u64(seed);

    // Spawn bots on free cells
    let mut bots = Vec::new();
    while bots.len() < BOT_COUNT {
        let cell = glam::IVec2::new(
            rng.random_range(0..world.map.width()),
            rng.random_range(0..world.map.height()),
        );
        if world.map.is_free(cell) {
            bots.push(world.spawn_bot(Map::cell_center(cell), config.bot_radius));
        }
    }

    // A few pickups
    for kind in [
        ItemKind::Health { amount: 25 },
        ItemKind::Health { amount: 25 },
        ItemKind::Ammo { rounds: 12 },
    ] {
        loop {
            let cell = glam::IVec2::new(
                rng.random_range(0..world.map.width()),
                rng.random_range(0..world.map.height()),
            );
            let taken = world.items.iter().any(|i| i.cell == cell);
            if world.map.is_free(cell) && !taken {
                world.spawn_item(kind, cell);
                break;
            }
        }
    }

    let mut resolver = Resolver::new();

    // Count wall/bot contacts the way external steering would
    let wall_hits = Rc::new(RefCell::new(0u64));
    let bot_hits = Rc::new(RefCell::new(0u64));
    for &id in &bots {
        let w = Rc::clone(&wall_hits);
        resolver.events.subscribe_wall(id, move |_| *w.borrow_mut() += 1);
        let b = Rc::clone(&bot_hits);
        resolver.events.subscribe_bot(id, move |_| *b.borrow_mut() += 1);
    }

    for tick_index in 0..TICKS {
        // Re-roll headings now and then; shoot rarely
        if tick_index % 30 == 0 {
            for bot in &mut world.bots {
                if bot.is_dead() {
                    continue;
                }
                let angle = rng.random_range(0.0..std::f64::consts::TAU);
                let speed = rng.random_range(1.0..3.0);
                bot.velocity = DVec2::from_angle(angle) * speed;
            }
        }
        if tick_index % 45 == 0 {
            let shooters: Vec<(u32, DVec2)> = world
                .bots
                .iter()
                .filter(|b| !b.is_dead() && b.ammo > 0)
                .map(|b| (b.id, b.location()))
                .collect();
            for (id, location) in shooters {
                let angle = rng.random_range(0.0..std::f64::consts::TAU);
                let direction = DVec2::from_angle(angle);
                world.spawn_projectile(id, location, direction * 12.0, 20);
                if let Some(bot) = world.bot_mut(id) {
                    bot.ammo -= 1;
                }
            }
        }

        tick(&mut world, &mut resolver, SIM_DT);
    }

    let alive = world.bots.iter().filter(|b| !b.is_dead()).count();
    let items_left = world.items.iter().filter(|i| i.is_active()).count();
    log::info!(
        "Done after {TICKS} ticks: {alive}/{BOT_COUNT} bots alive, \
         {items_left} items left, {} wall hits, {} bot hits",
        wall_hits.borrow(),
        bot_hits.borrow()
    );
}
