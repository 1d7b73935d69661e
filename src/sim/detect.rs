//! Per-tick collision detection
//!
//! One function per pairing. Each returns the full list of currently
//! colliding pairs as fresh transient values; nothing here mutates the
//! world except [`purge_escaped_projectiles`], which drops projectiles
//! that left the map instead of reporting them.

use glam::{DVec2, IVec2};

use super::collision::Collision;
use super::map::Map;
use super::state::World;
use crate::geometry::{is_null, Circle, Line};

/// The set of grid cells a bounding circle currently overlaps
///
/// The circle's home cell is always occupied. A cardinal neighbour is
/// occupied when the circle's chord across the shared border line overlaps
/// the border segment with positive length; a diagonal neighbour when the
/// circle covers the shared corner. Either way, a cell touched only at an
/// exact corner point is not occupied.
pub fn occupied_cells(map: &Map, center: DVec2, radius: f64) -> Vec<IVec2> {
    let home = map.cell_at(center);
    let min = Map::cell_min(home);
    let max = Map::cell_max(home);
    let circle = Circle { center, radius };
    let mut cells = vec![home];

    let vertical_borders = [
        (min.x, IVec2::new(home.x - 1, home.y)),
        (max.x, IVec2::new(home.x + 1, home.y)),
    ];
    for (x, neighbour) in vertical_borders {
        let border = Line { point: DVec2::new(x, min.y), direction: DVec2::Y };
        let points = border.intersection_with_circle(&circle).unwrap_or_default();
        if let [a, b] = points[..] {
            let (lo, hi) = (a.y.min(b.y), a.y.max(b.y));
            if lo.max(min.y) < hi.min(max.y) {
                cells.push(neighbour);
            }
        }
    }

    let horizontal_borders = [
        (min.y, IVec2::new(home.x, home.y - 1)),
        (max.y, IVec2::new(home.x, home.y + 1)),
    ];
    for (y, neighbour) in horizontal_borders {
        let border = Line { point: DVec2::new(min.x, y), direction: DVec2::X };
        let points = border.intersection_with_circle(&circle).unwrap_or_default();
        if let [a, b] = points[..] {
            let (lo, hi) = (a.x.min(b.x), a.x.max(b.x));
            if lo.max(min.x) < hi.min(max.x) {
                cells.push(neighbour);
            }
        }
    }

    let corners = [
        (min, IVec2::new(home.x - 1, home.y - 1)),
        (DVec2::new(max.x, min.y), IVec2::new(home.x + 1, home.y - 1)),
        (DVec2::new(min.x, max.y), IVec2::new(home.x - 1, home.y + 1)),
        (max, IVec2::new(home.x + 1, home.y + 1)),
    ];
    for (corner, neighbour) in corners {
        if center.distance(corner) < radius {
            cells.push(neighbour);
        }
    }

    cells
}

/// All unordered bot pairs whose center distance undercuts the sum of
/// their bounding radii
pub fn detect_bot_bot_collisions(world: &World) -> Vec<Collision> {
    let mut collisions = Vec::new();
    for (i, a) in world.bots.iter().enumerate() {
        if a.is_dead() {
            continue;
        }
        for b in &world.bots[i + 1..] {
            if b.is_dead() {
                continue;
            }
            if a.location().distance(b.location()) < a.bounding_radius + b.bounding_radius {
                collisions.push(Collision::BotBot { first: a.id, second: b.id });
            }
        }
    }
    collisions
}

/// One collision per bot per overlapped non-free cell
///
/// The bot's location at detection time rides along in the collision: a
/// single bot may overlap several cells at once, and each needs its own
/// independent resolution.
pub fn detect_bot_wall_collisions(world: &World) -> Vec<Collision> {
    let mut collisions = Vec::new();
    for bot in world.bots.iter().filter(|b| !b.is_dead()) {
        for cell in occupied_cells(&world.map, bot.location(), bot.bounding_radius) {
            if !world.map.is_free(cell) {
                collisions.push(Collision::BotWall {
                    bot: bot.id,
                    cell,
                    detected_at: bot.location(),
                });
            }
        }
    }
    collisions
}

/// Bots occupying the owning cell of an active item
pub fn detect_bot_item_collisions(world: &World) -> Vec<Collision> {
    let mut collisions = Vec::new();
    for bot in world.bots.iter().filter(|b| !b.is_dead()) {
        let cells = occupied_cells(&world.map, bot.location(), bot.bounding_radius);
        for item in world.items.iter().filter(|i| i.is_active()) {
            if cells.contains(&item.cell) {
                collisions.push(Collision::BotItem { bot: bot.id, item: item.id });
            }
        }
    }
    collisions
}

/// Projectiles overlapping a blocked cell
///
/// The same cell-occupancy test as bot-wall, but coarser in consequence:
/// no touching-point precision is needed because the projectile is spent
/// on impact rather than repositioned.
pub fn detect_projectile_wall_collisions(world: &World) -> Vec<Collision> {
    let mut collisions = Vec::new();
    for projectile in world.projectiles.iter().filter(|p| p.is_alive()) {
        for cell in occupied_cells(&world.map, projectile.location(), projectile.bounding_radius) {
            if !world.map.is_free(cell) {
                collisions.push(Collision::ProjectileWall { projectile: projectile.id, cell });
            }
        }
    }
    collisions
}

/// Drop projectiles that left the map entirely; never reported as
/// collisions
pub fn purge_escaped_projectiles(world: &mut World) {
    let World { map, projectiles, .. } = world;
    projectiles.retain(|p| {
        let inside = map.contains_point(p.location());
        if !inside {
            log::debug!("projectile {} left the map", p.id);
        }
        inside
    });
}

/// At most one hit per projectile: the nearest bot on its path this tick
///
/// Considers only bots strictly ahead of the projectile's prior position,
/// takes each bot's nearest segment/circle intersection, and requires the
/// winner to be within the distance actually traveled and in clear line of
/// sight from the prior position.
pub fn detect_bot_projectile_collisions(world: &World) -> Vec<Collision> {
    let mut collisions = Vec::new();
    for projectile in world.projectiles.iter().filter(|p| p.is_alive()) {
        let start = projectile.previous_location();
        let travel = projectile.location() - start;
        if is_null(travel) {
            continue;
        }
        let traveled = travel.length();
        let heading = travel / traveled;
        let path = Line { point: start, direction: heading };

        let mut nearest: Option<(f64, u32)> = None;
        for bot in &world.bots {
            if bot.is_dead() || bot.id == projectile.shooter {
                continue;
            }
            if (bot.location() - start).dot(heading) <= 0.0 {
                continue;
            }
            let hits = path.intersection_with_circle(&bot.bounding_circle()).unwrap_or_default();
            let entry = hits
                .iter()
                .map(|p| (*p - start).dot(heading))
                .filter(|t| *t >= 0.0)
                .fold(f64::INFINITY, f64::min);
            if entry > traveled {
                continue;
            }
            if !world.map.line_of_sight(start, bot.location()) {
                continue;
            }
            if nearest.is_none_or(|(best, _)| entry < best) {
                nearest = Some((entry, bot.id));
            }
        }
        if let Some((_, bot)) = nearest {
            collisions.push(Collision::BotProjectile { bot, projectile: projectile.id });
        }
    }
    collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::ItemKind;

    fn open_world() -> World {
        World::new(Map::new(10, 10))
    }

    #[test]
    fn test_occupied_cells_single_cell() {
        let map = Map::new(10, 10);
        let cells = occupied_cells(&map, DVec2::new(5.5, 5.5), 0.3);
        assert_eq!(cells, vec![IVec2::new(5, 5)]);
    }

    #[test]
    fn test_occupied_cells_cardinal_neighbour() {
        let map = Map::new(10, 10);
        let cells = occupied_cells(&map, DVec2::new(5.1, 5.5), 0.3);
        assert!(cells.contains(&IVec2::new(5, 5)));
        assert!(cells.contains(&IVec2::new(4, 5)));
        assert_eq!(cells.len(), 2);
    }

    #[test]
    fn test_occupied_cells_diagonal_through_corner() {
        let map = Map::new(10, 10);
        // 0.2 from the corner (5,5) in both axes: corner distance ≈ 0.283
        let cells = occupied_cells(&map, DVec2::new(5.2, 5.2), 0.3);
        assert!(cells.contains(&IVec2::new(4, 4)));
        assert!(cells.contains(&IVec2::new(4, 5)));
        assert!(cells.contains(&IVec2::new(5, 4)));
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn test_occupied_cells_excludes_exact_corner_touch() {
        let map = Map::new(10, 10);
        // Tangent to the border line exactly at the corner (5,5): the
        // diagonal neighbour is touched at one point, not occupied.
        let cells = occupied_cells(&map, DVec2::new(5.4, 5.0), 0.4);
        assert!(!cells.contains(&IVec2::new(4, 4)));
        assert!(!cells.contains(&IVec2::new(4, 5)));
    }

    #[test]
    fn test_bot_bot_detection_is_strict() {
        let mut world = open_world();
        let a = world.spawn_bot(DVec2::new(5.0, 5.0), 0.25);
        // Exactly touching: distance == sum of radii, no collision
        world.spawn_bot(DVec2::new(5.5, 5.0), 0.25);
        assert!(detect_bot_bot_collisions(&world).is_empty());

        // Nudge inside: collision
        world.bot_mut(a).unwrap().set_location(DVec2::new(5.0625, 5.0));
        let collisions = detect_bot_bot_collisions(&world);
        assert_eq!(collisions.len(), 1);
    }

    #[test]
    fn test_bot_wall_detection_reports_each_cell() {
        let mut world = World::new(Map::from_rows(&[
            "##########",
            "#........#",
            "#........#",
            "##########",
        ]));
        // Bot overlapping both the left wall and the bottom wall
        world.spawn_bot(DVec2::new(1.2, 1.2), 0.3);
        let collisions = detect_bot_wall_collisions(&world);
        let cells: Vec<IVec2> = collisions
            .iter()
            .map(|c| match c {
                Collision::BotWall { cell, .. } => *cell,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert!(cells.contains(&IVec2::new(0, 1)));
        assert!(cells.contains(&IVec2::new(1, 0)));
    }

    #[test]
    fn test_bot_item_requires_occupancy_and_active() {
        let mut world = open_world();
        let bot = world.spawn_bot(DVec2::new(5.5, 5.5), 0.3);
        let item = world.spawn_item(ItemKind::Health { amount: 25 }, IVec2::new(5, 5));
        assert_eq!(detect_bot_item_collisions(&world).len(), 1);

        world.item_mut(item).unwrap().deactivate();
        assert!(detect_bot_item_collisions(&world).is_empty());

        world.item_mut(item).unwrap().activate();
        world.bot_mut(bot).unwrap().set_location(DVec2::new(7.5, 7.5));
        assert!(detect_bot_item_collisions(&world).is_empty());
    }

    #[test]
    fn test_projectile_nearest_bot_wins() {
        let mut world = open_world();
        let shooter = world.spawn_bot(DVec2::new(2.0, 5.0), 0.3);
        let near = world.spawn_bot(DVec2::new(5.0, 5.0), 0.3);
        world.spawn_bot(DVec2::new(6.0, 5.0), 0.3);

        let id = world.spawn_projectile(shooter, DVec2::new(4.0, 5.0), DVec2::X, 20);
        world.projectile_mut(id).unwrap().set_location(DVec2::new(7.0, 5.0));

        let collisions = detect_bot_projectile_collisions(&world);
        assert_eq!(collisions, vec![Collision::BotProjectile { bot: near, projectile: id }]);
    }

    #[test]
    fn test_projectile_ignores_bots_behind() {
        let mut world = open_world();
        let shooter = world.spawn_bot(DVec2::new(9.0, 5.0), 0.3);
        world.spawn_bot(DVec2::new(3.0, 5.0), 0.3);

        // Heading away from the only other bot
        let id = world.spawn_projectile(shooter, DVec2::new(5.0, 5.0), DVec2::X, 20);
        world.projectile_mut(id).unwrap().set_location(DVec2::new(8.0, 5.0));
        assert!(detect_bot_projectile_collisions(&world).is_empty());
    }

    #[test]
    fn test_projectile_respects_travel_distance() {
        let mut world = open_world();
        let shooter = world.spawn_bot(DVec2::new(1.0, 5.0), 0.3);
        world.spawn_bot(DVec2::new(8.0, 5.0), 0.3);

        // Target is ahead but well beyond this tick's travel
        let id = world.spawn_projectile(shooter, DVec2::new(2.0, 5.0), DVec2::X, 20);
        world.projectile_mut(id).unwrap().set_location(DVec2::new(3.0, 5.0));
        assert!(detect_bot_projectile_collisions(&world).is_empty());
    }

    #[test]
    fn test_projectile_blocked_line_of_sight() {
        let mut world = World::new(Map::from_rows(&[
            "..........",
            "....#.....",
            "..........",
        ]));
        let shooter = world.spawn_bot(DVec2::new(1.5, 1.5), 0.3);
        world.spawn_bot(DVec2::new(7.5, 1.5), 0.3);

        let id = world.spawn_projectile(shooter, DVec2::new(2.0, 1.5), DVec2::X, 20);
        world.projectile_mut(id).unwrap().set_location(DVec2::new(7.5, 1.5));
        assert!(detect_bot_projectile_collisions(&world).is_empty());
    }

    #[test]
    fn test_projectile_never_hits_its_shooter() {
        let mut world = open_world();
        let shooter = world.spawn_bot(DVec2::new(5.0, 5.0), 0.3);

        // Fired from inside the shooter's own bounding circle
        let id = world.spawn_projectile(shooter, DVec2::new(5.0, 5.0), DVec2::X, 20);
        world.projectile_mut(id).unwrap().set_location(DVec2::new(5.4, 5.0));
        assert!(detect_bot_projectile_collisions(&world).is_empty());
    }

    #[test]
    fn test_escaped_projectiles_are_purged() {
        let mut world = open_world();
        let shooter = world.spawn_bot(DVec2::new(5.0, 5.0), 0.3);
        let id = world.spawn_projectile(shooter, DVec2::new(9.5, 5.0), DVec2::X, 20);
        world.projectile_mut(id).unwrap().set_location(DVec2::new(11.0, 5.0));

        purge_escaped_projectiles(&mut world);
        assert!(world.projectiles.is_empty());
    }
}
