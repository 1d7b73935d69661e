//! The five collision pairings and their resolutions
//!
//! A collision is a transient value: two participants plus
//! pairing-specific context, produced by detection and discarded after a
//! single `handle` call. The set of pairings is closed, so one enum with
//! exhaustive matching replaces open-ended dispatch.
//!
//! Within a phase the ordering of same-type collisions is unspecified, and
//! two collisions routinely name the same participant (two bots on one
//! item, two projectiles on one bot). Every handler therefore re-checks
//! the situation it was detected for and no-ops when an earlier handler
//! already resolved it.

use glam::{DVec2, IVec2};

use super::detect::occupied_cells;
use super::events::{CollisionEvent, Contact};
use super::map::Map;
use super::state::World;
use crate::error::SimError;
use crate::geometry::{is_null, Circle};

/// One detected contact, alive for a single detect→handle cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collision {
    /// Two overlapping bots
    BotBot { first: u32, second: u32 },
    /// A bot overlapping one blocked cell. The location at detection time
    /// rides along because one bot may overlap several cells at once, each
    /// resolved independently.
    BotWall { bot: u32, cell: IVec2, detected_at: DVec2 },
    /// A bot occupying the owning cell of an active item
    BotItem { bot: u32, item: u32 },
    /// A projectile whose path crossed a bot's bounding circle this tick
    BotProjectile { bot: u32, projectile: u32 },
    /// A projectile overlapping a blocked cell
    ProjectileWall { projectile: u32, cell: IVec2 },
}

impl Collision {
    /// Whether the situation this collision was detected for still exists
    ///
    /// Handlers for a pairing run in unspecified order, so a collision may
    /// describe a situation an earlier handler already fixed.
    pub fn is_relevant(&self, world: &World) -> bool {
        match *self {
            Collision::BotBot { first, second } => {
                match (world.bot(first), world.bot(second)) {
                    (Some(a), Some(b)) => {
                        a.location().distance(b.location())
                            < a.bounding_radius + b.bounding_radius
                    }
                    _ => false,
                }
            }
            Collision::BotWall { bot, cell, detected_at } => match world.bot(bot) {
                Some(b) => {
                    b.location() == detected_at
                        || occupied_cells(&world.map, b.location(), b.bounding_radius)
                            .contains(&cell)
                }
                None => false,
            },
            Collision::BotItem { bot, item } => {
                world.bot(bot).is_some()
                    && world.item(item).is_some_and(|i| i.is_active())
            }
            Collision::BotProjectile { bot, projectile } => {
                world.bot(bot).is_some_and(|b| !b.is_dead())
                    && world.projectile(projectile).is_some_and(|p| p.is_alive())
            }
            Collision::ProjectileWall { projectile, .. } => {
                world.projectile(projectile).is_some_and(|p| p.is_alive())
            }
        }
    }

    /// Resolve this contact by mutating entity state
    ///
    /// Idempotent: a no-op when the collision is no longer relevant.
    pub fn handle(&self, world: &mut World) {
        if !self.is_relevant(world) {
            return;
        }
        match *self {
            Collision::BotBot { first, second } => handle_bot_bot(world, first, second),
            Collision::BotWall { bot, cell, .. } => handle_bot_wall(world, bot, cell),
            Collision::BotItem { bot, item } => handle_bot_item(world, bot, item),
            Collision::BotProjectile { bot, projectile } => {
                handle_bot_projectile(world, bot, projectile);
            }
            Collision::ProjectileWall { projectile, cell } => {
                handle_projectile_wall(world, projectile, cell);
            }
        }
    }
}

/// Push both bots apart by half the overlap each, along the
/// center-to-center axis
fn handle_bot_bot(world: &mut World, first: u32, second: u32) {
    let Some((a, b)) = world.bot_pair_mut(first, second) else { return };

    let delta = a.location() - b.location();
    let distance = delta.length();
    let overlap = a.bounding_radius + b.bounding_radius - distance;
    if overlap <= 0.0 {
        return;
    }
    // Exactly coincident centers leave no separation axis; fall back to x
    let axis = if is_null(delta) { DVec2::X } else { delta / distance };

    let half = overlap / 2.0;
    let a_target = a.location() + axis * half;
    let b_target = b.location() - axis * half;

    // Roll back before the corrected write so the rollback point stays the
    // pre-move location, not the penetrating one.
    a.restore_location();
    b.restore_location();
    a.set_location(a_target);
    b.set_location(b_target);

    world
        .pending_events
        .push(CollisionEvent { bot: first, contact: Contact::Bot { other: second } });
    world
        .pending_events
        .push(CollisionEvent { bot: second, contact: Contact::Bot { other: first } });
}

/// Walk the bot back to where its bounding circle first touched the cell
fn handle_bot_wall(world: &mut World, bot_id: u32, cell: IVec2) {
    let World { bots, pending_events, config, .. } = world;
    let Some(bot) = bots.iter_mut().find(|b| b.id == bot_id) else { return };

    let start = bot.previous_location();
    let travel = bot.location() - start;
    if is_null(travel) {
        let err = SimError::InconsistentState(format!(
            "bot {bot_id} rests inside blocked cell ({}, {}) without having moved",
            cell.x, cell.y
        ));
        log::error!("{err}, skipping cell");
        return;
    }

    let min = Map::cell_min(cell);
    let max = Map::cell_max(cell);
    #[cfg(debug_assertions)]
    {
        // The rollback point must be clear of the cell, or the traveled
        // segment has no touching point to find.
        let closest = start.clamp(min, max);
        debug_assert!(
            closest.distance(start) >= bot.bounding_radius - 1e-12,
            "bot {bot_id} already penetrated cell ({}, {}) before moving",
            cell.x,
            cell.y
        );
    }

    let circle = Circle { center: start, radius: bot.bounding_radius };
    match circle.first_tangency_with_cell(travel, min, max) {
        Some(touch) => {
            // A hair further back along the travel direction, so the
            // corrected position stays clear under f64 rounding.
            let corrected = touch - travel.normalize() * config.wall_back_off;
            bot.restore_location();
            bot.set_location(corrected);
            pending_events.push(CollisionEvent { bot: bot_id, contact: Contact::Wall { cell } });
        }
        None => {
            let err = SimError::InconsistentState(format!(
                "no touching point along travel of bot {bot_id} into cell ({}, {})",
                cell.x, cell.y
            ));
            log::error!("{err}, skipping cell");
        }
    }
}

/// Hand the item's effect to the bot and spend the item
fn handle_bot_item(world: &mut World, bot_id: u32, item_id: u32) {
    let World { bots, items, .. } = world;
    let Some(item) = items.iter_mut().find(|i| i.id == item_id) else { return };
    let Some(bot) = bots.iter_mut().find(|b| b.id == bot_id) else { return };

    item.apply_to(bot);
    item.deactivate();
    log::debug!("bot {bot_id} picked up item {item_id}");
}

/// Let the projectile damage the bot and spend itself
fn handle_bot_projectile(world: &mut World, bot_id: u32, projectile_id: u32) {
    let World { bots, projectiles, .. } = world;
    let Some(projectile) = projectiles.iter_mut().find(|p| p.id == projectile_id) else {
        return;
    };
    let Some(bot) = bots.iter_mut().find(|b| b.id == bot_id) else { return };

    projectile.hit_bot(bot);
    if bot.is_dead() {
        log::info!("bot {bot_id} killed by projectile {projectile_id}");
    }
}

/// Spend the projectile against the wall, applying any area effect
fn handle_projectile_wall(world: &mut World, projectile_id: u32, cell: IVec2) {
    let World { bots, projectiles, .. } = world;
    let Some(projectile) = projectiles.iter_mut().find(|p| p.id == projectile_id) else {
        return;
    };

    let impact = projectile.location();
    let blast = projectile.blast_radius;
    let damage = projectile.damage;
    projectile.hit_wall();
    log::debug!("projectile {projectile_id} hit wall cell ({}, {})", cell.x, cell.y);

    if blast > 0.0 {
        for bot in bots.iter_mut().filter(|b| !b.is_dead()) {
            if bot.location().distance(impact) <= blast {
                bot.apply_damage(damage);
            }
        }
    }
}
