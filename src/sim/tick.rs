//! Fixed timestep advancement
//!
//! Integrates entity velocities, then hands the result to the resolver.
//! Velocities themselves are steering/AI output and never set here.

use crate::geometry::is_null;

use super::resolve::Resolver;
use super::state::World;

/// Advance the world by one fixed timestep and resolve all collisions
pub fn tick(world: &mut World, resolver: &mut Resolver, dt: f64) {
    for bot in &mut world.bots {
        if bot.is_dead() || is_null(bot.velocity) {
            continue;
        }
        let next = bot.location() + bot.velocity * dt;
        bot.set_location(next);
    }
    for projectile in &mut world.projectiles {
        if !projectile.is_alive() {
            continue;
        }
        let next = projectile.location() + projectile.velocity * dt;
        projectile.set_location(next);
    }
    resolver.resolve(world);
}
