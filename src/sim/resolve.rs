//! The per-tick resolution pipeline
//!
//! Five phases in a fixed order, run synchronously once per tick. Phase
//! order is a correctness requirement, not an optimization: later phases
//! read state written by earlier ones. Item pickup runs before projectile
//! impact so a bot that reached a health pack this tick may survive a hit
//! that would otherwise kill it; projectile impact runs last so every bot
//! repositioning is final before damage is decided.
//!
//! For the duration of `resolve` the resolver is the sole writer of entity
//! position, health and ammo; AI and rendering collaborators run only
//! between ticks.

use super::detect::{
    detect_bot_bot_collisions, detect_bot_item_collisions, detect_bot_projectile_collisions,
    detect_bot_wall_collisions, detect_projectile_wall_collisions, purge_escaped_projectiles,
};
use super::events::EventBus;
use super::state::World;

/// Runs the pipeline and owns the per-bot event channels
#[derive(Default)]
pub struct Resolver {
    pub events: EventBus,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detect and resolve every collision of the tick
    pub fn resolve(&mut self, world: &mut World) {
        // Phase 1: bot vs bot, once. Residual bot-bot overlap after this
        // phase is tolerated; only wall penetration must fully resolve.
        let collisions = detect_bot_bot_collisions(world);
        log::trace!("bot-bot phase: {} contacts", collisions.len());
        for collision in &collisions {
            collision.handle(world);
        }

        // Phase 2: bot vs wall, repeated up to the configured bound —
        // fixing one wall contact can expose another.
        let max_passes = world.config.bot_wall_max_passes;
        let mut pass = 0;
        loop {
            let collisions = detect_bot_wall_collisions(world);
            if collisions.is_empty() {
                break;
            }
            if pass >= max_passes {
                log::warn!(
                    "bot-wall pass bound ({max_passes}) exhausted, {} contacts left unresolved",
                    collisions.len()
                );
                break;
            }
            log::trace!("bot-wall pass {pass}: {} contacts", collisions.len());
            for collision in &collisions {
                collision.handle(world);
            }
            pass += 1;
        }

        // Phase 3: bot vs item, once.
        for collision in &detect_bot_item_collisions(world) {
            collision.handle(world);
        }

        // Phase 4: projectile vs wall, once; projectiles that left the map
        // are dropped outright rather than reported.
        purge_escaped_projectiles(world);
        for collision in &detect_projectile_wall_collisions(world) {
            collision.handle(world);
        }

        // Phase 5: projectile vs bot, once, last.
        for collision in &detect_bot_projectile_collisions(world) {
            collision.handle(world);
        }

        world.projectiles.retain(|p| p.is_alive());

        // A fresh wall detection must come back empty now. Anything else
        // is a logic error in the pipeline, not a recoverable condition,
        // and only worth the extra detection pass in debug builds.
        #[cfg(debug_assertions)]
        {
            let residual = detect_bot_wall_collisions(world);
            if !residual.is_empty() {
                log::error!("wall penetration survived resolution: {residual:?}");
            }
            debug_assert!(residual.is_empty(), "wall penetration survived resolution");
        }

        for event in world.pending_events.drain(..) {
            self.events.fire(&event);
        }
    }
}
