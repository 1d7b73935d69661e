//! Arena entities: bots, items, projectiles
//!
//! Entities are owned by the [`World`](super::state::World); during a
//! resolver pass nothing else mutates their position, health or ammo.
//! Cell occupancy is always derived from location + bounding radius,
//! never stored here.

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_BOT_AMMO, DEFAULT_BOT_HEALTH};
use crate::geometry::Circle;

/// Two-slot position history
///
/// Every write moves the old current value into the previous slot exactly
/// once (never chained); `restore` copies it back. Collision handlers rely
/// on this to undo a tentative move before recomputing a correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedPosition {
    current: DVec2,
    previous: DVec2,
}

impl TrackedPosition {
    /// Both slots start at the spawn point
    pub fn new(point: DVec2) -> Self {
        Self { current: point, previous: point }
    }

    #[inline]
    pub fn get(&self) -> DVec2 {
        self.current
    }

    #[inline]
    pub fn previous(&self) -> DVec2 {
        self.previous
    }

    /// Write a new location, retaining the old one for rollback
    pub fn set(&mut self, point: DVec2) {
        self.previous = self.current;
        self.current = point;
    }

    /// Roll back to the previous location
    pub fn restore(&mut self) {
        self.current = self.previous;
    }

    /// Collapse the history onto the current location
    pub fn commit(&mut self) {
        self.previous = self.current;
    }
}

/// An autonomous agent
///
/// Velocity is written by external steering/AI; this crate only integrates
/// it and corrects the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    pub id: u32,
    position: TrackedPosition,
    pub bounding_radius: f64,
    pub velocity: DVec2,
    pub health: i32,
    pub max_health: i32,
    pub ammo: u32,
}

impl Bot {
    pub fn new(id: u32, location: DVec2, bounding_radius: f64) -> Self {
        debug_assert!(bounding_radius > 0.0, "bounding radius must be positive");
        Self {
            id,
            position: TrackedPosition::new(location),
            bounding_radius,
            velocity: DVec2::ZERO,
            health: DEFAULT_BOT_HEALTH,
            max_health: DEFAULT_BOT_HEALTH,
            ammo: DEFAULT_BOT_AMMO,
        }
    }

    #[inline]
    pub fn location(&self) -> DVec2 {
        self.position.get()
    }

    #[inline]
    pub fn previous_location(&self) -> DVec2 {
        self.position.previous()
    }

    pub fn set_location(&mut self, point: DVec2) {
        self.position.set(point);
    }

    pub fn restore_location(&mut self) {
        self.position.restore();
    }

    pub fn bounding_circle(&self) -> Circle {
        Circle { center: self.location(), radius: self.bounding_radius }
    }

    pub fn apply_damage(&mut self, damage: i32) {
        self.health -= damage;
    }

    /// Heal, capped at max health
    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn add_ammo(&mut self, rounds: u32) {
        self.ammo += rounds;
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// What picking an item up does to a bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Health { amount: i32 },
    Ammo { rounds: u32 },
}

/// A static pickup occupying exactly one cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    pub cell: IVec2,
    active: bool,
}

impl Item {
    pub fn new(id: u32, kind: ItemKind, cell: IVec2) -> Self {
        Self { id, kind, cell, active: true }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Apply this item's effect to a bot
    pub fn apply_to(&self, bot: &mut Bot) {
        match self.kind {
            ItemKind::Health { amount } => bot.heal(amount),
            ItemKind::Ammo { rounds } => bot.add_ammo(rounds),
        }
    }
}

/// A shot in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    position: TrackedPosition,
    pub bounding_radius: f64,
    pub velocity: DVec2,
    pub damage: i32,
    /// Radius of the wall-impact area effect; zero for plain bullets
    pub blast_radius: f64,
    /// The firing bot, which a projectile never hits
    pub shooter: u32,
    alive: bool,
}

impl Projectile {
    pub fn new(
        id: u32,
        shooter: u32,
        location: DVec2,
        velocity: DVec2,
        damage: i32,
        bounding_radius: f64,
    ) -> Self {
        debug_assert!(bounding_radius > 0.0, "bounding radius must be positive");
        Self {
            id,
            position: TrackedPosition::new(location),
            bounding_radius,
            velocity,
            damage,
            blast_radius: 0.0,
            shooter,
            alive: true,
        }
    }

    /// Builder-style blast radius for rocket-like projectiles
    pub fn with_blast(mut self, blast_radius: f64) -> Self {
        self.blast_radius = blast_radius;
        self
    }

    #[inline]
    pub fn location(&self) -> DVec2 {
        self.position.get()
    }

    #[inline]
    pub fn previous_location(&self) -> DVec2 {
        self.position.previous()
    }

    pub fn set_location(&mut self, point: DVec2) {
        self.position.set(point);
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Damage the bot and spend the projectile
    pub fn hit_bot(&mut self, bot: &mut Bot) {
        bot.apply_damage(self.damage);
        self.alive = false;
    }

    /// Spend the projectile against a wall; any area effect is the
    /// handler's business since it needs the full bot list
    pub fn hit_wall(&mut self) {
        self.alive = false;
    }
}
