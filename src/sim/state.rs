//! World state
//!
//! Everything the simulation owns: the map plus all entities, with stable
//! entity IDs, stable iteration order, and whole-state serialization. The
//! pending event list is transient and skipped on serialization; the
//! resolver drains it every tick.

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use super::entity::{Bot, Item, ItemKind, Projectile};
use super::events::CollisionEvent;
use super::map::Map;
use crate::config::SimConfig;

/// The complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub config: SimConfig,
    pub map: Map,
    pub bots: Vec<Bot>,
    pub items: Vec<Item>,
    pub projectiles: Vec<Projectile>,
    /// Collision notifications produced by handlers this tick, drained by
    /// the resolver through the event bus
    #[serde(skip)]
    pub pending_events: Vec<CollisionEvent>,
    next_id: u32,
}

impl World {
    pub fn new(map: Map) -> Self {
        Self::with_config(map, SimConfig::default())
    }

    pub fn with_config(map: Map, config: SimConfig) -> Self {
        Self {
            config,
            map,
            bots: Vec::new(),
            items: Vec::new(),
            projectiles: Vec::new(),
            pending_events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_bot(&mut self, location: DVec2, bounding_radius: f64) -> u32 {
        let id = self.next_entity_id();
        self.bots.push(Bot::new(id, location, bounding_radius));
        id
    }

    /// Place an item; a cell holds at most one active item
    pub fn spawn_item(&mut self, kind: ItemKind, cell: IVec2) -> u32 {
        debug_assert!(
            !self.items.iter().any(|i| i.is_active() && i.cell == cell),
            "cell already holds an active item"
        );
        let id = self.next_entity_id();
        self.items.push(Item::new(id, kind, cell));
        id
    }

    pub fn spawn_projectile(
        &mut self,
        shooter: u32,
        location: DVec2,
        velocity: DVec2,
        damage: i32,
    ) -> u32 {
        let id = self.next_entity_id();
        let radius = self.config.projectile_radius;
        self.projectiles.push(Projectile::new(id, shooter, location, velocity, damage, radius));
        id
    }

    /// A projectile with a wall-impact area effect
    pub fn spawn_rocket(
        &mut self,
        shooter: u32,
        location: DVec2,
        velocity: DVec2,
        damage: i32,
        blast_radius: f64,
    ) -> u32 {
        let id = self.next_entity_id();
        let radius = self.config.projectile_radius;
        self.projectiles.push(
            Projectile::new(id, shooter, location, velocity, damage, radius)
                .with_blast(blast_radius),
        );
        id
    }

    pub fn bot(&self, id: u32) -> Option<&Bot> {
        self.bots.iter().find(|b| b.id == id)
    }

    pub fn bot_mut(&mut self, id: u32) -> Option<&mut Bot> {
        self.bots.iter_mut().find(|b| b.id == id)
    }

    pub fn item(&self, id: u32) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: u32) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn projectile(&self, id: u32) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    pub fn projectile_mut(&mut self, id: u32) -> Option<&mut Projectile> {
        self.projectiles.iter_mut().find(|p| p.id == id)
    }

    /// Distinct mutable references to two bots
    pub fn bot_pair_mut(&mut self, first: u32, second: u32) -> Option<(&mut Bot, &mut Bot)> {
        let i = self.bots.iter().position(|b| b.id == first)?;
        let j = self.bots.iter().position(|b| b.id == second)?;
        if i == j {
            return None;
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        let (head, tail) = self.bots.split_at_mut(hi);
        let (a, b) = (&mut head[lo], &mut tail[0]);
        Some(if i < j { (a, b) } else { (b, a) })
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.bots.sort_by_key(|b| b.id);
        self.items.sort_by_key(|i| i.id);
        self.projectiles.sort_by_key(|p| p.id);
    }
}
