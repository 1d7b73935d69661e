//! Deterministic arena simulation
//!
//! All collision logic lives here. This module must stay pure and
//! deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies
//!
//! Per tick, [`resolve::Resolver::resolve`] runs five phases in fixed
//! order: bot-bot, bot-wall (bounded retry), bot-item, projectile-wall,
//! bot-projectile.

pub mod collision;
pub mod detect;
pub mod entity;
pub mod events;
pub mod map;
pub mod resolve;
pub mod state;
pub mod tick;

pub use collision::Collision;
pub use detect::{
    detect_bot_bot_collisions, detect_bot_item_collisions, detect_bot_projectile_collisions,
    detect_bot_wall_collisions, detect_projectile_wall_collisions, occupied_cells,
};
pub use entity::{Bot, Item, ItemKind, Projectile, TrackedPosition};
pub use events::{CollisionEvent, Contact, EventBus, SubscriptionId};
pub use map::Map;
pub use resolve::Resolver;
pub use state::World;
pub use tick::tick;
