//! Per-bot collision notifications
//!
//! Steering and AI code outside this crate reacts to "hit a wall" and
//! "hit a bot" (a strafing behavior flips direction on wall contact, for
//! example). Handlers never call subscribers directly: they append events
//! to the world's pending list, and the resolver drains that list through
//! the bus once all phases are done, so no callback ever observes the
//! world mid-resolution.

use glam::IVec2;

/// The counterpart a bot collided with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Wall { cell: IVec2 },
    Bot { other: u32 },
}

/// One collision notification for one bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub bot: u32,
    pub contact: Contact,
}

/// Token handed out by `subscribe_*`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Wall,
    Bot,
}

struct Subscription {
    id: SubscriptionId,
    bot: u32,
    channel: Channel,
    callback: Box<dyn FnMut(&CollisionEvent)>,
}

/// Owned callback lists, keyed by bot and channel
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify `callback` whenever `bot` collides with a wall
    pub fn subscribe_wall(
        &mut self,
        bot: u32,
        callback: impl FnMut(&CollisionEvent) + 'static,
    ) -> SubscriptionId {
        self.subscribe(bot, Channel::Wall, Box::new(callback))
    }

    /// Notify `callback` whenever `bot` collides with another bot
    pub fn subscribe_bot(
        &mut self,
        bot: u32,
        callback: impl FnMut(&CollisionEvent) + 'static,
    ) -> SubscriptionId {
        self.subscribe(bot, Channel::Bot, Box::new(callback))
    }

    fn subscribe(
        &mut self,
        bot: u32,
        channel: Channel,
        callback: Box<dyn FnMut(&CollisionEvent)>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, bot, channel, callback });
        id
    }

    /// Drop a subscription; returns whether it existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Deliver one event to every matching subscription
    pub fn fire(&mut self, event: &CollisionEvent) {
        let channel = match event.contact {
            Contact::Wall { .. } => Channel::Wall,
            Contact::Bot { .. } => Channel::Bot,
        };
        for sub in &mut self.subscriptions {
            if sub.bot == event.bot && sub.channel == channel {
                (sub.callback)(event);
            }
        }
    }
}
