//! Error types for the collision engine.

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised by the geometry primitives and the resolver.
///
/// Expected same-tick races (two bots reaching one item, two projectiles
/// hitting one bot) are not errors; handlers absorb them with state checks.
#[derive(Debug, Error)]
pub enum SimError {
    /// Degenerate geometric input: a null line direction or a circle with a
    /// non-positive radius. A programming or configuration error, raised
    /// immediately and never retried.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),

    /// The world contradicts itself: a bot already penetrating a wall
    /// before any movement, or a tangency search that finds no touching
    /// point along the traveled segment. Logged as severe; the offending
    /// unit of work is skipped and the tick proceeds.
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
}
