//! Simulation configuration
//!
//! Resolver tunables, persisted as JSON. Loading never fails hard: a
//! missing or malformed file falls back to the defaults, matching how the
//! rest of the engine treats configuration as a soft input.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable parameters of the simulation and its collision resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Fixed simulation timestep in seconds
    pub tick_dt: f64,
    /// Upper bound on bot-wall detect+handle passes per tick
    pub bot_wall_max_passes: u32,
    /// Distance a corrected bot is nudged back from its wall touching point
    pub wall_back_off: f64,
    /// Default bot bounding radius
    pub bot_radius: f64,
    /// Default projectile bounding radius
    pub projectile_radius: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_dt: SIM_DT,
            bot_wall_max_passes: BOT_WALL_MAX_PASSES,
            wall_back_off: WALL_BACK_OFF,
            bot_radius: DEFAULT_BOT_RADIUS,
            projectile_radius: DEFAULT_PROJECTILE_RADIUS,
        }
    }
}

impl SimConfig {
    /// Load from a JSON file, falling back to defaults on any failure
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {path}");
                    config
                }
                Err(e) => {
                    log::warn!("Config {path} unreadable ({e}), using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No config at {path}, using defaults");
                Self::default()
            }
        }
    }

    /// Best-effort save as pretty JSON
    pub fn save(&self, path: &str) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    log::warn!("Failed to write config {path}: {e}");
                } else {
                    log::info!("Config saved to {path}");
                }
            }
            Err(e) => log::warn!("Failed to serialize config: {e}"),
        }
    }
}
