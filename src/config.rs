use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::error::Result;

/// Tuning knobs. Distances are in map units, speeds in units per turn.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub boundary_margin: f32,
    pub close_range: f32,
    pub agent_speed: f32,
    pub boundary_shrink_speed: f32,
    pub active_ticks: u32,
    pub waiting_ticks: u32,
    pub boundary_waiting_ticks: u32,
    /// Inclusive range of degrees added to the heading towards the zone edge.
    pub escape_jitter: (i32, i32),
    /// Inclusive range of degrees added to the heading away from the enemy.
    pub orbit_jitter: (i32, i32),
    pub strafe_offset: f32,
    /// When set, moves are sent as `[angle, magnitude]`.
    pub move_magnitude: Option<f32>,
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            boundary_margin: 100.,
            close_range: 100.,
            agent_speed: 100.,
            boundary_shrink_speed: 10.,
            active_ticks: 5,
            waiting_ticks: 2,
            boundary_waiting_ticks: 2,
            escape_jitter: (165, 195),
            orbit_jitter: (-90, 90),
            strafe_offset: 45.,
            move_magnitude: None,
        }
    }
}

impl BotConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
