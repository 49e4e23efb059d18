//! Game configuration.
//!
//! Every tunable constant lives in [`GameConfig`]. At startup the settings file
//! in the user's config directory is read if present; any key it omits keeps its
//! default, so a file can override just the values you care about.

use bevy::{prelude::*, window::PrimaryWindow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(GameConfig::load());
    app.add_systems(Startup, fit_window_to_playfield);
}

/// Size the window so one world unit is one playfield pixel.
fn fit_window_to_playfield(
    config: Res<GameConfig>,
    mut window_query: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Ok(mut window) = window_query.single_mut() else {
        return;
    };
    window.resolution.set(config.width, config.height);
}

/// Default playfield width in pixels.
pub const PLAYFIELD_WIDTH: f32 = 800.0;

/// Default playfield height in pixels.
pub const PLAYFIELD_HEIGHT: f32 = 600.0;

/// Default bubble radius in pixels.
pub const BUBBLE_RADIUS: f32 = 20.0;

/// Errors raised while loading the settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting `{name}`: {reason}")]
    Invalid {
        name: &'static str,
        reason: &'static str,
    },
}

/// Runtime configuration for the playfield, bubbles and shooter.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: f32,
    pub height: f32,
    pub bubble_radius: f32,
    /// Distance a flying bubble travels per tick; also the shooter's step.
    pub bubble_speed: f32,
    /// Minimum time between two shots, in milliseconds.
    pub shoot_cooldown_ms: u64,
    /// Slack subtracted from the cell size when looking for a placement neighbor.
    pub placement_tolerance: f32,
    pub tick_rate_hz: f64,
    /// Distance from the bottom edge to the shooter's center.
    pub shooter_offset: f32,
    /// Fixed seed for layout and color rolls. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            bubble_radius: BUBBLE_RADIUS,
            bubble_speed: 8.0,
            shoot_cooldown_ms: 500,
            placement_tolerance: 2.0,
            tick_rate_hz: 30.0,
            shooter_offset: 50.0,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Grid cell size: one bubble diameter.
    pub fn cell_size(&self) -> f32 {
        self.bubble_radius * 2.0
    }

    /// Check the values the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("bubble_radius", self.bubble_radius),
            ("bubble_speed", self.bubble_speed),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    name,
                    reason: "must be a positive number",
                });
            }
        }

        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            return Err(ConfigError::Invalid {
                name: "tick_rate_hz",
                reason: "must be a positive number",
            });
        }

        if self.width < self.cell_size() || self.height < self.cell_size() {
            return Err(ConfigError::Invalid {
                name: "bubble_radius",
                reason: "a bubble must fit inside the playfield",
            });
        }

        if !(0.0..self.cell_size()).contains(&self.placement_tolerance) {
            return Err(ConfigError::Invalid {
                name: "placement_tolerance",
                reason: "must be between zero and one bubble diameter",
            });
        }

        if self.shooter_offset < self.bubble_radius || self.shooter_offset > self.height {
            return Err(ConfigError::Invalid {
                name: "shooter_offset",
                reason: "the shooter must sit inside the playfield",
            });
        }

        Ok(())
    }

    /// Parse and validate settings from JSON text.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read settings from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Get the file path for the settings file.
    fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bubble-pop").join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine config directory, using default settings");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                info!("Loaded settings from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Ignoring settings file: {}", e);
                Self::default()
            }
        }
    }
}
