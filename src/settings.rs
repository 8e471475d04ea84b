//! Runtime configuration.
//!
//! Settings are read from a JSON file. Every field has a default, so the file may set only what
//! it wants to change (or not exist at all).

use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_PATH: &str = "mccln.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub render: RenderSettings,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            render: RenderSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Window and context options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// OpenGL context version as `(major, minor)`; always a core profile.
    pub gl_version: (u8, u8),
    pub vsync: bool,
    /// Frames per second the host aims for. `0` renders as fast as possible.
    pub render_frequency: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Shitty Minecraft Clone".to_string(),
            width: 800,
            height: 600,
            gl_version: (4, 6),
            vsync: true,
            render_frequency: 60,
        }
    }
}

/// Options consumed by the renderer itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub clear_color: [f32; 4],
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    /// Registers the driver debug-output callback.
    pub debug_output: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            // aquamarine
            clear_color: [127.0 / 255.0, 1.0, 212.0 / 255.0, 1.0],
            vertex_shader: PathBuf::from("shaders/cube.vert"),
            fragment_shader: PathBuf::from("shaders/cube.frag"),
            debug_output: true,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from [`DEFAULT_PATH`] if it exists.
    ///
    /// An explicitly given path must exist; a missing default file just yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let path = match path {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_PATH);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&text)
    }

    /// Parses settings from JSON text.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }

    /// The configured log level as a filter.
    pub fn level_filter(&self) -> Result<LevelFilter, Error> {
        parse_level(&self.log_level)
    }
}

/// Parses a level name such as `"debug"` or `"off"`.
pub fn parse_level(level: &str) -> Result<LevelFilter, Error> {
    level
        .parse::<LevelFilter>()
        .map_err(|_| Error::LogLevel(level.to_string()))
}
