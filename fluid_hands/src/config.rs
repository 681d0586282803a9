//! Application configuration: an optional TOML file, overridden by CLI flags.
//!
//! ```toml
//! # fluid_hands.toml
//! width = 1280
//! height = 720
//! flip_camera = true
//! render_mode = "composite"
//!
//! [tracker]
//! max_hands = 2
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use flow_field::Resolution;
use serde::Deserialize;

use crate::context::Resolutions;
use crate::error::{Error, Result};

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "FLUID_HANDS_CONFIG";

/// Slowest synthetic camera rate accepted from config.
pub const MIN_SIM_CAMERA_FPS: f32 = 0.01;

// ════════════════════════════════════════════════════════════════════════════
// RenderMode
// ════════════════════════════════════════════════════════════════════════════

/// What `draw` puts on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Camera, fluid, particles, tracker overlay and hand markers.
    #[default]
    Composite,
    /// Only the pointer forces that fired this tick.
    MouseForces,
}

impl RenderMode {
    pub fn toggled(self) -> Self {
        match self {
            RenderMode::Composite   => RenderMode::MouseForces,
            RenderMode::MouseForces => RenderMode::Composite,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RenderMode::Composite   => "composite",
            RenderMode::MouseForces => "mouse forces",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Align depth with the color image.
    pub registration: bool,
    /// Mirror the device image.
    pub mirror:       bool,
    pub max_hands:    usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig { registration: true, mirror: true, max_hands: 2 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Draw (window) size.
    pub width:             usize,
    pub height:            usize,
    /// Flow resolution = draw / `flow_divisor`.
    pub flow_divisor:      usize,
    /// Field-view resolution = flow / `field_divisor`.
    pub field_divisor:     usize,
    pub camera_width:      usize,
    pub camera_height:     usize,
    /// Mirror the camera image horizontally.
    pub flip_camera:       bool,
    /// Cheaper internal formats for fluid and particles.
    pub reduced_precision: bool,
    pub render_mode:       RenderMode,
    /// Use the synthetic camera even when a webcam backend is compiled in.
    pub sim_camera:        bool,
    /// Frame rate of the synthetic camera.
    pub sim_camera_fps:    f32,
    pub particles:         bool,
    pub target_fps:        u32,
    pub tracker:           TrackerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            width:             1280,
            height:            720,
            flow_divisor:      8,
            field_divisor:     4,
            camera_width:      640,
            camera_height:     480,
            flip_camera:       true,
            reduced_precision: false,
            render_mode:       RenderMode::Composite,
            sim_camera:        false,
            sim_camera_fps:    30.0,
            particles:         true,
            target_fps:        60,
            tracker:           TrackerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        let cfg = Self::from_toml(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let nonzero = [
            ("width", self.width),
            ("height", self.height),
            ("flow_divisor", self.flow_divisor),
            ("field_divisor", self.field_divisor),
            ("camera_width", self.camera_width),
            ("camera_height", self.camera_height),
            ("target_fps", self.target_fps as usize),
        ];
        if let Some((name, _)) = nonzero.iter().find(|(_, v)| *v == 0) {
            return Err(Error::Config(format!("{name} must be at least 1")));
        }
        if self.tracker.max_hands == 0 {
            return Err(Error::Config("tracker.max_hands must be at least 1".into()));
        }
        if !self.sim_camera_fps.is_finite() || self.sim_camera_fps < MIN_SIM_CAMERA_FPS {
            return Err(Error::Config(format!(
                "sim_camera_fps must be a finite rate of at least {MIN_SIM_CAMERA_FPS}"
            )));
        }
        Ok(())
    }

    pub fn resolutions(&self) -> Resolutions {
        Resolutions::derive(
            Resolution::new(self.width, self.height),
            self.flow_divisor,
            self.field_divisor,
            Resolution::new(self.camera_width, self.camera_height),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Cli
// ════════════════════════════════════════════════════════════════════════════

/// Hand- and camera-driven fluid.
#[derive(Parser, Debug, Default)]
#[command(name = "fluid_hands", author, version, about)]
pub struct Cli {
    /// TOML config file.
    #[arg(long, value_name = "PATH", env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Ignore any config file and start from defaults.
    #[arg(long)]
    pub quick: bool,

    /// Window width.
    #[arg(long)]
    pub width: Option<usize>,

    /// Window height.
    #[arg(long)]
    pub height: Option<usize>,

    /// Do not mirror the camera image.
    #[arg(long)]
    pub no_flip: bool,

    /// Cheaper internal formats for fluid and particles.
    #[arg(long)]
    pub reduced_precision: bool,

    #[arg(long, value_enum)]
    pub render_mode: Option<RenderMode>,

    /// Cap on simultaneously tracked hands.
    #[arg(long)]
    pub max_hands: Option<usize>,

    /// Use the synthetic camera.
    #[arg(long)]
    pub sim_camera: bool,
}

impl Cli {
    /// Build the effective config: file (unless `--quick`), then flags,
    /// then validation.
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut cfg = match (&self.config, self.quick) {
            (Some(path), false) => AppConfig::from_file(path)?,
            _ => AppConfig::default(),
        };
        if let Some(w) = self.width  { cfg.width = w; }
        if let Some(h) = self.height { cfg.height = h; }
        if self.no_flip { cfg.flip_camera = false; }
        if self.reduced_precision { cfg.reduced_precision = true; }
        if let Some(mode) = self.render_mode { cfg.render_mode = mode; }
        if let Some(n) = self.max_hands { cfg.tracker.max_hands = n; }
        if self.sim_camera { cfg.sim_camera = true; }
        cfg.validate()?;
        Ok(cfg)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
