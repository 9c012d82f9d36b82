use std::path::PathBuf;

use anyhow::{Context, Result};
use tessel_engine::device::GpuInit;
use tessel_engine::motion::PingPong;

pub const ASSETS_VAR: &str = "TESSEL_ASSETS";
pub const SHADERS_VAR: &str = "TESSEL_SHADERS";
pub const VELOCITY_VAR: &str = "TESSEL_VELOCITY";
pub const VSYNC_VAR: &str = "TESSEL_VSYNC";

/// Demo settings, overridable through the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    /// Holds `background.png` and `kitty.png`.
    pub assets_dir: PathBuf,
    /// Directory with `sprite.vert.wgsl`/`sprite.frag.wgsl`; `None` uses the
    /// built-in sprite shader.
    pub shader_dir: Option<PathBuf>,
    /// Horizontal speed of the bouncing sprite, world units per second.
    pub velocity: f32,
    /// Wait for vertical blank when presenting.
    pub vsync: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets")),
            shader_dir: None,
            velocity: PingPong::DEFAULT_VELOCITY,
            vsync: true,
        }
    }
}

impl DemoConfig {
    /// Device options derived from these settings.
    pub fn gpu_init(&self) -> GpuInit {
        GpuInit::default().with_vsync(self.vsync)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup(ASSETS_VAR) {
            config.assets_dir = dir.into();
        }
        if let Some(dir) = lookup(SHADERS_VAR) {
            config.shader_dir = Some(dir.into());
        }
        if let Some(raw) = lookup(VELOCITY_VAR) {
            let velocity: f32 = raw
                .trim()
                .parse()
                .with_context(|| format!("{VELOCITY_VAR}={raw:?} is not a number"))?;
            anyhow::ensure!(velocity.is_finite(), "{VELOCITY_VAR} must be finite, got {velocity}");
            config.velocity = velocity;
        }
        if let Some(raw) = lookup(VSYNC_VAR) {
            config.vsync = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => true,
                "0" | "false" | "off" | "no" => false,
                _ => anyhow::bail!("{VSYNC_VAR}={raw:?} is not a boolean"),
            };
        }

        Ok(config)
    }
}
