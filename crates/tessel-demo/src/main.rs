mod config;
mod scene;

use anyhow::Result;
use tessel_engine::logging::{init_logging, LoggingConfig};
use tessel_engine::window::{Runtime, RuntimeConfig};

use crate::config::DemoConfig;
use crate::scene::SpriteScene;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = DemoConfig::from_env()?;
    log::info!(
        "assets from {}, velocity {}, vsync {}",
        config.assets_dir.display(),
        config.velocity,
        config.vsync
    );

    let runtime = RuntimeConfig {
        title: "tessel sprites".to_string(),
        ..RuntimeConfig::default()
    };
    let gpu_init = config.gpu_init();
    Runtime::run(runtime, gpu_init, SpriteScene::new(config))
}
