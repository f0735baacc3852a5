//! The `orrery` binary.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p orrery-app -- --width 1280 --height 720`.

use std::process::ExitCode;

use clap::Parser;
use orrery_app::AppError;
use orrery_app::platform::PlatformDirs;
use orrery_config::{CliArgs, Config};
use orrery_scene::SolarSystem;
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match PlatformDirs::resolve_and_create(args.config.as_deref()) {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to initialize platform directories: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };
    config.apply_cli_overrides(&args);

    orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(
        "Window: {}x{} | Title: {}",
        config.window.width, config.window.height, config.window.title
    );

    match load_scene(&config).and_then(|system| orrery_app::window::run(config, system)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_scene(config: &Config) -> Result<SolarSystem, AppError> {
    let system = match &config.assets.scene {
        Some(path) => SolarSystem::load_ron(&config.assets.resolve(path))?,
        None => SolarSystem::default_system(),
    };
    info!("Scene: {} bodies", system.len());
    Ok(system)
}
