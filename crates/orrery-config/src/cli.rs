//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Toy solar system with a cubemap skybox")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Asset root directory.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// RON scene file to load instead of the built-in solar system.
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref root) = args.assets {
            self.assets.root = root.clone();
        }
        if let Some(ref scene) = args.scene {
            self.assets.scene = Some(scene.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1280),
            scene: Some(PathBuf::from("moons.ron")),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.assets.scene, Some(PathBuf::from("moons.ron")));
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 1080);
        assert_eq!(config.assets.root, PathBuf::from("assets"));
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "orrery",
            "--width",
            "800",
            "--log-level",
            "debug",
            "--assets",
            "/opt/orrery",
        ]);
        assert_eq!(args.width, Some(800));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.assets, Some(PathBuf::from("/opt/orrery")));
        assert!(args.config.is_none());
    }
}
