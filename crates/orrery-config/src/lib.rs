//! Configuration for the orrery viewer.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line. Every section is `#[serde(default)]`, so older or partial
//! files keep loading as fields are added.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetConfig, CameraConfig, Config, DebugConfig, InputConfig, RenderConfig, WindowConfig,
};
pub use error::ConfigError;
