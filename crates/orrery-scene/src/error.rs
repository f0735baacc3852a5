//! Scene error types.

use std::path::PathBuf;

/// Errors raised while loading or resolving a scene description.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The scene file could not be read.
    #[error("failed to read scene {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scene file is not valid RON.
    #[error("failed to parse scene: {0}")]
    Parse(#[source] ron::error::SpannedError),

    /// A body names a parent that is not declared before it.
    #[error("body '{body}' orbits '{parent}', which is not declared before it")]
    UnknownParent { body: String, parent: String },

    /// Two bodies share a name.
    #[error("duplicate body name '{name}'")]
    DuplicateName { name: String },

    /// Scale is zero, negative, or not finite.
    #[error("body '{body}' has invalid scale {scale}")]
    InvalidScale { body: String, scale: f32 },
}
