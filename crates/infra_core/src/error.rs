use thiserror::Error;

use crate::config::ConfigKey;
use crate::graph::Runtime;

/// Missing or unusable input. Fatal; nothing is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("missing required configuration key {0}")]
    MissingKey(ConfigKey),
    #[error("missing required configuration key {stage} (or {identifier})", stage = ConfigKey::Stage, identifier = ConfigKey::Identifier)]
    MissingStageOrIdentifier,
    #[error("stack identity `{0}` must start with a letter and contain only letters, digits and hyphens (max 128 characters)")]
    InvalidIdentity(String),
    #[error("tag `{tag}` requires configuration key {key}")]
    MissingTag { tag: &'static str, key: ConfigKey },
    #[error("function `{function}`: {field} {value} is outside {min}..={max}")]
    InvalidLimit {
        function: String,
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// The declared resources do not form a consistent graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    #[error("function `{function}` depends on unknown layer `{layer}`")]
    UnknownLayer { function: String, layer: String },
    #[error("function `{function}` runs {runtime} which layer `{layer}` does not support")]
    IncompatibleRuntime {
        function: String,
        layer: String,
        runtime: Runtime,
    },
    #[error("resource name `{0}` is declared more than once")]
    DuplicateName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Dependency(#[from] DependencyError),
}
