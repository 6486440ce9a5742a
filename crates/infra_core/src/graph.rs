use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Lambda runtime identifiers the stack can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Runtime {
    #[serde(rename = "python3.8")]
    Python38,
    #[serde(rename = "python3.9")]
    Python39,
    #[serde(rename = "python3.10")]
    Python310,
    #[serde(rename = "python3.11")]
    Python311,
    #[serde(rename = "python3.12")]
    Python312,
}

impl Runtime {
    pub fn identifier(self) -> &'static str {
        match self {
            Self::Python38 => "python3.8",
            Self::Python39 => "python3.9",
            Self::Python310 => "python3.10",
            Self::Python311 => "python3.11",
            Self::Python312 => "python3.12",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Shared dependency bundle attachable to functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerNode {
    pub name: String,
    pub source_directory: PathBuf,
    pub compatible_runtimes: BTreeSet<Runtime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub name: String,
    pub source_directory: PathBuf,
    /// `module.function` entry point, e.g. `index.handler`.
    pub handler: String,
    pub memory_mb: u32,
    pub timeout_seconds: u32,
    pub runtime: Runtime,
    /// Names of layers in the same graph, in attachment order.
    pub depends_on_layers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
    pub propagate_to_compute_instances: bool,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            propagate_to_compute_instances: true,
        }
    }
}

/// Fully assembled stack. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackGraph {
    pub identity: String,
    pub layers: Vec<LayerNode>,
    pub functions: Vec<FunctionNode>,
    pub tags: Vec<Tag>,
}

impl StackGraph {
    pub fn layer(&self, name: &str) -> Option<&LayerNode> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionNode> {
        self.functions.iter().find(|function| function.name == name)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }

    /// SHA-256 over the stable JSON form; equal graphs hash equally.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(self)?);
        Ok(format!("{:x}", hasher.finalize()))
    }
}
