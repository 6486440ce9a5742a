//! Declared resources of the stack, in the order they are constructed.
//!
//! The order is fixed by the declaration and never derived from directory
//! listings, which differ between platforms.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::graph::Runtime;

pub const DEFAULT_MEMORY_MB: u32 = 128;
pub const DEFAULT_TIMEOUT_SECONDS: u32 = 10;
pub const DEFAULT_INDEX_FILE: &str = "index.py";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    pub source_directory: PathBuf,
    pub compatible_runtimes: BTreeSet<Runtime>,
}

impl LayerSpec {
    pub fn new(name: impl Into<String>, source_directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source_directory: source_directory.into(),
            compatible_runtimes: BTreeSet::new(),
        }
    }

    pub fn runtime(mut self, runtime: Runtime) -> Self {
        self.compatible_runtimes.insert(runtime);
        self
    }
}

/// A function declaration. Unset limits fall back to [`FunctionDefaults`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub source_directory: PathBuf,
    /// Module file inside `source_directory`.
    pub index: String,
    /// Function name inside `index`.
    pub handler: String,
    pub memory_mb: Option<u32>,
    pub timeout_seconds: Option<u32>,
    pub runtime: Option<Runtime>,
    pub layers: Vec<String>,
}

impl FunctionSpec {
    pub fn new(name: impl Into<String>, source_directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source_directory: source_directory.into(),
            index: DEFAULT_INDEX_FILE.to_string(),
            handler: "handler".to_string(),
            memory_mb: None,
            timeout_seconds: None,
            runtime: None,
            layers: Vec::new(),
        }
    }

    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = handler.into();
        self
    }

    pub fn memory_mb(mut self, memory_mb: u32) -> Self {
        self.memory_mb = Some(memory_mb);
        self
    }

    pub fn timeout_seconds(mut self, timeout_seconds: u32) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    pub fn runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn layer(mut self, layer: impl Into<String>) -> Self {
        self.layers.push(layer.into());
        self
    }

    /// `index.py` + `handler` becomes `index.handler`.
    pub fn handler_spec(&self) -> String {
        let module = self
            .index
            .strip_suffix(".py")
            .unwrap_or(self.index.as_str());
        format!("{module}.{}", self.handler)
    }
}

/// Values used for limits a [`FunctionSpec`] leaves unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefaults {
    pub memory_mb: u32,
    pub timeout_seconds: u32,
    pub runtime: Runtime,
}

impl Default for FunctionDefaults {
    fn default() -> Self {
        Self {
            memory_mb: DEFAULT_MEMORY_MB,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            runtime: Runtime::Python38,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackBlueprint {
    pub layers: Vec<LayerSpec>,
    pub functions: Vec<FunctionSpec>,
}

impl StackBlueprint {
    /// The monorepo layout: one shared DB layer, one function that uses it
    /// and one that only pulls third-party packages at packaging time.
    pub fn monorepo() -> Self {
        Self {
            layers: vec![LayerSpec::new("DB lib", "layers/db-utils").runtime(Runtime::Python38)],
            functions: vec![
                FunctionSpec::new("Lambda 1", "lambdas/lambda_1")
                    .memory_mb(DEFAULT_MEMORY_MB)
                    .timeout_seconds(DEFAULT_TIMEOUT_SECONDS)
                    .runtime(Runtime::Python38)
                    .layer("DB lib"),
                FunctionSpec::new("Lambda 2", "lambdas/lambda_2")
                    .memory_mb(DEFAULT_MEMORY_MB)
                    .timeout_seconds(DEFAULT_TIMEOUT_SECONDS)
                    .runtime(Runtime::Python38),
            ],
        }
    }
}

impl Default for StackBlueprint {
    fn default() -> Self {
        Self::monorepo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_spec_strips_python_extension() {
        let spec = FunctionSpec::new("Lambda 1", "lambdas/lambda_1");
        assert_eq!(spec.handler_spec(), "index.handler");

        let mut custom = spec.handler("main");
        custom.index = "app".to_string();
        assert_eq!(custom.handler_spec(), "app.main");
    }

    #[test]
    fn monorepo_declares_layer_before_functions() {
        let blueprint = StackBlueprint::monorepo();
        assert_eq!(blueprint.layers.len(), 1);
        assert_eq!(blueprint.layers[0].name, "DB lib");
        let names: Vec<&str> = blueprint
            .functions
            .iter()
            .map(|function| function.name.as_str())
            .collect();
        assert_eq!(names, vec!["Lambda 1", "Lambda 2"]);
        assert_eq!(blueprint.functions[0].layers, vec!["DB lib".to_string()]);
        assert!(blueprint.functions[1].layers.is_empty());
    }
}
