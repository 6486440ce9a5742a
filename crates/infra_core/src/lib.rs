//! Deterministic resource-graph assembly for the Lambda monorepo stack.
//!
//! This crate owns configuration parsing, the declared resource blueprint,
//! graph assembly and template rendering. It intentionally excludes the
//! filesystem, the AWS SDK and any packaging of function sources; those
//! belong to the `infra_cli` synthesis backend.

pub mod assemble;
pub mod blueprint;
pub mod config;
pub mod error;
pub mod graph;
pub mod naming;
pub mod template;

pub use assemble::{assemble, assemble_with, AssemblyOptions, MissingTagPolicy};
pub use blueprint::{FunctionDefaults, FunctionSpec, LayerSpec, StackBlueprint};
pub use config::{ConfigKey, Configuration};
pub use error::{AssemblyError, ConfigurationError, DependencyError};
pub use graph::{FunctionNode, LayerNode, Runtime, StackGraph, Tag};
