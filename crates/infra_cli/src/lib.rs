//! Command-line entry point and synthesis backend for the Lambda monorepo
//! stack.
//!
//! This crate owns everything that touches the process environment or the
//! filesystem. Graph assembly itself lives in `infra_core`.

pub mod backend;
pub mod cli;
pub mod logging;
pub mod target;

pub use infra_core;
