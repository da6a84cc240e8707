//! kiln core library.
//!
//! `kiln-core` holds the pieces the binary wires together: CLI parsing,
//! logging setup, TOML pipeline definitions and the built-in client/server
//! packaging pipeline.

pub mod cli;
pub mod config;
pub mod logging;
pub mod package;

pub use config::PipelineContext;
