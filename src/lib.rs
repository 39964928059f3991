//! # gymlog
//!
//! Fills workout log templates (Word `.docx` or HTML) from a JSON workout
//! record and optionally renders the result to PDF, either with a local
//! headless office suite or through a Gotenberg service.
//!
//! ## Modules
//!
//! - `workout` - The workout record clients submit
//! - `template` - Placeholder table, substitution and variable discovery
//! - `document` - `.docx` and HTML document models
//! - `convert` - PDF conversion backends and their availability probes
//! - `service` - Template resolution, generation, output naming and cleanup
//! - `server` - The axum HTTP API
//! - `subprocess` - Process runner abstraction used by the office converter
//! - `config` - Defaults, TOML file and environment overrides
pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod server;
pub mod service;
pub mod subprocess;
pub mod template;
pub mod workout;

pub use error::{Error, Result};
