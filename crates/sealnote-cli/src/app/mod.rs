//! Application-level utilities for the Sealnote CLI.
//!
//! This module provides:
//! - Path resolution for config and store files
//! - Passphrase handling with retry logic
//! - A command context with lazily loaded configuration

mod context;
mod passphrase;
mod resolver;

// Re-export public API
pub use context::AppContext;
pub use resolver::resolve_config_path;
