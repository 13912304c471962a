//! Engine configuration for the aural graph compiler.
//!
//! An engine config fixes the sample rate, the render quantum and the safety
//! limits the compiler and wire decoder run with. It lives in a TOML file,
//! by default `engine.toml` in the user config directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use aural_config::{EngineConfig, GraphController};
//!
//! let config = EngineConfig::load("engine.toml").unwrap();
//! let graph = aural_graph::GraphDescription::default();
//! let (_controller, _executor) =
//!     GraphController::with_inert_nodes(graph, config.render_settings());
//! ```

mod engine;
mod error;

/// Platform-specific paths for the configuration file.
#[cfg(feature = "std")]
pub mod paths;

/// Engine configuration validation.
pub mod validation;

pub use engine::EngineConfig;
pub use error::ConfigError;
#[cfg(feature = "std")]
pub use paths::{default_config_path, ensure_user_config_dir, find_config, user_config_dir};
pub use validation::{ValidationError, ValidationResult, validate_engine_config};

/// Re-export the graph types a configuration feeds into.
pub use aural_graph::{CompileLimits, GraphController, RenderSettings};
