// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Lectern research coordinator.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use lectern_config::load_and_validate;
//!
//! let config = load_and_validate(None).expect("config errors");
//! println!("roster size: {}", config.models.len());
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, SourceFile, render_errors};
pub use loader::{load_config, load_config_from_str};
pub use model::{
    AssignmentConfig, IndicatorConfig, LecternConfig, LoggingConfig, ModelConfig,
    ProviderConfig, ProviderKind, ProvidersConfig, SectionConfig, TopicConfig,
    VectorStoreConfig,
};

/// Loads configuration from the layered hierarchy and validates it.
///
/// On a Figment error the TOML sources are re-read so diagnostics can point
/// at the offending key.
pub fn load_and_validate(explicit: Option<&Path>) -> Result<LecternConfig, Vec<ConfigError>> {
    match loader::load_config(explicit) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_sources(explicit),
        )),
    }
}

/// Loads configuration from a TOML string over the defaults and validates it.
pub fn load_and_validate_str(toml_content: &str) -> Result<LecternConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = [SourceFile {
                path: "<inline>".to_string(),
                content: toml_content.to_string(),
            }];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

fn collect_sources(explicit: Option<&Path>) -> Vec<SourceFile> {
    loader::config_paths(explicit)
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let path = std::fs::canonicalize(&path).unwrap_or(path);
            Some(SourceFile {
                path: path.display().to_string(),
                content,
            })
        })
        .collect()
}
