// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `/etc/lectern/lectern.toml`
//! 3. `~/.config/lectern/lectern.toml`
//! 4. `./lectern.toml`
//! 5. An explicit file passed with `--config`
//! 6. `LECTERN_*` environment variables
//!
//! Tables merge key by key; arrays such as `[[models]]` replace the default
//! roster wholesale. Keyed tables therefore only grow: a user file can add or
//! retune `[indicators.<category>]` and `[topic.weights.<model_id>]` entries
//! but cannot remove the defaults. A leftover default indicator only adds a
//! profile category no section maps to, and topic weights for models outside
//! the roster are ignored.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LecternConfig;

const SYSTEM_CONFIG: &str = "/etc/lectern/lectern.toml";
const LOCAL_CONFIG: &str = "lectern.toml";

/// Sections whose names are stripped from env var keys before the first `_`
/// becomes a `.`. Longest first so `vector_store_` wins over shorter prefixes.
const ENV_SECTIONS: &[&str] = &[
    "vector_store",
    "assignment",
    "providers_openai",
    "providers_anthropic",
    "providers_gemini",
    "logging",
    "topic",
];

/// Config files consulted, in merge order. Missing files are skipped by Figment.
pub fn config_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("lectern").join(LOCAL_CONFIG));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG));
    if let Some(path) = explicit {
        paths.push(path.to_path_buf());
    }
    paths
}

/// Builds the full layered Figment without extracting it.
pub fn build_figment(explicit: Option<&Path>) -> Figment {
    config_paths(explicit)
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(LecternConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Loads configuration from the XDG hierarchy, an optional explicit file, and env vars.
pub fn load_config(explicit: Option<&Path>) -> Result<LecternConfig, figment::Error> {
    build_figment(explicit).extract()
}

/// Loads configuration from a TOML string over the defaults (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<LecternConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LecternConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Maps `LECTERN_ASSIGNMENT_MIN_CONFIDENCE` to `assignment.min_confidence`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores themselves.
fn env_provider() -> Env {
    Env::prefixed("LECTERN_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{}.{rest}", section.replacen("providers_", "providers.", 1));
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(
            map_env_key("assignment_min_confidence"),
            "assignment.min_confidence"
        );
        assert_eq!(
            map_env_key("vector_store_database_path"),
            "vector_store.database_path"
        );
        assert_eq!(
            map_env_key("providers_openai_api_key"),
            "providers.openai.api_key"
        );
        assert_eq!(map_env_key("logging_level"), "logging.level");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }

    #[test]
    fn explicit_path_is_merged_last() {
        let explicit = PathBuf::from("/tmp/custom.toml");
        let paths = config_paths(Some(explicit.as_path()));
        assert_eq!(paths.first(), Some(&PathBuf::from(SYSTEM_CONFIG)));
        assert_eq!(paths.last(), Some(&explicit));
    }
}
