// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with "did you mean" suggestions.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A TOML file that took part in loading, kept for span lookup.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(lectern::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(lectern::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// An enum-valued key holds a value outside its variants (e.g. an unknown provider).
    #[error("unknown value `{value}` for key `{key}`")]
    #[diagnostic(
        code(lectern::config::unknown_variant),
        help("{}", unknown_key_help(suggestion.as_deref(), expected))
    )]
    UnknownVariant {
        key: String,
        value: String,
        suggestion: Option<String>,
        expected: String,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(lectern::config::missing_key),
        help("add `{key} = <value>` to your lectern.toml")
    )]
    MissingKey { key: String },

    /// A value deserialized but breaks a semantic rule.
    #[error("validation error: {message}")]
    #[diagnostic(code(lectern::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(lectern::config::other))]
    Other(String),
}

impl ConfigError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid values: {valid}"),
        None => format!("valid values: {valid}"),
    }
}

/// Converts a `figment::Error` (which may hold several errors) into diagnostics.
pub fn figment_to_config_errors(err: figment::Error, sources: &[SourceFile]) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let key = error
                .path
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(".");
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = locate(&error, field, sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::UnknownVariant(value, expected) => ConfigError::UnknownVariant {
                    key,
                    value: value.clone(),
                    suggestion: suggest_key(value, expected),
                    expected: expected.join(", "),
                },
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: if key.is_empty() {
                        field.to_string()
                    } else {
                        format!("{key}.{field}")
                    },
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key,
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn locate(
    error: &figment::error::Error,
    field: &str,
    sources: &[SourceFile],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let Some(file) = origin.and_then(|path| sources.iter().find(|f| f.path == path)) else {
        return (None, None);
    };

    let section: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
    match find_key_offset(&file.content, &section, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(&file.path, file.content.clone())),
        ),
        None => (None, None),
    }
}

/// Finds the byte offset of `field` inside the TOML table named by `path`.
///
/// Array indices in the path are skipped, so `["models", "0"]` matches the
/// first `[[models]]` header. Top-level fields are searched from the start.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let table: Vec<&str> = path
        .iter()
        .filter(|p| p.parse::<usize>().is_err())
        .map(String::as_str)
        .collect();

    let start = if table.is_empty() {
        0
    } else {
        let dotted = table.join(".");
        let header = [format!("[{dotted}]"), format!("[[{dotted}]]")]
            .into_iter()
            .filter_map(|h| content.find(&h).map(|pos| pos + h.len()))
            .min()?;
        header
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(after) = trimmed.strip_prefix(field) {
            if after.starts_with([' ', '\t', '=']) {
                return Some(offset + (line.len() - trimmed.len()));
            }
        }
        offset += line.len();
    }
    None
}

/// Suggests the closest valid key by Jaro-Winkler similarity, if any is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Renders diagnostics to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_min_confidence_for_typo() {
        let valid = &["min_confidence", "max_sections_per_model", "base_weight"];
        assert_eq!(
            suggest_key("min_confidense", valid),
            Some("min_confidence".to_string())
        );
    }

    #[test]
    fn suggests_provider_name() {
        let valid = &["openai", "anthropic", "gemini"];
        assert_eq!(suggest_key("antropic", valid), Some("anthropic".to_string()));
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["primary_weight", "secondary_weight"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn finds_key_in_nested_table() {
        let content = "[assignment]\nbase_weight = 0.5\n\n[providers.openai]\ntimeout = 3\n";
        let path = vec!["providers".to_string(), "openai".to_string()];
        let offset = find_key_offset(content, &path, "timeout").expect("offset");
        assert_eq!(&content[offset..offset + 7], "timeout");
    }

    #[test]
    fn finds_key_in_array_of_tables() {
        let content = "[[models]]\nid = \"gpt4\"\n  strength = \"x\"\n";
        let path = vec!["models".to_string(), "0".to_string()];
        let offset = find_key_offset(content, &path, "strength").expect("offset");
        assert_eq!(&content[offset..offset + 8], "strength");
    }

    #[test]
    fn missing_table_yields_none() {
        assert_eq!(
            find_key_offset("[logging]\nlevel = \"info\"\n", &["topic".to_string()], "level"),
            None
        );
    }
}
