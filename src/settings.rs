//! Optional keyword settings resource
//!
//! A JSON file can supply the suggested split keywords and the default
//! keyword. A missing or malformed file is never fatal; the built-in list
//! takes over with a warning.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::config::{BUILTIN_KEYWORDS, DEFAULT_KEYWORD};

#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    splitter: SplitterSection,
}

#[derive(Debug, Clone, Deserialize)]
struct SplitterSection {
    defaults: DefaultsSection,
}

#[derive(Debug, Clone, Deserialize)]
struct DefaultsSection {
    split_keyword: Option<String>,
    available_keywords: Vec<String>,
}

/// Resolved keyword settings, from the settings file or the built-in fallback
#[derive(Debug, Clone)]
pub struct KeywordSettings {
    pub default_keyword: String,
    pub available_keywords: Vec<String>,
}

impl Default for KeywordSettings {
    fn default() -> Self {
        Self {
            default_keyword: DEFAULT_KEYWORD.to_string(),
            available_keywords: BUILTIN_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl KeywordSettings {
    /// Load settings from a JSON file, falling back to the built-in list on
    /// any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<SettingsFile>(&raw) {
                Ok(file) => {
                    let defaults = file.splitter.defaults;
                    if defaults.available_keywords.is_empty() {
                        warn!(
                            "Settings file '{}' lists no keywords, using built-in list",
                            path.display()
                        );
                        return Self::default();
                    }
                    Self {
                        default_keyword: defaults
                            .split_keyword
                            .unwrap_or_else(|| DEFAULT_KEYWORD.to_string()),
                        available_keywords: defaults.available_keywords,
                    }
                }
                Err(e) => {
                    warn!(
                        "Could not parse settings file '{}': {}, using built-in keywords",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!(
                    "Could not read settings file '{}': {}, using built-in keywords",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn valid_settings_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keywords.json");
        std::fs::write(
            &path,
            r#"{ "splitter": { "defaults": {
                "split_keyword": "M02",
                "available_keywords": ["M02", "END"]
            } } }"#,
        )
        .unwrap();

        let settings = KeywordSettings::load(&path);
        assert_eq!(settings.default_keyword, "M02");
        assert_eq!(settings.available_keywords, vec!["M02", "END"]);
    }

    #[test]
    fn missing_default_keyword_falls_back_to_m30() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keywords.json");
        std::fs::write(
            &path,
            r#"{ "splitter": { "defaults": { "available_keywords": ["END"] } } }"#,
        )
        .unwrap();

        let settings = KeywordSettings::load(&path);
        assert_eq!(settings.default_keyword, "M30");
        assert_eq!(settings.available_keywords, vec!["END"]);
    }

    #[test]
    fn absent_file_falls_back_to_builtin_list() {
        let settings = KeywordSettings::load("/nonexistent/keywords.json");
        assert_eq!(settings.default_keyword, "M30");
        assert_eq!(settings.available_keywords.len(), BUILTIN_KEYWORDS.len());
        assert_eq!(settings.available_keywords[0], "M30");
    }

    #[test]
    fn malformed_json_falls_back_to_builtin_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keywords.json");
        std::fs::write(&path, "{ not json").unwrap();

        let settings = KeywordSettings::load(&path);
        assert_eq!(settings.default_keyword, "M30");
        assert!(settings.available_keywords.contains(&"REWIND".to_string()));
    }

    #[test]
    fn empty_keyword_list_falls_back_to_builtin_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keywords.json");
        std::fs::write(
            &path,
            r#"{ "splitter": { "defaults": { "available_keywords": [] } } }"#,
        )
        .unwrap();

        let settings = KeywordSettings::load(&path);
        assert_eq!(settings.available_keywords.len(), BUILTIN_KEYWORDS.len());
    }
}
