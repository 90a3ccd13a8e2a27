//! Engine configuration from the environment.
//!
//! `.env.local` / `.env` at the repository root are loaded by the binary
//! before [`EngineConfig::from_env`] runs.

use std::path::PathBuf;

pub const DATA_DIR_VAR: &str = "SHEETFORGE_DATA_DIR";
pub const POST_ROLLS_VAR: &str = "SHEETFORGE_POST_ROLLS";
pub const LOG_VAR: &str = "SHEETFORGE_LOG";

pub const DEFAULT_DATA_DIR: &str = "data/actors";
pub const DEFAULT_LOG_FILTER: &str = "sheetforge_engine=info,sheetforge_domain=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory holding one JSON file per actor
    pub data_dir: PathBuf,
    /// Publish roll results to chat unless a roll suppresses it
    pub post_rolls: bool,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            post_rolls: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset or blank values use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let post_rolls = match read(POST_ROLLS_VAR) {
            Some(value) => parse_flag(&value).unwrap_or_else(|| {
                tracing::warn!(
                    variable = POST_ROLLS_VAR,
                    value = %value,
                    "Unrecognised boolean, using default"
                );
                defaults.post_rolls
            }),
            None => defaults.post_rolls,
        };

        Self {
            data_dir: read(DATA_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            post_rolls,
            log_filter: read(LOG_VAR).unwrap_or(defaults.log_filter),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config(&[]), EngineConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            (DATA_DIR_VAR, "/tmp/sheets"),
            (POST_ROLLS_VAR, "off"),
            (LOG_VAR, "sheetforge_domain=trace"),
        ]);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/sheets"));
        assert!(!config.post_rolls);
        assert_eq!(config.log_filter, "sheetforge_domain=trace");
    }

    #[test]
    fn invalid_flag_keeps_default() {
        assert!(config(&[(POST_ROLLS_VAR, "sometimes")]).post_rolls);
        assert_eq!(config(&[(DATA_DIR_VAR, "  ")]).data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }
}
