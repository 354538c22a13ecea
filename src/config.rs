//! Environment-backed defaults.
//!
//! `.env` is read once (if present); explicit CLI flags always win over
//! these values.

use std::path::PathBuf;

pub const ENV_RAW_CSV: &str = "WDI_RAW_CSV";
pub const ENV_FEATURES_DIR: &str = "WDI_FEATURES_DIR";
pub const DEFAULT_FEATURES_DIR: &str = "data/processed/features";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Raw wide CSV used by `build`/`validate` when `-f` is not given.
    pub raw_csv: Option<PathBuf>,
    /// Directory holding the persisted feature tables.
    pub features_dir: PathBuf,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(
            std::env::var(ENV_RAW_CSV).ok(),
            std::env::var(ENV_FEATURES_DIR).ok(),
        )
    }

    fn from_vars(raw_csv: Option<String>, features_dir: Option<String>) -> Self {
        let non_empty =
            |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            raw_csv: non_empty(raw_csv).map(PathBuf::from),
            features_dir: non_empty(features_dir)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FEATURES_DIR)),
        }
    }

    /// `flag` if given, else the configured features directory.
    pub fn features_dir_or(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| self.features_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let cfg = EnvConfig::from_vars(None, Some("  ".into()));
        assert_eq!(cfg.raw_csv, None);
        assert_eq!(cfg.features_dir, PathBuf::from(DEFAULT_FEATURES_DIR));
    }

    #[test]
    fn flags_override_environment() {
        let cfg = EnvConfig::from_vars(Some("raw.csv".into()), Some("out".into()));
        assert_eq!(cfg.raw_csv, Some(PathBuf::from("raw.csv")));
        assert_eq!(cfg.features_dir_or(None), PathBuf::from("out"));
        assert_eq!(cfg.features_dir_or(Some("cli".into())), PathBuf::from("cli"));
    }
}
