use pf_proforma_core::proforma::ModelConfig;
use pf_proforma_core::store::StoreLocation;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file read when `--config` is not given.
pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.yaml";

/// Environment variable overriding the store location (path or `sqlite:` URL).
pub const DB_ENV_VAR: &str = "PROFORMA_DB";

/// Top-level settings file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: ModelConfig,
    pub database: DatabaseSettings,
    pub reports: ReportSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Store URL, e.g. `sqlite:///db/proforma.db`. Takes precedence over `path`.
    pub url: Option<String>,
    /// JSON store file used when no URL is set.
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            path: PathBuf::from("db/proforma.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub dir: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reports"),
        }
    }
}

impl Settings {
    /// Load settings from an explicit path, or from the default path if it
    /// exists. An explicit path that cannot be read is an error; a missing
    /// default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_SETTINGS_PATH), false),
        };

        if !path.exists() {
            if required {
                return Err(format!("Settings file not found: {}", path.display()).into());
            }
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
        Self::from_yaml_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e).into())
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    /// Store location: `--db` flag, then `PROFORMA_DB`, then `database.url`,
    /// then `database.path`.
    pub fn resolve_store(
        &self,
        flag: Option<String>,
    ) -> Result<StoreLocation, pf_proforma_core::ProjectFinanceError> {
        StoreLocation::parse(&self.resolve_store_with(flag, std::env::var(DB_ENV_VAR).ok()))
    }

    fn resolve_store_with(&self, flag: Option<String>, env: Option<String>) -> String {
        flag.into_iter()
            .chain(env)
            .chain(self.database.url.clone())
            .find(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.database.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = Settings::from_yaml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.model.discount_rate, dec!(0.08));
        assert_eq!(settings.database.path, PathBuf::from("db/proforma.json"));
        assert_eq!(settings.database.url, None);
        assert_eq!(settings.reports.dir, PathBuf::from("reports"));
    }

    #[test]
    fn test_partial_model_section_keeps_other_defaults() {
        let yaml = "model:\n  discount_rate: 0.07\n  project_life_years: 30\n";
        let settings = Settings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.model.discount_rate, dec!(0.07));
        assert_eq!(settings.model.project_life_years, 30);
        assert_eq!(settings.model.tax_rate, dec!(0.21));
        assert_eq!(settings.model.opex_escalation, dec!(0.02));
    }

    #[test]
    fn test_database_and_reports_sections() {
        let yaml = "database:\n  path: /tmp/pf.json\nreports:\n  dir: out\n";
        let settings = Settings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.database.path, PathBuf::from("/tmp/pf.json"));
        assert_eq!(settings.reports.dir, PathBuf::from("out"));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(Settings::from_yaml_str("model: [not, a, map]").is_err());
    }

    #[test]
    fn test_store_precedence() {
        let mut settings = Settings::default();
        let flag = Some("flag.json".to_string());
        let env = Some("sqlite:///env.db".to_string());

        assert_eq!(settings.resolve_store_with(flag.clone(), env.clone()), "flag.json");
        assert_eq!(settings.resolve_store_with(None, env.clone()), "sqlite:///env.db");
        assert_eq!(settings.resolve_store_with(None, None), "db/proforma.json");

        settings.database.url = Some("sqlite:///db/proforma.db".into());
        assert_eq!(settings.resolve_store_with(None, None), "sqlite:///db/proforma.db");
        assert_eq!(settings.resolve_store_with(None, env), "sqlite:///env.db");
        assert_eq!(
            settings.resolve_store_with(Some(String::new()), None),
            "sqlite:///db/proforma.db"
        );
    }

    #[test]
    fn test_database_url_selects_sqlite() {
        let yaml = "database:\n  url: sqlite:///db/proforma.db\n";
        let settings = Settings::from_yaml_str(yaml).unwrap();
        assert_eq!(
            StoreLocation::parse(&settings.resolve_store_with(None, None)).unwrap(),
            StoreLocation::Sqlite(PathBuf::from("db/proforma.db"))
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("pf_proforma_no_such_settings.yaml");
        assert!(Settings::load(Some(&path)).is_err());
    }
}
