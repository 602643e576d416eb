use crate::constants::{CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE, DEFAULT_LOG_DIR, DEFAULT_TABLE_NAME};
use crate::error::{EtlError, Result};
use crate::pipeline::cleaner::CategorySchema;
use crate::pipeline::loader::CsvOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Output table, replaced on every run
    pub table_name: String,
    /// Field delimiter of both input files
    pub delimiter: char,
    pub log_dir: PathBuf,
    /// Declared category names. When absent they are read from the first row.
    pub categories: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            delimiter: ',',
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            categories: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`, the file named by `DISASTER_ETL_CONFIG`,
    /// or `disaster_etl.toml` in the working directory, in that order.
    /// Falls back to defaults when none of them is present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => match std::env::var(CONFIG_ENV_VAR) {
                Ok(v) if !v.trim().is_empty() => Some(PathBuf::from(v)),
                _ => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
            },
        };

        let Some(config_path) = config_path else {
            return Ok(Self::default());
        };
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            EtlError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(EtlError::Config("table_name must not be empty".to_string()));
        }
        if !self.delimiter.is_ascii() {
            return Err(EtlError::Config(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }
        self.category_schema()?;
        Ok(())
    }

    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            delimiter: self.delimiter as u8,
        }
    }

    pub fn category_schema(&self) -> Result<Option<CategorySchema>> {
        self.categories
            .as_ref()
            .map(|names| CategorySchema::new(names.iter().cloned()))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.table_name, "df");
        assert_eq!(config.csv_options().delimiter, b',');
        assert!(config.category_schema().unwrap().is_none());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            table_name = "messages"
            delimiter = ";"
            log_dir = "/tmp/etl-logs"
            categories = ["related", "request", "offer"]
            "#,
        )
        .unwrap();

        assert_eq!(config.table_name, "messages");
        assert_eq!(config.csv_options().delimiter, b';');
        assert_eq!(config.log_dir, PathBuf::from("/tmp/etl-logs"));
        let schema = config.category_schema().unwrap().unwrap();
        assert_eq!(schema.names(), ["related", "request", "offer"]);
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let err = Config::from_toml("delimiter = \"é\"").unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }

    #[test]
    fn test_rejects_duplicate_declared_categories() {
        let err = Config::from_toml("categories = [\"a\", \"a\"]").unwrap_err();
        assert!(matches!(err, EtlError::DuplicateColumn(_)));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(matches!(
            Config::from_toml("tabel_name = \"x\"").unwrap_err(),
            EtlError::Toml(_)
        ));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/disaster_etl.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
