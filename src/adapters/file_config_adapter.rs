//! INI file configuration adapter.

use crate::domain::error::AutotradeError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AutotradeError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| AutotradeError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
source = csv
csv_dir = /var/lib/bars

[report]
output_path = out/analysis.png
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_string("data", "source"), Some("csv".to_string()));
        assert_eq!(
            adapter.get_string("report", "output_path"),
            Some("out/analysis.png".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[data]\nsource = yahoo\n").unwrap();
        assert_eq!(adapter.get_string("data", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value() {
        let adapter = FileConfigAdapter::from_string("[model]\nn_trees = 50\n").unwrap();
        assert_eq!(adapter.get_int("model", "n_trees", 0), 50);
    }

    #[test]
    fn get_int_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[model]\n").unwrap();
        assert_eq!(adapter.get_int("model", "missing", 42), 42);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[model]\nn_trees = abc\n").unwrap();
        assert_eq!(adapter.get_int("model", "n_trees", 42), 42);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter = FileConfigAdapter::from_string("[training]\ntest_ratio = 0.25\n").unwrap();
        assert!((adapter.get_double("training", "test_ratio", 0.0) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn get_double_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[training]\n").unwrap();
        assert_eq!(adapter.get_double("training", "missing", 99.9), 99.9);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[training]\ntest_ratio = not_a_number\n").unwrap();
        assert_eq!(adapter.get_double("training", "test_ratio", 0.2), 0.2);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[Model]\nN_Trees = 7\n").unwrap();
        assert_eq!(adapter.get_int("model", "n_trees", 0), 7);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[backtest]\nrisk_free_rate = 0.03\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert!((adapter.get_double("backtest", "risk_free_rate", 0.0) - 0.03).abs() < 1e-12);
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/autotrade.ini");
        assert!(matches!(result, Err(AutotradeError::ConfigParse { .. })));
    }
}
