//! INI file configuration adapter.
//!
//! Run configuration lives in an INI file:
//!
//! ```ini
//! [data]
//! file = bars.csv
//!
//! [strategy]
//! file = strategy.json
//!
//! [output]
//! file = report.json
//! pretty = true
//! ```

use configparser::ini::Ini;
use std::path::Path;

use crate::ports::config_port::ConfigPort;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[data]
file = bars.csv

[strategy]
file = strategy.json

[output]
file = report.json
pretty = yes
"#;

    #[test]
    fn from_string_reads_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("data", "file").as_deref(), Some("bars.csv"));
        assert_eq!(
            adapter.get_string("strategy", "file").as_deref(),
            Some("strategy.json")
        );
        assert_eq!(
            adapter.get_string("output", "file").as_deref(),
            Some("report.json")
        );
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("data", "file").as_deref(), Some("bars.csv"));
    }

    #[test]
    fn missing_key_is_none() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("data", "nope"), None);
    }

    #[test]
    fn get_bool_variants() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert!(adapter.get_bool("output", "pretty", false));
        assert!(!adapter.get_bool("output", "missing", false));
        assert!(adapter.get_bool("output", "missing", true));
    }

    #[test]
    fn get_bool_rejects_garbage() {
        let adapter = FileConfigAdapter::from_string("[output]\npretty = maybe\n").unwrap();
        assert!(adapter.get_bool("output", "pretty", true));
        assert!(!adapter.get_bool("output", "pretty", false));
    }
}
