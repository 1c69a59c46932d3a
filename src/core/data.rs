//! Data-context loading for the command-line front end
//!
//! Templates render against a `serde_json::Value`. This module turns JSON,
//! YAML, or TOML documents into that shape.

use std::fmt::{self, Display};
use std::path::Path;
use std::str::FromStr;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::core::error::{Error, Result};

/// Supported data-context document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    Json,
    Yaml,
    Toml,
}

impl DataFormat {
    /// Get the string identifier for this format
    pub fn name(self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::Yaml => "yaml",
            DataFormat::Toml => "toml",
        }
    }

    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;
        ext.parse()
    }

    /// Get all available formats
    pub fn all() -> &'static [DataFormat] {
        &[DataFormat::Json, DataFormat::Yaml, DataFormat::Toml]
    }
}

impl Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DataFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(DataFormat::Json),
            "yaml" | "yml" => Ok(DataFormat::Yaml),
            "toml" => Ok(DataFormat::Toml),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Parse a data context from text in the given format
pub fn parse_context(content: &str, format: DataFormat) -> Result<JsonValue> {
    let value = match format {
        DataFormat::Json => serde_json::from_str(content)?,
        DataFormat::Yaml => serde_yaml::from_str(content)?,
        DataFormat::Toml => toml::from_str(content)?,
    };
    Ok(value)
}

/// Load a data context from a file, inferring the format unless one is given
pub fn load_context(path: &Path, format: Option<DataFormat>) -> Result<JsonValue> {
    let format = match format {
        Some(format) => format,
        None => DataFormat::from_path(path)?,
    };
    debug!("Loading {} data context from {}", format, path.display());
    let content = std::fs::read_to_string(path)?;
    parse_context(&content, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_format_from_str() {
        assert_eq!(DataFormat::from_str("json").unwrap(), DataFormat::Json);
        assert_eq!(DataFormat::from_str("YML").unwrap(), DataFormat::Yaml);
        assert_eq!(DataFormat::from_str("toml").unwrap(), DataFormat::Toml);
        assert!(matches!(
            DataFormat::from_str("xml"),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_format_display_round_trips() {
        for format in DataFormat::all() {
            assert_eq!(DataFormat::from_str(&format.to_string()).unwrap(), *format);
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DataFormat::from_path(Path::new("ctx/data.yaml")).unwrap(),
            DataFormat::Yaml
        );
        assert!(DataFormat::from_path(Path::new("data")).is_err());
    }

    #[test]
    fn test_parse_context_formats() {
        let expected = json!({"name": "World", "items": ["a", "b"]});

        let from_json = parse_context(r#"{"name":"World","items":["a","b"]}"#, DataFormat::Json);
        assert_eq!(from_json.unwrap(), expected);

        let from_yaml = parse_context("name: World\nitems:\n  - a\n  - b\n", DataFormat::Yaml);
        assert_eq!(from_yaml.unwrap(), expected);

        let from_toml = parse_context("name = \"World\"\nitems = [\"a\", \"b\"]\n", DataFormat::Toml);
        assert_eq!(from_toml.unwrap(), expected);
    }

    #[test]
    fn test_parse_context_invalid() {
        let err = parse_context("{ not json", DataFormat::Json).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_load_context_infers_format() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"count": 3}}"#).unwrap();

        let value = load_context(file.path(), None).unwrap();
        assert_eq!(value, json!({"count": 3}));
    }

    #[test]
    fn test_load_context_missing_file() {
        let err = load_context(Path::new("/nonexistent/ctx.json"), None).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
