//! Configuration loading and parsing

use anyhow::{Context, Result};
use can_codec::CodecConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub codec: CodecConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default)]
    pub dbc_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    // DBC paths are relative to the config file
    if let Some(base) = path.parent() {
        for dbc in &mut config.input.dbc_files {
            if dbc.is_relative() {
                *dbc = base.join(&*dbc);
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_codec::RangePolicy;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            dbc_files = ["powertrain.dbc", "body.dbc"]

            [output]
            format = "json"

            [codec]
            range_policy = "enforce"
            allow_truncated = true
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.dbc_files.len(), 2);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.codec.range_policy, RangePolicy::Enforce);
        assert!(config.codec.allow_truncated);
        assert!(config.codec.strict);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.input.dbc_files.is_empty());
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.codec, CodecConfig::default());
    }

    #[test]
    fn test_load_config_resolves_dbc_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[input]\ndbc_files = [\"motohawk.dbc\", \"/abs/signed.dbc\"]").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.input.dbc_files[0], dir.path().join("motohawk.dbc"));
        assert_eq!(config.input.dbc_files[1], PathBuf::from("/abs/signed.dbc"));
    }

    #[test]
    fn test_load_missing_config() {
        let err = load_config(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
