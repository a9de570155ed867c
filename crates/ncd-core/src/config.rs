//! Run configuration
//!
//! TOML-based. Every key is optional and defaults to the values the
//! `ncdmatch` binary uses when no configuration file is given.

use crate::compressor::{self, Compressor};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NcdConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Distance computation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Compressor name or alias
    #[serde(default = "default_compressor")]
    pub compressor: String,
    /// Compute candidate distances on the rayon pool
    #[serde(default)]
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compressor: default_compressor(),
            parallel: false,
        }
    }
}

fn default_compressor() -> String {
    "zlib".to_string()
}

/// Where fingerprints are found
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CorpusConfig {
    #[serde(default = "default_database_dir")]
    pub database_dir: String,
    #[serde(default = "default_query_dir")]
    pub query_dir: String,
    /// Fingerprint file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Keep only the first fingerprint of each genre directory
    #[serde(default = "default_single_member_groups")]
    pub single_member_groups: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            database_dir: default_database_dir(),
            query_dir: default_query_dir(),
            extension: default_extension(),
            single_member_groups: default_single_member_groups(),
        }
    }
}

fn default_database_dir() -> String {
    "database/".to_string()
}
fn default_query_dir() -> String {
    "queries/".to_string()
}
fn default_extension() -> String {
    "freqs".to_string()
}
fn default_single_member_groups() -> bool {
    true
}

/// Result sink
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> String {
    "results/results.csv".to_string()
}

impl NcdConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: NcdConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?;
        Ok(config)
    }

    /// Validate configuration and resolve the compressor
    pub fn validate(&self) -> anyhow::Result<&'static dyn Compressor> {
        let backend = compressor::resolve(&self.engine.compressor)?;
        if self.corpus.extension.trim_start_matches('.').is_empty() {
            anyhow::bail!("corpus.extension must not be empty");
        }
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NcdError;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = NcdConfig::default();
        assert_eq!(config.engine.compressor, "zlib");
        assert!(!config.engine.parallel);
        assert_eq!(config.corpus.database_dir, "database/");
        assert_eq!(config.corpus.query_dir, "queries/");
        assert_eq!(config.corpus.extension, "freqs");
        assert!(config.corpus.single_member_groups);
        assert_eq!(config.output.path, "results/results.csv");
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
            [engine]
            compressor = "lz4"
            parallel = true

            [corpus]
            database_dir = "./refs"
            single_member_groups = false
        "#;

        let config: NcdConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.compressor, "lz4");
        assert!(config.engine.parallel);
        assert_eq!(config.corpus.database_dir, "./refs");
        assert_eq!(config.corpus.query_dir, "queries/");
        assert!(!config.corpus.single_member_groups);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: NcdConfig = toml::from_str("").unwrap();
        assert_eq!(config, NcdConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\ncompressor = \"gzip\"\n\n[output]\npath = \"out.csv\"").unwrap();

        let config = NcdConfig::load(file.path()).unwrap();
        assert_eq!(config.engine.compressor, "gzip");
        assert_eq!(config.output.path, "out.csv");
        assert_eq!(config.validate().unwrap().name(), "zlib");
    }

    #[test]
    fn test_load_missing_file() {
        assert!(NcdConfig::load(Path::new("/nonexistent/ncd.toml")).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_compressor() {
        let mut config = NcdConfig::default();
        config.engine.compressor = "brotli".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NcdError>(),
            Some(NcdError::UnknownCompressor { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_extension() {
        let mut config = NcdConfig::default();
        config.corpus.extension = ".".to_string();
        assert!(config.validate().is_err());
    }
}
