//! Configuration loader - YAML manifest + .env secrets

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main configuration loaded from datasets.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub datasets: Vec<DatasetSource>,
}

/// One profiled dataset collection and the raw texts it exposes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSource {
    pub id: String,
    pub name: String,
    /// Newline-delimited coordinate rows (up to 3 floats each)
    pub coordinates_url: String,
    /// Newline-delimited point names, row-aligned with the coordinates
    pub labels_url: String,
    /// Similarity CSV: header line + `row,col,value` lines
    pub similarity_url: String,
    /// Named score sets: score-set id -> `label:value` text URL
    #[serde(default)]
    pub scores: HashMap<String, String>,
}

/// Secrets loaded from .env
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub data_dir: String,
    /// Base URL of the profiler server, for score-set lookups
    pub profiler_base: Option<String>,
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Get dataset collection by ID
    pub fn get_dataset(&self, id: &str) -> Option<&DatasetSource> {
        self.datasets.iter().find(|d| d.id == id)
    }
}

impl Secrets {
    /// Load secrets from .env file
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Secrets {
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            profiler_base: std::env::var("PROFILER_BASE").ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_lookup() {
        let config = Config {
            datasets: vec![DatasetSource {
                id: "iris".to_string(),
                name: "Iris splits".to_string(),
                coordinates_url: "http://localhost/coords".to_string(),
                labels_url: "http://localhost/labels".to_string(),
                similarity_url: "http://localhost/sm".to_string(),
                scores: HashMap::new(),
            }],
        };
        assert!(config.get_dataset("iris").is_some());
        assert!(config.get_dataset("missing").is_none());
    }

    #[test]
    fn test_manifest_parses_without_scores() {
        let yaml = r#"
datasets:
  - id: iris
    name: Iris splits
    coordinates_url: http://localhost/coords
    labels_url: http://localhost/labels
    similarity_url: http://localhost/sm
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.datasets.len(), 1);
        assert!(config.datasets[0].scores.is_empty());
    }
}
