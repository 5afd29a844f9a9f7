use serde::Deserialize;
use std::{env, error::Error, fs, path::Path};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: "data/sample_transactions.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
}

impl Config {
    /// Load configuration from a YAML file, falling back to defaults when the
    /// file does not exist. `SERVER_ADDRESS` and `DATASET_PATH` environment
    /// variables override file values.
    pub fn load(config_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let mut config = if Path::new(config_path).exists() {
            let contents = fs::read_to_string(config_path)?;
            serde_yml::from_str(&contents)?
        } else {
            Config::default()
        };
        config.apply_env_overrides();

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(address) = env::var("SERVER_ADDRESS") {
            self.server.address = address;
        }
        if let Ok(path) = env::var("DATASET_PATH") {
            self.dataset.path = path;
        }
    }
}
