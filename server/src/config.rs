use std::path::PathBuf;

use serde::Deserialize;

use crate::store::IdPolicy;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Backing file. Unset means the in-memory variant.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    #[serde(default)]
    pub id_policy: IdPolicy,
}

impl Config {
    /// Loads configuration from `TODO_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("TODO"))
            .build()?;
        Self::from_settings(settings)
    }

    pub fn from_settings(settings: config::Config) -> anyhow::Result<Self> {
        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_file: None,
            id_policy: IdPolicy::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}
