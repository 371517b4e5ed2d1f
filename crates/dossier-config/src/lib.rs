#![forbid(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, forbidden_lint_groups)]

pub mod api;
pub mod logging;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    pub api: api::Configuration,
    #[serde(default)]
    pub logging: logging::Configuration,
}

impl Configuration {
    pub async fn load<P>(path: P) -> eyre::Result<Self>
    where
        P: AsRef<Path>,
    {
        let content = fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> eyre::Result<Self> {
        toml::from_str(content).map_err(eyre::Report::from)
    }

    /// Read the configuration from `DOSSIER_`-prefixed environment variables
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            api: api::Configuration::from_env()?,
            logging: logging::Configuration::default(),
        })
    }
}
