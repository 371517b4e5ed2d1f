use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::{fmt, time::Duration};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Backend the client talks to and the credentials it signs with
///
/// The snake_case aliases exist for `envy`, which lower-cases the variable names
#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    #[serde(alias = "base_url")]
    pub base_url: SmolStr,
    #[serde(alias = "client_id")]
    pub client_id: SmolStr,
    #[serde(alias = "secret_key")]
    pub secret_key: SmolStr,
    #[serde(alias = "tenant_id")]
    pub tenant_id: SmolStr,
    #[serde(alias = "timeout_ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(alias = "max_concurrent_requests", default)]
    pub max_concurrent_requests: Option<usize>,
}

impl Configuration {
    /// Read the configuration from `DOSSIER_BASE_URL`, `DOSSIER_CLIENT_ID`, etc.
    pub fn from_env() -> eyre::Result<Self> {
        envy::prefixed("DOSSIER_")
            .from_env()
            .map_err(eyre::Report::from)
    }

    /// Request timeout, a zero value falls back to the 30 second default
    #[must_use]
    pub fn timeout(&self) -> Duration {
        let timeout_ms = if self.timeout_ms == 0 {
            DEFAULT_TIMEOUT_MS
        } else {
            self.timeout_ms
        };

        Duration::from_millis(timeout_ms)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("secret_key", &"[redacted]")
            .field("tenant_id", &self.tenant_id)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .finish()
    }
}
