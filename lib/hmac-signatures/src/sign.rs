use crate::{
    canonical::{self, Payload},
    clock::Clock,
    crypto::{self, SecretKey},
    Error, SignedHeaders,
};
use std::fmt;
use tracing::instrument;

/// Credentials a signer is constructed from
#[derive(Clone)]
pub struct SignerConfig {
    /// Identifier of the client, sent along in plain text
    pub client_id: String,

    /// Secret shared with the server
    pub secret_key: String,

    /// Tenant the requests are made on behalf of
    pub tenant_id: String,
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerConfig")
            .field("client_id", &self.client_id)
            .field("secret_key", &"[redacted]")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Request signer
///
/// Holds the credentials for its whole lifetime and never hands the secret back out
#[derive(Clone)]
pub struct Signer {
    client_id: String,
    tenant_id: String,
    key: SecretKey,
    clock: Clock,
}

impl Signer {
    /// Construct a new signer reading timestamps from the system clock
    ///
    /// # Errors
    ///
    /// - The client ID is empty
    /// - The secret key is empty
    pub fn new(config: SignerConfig) -> Result<Self, Error> {
        if config.client_id.is_empty() {
            return Err(Error::MissingClientId);
        }

        if config.secret_key.is_empty() {
            return Err(Error::MissingSecretKey);
        }

        Ok(Self {
            key: SecretKey::new(config.secret_key.as_bytes()),
            client_id: config.client_id,
            tenant_id: config.tenant_id,
            clock: Clock::default(),
        })
    }

    /// Replace the clock timestamps are read from
    #[must_use]
    pub fn with_clock(self, clock: Clock) -> Self {
        Self { clock, ..self }
    }

    /// Client ID the headers are generated for
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Tenant ID the headers are generated for
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Generate the authentication headers for a request, timestamped with the current time
    ///
    /// # Errors
    ///
    /// - The clock is set before the Unix epoch
    /// - The URL failed to parse
    /// - The body failed to serialise
    pub fn generate_headers(
        &self,
        method: &str,
        url: &str,
        body: Option<&Payload<'_>>,
    ) -> Result<SignedHeaders, Error> {
        let timestamp = self.clock.unix_timestamp()?;
        self.generate_headers_at(method, url, body, timestamp)
    }

    /// Generate the authentication headers for a request with an explicit Unix timestamp (in seconds)
    ///
    /// # Errors
    ///
    /// - The URL failed to parse
    /// - The body failed to serialise
    #[instrument(level = "debug", skip_all, fields(%method, %timestamp))]
    pub fn generate_headers_at(
        &self,
        method: &str,
        url: &str,
        body: Option<&Payload<'_>>,
        timestamp: u64,
    ) -> Result<SignedHeaders, Error> {
        let timestamp = timestamp.to_string();
        let material = canonical::signing_material(method, url, body, &timestamp)?;
        let signature = crypto::sign(material.as_bytes(), &self.key);

        Ok(SignedHeaders {
            client_id: self.client_id.clone(),
            signature,
            timestamp,
            tenant_id: self.tenant_id.clone(),
        })
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("client_id", &self.client_id)
            .field("tenant_id", &self.tenant_id)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
