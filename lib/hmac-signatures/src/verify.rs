use crate::{
    canonical::{self, Payload},
    clock::Clock,
    crypto::{self, SecretKey},
    header::{X_CLIENT_ID, X_SIGNATURE, X_TENANT_ID, X_TIMESTAMP},
    BoxError, Error,
};
use http::{request::Parts, HeaderMap, HeaderName};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default maximum distance between the signature timestamp and the verifier's clock
const DEFAULT_TOLERANCE: Duration = Duration::from_secs(5 * 60);

/// Server-side counterpart of the [`Signer`](crate::Signer)
#[derive(Clone, Debug)]
pub struct Verifier {
    clock: Clock,
    tolerance: Duration,
}

impl Default for Verifier {
    fn default() -> Self {
        Self {
            clock: Clock::default(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[inline]
fn header_str<'a>(headers: &'a HeaderMap, name: &'static HeaderName) -> Result<&'a str, Error> {
    let value = headers
        .get(name)
        .ok_or(Error::MissingHeader(name.as_str()))?;

    Ok(value.to_str()?)
}

impl Verifier {
    /// Construct a verifier with a five minute tolerance
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clock the timestamps are compared against
    #[must_use]
    pub fn with_clock(self, clock: Clock) -> Self {
        Self { clock, ..self }
    }

    /// Set how far the timestamp may be off in either direction
    #[must_use]
    pub fn tolerance(self, tolerance: Duration) -> Self {
        Self { tolerance, ..self }
    }

    /// Verify the signature of a request
    ///
    /// The secret is looked up through `get_secret`, which receives the client ID and the tenant ID
    ///
    /// # Errors
    ///
    /// - One of the authentication headers is missing or not valid UTF-8
    /// - The timestamp isn't a number or falls outside of the tolerance window
    /// - The secret lookup failed
    /// - The signature doesn't match
    #[instrument(skip_all, fields(method = %parts.method, uri = %parts.uri))]
    pub fn verify<F, E>(
        &self,
        parts: &Parts,
        body: Option<&Payload<'_>>,
        get_secret: F,
    ) -> Result<(), Error>
    where
        F: FnOnce(&str, &str) -> Result<String, E>,
        E: Into<BoxError>,
    {
        let client_id = header_str(&parts.headers, &X_CLIENT_ID)?;
        let tenant_id = header_str(&parts.headers, &X_TENANT_ID)?;
        let timestamp = header_str(&parts.headers, &X_TIMESTAMP)?;
        let signature = header_str(&parts.headers, &X_SIGNATURE)?;

        let issued_at: u64 = timestamp.parse().map_err(Error::InvalidTimestamp)?;
        let now = self.clock.unix_timestamp()?;
        if now.abs_diff(issued_at) > self.tolerance.as_secs() {
            debug!(issued_at, now, "timestamp outside of tolerance window");
            return Err(Error::ExpiredSignature);
        }

        let secret = get_secret(client_id, tenant_id).map_err(|err| Error::GetKey(err.into()))?;
        let key = SecretKey::new(secret.as_bytes());

        let material = canonical::signing_material(
            parts.method.as_str(),
            &parts.uri.to_string(),
            body,
            timestamp,
        )?;

        crypto::verify(material.as_bytes(), signature, &key)
    }
}
