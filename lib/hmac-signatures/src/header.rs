//!
//! Header names and the signed header set
//!

use crate::Error;
use http::{HeaderMap, HeaderName, HeaderValue};

/// Header carrying the client ID
pub static X_CLIENT_ID: HeaderName = HeaderName::from_static("x-client-id");

/// Header carrying the Base64 encoded HMAC
pub static X_SIGNATURE: HeaderName = HeaderName::from_static("x-signature");

/// Header carrying the Unix timestamp (in seconds) the signature was created at
pub static X_TIMESTAMP: HeaderName = HeaderName::from_static("x-timestamp");

/// Header carrying the tenant ID
pub static X_TENANT_ID: HeaderName = HeaderName::from_static("x-tenant-id");

static CONTENT_TYPE: HeaderName = http::header::CONTENT_TYPE;

/// Content type every signed request is sent with
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Freshly computed authentication headers of a single request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedHeaders {
    /// Value of `x-client-id`
    pub client_id: String,

    /// Value of `x-signature`
    pub signature: String,

    /// Value of `x-timestamp`
    pub timestamp: String,

    /// Value of `x-tenant-id`
    pub tenant_id: String,
}

impl SignedHeaders {
    /// Iterate over the headers, `Content-Type` included
    pub fn iter(&self) -> impl Iterator<Item = (&'static HeaderName, &str)> {
        [
            (&X_CLIENT_ID, self.client_id.as_str()),
            (&X_SIGNATURE, self.signature.as_str()),
            (&X_TIMESTAMP, self.timestamp.as_str()),
            (&X_TENANT_ID, self.tenant_id.as_str()),
            (&CONTENT_TYPE, CONTENT_TYPE_JSON),
        ]
        .into_iter()
    }

    /// Insert the headers into the map, replacing previous values
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), Error> {
        for (name, value) in self.iter() {
            headers.insert(name.clone(), HeaderValue::from_str(value)?);
        }

        Ok(())
    }

    /// Convert the headers into a fresh header map
    pub fn to_header_map(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::with_capacity(5);
        self.apply(&mut headers)?;
        Ok(headers)
    }
}
