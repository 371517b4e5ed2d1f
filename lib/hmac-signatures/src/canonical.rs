//!
//! Construction of the signing material
//!
//! Write requests carrying a body sign the body, everything else signs the request path.
//! The server strips the `/api` routing prefix before it verifies, so the signer does as well.
//!

use crate::Error;
use http::Uri;
use sonic_rs::{JsonValueTrait, Value};
use std::borrow::Cow;

const API_PREFIX: &str = "/api";
const BODY_SIGNED_METHODS: &[&str] = &["POST", "PUT", "PATCH", "DELETE"];

/// Request body as handed to the signer
#[derive(Clone, Copy, Debug)]
pub enum Payload<'a> {
    /// Already parsed JSON value
    Json(&'a Value),

    /// JSON text
    ///
    /// Parsed and re-serialised before signing. Text that isn't valid JSON is signed verbatim.
    Text(&'a str),
}

impl<'a> Payload<'a> {
    /// Whether the payload counts as a body
    ///
    /// Follows the truthiness rules of the JavaScript clients: `null`, `false`, `0` and empty strings don't.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::Json(value) => is_truthy(value),
        }
    }

    /// Canonical JSON string of the payload
    ///
    /// Keys keep their original order. They are *not* sorted, the verifier relies on the exact byte sequence.
    pub fn canonical(&self) -> Result<Cow<'a, str>, Error> {
        match *self {
            Self::Json(value) => Ok(Cow::Owned(sonic_rs::to_string(value)?)),
            Self::Text(text) => {
                let reserialised = sonic_rs::from_str::<Value>(text)
                    .and_then(|value| sonic_rs::to_string(&value));

                Ok(reserialised.map_or(Cow::Borrowed(text), Cow::Owned))
            }
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    if value.is_null() {
        return false;
    }

    if let Some(boolean) = value.as_bool() {
        return boolean;
    }

    if let Some(number) = value.as_f64() {
        return number.abs() > 0.0;
    }

    value.as_str() != Some("")
}

/// Whether requests with this method sign their body instead of their path
#[must_use]
pub fn signs_body(method: &str) -> bool {
    BODY_SIGNED_METHODS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(method))
}

/// Canonical path of the URL
///
/// Scheme, authority and query are dropped, a leading `/api/` loses its `/api` and the result is lower-cased
pub fn path(url: &str) -> Result<String, Error> {
    let uri: Uri = url.parse()?;
    let path = uri.path();
    let path = path
        .strip_prefix(API_PREFIX)
        .filter(|rest| rest.starts_with('/'))
        .unwrap_or(path);

    Ok(path.to_lowercase())
}

/// Construct the string the HMAC is computed over
pub fn signing_material(
    method: &str,
    url: &str,
    body: Option<&Payload<'_>>,
    timestamp: &str,
) -> Result<String, Error> {
    let mut material = match body.filter(|body| signs_body(method) && body.is_present()) {
        Some(body) => body.canonical()?.into_owned(),
        None => path(url)?,
    };
    material.push_str(timestamp);

    Ok(material)
}
