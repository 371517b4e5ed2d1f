use crate::BoxError;
use http::{
    header::{InvalidHeaderValue, ToStrError},
    uri::InvalidUri,
};
use miette::Diagnostic;
use std::{num::ParseIntError, time::SystemTimeError};
use thiserror::Error;

/// Signing and verification error
#[derive(Debug, Diagnostic, Error)]
pub enum Error {
    /// Failed to decode the Base64 signature
    #[error(transparent)]
    Base64(#[from] base64_simd::Error),

    /// Timestamp is outside of the accepted window
    #[error("Signature is expired")]
    ExpiredSignature,

    /// Couldn't get the secret from the user-provided closure
    #[error(transparent)]
    GetKey(BoxError),

    /// Header had an invalid value (non-UTF8 value)
    #[error(transparent)]
    HttpHeaderToStr(#[from] ToStrError),

    /// Value can't be used as an HTTP header value
    #[error(transparent)]
    InvalidHeaderValue(#[from] InvalidHeaderValue),

    /// Signature doesn't match the request
    #[error("Invalid signature")]
    InvalidSignature,

    /// Timestamp header isn't a decimal number of seconds
    #[error("Invalid timestamp")]
    InvalidTimestamp(#[source] ParseIntError),

    /// URL failed to parse
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUri),

    /// JSON body failed to serialise
    #[error(transparent)]
    Json(#[from] sonic_rs::Error),

    /// Client ID is empty
    #[error("Missing client ID")]
    #[diagnostic(help("set a non-empty client ID before constructing the signer"))]
    MissingClientId,

    /// Header is missing from the request
    #[error("Missing header: {0}")]
    MissingHeader(&'static str),

    /// Secret key is empty
    #[error("Missing secret key")]
    #[diagnostic(help("set a non-empty secret key before constructing the signer"))]
    MissingSecretKey,

    /// System clock is set before the Unix epoch
    #[error(transparent)]
    SystemTime(#[from] SystemTimeError),
}

impl Error {
    /// Whether the error stems from invalid signer configuration
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingClientId | Self::MissingSecretKey)
    }
}
