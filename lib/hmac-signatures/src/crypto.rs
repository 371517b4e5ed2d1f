//!
//! HMAC-SHA256 primitives
//!

use crate::Error;
use ring::hmac;
use std::fmt;

/// Shared secret used for signing and verifying
#[derive(Clone)]
pub struct SecretKey {
    inner: hmac::Key,
}

impl SecretKey {
    /// Construct an HMAC-SHA256 key from the raw secret
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            inner: hmac::Key::new(hmac::HMAC_SHA256, secret),
        }
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey").finish_non_exhaustive()
    }
}

/// Compute the HMAC of the message and encode it in Base64
#[inline]
#[must_use]
pub fn sign(msg: &[u8], key: &SecretKey) -> String {
    base64_simd::STANDARD.encode_to_string(hmac::sign(&key.inner, msg))
}

/// Verify the Base64 encoded HMAC against the message in constant time
#[inline]
pub fn verify(msg: &[u8], encoded_signature: &str, key: &SecretKey) -> Result<(), Error> {
    let signature = base64_simd::STANDARD.decode_to_vec(encoded_signature)?;
    hmac::verify(&key.inner, msg, &signature).map_err(|_| Error::InvalidSignature)
}
