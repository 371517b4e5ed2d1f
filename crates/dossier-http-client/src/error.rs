use std::{error::Error as StdError, fmt};
use tower::{timeout::error::Elapsed, BoxError};

/// Transport error
///
/// Opaque on purpose, callers only get to ask what kind of failure it was
pub struct Error {
    inner: BoxError,
}

impl Error {
    #[inline]
    pub(crate) fn new<E>(inner: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self {
            inner: inner.into(),
        }
    }

    /// Whether the request ran into the timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.inner.is::<Elapsed>()
    }

    /// Whether no connection to the remote could be established
    #[must_use]
    pub fn is_connect(&self) -> bool {
        self.inner
            .downcast_ref::<hyper_util::client::legacy::Error>()
            .is_some_and(hyper_util::client::legacy::Error::is_connect)
    }

    /// Signing failure that stopped the request from being sent
    #[must_use]
    pub fn signing_error(&self) -> Option<&hmac_signatures::Error> {
        self.inner.downcast_ref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}
