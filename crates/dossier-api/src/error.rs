use http::StatusCode;
use miette::Diagnostic;
use sonic_rs::{JsonValueTrait, Value};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by every [`ApiClient`](crate::ApiClient) operation
///
/// Failures that never produced an HTTP response report a status of `0`
#[derive(Debug, Diagnostic, Error)]
pub enum ApiError {
    /// The client configuration is unusable
    #[error("Invalid client configuration")]
    #[diagnostic(help("check the base URL, client ID and secret key"))]
    Configuration(#[source] BoxError),

    /// The request couldn't be constructed (query, body or URL)
    #[error("Invalid request")]
    InvalidRequest(#[source] BoxError),

    /// The request couldn't be signed
    #[error("Failed to sign request")]
    Signing(#[source] dossier_http_client::Error),

    /// The request never reached the server, or the response never arrived in full
    #[error("{message}")]
    Network {
        /// Message of the transport error
        message: String,
        /// Whether the request ran into the configured timeout
        timed_out: bool,
        /// Transport error
        #[source]
        source: dossier_http_client::Error,
    },

    /// The server answered with a non-success status
    #[error("{message}")]
    Http {
        /// Status of the response
        status: StatusCode,
        /// Message taken from the response body, or a generic fallback
        message: String,
        /// Parsed response body, if it was JSON
        data: Option<Value>,
    },

    /// The server answered with a success status but the body wasn't what was asked for
    #[error("{message}")]
    MalformedResponse {
        /// Status of the response
        status: StatusCode,
        /// Description of the decoding failure
        message: String,
    },
}

impl ApiError {
    pub(crate) fn configuration<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Configuration(error.into())
    }

    pub(crate) fn invalid_request<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::InvalidRequest(error.into())
    }

    pub(crate) fn from_transport(error: dossier_http_client::Error) -> Self {
        if error.signing_error().is_some() {
            return Self::Signing(error);
        }

        Self::Network {
            message: error.to_string(),
            timed_out: error.is_timeout(),
            source: error,
        }
    }

    pub(crate) fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let data: Option<Value> = if body.is_empty() {
            None
        } else {
            sonic_rs::from_slice(body).ok()
        };

        let message = data
            .as_ref()
            .and_then(extract_message)
            .unwrap_or_else(|| format!("Request failed with status {status}"));

        Self::Http {
            status,
            message,
            data,
        }
    }

    /// HTTP status of the failure, `0` if no response was received
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Http { status, .. } | Self::MalformedResponse { status, .. } => status.as_u16(),
            Self::Configuration(..)
            | Self::InvalidRequest(..)
            | Self::Signing(..)
            | Self::Network { .. } => 0,
        }
    }

    /// Human-readable message of the failure
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Parsed body of the error response
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Http { data, .. } => data.as_ref(),
            _ => None,
        }
    }

    /// Whether the request never got a response
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Whether the request ran into the configured timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { timed_out: true, .. })
    }

    /// Whether the server rejected the credentials or the signature
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == StatusCode::UNAUTHORIZED.as_u16()
    }
}

fn extract_message(data: &Value) -> Option<String> {
    ["message", "error"]
        .into_iter()
        .find_map(|key| data.get(key).and_then(|value| value.as_str()))
        .filter(|message| !message.is_empty())
        .map(ToOwned::to_owned)
}
