#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

use hmac_signatures::{Payload, Signer};
use http::{
    header::{HeaderName, USER_AGENT},
    HeaderMap, HeaderValue, Request, StatusCode, Uri,
};
use http_body::Body as HttpBody;
use http_body_util::{BodyExt, Limited};
use hyper::body::{Bytes, Incoming};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::{client::legacy::Client as HyperClient, rt::TokioExecutor};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::Instant;
use tower::{
    layer::util::Identity,
    limit::ConcurrencyLimitLayer,
    timeout::{error::Elapsed, TimeoutLayer},
    util::{BoxCloneSyncService, Either},
    BoxError, Service, ServiceBuilder, ServiceExt,
};
use tower_http::{decompression::DecompressionLayer, map_response_body::MapResponseBodyLayer};
use tracing::{debug, instrument};

mod body;
mod error;

pub use self::{body::Body, error::Error};

type BoxBody = http_body_util::combinators::BoxBody<Bytes, BoxError>;
type HttpResponse = http::Response<BoxBody>;
type Result<T, E = Error> = std::result::Result<T, E>;

const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = concat!("dossier/", env!("CARGO_PKG_VERSION"));

/// Configures and builds a [`Client`]
pub struct ClientBuilder {
    concurrency_limit: Option<usize>,
    content_length_limit: Option<usize>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Maximum amount of requests in flight
    ///
    /// Further requests wait for a slot. Unlimited when `None`, which is the default
    #[must_use]
    pub fn concurrency_limit(self, concurrency_limit: Option<usize>) -> Self {
        Self {
            concurrency_limit,
            ..self
        }
    }

    /// Maximum size of a response body in bytes, counted while reading it
    ///
    /// Defaults to 1MiB
    #[must_use]
    pub fn content_length_limit(self, content_length_limit: Option<usize>) -> Self {
        Self {
            content_length_limit,
            ..self
        }
    }

    /// Header sent with every request that doesn't set it itself
    ///
    /// # Errors
    ///
    /// - The name isn't a valid header name
    /// - The value isn't a valid header value
    pub fn default_header<K, V>(mut self, key: K, value: V) -> Result<Self>
    where
        K: TryInto<HeaderName>,
        K::Error: Into<BoxError>,
        V: TryInto<HeaderValue>,
        V::Error: Into<BoxError>,
    {
        let key = key.try_into().map_err(Error::new)?;
        let value = value.try_into().map_err(Error::new)?;
        self.default_headers.insert(key, value);

        Ok(self)
    }

    /// Time a request may take, reading the response body included
    ///
    /// Defaults to 30 seconds
    #[must_use]
    pub fn timeout(self, timeout: Option<Duration>) -> Self {
        Self { timeout, ..self }
    }

    /// Build the client on top of hyper, with rustls and the native root certificates
    ///
    /// # Errors
    ///
    /// - Loading the native root certificates failed
    pub fn build(self) -> Result<Client> {
        let connector = HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(Error::new)?
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();

        let hyper = HyperClient::builder(TokioExecutor::new())
            .build::<_, Body>(connector)
            .map_response(|response: http::Response<Incoming>| {
                response.map(|body| BoxBody::new(body.map_err(BoxError::from)))
            });

        Ok(self.service(hyper))
    }

    /// Build the client on top of another HTTP client service
    #[must_use]
    pub fn service<S, B>(self, transport: S) -> Client
    where
        S: Service<Request<Body>, Response = http::Response<B>> + Clone + Send + Sync + 'static,
        S::Error: Into<BoxError>,
        S::Future: Send,
        B: HttpBody + Send + Sync + 'static,
        B::Data: Send + Sync,
        B::Error: Into<BoxError> + Send + Sync,
    {
        let concurrency_limit = match self.concurrency_limit {
            Some(limit) => Either::Right(ConcurrencyLimitLayer::new(limit)),
            None => Either::Left(Identity::new()),
        };
        let limit_body = match self.content_length_limit {
            Some(limit) => Either::Right(MapResponseBodyLayer::new(move |body| {
                BoxBody::new(Limited::new(body, limit))
            })),
            None => Either::Left(MapResponseBodyLayer::new(BoxBody::new)),
        };
        let timeout = match self.timeout {
            Some(timeout) => Either::Right(TimeoutLayer::new(timeout)),
            None => Either::Left(Identity::new()),
        };

        let stack = ServiceBuilder::new()
            .layer(concurrency_limit)
            .layer(limit_body)
            .layer(DecompressionLayer::default())
            .layer(timeout)
            .map_err(Into::<BoxError>::into)
            .service(transport);

        Client {
            default_headers: self.default_headers,
            inner: BoxCloneSyncService::new(stack),
            timeout: self.timeout,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        let mut default_headers = HeaderMap::default();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        Self {
            concurrency_limit: None,
            content_length_limit: Some(DEFAULT_BODY_LIMIT),
            default_headers,
            timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

/// HTTP client with default headers, limits and request signing
///
/// Clones share the underlying connection pool. Redirects aren't followed, the signature
/// headers are bound to the original request and must not be replayed against another target.
#[derive(Clone)]
pub struct Client {
    default_headers: HeaderMap,
    inner: BoxCloneSyncService<Request<Body>, HttpResponse, BoxError>,
    timeout: Option<Duration>,
}

impl Client {
    /// Start configuring a client
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Send a request as-is, apart from the default headers
    ///
    /// # Errors
    ///
    /// - The request failed or timed out
    #[instrument(skip_all, fields(method = %req.method(), path = req.uri().path()))]
    pub async fn execute(&self, mut req: Request<Body>) -> Result<Response> {
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let headers = req.headers_mut();
        for (name, value) in &self.default_headers {
            if !headers.contains_key(name) {
                headers.insert(name.clone(), value.clone());
            }
        }

        let response = self.inner.clone().oneshot(req).await.map_err(|error| {
            debug!(?error, "request failed");
            Error::new(error)
        })?;
        debug!(status = %response.status(), "received response");

        Ok(Response {
            deadline,
            inner: response,
        })
    }

    /// Attach the HMAC authentication headers, then send the request
    ///
    /// The body is handed to the signer as JSON text. Whether it or the path ends up signed is up to the signer.
    ///
    /// # Errors
    ///
    /// - The body isn't UTF-8
    /// - The request couldn't be signed
    /// - The request failed or timed out
    pub async fn execute_signed(&self, mut req: Request<Body>, signer: &Signer) -> Result<Response> {
        let body = match req.body().as_bytes() {
            Some(bytes) => Some(simdutf8::basic::from_utf8(bytes).map_err(Error::new)?),
            None => None,
        };

        let headers = signer
            .generate_headers(
                req.method().as_str(),
                &req.uri().to_string(),
                body.map(Payload::Text).as_ref(),
            )
            .map_err(Error::new)?;
        headers.apply(req.headers_mut()).map_err(Error::new)?;

        self.execute(req).await
    }

    /// Send an unsigned GET request
    ///
    /// # Errors
    ///
    /// - The URI is invalid
    /// - The request failed or timed out
    pub async fn get<U>(&self, uri: U) -> Result<Response>
    where
        Uri: TryFrom<U>,
        <Uri as TryFrom<U>>::Error: Into<http::Error>,
    {
        let req = Request::get(uri).body(Body::empty()).map_err(Error::new)?;
        self.execute(req).await
    }
}

/// Response whose body hasn't been read yet
///
/// Reading the body is bound by what is left of the request timeout
#[derive(Debug)]
pub struct Response {
    deadline: Option<Instant>,
    inner: HttpResponse,
}

impl Response {
    /// Status code
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Response headers
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Read the whole body, within the configured size and time limits
    ///
    /// # Errors
    ///
    /// - The body exceeded the size limit
    /// - The request timeout elapsed while reading
    /// - The connection broke while reading
    pub async fn bytes(self) -> Result<Bytes> {
        let collect = self.inner.into_body().collect();
        let collected = match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, collect)
                .await
                .map_err(|_| Error::new(Elapsed::new()))?,
            None => collect.await,
        }
        .map_err(Error::new)?;

        Ok(collected.to_bytes())
    }

    /// Read the body as UTF-8 text
    ///
    /// # Errors
    ///
    /// - See [`Response::bytes`]
    /// - The body isn't UTF-8
    pub async fn text(self) -> Result<String> {
        let body = self.bytes().await?;
        let text = simdutf8::basic::from_utf8(&body).map_err(Error::new)?;
        Ok(text.to_owned())
    }

    /// Read the body as JSON
    ///
    /// # Errors
    ///
    /// - See [`Response::bytes`]
    /// - The body doesn't deserialise into `T`
    pub async fn json<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.bytes().await?;
        sonic_rs::from_slice(&body).map_err(Error::new)
    }
}
