//!
//! Typed client for the person-profile backend
//!
//! Every request is signed with the configured HMAC credentials. Paths are relative to the
//! backend's `/api` routing prefix, which is added when missing.
//!

#![deny(missing_docs)]

use bytes::Bytes;
use dossier_config::api;
use dossier_http_client::{Body, Client};
use hmac_signatures::{canonical, Payload, Signer, SignerConfig};
use http::{Method, Request, StatusCode};
use http_body::Body as HttpBody;
use serde::{de::DeserializeOwned, Serialize};
use sonic_rs::{JsonContainerTrait, JsonValueTrait, Value};
use tower::{BoxError, Service};
use tracing::{debug, instrument};
use url::Url;

mod envelope;
mod error;
mod path;

pub use self::{
    envelope::{ApiResponse, ListQuery, ListResponse, ShapeError, SortOrder},
    error::ApiError,
};
pub use hmac_signatures::Clock;

/// Result type of every client operation
pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Query parameters and body of a request
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    params: Vec<(String, String)>,
    body: Option<Value>,
}

impl RequestOptions {
    /// Empty options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query parameters
    ///
    /// `params` has to serialise into a map. Null values are skipped and arrays are joined with commas.
    ///
    /// # Errors
    ///
    /// - `params` doesn't serialise into a map
    pub fn params<P>(self, params: &P) -> Result<Self>
    where
        P: Serialize + ?Sized,
    {
        let value = sonic_rs::to_value(params).map_err(ApiError::invalid_request)?;

        Ok(Self {
            params: query_pairs(&value)?,
            ..self
        })
    }

    /// Set the JSON body
    ///
    /// # Errors
    ///
    /// - `body` failed to serialise
    pub fn body<B>(self, body: &B) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        let body = sonic_rs::to_value(body).map_err(ApiError::invalid_request)?;

        Ok(Self {
            body: Some(body),
            ..self
        })
    }
}

fn query_pairs(value: &Value) -> Result<Vec<(String, String)>> {
    if value.is_null() {
        return Ok(Vec::new());
    }

    let Some(object) = value.as_object() else {
        return Err(ApiError::invalid_request(
            "query parameters have to serialise into a map",
        ));
    };

    let mut pairs = Vec::new();
    for (key, value) in object.iter() {
        if value.is_null() {
            continue;
        }

        pairs.push((key.to_owned(), query_value(value)?));
    }

    Ok(pairs)
}

fn query_value(value: &Value) -> Result<String> {
    if let Some(value) = value.as_str() {
        return Ok(value.to_owned());
    }

    if let Some(values) = value.as_array() {
        let values = values.iter().map(query_value).collect::<Result<Vec<_>>>()?;
        return Ok(values.join(","));
    }

    sonic_rs::to_string(value).map_err(ApiError::invalid_request)
}

/// Client of the person-profile backend
///
/// Cheap to clone, clones share the connection pool and the concurrency limit
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http_client: Client,
    signer: Signer,
}

impl ApiClient {
    /// Construct a client talking to the configured backend over HTTPS
    ///
    /// # Errors
    ///
    /// - The base URL isn't a valid URL
    /// - The client ID or the secret key is empty
    /// - The native certificate store couldn't be loaded
    pub fn new(config: &api::Configuration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Some(config.timeout()))
            .concurrency_limit(config.max_concurrent_requests)
            .build()
            .map_err(ApiError::configuration)?;

        Self::from_parts(config, http_client)
    }

    /// Construct a client sending its requests through another HTTP client service
    ///
    /// # Errors
    ///
    /// - The base URL isn't a valid URL
    /// - The client ID or the secret key is empty
    pub fn with_service<S, B>(config: &api::Configuration, service: S) -> Result<Self>
    where
        S: Service<Request<Body>, Response = http::Response<B>> + Clone + Send + Sync + 'static,
        S::Error: Into<BoxError>,
        S::Future: Send,
        B: HttpBody + Send + Sync + 'static,
        B::Data: Send + Sync,
        B::Error: Into<BoxError> + Send + Sync,
    {
        let http_client = Client::builder()
            .timeout(Some(config.timeout()))
            .concurrency_limit(config.max_concurrent_requests)
            .service(service);

        Self::from_parts(config, http_client)
    }

    fn from_parts(config: &api::Configuration, http_client: Client) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(ApiError::configuration)?;
        let signer = Signer::new(SignerConfig {
            client_id: config.client_id.to_string(),
            secret_key: config.secret_key.to_string(),
            tenant_id: config.tenant_id.to_string(),
        })
        .map_err(ApiError::configuration)?;

        Ok(Self {
            base_url,
            http_client,
            signer,
        })
    }

    /// Replace the clock the request timestamps are read from
    #[must_use]
    pub fn with_clock(self, clock: Clock) -> Self {
        Self {
            signer: self.signer.with_clock(clock),
            ..self
        }
    }

    /// Base URL the paths are resolved against
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[instrument(skip_all, fields(%method, %path))]
    async fn send(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<(StatusCode, Bytes)> {
        let path = path::normalise(path);
        let url = path::resolve(&self.base_url, &path, &options.params)
            .map_err(ApiError::invalid_request)?;

        let body = match options.body {
            Some(ref body) if Payload::Json(body).is_present() => {
                if !canonical::signs_body(method.as_str()) {
                    return Err(ApiError::invalid_request(
                        "only POST, PUT, PATCH and DELETE requests carry a body",
                    ));
                }

                Body::from(sonic_rs::to_string(body).map_err(ApiError::invalid_request)?)
            }
            Some(..) | None => Body::empty(),
        };

        let request = Request::builder()
            .method(method)
            .uri(url.as_str())
            .body(body)
            .map_err(ApiError::invalid_request)?;

        let response = self
            .http_client
            .execute_signed(request, &self.signer)
            .await
            .map_err(ApiError::from_transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::from_transport)?;

        if !status.is_success() {
            let error = ApiError::from_response(status, &body);
            debug!(%status, message = %error, "request rejected");
            return Err(error);
        }

        Ok((status, body))
    }

    /// Perform a request and decode the JSON response
    ///
    /// The response is returned as sent, envelopes aren't unwrapped. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// - The request couldn't be constructed or signed
    /// - The request failed or timed out
    /// - The server answered with a non-success status
    /// - The response didn't decode into `T`
    pub async fn request<T>(&self, method: Method, path: &str, options: RequestOptions) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let (status, body) = self.send(method, path, options).await?;
        let body: &[u8] = if body.is_empty() { b"null" } else { &body };

        sonic_rs::from_slice(body).map_err(|error| ApiError::MalformedResponse {
            status,
            message: error.to_string(),
        })
    }

    /// GET a resource
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, path, RequestOptions::new()).await
    }

    /// GET a resource with query parameters
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`] and [`RequestOptions::params`]
    pub async fn get_with_params<T, P>(&self, path: &str, params: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let options = RequestOptions::new().params(params)?;
        self.request(Method::GET, path, options).await
    }

    /// POST a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new().body(body)?;
        self.request(Method::POST, path, options).await
    }

    /// PUT a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new().body(body)?;
        self.request(Method::PUT, path, options).await
    }

    /// PATCH with a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new().body(body)?;
        self.request(Method::PATCH, path, options).await
    }

    /// DELETE a resource
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn delete<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request(Method::DELETE, path, RequestOptions::new())
            .await
    }

    /// GET an array-returning endpoint
    ///
    /// # Errors
    ///
    /// - See [`ApiClient::request`]
    /// - The response isn't one of the known list shapes
    pub async fn get_list<T>(&self, path: &str, query: &ListQuery) -> Result<ListResponse<T>>
    where
        T: DeserializeOwned,
    {
        let options = RequestOptions::new().params(query)?;
        let (status, body) = self.send(Method::GET, path, options).await?;

        ListResponse::parse(&body).map_err(|error| ApiError::MalformedResponse {
            status,
            message: error.to_string(),
        })
    }
}
