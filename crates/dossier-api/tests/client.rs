use bytes::Bytes;
use core::convert::Infallible;
use dossier_api::{ApiClient, ApiError, ApiResponse, Clock, ListQuery, ListResponse, SortOrder};
use dossier_config::api::Configuration;
use dossier_http_client::Body;
use hmac_signatures::{Payload, Verifier};
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use serde::{Deserialize, Serialize};
use sonic_rs::{json, JsonValueTrait, Value};
use http_body::{Body as HttpBody, Frame};
use std::{
    io,
    pin::Pin,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    task::{self, Poll},
    time::Duration,
};
use tower::service_fn;

const TIMESTAMP: u64 = 1_700_000_000;

fn config() -> Configuration {
    Configuration {
        base_url: "https://api.example.com".into(),
        client_id: "c1".into(),
        secret_key: "s1".into(),
        tenant_id: "t1".into(),
        timeout_ms: 5000,
        max_concurrent_requests: None,
    }
}

fn json_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(body.into()))
        .unwrap()
}

/// Client whose transport answers every request with what it received
fn echo_client() -> ApiClient {
    let service = service_fn(|req: Request<Body>| async move {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .map(|value| value.to_str().unwrap().to_string())
        };
        let body = req
            .body()
            .as_bytes()
            .map(|bytes| String::from_utf8(bytes.to_vec()).unwrap());

        let echo = Echo {
            method: req.method().to_string(),
            uri: req.uri().to_string(),
            signature: header("x-signature").unwrap_or_default(),
            timestamp: header("x-timestamp").unwrap_or_default(),
            body,
        };

        Ok::<_, Infallible>(json_response(
            StatusCode::OK,
            sonic_rs::to_string(&echo).unwrap(),
        ))
    });

    ApiClient::with_service(&config(), service)
        .unwrap()
        .with_clock(Clock::from_unix_timestamp(TIMESTAMP))
}

#[derive(Deserialize, Serialize)]
struct Echo {
    method: String,
    uri: String,
    signature: String,
    timestamp: String,
    body: Option<String>,
}

/// Body that never yields a frame, like a server stalling after the headers
struct Stall;

impl HttpBody for Stall {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut task::Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Pending
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Widgets {
    ok: bool,
}

#[tokio::test]
async fn widgets_scenario() {
    let service = service_fn(|req: Request<Body>| async move {
        let signed = req
            .headers()
            .get("x-signature")
            .is_some_and(|value| !value.is_empty());

        let response = if signed && req.uri().path() == "/api/widgets" {
            json_response(StatusCode::OK, r#"{"data":{"ok":true}}"#)
        } else {
            json_response(StatusCode::UNAUTHORIZED, r#"{"message":"Unauthorized"}"#)
        };

        Ok::<_, Infallible>(response)
    });
    let client = ApiClient::with_service(&config(), service).unwrap();

    let response: ApiResponse<Widgets> = client.get("/widgets").await.unwrap();
    assert_eq!(response.data, Widgets { ok: true });
}

#[tokio::test]
async fn server_accepts_signature() {
    let service = service_fn(|req: Request<Body>| async move {
        let (parts, body) = req.into_parts();
        let body = body
            .as_bytes()
            .map(|bytes| String::from_utf8(bytes.to_vec()).unwrap());

        let verified = Verifier::new()
            .with_clock(Clock::from_unix_timestamp(TIMESTAMP + 1))
            .verify(&parts, body.as_deref().map(Payload::Text).as_ref(), |_, _| {
                Ok::<_, Infallible>("s1".to_string())
            })
            .is_ok();

        let response = if verified {
            json_response(StatusCode::OK, r#"{"data":null}"#)
        } else {
            json_response(StatusCode::UNAUTHORIZED, r#"{"message":"Invalid signature"}"#)
        };

        Ok::<_, Infallible>(response)
    });
    let client = ApiClient::with_service(&config(), service)
        .unwrap()
        .with_clock(Clock::from_unix_timestamp(TIMESTAMP));

    let _: ApiResponse<Value> = client.get("/Persons/List?page=4").await.unwrap();
    let _: ApiResponse<Value> = client
        .post("/persons", &json!({ "firstName": "Ada", "lastName": "Lovelace" }))
        .await
        .unwrap();
    let _: ApiResponse<Value> = client
        .patch("/persons/1", &json!({ "lastName": "Byron" }))
        .await
        .unwrap();
}

#[tokio::test]
async fn adds_api_prefix() {
    let client = echo_client();

    let echo: Echo = client.get("/persons").await.unwrap();
    assert_eq!(echo.uri, "https://api.example.com/api/persons");

    let echo: Echo = client.get("/api/persons").await.unwrap();
    assert_eq!(echo.uri, "https://api.example.com/api/persons");
}

#[tokio::test]
async fn query_is_not_signed() {
    let client = echo_client();

    let echo: Echo = client
        .get_with_params("/persons/list", &json!({ "page": 1, "search": null }))
        .await
        .unwrap();

    assert_eq!(echo.method, "GET");
    assert_eq!(echo.uri, "https://api.example.com/api/persons/list?page=1");
    assert_eq!(echo.timestamp, "1700000000");
    assert_eq!(echo.signature, "g+VNNfQeSS5UKKX1ra9fRPhe0soVxW6llpgRajG4AsA=");
    assert_eq!(echo.body, None);
}

#[derive(Serialize)]
struct Pair {
    a: u32,
    b: u32,
}

#[tokio::test]
async fn sends_the_signed_body() {
    let echo: Echo = echo_client()
        .post("/anything", &Pair { a: 1, b: 2 })
        .await
        .unwrap();

    assert_eq!(echo.method, "POST");
    assert_eq!(echo.body.as_deref(), Some(r#"{"a":1,"b":2}"#));
    assert_eq!(echo.signature, "9TcNFuAN0SLb29HuQpVAbb93PTxEphNAMdGtVu0B0Xo=");
}

#[tokio::test]
async fn key_order_is_preserved() {
    let echo: Echo = echo_client()
        .put("/anything", &json!({ "b": 2, "a": 1 }))
        .await
        .unwrap();

    assert_eq!(echo.body.as_deref(), Some(r#"{"b":2,"a":1}"#));
    assert_eq!(echo.signature, "v8tX5Kzn/eU7yF4xZX+zMG5Kb07gHXPlrghD8IUo+3Y=");
}

#[tokio::test]
async fn absent_body_signs_the_path() {
    let client = echo_client();

    let echo: Echo = client.post("/widgets", &()).await.unwrap();
    assert_eq!(echo.body, None);
    assert_eq!(echo.signature, "Xkldp1OFdNwb7qD/VHgMBystktO956pmCdWSHPGR5PI=");

    let echo: Echo = client.delete("/widgets").await.unwrap();
    assert_eq!(echo.method, "DELETE");
    assert_eq!(echo.signature, "Xkldp1OFdNwb7qD/VHgMBystktO956pmCdWSHPGR5PI=");
}

#[tokio::test]
async fn empty_success_body() {
    let service = service_fn(|_req: Request<Body>| async move {
        Ok::<_, Infallible>(json_response(StatusCode::NO_CONTENT, Bytes::new()))
    });
    let client = ApiClient::with_service(&config(), service).unwrap();

    let () = client.delete("/persons/1").await.unwrap();
}

#[tokio::test]
async fn http_error_carries_body() {
    let service = service_fn(|_req: Request<Body>| async move {
        Ok::<_, Infallible>(json_response(
            StatusCode::UNAUTHORIZED,
            r#"{"success":false,"message":"Invalid signature"}"#,
        ))
    });
    let client = ApiClient::with_service(&config(), service).unwrap();

    let error = client.get::<Value>("/persons").await.unwrap_err();

    assert_eq!(error.status(), 401);
    assert!(error.is_unauthorized());
    assert_eq!(error.message(), "Invalid signature");
    assert_eq!(
        error.data(),
        Some(&json!({ "success": false, "message": "Invalid signature" }))
    );
}

#[tokio::test]
async fn http_error_without_json() {
    let service = service_fn(|_req: Request<Body>| async move {
        Ok::<_, Infallible>(json_response(StatusCode::BAD_GATEWAY, "<h1>Bad Gateway</h1>"))
    });
    let client = ApiClient::with_service(&config(), service).unwrap();

    let error = client.get::<Value>("/persons").await.unwrap_err();

    assert_eq!(error.status(), 502);
    assert!(error.data().is_none());
    assert_eq!(error.message(), "Request failed with status 502 Bad Gateway");
}

#[tokio::test]
async fn malformed_success_body() {
    let service = service_fn(|_req: Request<Body>| async move {
        Ok::<_, Infallible>(json_response(StatusCode::OK, "not json"))
    });
    let client = ApiClient::with_service(&config(), service).unwrap();

    let error = client.get::<Value>("/persons").await.unwrap_err();

    assert!(matches!(error, ApiError::MalformedResponse { .. }));
    assert_eq!(error.status(), 200);
}

#[tokio::test]
async fn network_failure() {
    let service = service_fn(|_req: Request<Body>| async move {
        Err::<Response<Full<Bytes>>, _>(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))
    });
    let client = ApiClient::with_service(&config(), service).unwrap();

    let error = client.get::<Value>("/persons").await.unwrap_err();

    assert_eq!(error.status(), 0);
    assert!(error.is_network());
    assert!(!error.is_timeout());
    assert!(error.data().is_none());
    assert!(error.message().contains("connection refused"));
}

#[tokio::test]
async fn times_out() {
    let service = service_fn(|_req: Request<Body>| async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok::<_, Infallible>(json_response(StatusCode::OK, "{}"))
    });
    let config = Configuration {
        timeout_ms: 50,
        ..config()
    };
    let client = ApiClient::with_service(&config, service).unwrap();

    let started = tokio::time::Instant::now();
    let error = client.get::<Value>("/slow").await.unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(error.status(), 0);
    assert!(error.is_timeout());
}

#[tokio::test]
async fn times_out_after_the_headers() {
    let service = service_fn(|_req: Request<Body>| async move {
        Ok::<_, Infallible>(Response::new(Stall))
    });
    let config = Configuration {
        timeout_ms: 50,
        ..config()
    };
    let client = ApiClient::with_service(&config, service).unwrap();

    let error = tokio::time::timeout(Duration::from_secs(2), client.get::<Value>("/slow"))
        .await
        .expect("client did not honour its timeout while reading the body")
        .unwrap_err();

    assert!(matches!(error, ApiError::Network { timed_out: true, .. }));
    assert_eq!(error.status(), 0);
    assert!(error.is_timeout());
}

#[tokio::test]
async fn redirect_is_an_http_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let service = service_fn({
        let calls = Arc::clone(&calls);
        move |_req: Request<Body>| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                let response = Response::builder()
                    .status(StatusCode::SEE_OTHER)
                    .header("location", "https://elsewhere.example.com/api/persons")
                    .body(Full::new(Bytes::new()))
                    .unwrap();
                Ok::<_, Infallible>(response)
            }
        }
    });
    let client = ApiClient::with_service(&config(), service).unwrap();

    let error = client
        .post::<Value, _>("/persons", &json!({"name": "Jane"}))
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Http { .. }));
    assert_eq!(error.status(), 303);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn get_list_shapes() {
    let service = service_fn(|req: Request<Body>| async move {
        let response = match req.uri().path() {
            "/api/persons" => {
                assert_eq!(
                    req.uri().query(),
                    Some("page=2&limit=10&sortOrder=desc&nationality=DE")
                );
                json_response(
                    StatusCode::OK,
                    r#"{"data":[{"id":1}],"count":1,"totalCount":11}"#,
                )
            }
            "/api/countries" => json_response(StatusCode::OK, r#"[{"id":2},{"id":3}]"#),
            _ => json_response(StatusCode::OK, r#"{"success":true,"data":[]}"#),
        };

        Ok::<_, Infallible>(response)
    });
    let client = ApiClient::with_service(&config(), service).unwrap();

    let query = ListQuery {
        page: Some(2),
        limit: Some(10),
        sort_order: Some(SortOrder::Desc),
        ..ListQuery::default()
    }
    .filter("nationality", "DE");
    let persons: ListResponse<Value> = client.get_list("/persons", &query).await.unwrap();
    assert_eq!(persons.items().len(), 1);
    assert_eq!(persons.total(), Some(11));

    let countries: ListResponse<Value> = client
        .get_list("/countries", &ListQuery::default())
        .await
        .unwrap();
    assert!(matches!(countries, ListResponse::Bare(ref items) if items.len() == 2));
    assert_eq!(countries.items()[1].get("id").and_then(|id| id.as_u64()), Some(3));

    let languages: ListResponse<Value> = client
        .get_list("/languages", &ListQuery::default())
        .await
        .unwrap();
    assert!(matches!(
        languages,
        ListResponse::Wrapped { success: true, .. }
    ));
}

#[tokio::test]
async fn rejects_incomplete_configuration() {
    let service = service_fn(|_req: Request<Body>| async move {
        Ok::<_, Infallible>(json_response(StatusCode::OK, "{}"))
    });

    let missing_secret = Configuration {
        secret_key: "".into(),
        ..config()
    };
    let error = ApiClient::with_service(&missing_secret, service.clone())
        .err().unwrap();
    assert!(matches!(error, ApiError::Configuration(..)));

    let invalid_url = Configuration {
        base_url: "not a url".into(),
        ..config()
    };
    let error = ApiClient::with_service(&invalid_url, service).err().unwrap();
    assert!(matches!(error, ApiError::Configuration(..)));
}

#[tokio::test]
async fn body_on_get_is_rejected() {
    let error = echo_client()
        .request::<Value>(
            http::Method::GET,
            "/persons",
            dossier_api::RequestOptions::new()
                .body(&json!({ "a": 1 }))
                .unwrap(),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::InvalidRequest(..)));
}
