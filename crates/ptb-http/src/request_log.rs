//! Structured request/response logging.
//!
//! One event per request, emitted inline once the response is ready. The
//! writer behind `tracing` owns buffering and flushing.

use std::{net::SocketAddr, sync::OnceLock, time::Instant};

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use regex::Regex;

use crate::cors;

/// Request bodies above this size are rejected rather than buffered.
const MAX_REQUEST_BODY: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLog {
    pub client_ip: String,
    pub method: String,
    pub status_code: u16,
    pub path: String,
    pub latency: String,
    pub body_size: usize,
    pub body_request: String,
    pub body_response: String,
}

impl RequestLog {
    pub fn emit(&self) {
        if self.status_code >= 500 {
            tracing::error!(
                client_ip = %self.client_ip,
                method = %self.method,
                status_code = self.status_code,
                path = %self.path,
                latency = %self.latency,
                body_size = self.body_size,
                body_request = %self.body_request,
                body_response = %self.body_response,
                "request failed"
            );
        } else {
            tracing::info!(
                client_ip = %self.client_ip,
                method = %self.method,
                status_code = self.status_code,
                path = %self.path,
                latency = %self.latency,
                body_size = self.body_size,
                body_request = %self.body_request,
                body_response = %self.body_response,
                "request handled"
            );
        }
    }
}

pub async fn log_requests(req: Request, next: Next) -> Response {
    if req.uri().path().contains("swagger") {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().to_string();
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let client_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();

    let (parts, body) = req.into_parts();
    let request_bytes = match to_bytes(body, MAX_REQUEST_BODY).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(%method, %path, "failed to read request body: {e}");
            // Rejected before reaching the CORS layer, so its headers are added here.
            let mut resp = StatusCode::PAYLOAD_TOO_LARGE.into_response();
            cors::apply_headers(resp.headers_mut());
            RequestLog {
                client_ip,
                method,
                status_code: resp.status().as_u16(),
                path,
                latency: format!("{:?}", start.elapsed()),
                body_size: 0,
                body_request: String::new(),
                body_response: String::new(),
            }
            .emit();
            return resp;
        }
    };
    let body_request = collapse_whitespace(&String::from_utf8_lossy(&request_bytes));

    let resp = next
        .run(Request::from_parts(parts, Body::from(request_bytes)))
        .await;

    let (parts, body) = resp.into_parts();
    let response_bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(%method, %path, "failed to buffer response body: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    RequestLog {
        client_ip,
        method,
        status_code: parts.status.as_u16(),
        path,
        latency: format!("{:?}", start.elapsed()),
        body_size: response_bytes.len(),
        body_request,
        body_response: collapse_whitespace(&String::from_utf8_lossy(&response_bytes)),
    }
    .emit();

    Response::from_parts(parts, Body::from(response_bytes))
}

/// Drop newlines and squeeze every whitespace run into one space.
pub fn collapse_whitespace(s: &str) -> String {
    static SPACE_RE: OnceLock<Regex> = OnceLock::new();
    let re = SPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));
    re.replace_all(&s.replace('\n', ""), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{
        collections::BTreeMap,
        fmt,
        sync::{Arc, Mutex},
    };

    use axum::{
        http::{self, Method},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt as _;
    use tracing::{
        field::{Field, Visit},
        Event, Level, Subscriber,
    };
    use tracing_subscriber::{layer::Context, prelude::*, Layer};

    type Fields = BTreeMap<String, String>;

    /// Records every event emitted by this module.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(Level, Fields)>>>);

    impl Captured {
        fn events(&self) -> Vec<(Level, Fields)> {
            self.0.lock().unwrap().clone()
        }
    }

    struct FieldVisitor<'a>(&'a mut Fields);

    impl Visit for FieldVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0
                .insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    impl<S: Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if event.metadata().target() != "ptb_http::request_log" {
                return;
            }
            let mut fields = Fields::new();
            event.record(&mut FieldVisitor(&mut fields));
            self.0
                .lock()
                .unwrap()
                .push((*event.metadata().level(), fields));
        }
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/boom",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "backend\n  down") }),
            )
            .route("/ok", get(|| async { "fine" }).post(|| async { "fine" }))
            .route("/swagger/index.html", get(|| async { "docs" }))
            .layer(middleware::from_fn(cors::cors))
            .layer(middleware::from_fn(log_requests))
    }

    async fn send(req: Request) -> (Response, Vec<(Level, Fields)>) {
        let captured = Captured::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(captured.clone()));
        let resp = app().oneshot(req).await.unwrap();
        (resp, captured.events())
    }

    #[tokio::test]
    async fn server_errors_log_at_error_level() {
        let (resp, events) =
            send(http::Request::builder().uri("/boom?x=1").body(Body::empty()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(events.len(), 1, "{events:?}");
        let (level, fields) = &events[0];
        assert_eq!(*level, Level::ERROR);
        assert_eq!(fields["status_code"], "500");
        assert_eq!(fields["method"], "GET");
        assert_eq!(fields["path"], "/boom?x=1");
        assert_eq!(fields["body_response"], "backend down");
        assert_eq!(fields["body_size"], "14");
    }

    #[tokio::test]
    async fn other_statuses_log_at_info_level() {
        let (_, events) = send(
            http::Request::builder()
                .method(Method::POST)
                .uri("/ok")
                .body(Body::from("{\n  \"a\":   1\n}"))
                .unwrap(),
        )
        .await;

        assert_eq!(events.len(), 1, "{events:?}");
        let (level, fields) = &events[0];
        assert_eq!(*level, Level::INFO);
        assert_eq!(fields["status_code"], "200");
        assert_eq!(fields["body_request"], "{ \"a\": 1}");
    }

    #[tokio::test]
    async fn swagger_paths_are_not_logged() {
        let (resp, events) = send(
            http::Request::builder()
                .uri("/swagger/index.html")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(events.is_empty(), "{events:?}");
    }

    #[tokio::test]
    async fn oversized_body_is_logged_with_cors_headers() {
        let (resp, events) = send(
            http::Request::builder()
                .method(Method::POST)
                .uri("/ok")
                .body(Body::from(vec![b'a'; MAX_REQUEST_BODY + 1]))
                .unwrap(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");

        let logged: Vec<_> = events
            .iter()
            .filter(|(_, f)| f.contains_key("status_code"))
            .collect();
        assert_eq!(logged.len(), 1, "{events:?}");
        assert_eq!(logged[0].0, Level::INFO);
        assert_eq!(logged[0].1["status_code"], "413");
        assert_eq!(logged[0].1["path"], "/ok");
    }

    #[test]
    fn newlines_are_removed_not_spaced() {
        assert_eq!(collapse_whitespace("{\n\"a\":1\n}"), "{\"a\":1}");
    }

    #[test]
    fn whitespace_runs_become_single_spaces() {
        assert_eq!(
            collapse_whitespace("{ \"a\":   1,\t\t\"b\": 2 }"),
            "{ \"a\": 1, \"b\": 2 }"
        );
    }

    #[test]
    fn empty_body_stays_empty() {
        assert_eq!(collapse_whitespace(""), "");
    }
}
