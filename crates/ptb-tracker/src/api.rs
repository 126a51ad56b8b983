//! Generic JSON-over-HTTP client.
//!
//! GET, POST and DELETE decode whatever body comes back, whatever the status
//! code. PATCH alone rejects anything but `200 OK`.

use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to parse API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to encode request payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to make API request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to decode API response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("unexpected status code: {status}, response: {body}")]
    Status { status: u16, body: String },
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
}

impl ApiClient {
    /// `timeout: None` keeps the transport default (no request timeout).
    pub fn new(timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder.build().map_err(ApiError::Client)?;
        Ok(Self { http })
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let url = parse_url(url)?;
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        decode(resp).await
    }

    pub async fn post<B, T>(&self, url: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send_json(Method::POST, url, body).await?;
        decode(resp).await
    }

    pub async fn delete<B, T>(&self, url: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send_json(Method::DELETE, url, body).await?;
        decode(resp).await
    }

    pub async fn patch<B, T>(&self, url: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send_json(Method::PATCH, url, body).await?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(ApiError::Transport)?;
        let text = String::from_utf8_lossy(&bytes);
        tracing::debug!(status = status.as_u16(), body = %text, "PATCH response");

        if status != StatusCode::OK {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text.into_owned(),
            });
        }
        serde_json::from_slice(&bytes).map_err(ApiError::Decode)
    }

    async fn send_json<B>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = parse_url(url)?;
        let payload = serde_json::to_vec(body).map_err(ApiError::Encode)?;
        self.http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(ApiError::Transport)
    }
}

fn parse_url(raw: &str) -> Result<Url, ApiError> {
    Url::parse(raw).map_err(|e| ApiError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let bytes = resp.bytes().await.map_err(ApiError::Transport)?;
    serde_json::from_slice(&bytes).map_err(ApiError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptb_core::envelope::Envelope;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> ApiClient {
        ApiClient::new(None).unwrap()
    }

    #[tokio::test]
    async fn get_decodes_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "data": ["A", "B"]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let env: Envelope = client()
            .get(&format!("{}/list", server.uri()))
            .await
            .unwrap();
        assert!(env.is_success());
        assert_eq!(env.data, json!(["A", "B"]));
    }

    #[tokio::test]
    async fn post_sends_json_body_with_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/track"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"user_id": 5, "url": "https://x"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let env: Envelope = client()
            .post(
                &format!("{}/track", server.uri()),
                &json!({"user_id": 5, "url": "https://x"}),
            )
            .await
            .unwrap();
        assert!(env.is_success());
    }

    #[tokio::test]
    async fn delete_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/stop"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"user_id": 9})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let env: Envelope = client()
            .delete(&format!("{}/stop", server.uri()), &json!({"user_id": 9}))
            .await
            .unwrap();
        assert!(env.is_success());
    }

    #[tokio::test]
    async fn get_and_post_ignore_error_status() {
        let server = MockServer::start().await;
        let body = json!({"success": false, "error": {"code": 500, "message": "boom"}});
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_json(body.clone()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(body))
            .mount(&server)
            .await;

        let got: Envelope = client().get(&server.uri()).await.unwrap();
        assert_eq!(got.error.map(|e| e.code), Some(500));

        let posted: Envelope = client().post(&server.uri(), &json!({})).await.unwrap();
        assert!(!posted.is_success());
    }

    #[tokio::test]
    async fn patch_rejects_non_200() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let err = client()
            .patch::<_, Envelope>(&server.uri(), &json!({"a": 1}))
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 201);
                assert!(body.contains("success"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn patch_decodes_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(body_json(json!({"a": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let env: Envelope = client().patch(&server.uri(), &json!({"a": 1})).await.unwrap();
        assert!(env.is_success());
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client().get::<Envelope>(&server.uri()).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "{err}");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let err = client()
            .post::<_, Envelope>("http://127.0.0.1:1/track", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "{err}");
    }

    #[tokio::test]
    async fn malformed_url_is_rejected_before_sending() {
        let err = client()
            .delete::<_, Envelope>("not a url", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }), "{err}");
    }

    #[tokio::test]
    async fn unserializable_payload_is_an_encode_error() {
        use std::collections::HashMap;

        // JSON object keys must be strings.
        let mut bad: HashMap<(i32, i32), i32> = HashMap::new();
        bad.insert((1, 2), 3);

        let err = client()
            .post::<_, Envelope>("http://127.0.0.1:1/track", &bad)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Encode(_)), "{err}");
    }
}
