use async_trait::async_trait;
use serde::Serialize;

use crate::{domain::ChatId, envelope::Envelope, Result};

/// `POST /track` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrackRequest {
    pub user_id: i64,
    pub url: String,
}

/// `DELETE /stop` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StopRequest {
    pub user_id: i64,
}

/// `DELETE /remove` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RemoveRequest {
    pub user_id: i64,
    pub product_id: String,
}

impl TrackRequest {
    pub fn new(chat_id: ChatId, url: impl Into<String>) -> Self {
        Self {
            user_id: chat_id.0,
            url: url.into(),
        }
    }
}

impl StopRequest {
    pub fn new(chat_id: ChatId) -> Self {
        Self { user_id: chat_id.0 }
    }
}

impl RemoveRequest {
    pub fn new(chat_id: ChatId, product_id: impl Into<String>) -> Self {
        Self {
            user_id: chat_id.0,
            product_id: product_id.into(),
        }
    }
}

/// Port for the external price tracker service.
///
/// Every call is a single request; implementations must not retry.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    async fn track(&self, req: &TrackRequest) -> Result<Envelope>;
    async fn list(&self) -> Result<Envelope>;
    async fn stop(&self, req: &StopRequest) -> Result<Envelope>;
    async fn remove(&self, req: &RemoveRequest) -> Result<Envelope>;
}
