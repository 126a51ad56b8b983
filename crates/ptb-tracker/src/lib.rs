//! Price tracker backend adapter (reqwest).
//!
//! Implements the `ptb-core` tracker port over the backend's REST API.

use async_trait::async_trait;

use ptb_core::{
    config::Config,
    envelope::Envelope,
    errors::Error,
    ports::{RemoveRequest, StopRequest, TrackRequest, TrackerApi},
    Result,
};

pub mod api;

pub use api::{ApiClient, ApiError};

#[derive(Clone, Debug)]
pub struct TrackerClient {
    api: ApiClient,
    base_url: String,
}

impl TrackerClient {
    pub fn new(api: ApiClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { api, base_url }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let api = ApiClient::new(cfg.price_tracker_timeout).map_err(map_err)?;
        Ok(Self::new(api, cfg.price_tracker_service.clone()))
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{resource}", self.base_url)
    }
}

fn map_err(e: ApiError) -> Error {
    Error::Backend(e.to_string())
}

#[async_trait]
impl TrackerApi for TrackerClient {
    async fn track(&self, req: &TrackRequest) -> Result<Envelope> {
        self.api.post(&self.url("track"), req).await.map_err(map_err)
    }

    async fn list(&self) -> Result<Envelope> {
        self.api.get(&self.url("list")).await.map_err(map_err)
    }

    async fn stop(&self, req: &StopRequest) -> Result<Envelope> {
        self.api.delete(&self.url("stop"), req).await.map_err(map_err)
    }

    async fn remove(&self, req: &RemoveRequest) -> Result<Envelope> {
        self.api
            .delete(&self.url("remove"), req)
            .await
            .map_err(map_err)
    }
}
