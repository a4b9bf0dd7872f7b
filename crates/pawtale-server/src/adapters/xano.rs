//! Xano (low-code backend) story persistence adapter

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use pawtale::{PersistenceError, StoryStore, XanoStoryPayload};

use super::http;
use crate::config::XanoConfig;

struct XanoClient {
    client: Client,
    base_url: Url,
}

/// Story store backed by Xano; inert when no base URL is configured
pub struct XanoStoryStore {
    inner: Option<XanoClient>,
}

impl XanoStoryStore {
    pub fn new(config: Option<&XanoConfig>) -> anyhow::Result<Self> {
        let inner = match config {
            Some(config) => Some(XanoClient {
                client: http::json_client(config.timeout, config.api_key.as_deref())?,
                base_url: http::base_url(&config.base_url)?,
            }),
            None => None,
        };
        Ok(Self { inner })
    }
}

#[async_trait]
impl StoryStore for XanoStoryStore {
    fn is_configured(&self) -> bool {
        self.inner.is_some()
    }

    async fn save_story(&self, payload: &XanoStoryPayload) -> Result<String, PersistenceError> {
        let xano = self.inner.as_ref().ok_or(PersistenceError::NotConfigured)?;

        tracing::info!(title = %payload.title, pet_id = %payload.pims_pet_id, "Saving story to Xano");

        let response = xano
            .client
            .post(http::join(&xano.base_url, &["generated_stories"]))
            .json(payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|err| PersistenceError::Request(err.to_string()))?;

        let record: Value = response
            .json()
            .await
            .map_err(|err| PersistenceError::InvalidResponse(err.to_string()))?;

        let id = record_id(&record).ok_or_else(|| {
            PersistenceError::InvalidResponse("response carries no record id".to_string())
        })?;

        tracing::info!(id = %id, title = ?record.get("title"), "Story saved to Xano");
        Ok(id)
    }
}

fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
