//! PIMS (veterinary practice-management) HTTP adapter

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use pawtale::{PimsGateway, UpstreamError, UpstreamErrorKind};

use super::http;
use crate::config::PimsConfig;

pub struct PimsHttpGateway {
    client: Client,
    base_url: Url,
}

impl PimsHttpGateway {
    pub fn new(config: &PimsConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: http::json_client(config.timeout, config.api_key.as_deref())?,
            base_url: http::base_url(&config.base_url)?,
        })
    }

    async fn get_json(&self, segments: &[&str]) -> Result<Value, UpstreamError> {
        let url = http::join(&self.base_url, segments);
        tracing::debug!("PIMS GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http::upstream_error)?;

        response.json().await.map_err(|err| {
            UpstreamError::new(
                UpstreamErrorKind::Unknown,
                format!("Invalid JSON from PIMS: {}", err),
            )
        })
    }
}

#[async_trait]
impl PimsGateway for PimsHttpGateway {
    async fn fetch_patients(&self) -> Result<Value, UpstreamError> {
        self.get_json(&["pims", "patients"]).await
    }

    async fn fetch_patient(&self, id: &str) -> Result<Value, UpstreamError> {
        self.get_json(&["pims", "patients", id]).await
    }
}
