//! PIMS Gateway Port
//!
//! Raw access to the veterinary practice-management API. Bodies come back
//! untyped; shaping them is the caller's job.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::UpstreamError;

#[async_trait]
pub trait PimsGateway: Send + Sync {
    /// GET the patient list, whatever envelope it comes in
    async fn fetch_patients(&self) -> Result<Value, UpstreamError>;

    /// GET a single patient from the by-id endpoint
    async fn fetch_patient(&self, id: &str) -> Result<Value, UpstreamError>;
}
