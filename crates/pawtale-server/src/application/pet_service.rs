//! Pet Application Service (Use Case)
//!
//! Shapes PIMS responses into pet lists and resolves single pets,
//! scanning the list when the by-id endpoint is unavailable.

use std::sync::Arc;

use pawtale::domain::services::{normalize_envelope, EnvelopeShape};
use pawtale::{PimsGateway, PimsPet, UpstreamError};

pub struct PetService {
    gateway: Arc<dyn PimsGateway>,
}

impl PetService {
    pub fn new(gateway: Arc<dyn PimsGateway>) -> Self {
        Self { gateway }
    }

    /// All pets, whatever envelope the upstream used
    pub async fn list_pets(&self) -> Result<Vec<PimsPet>, UpstreamError> {
        let body = self.gateway.fetch_patients().await?;

        let (shape, records) = normalize_envelope(body);
        if shape == EnvelopeShape::SingleRecord {
            tracing::warn!("Unexpected PIMS response format, treating it as a single pet");
        } else {
            tracing::debug!(shape = shape.name(), count = records.len(), "PIMS patient list");
        }

        let total = records.len();
        let pets: Vec<PimsPet> = records.into_iter().filter_map(PimsPet::from_value).collect();
        if pets.len() < total {
            tracing::warn!(
                skipped = total - pets.len(),
                "Skipping PIMS patient entries that are not objects"
            );
        }
        Ok(pets)
    }

    /// One pet by id; `Ok(None)` when neither lookup finds it
    pub async fn get_pet(&self, id: &str) -> Result<Option<PimsPet>, UpstreamError> {
        match self.gateway.fetch_patient(id).await {
            Ok(body) => match PimsPet::from_value(body) {
                Some(pet) => return Ok(Some(pet)),
                None => tracing::info!("Pet detail endpoint returned no record, using fallback"),
            },
            Err(err) => {
                tracing::info!("Pet detail endpoint not available ({}), using fallback", err.detail);
            }
        }

        let pets = self.list_pets().await?;
        Ok(pets.into_iter().find(|pet| pet.has_id(id)))
    }
}
