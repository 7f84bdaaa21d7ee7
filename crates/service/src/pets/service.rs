use std::sync::Arc;

use models::pet::{Model as Pet, NewPet, PetFilter};
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::repository::PetRepository;
use crate::errors::ServiceError;

/// Pet lifecycle rules on top of any [`PetRepository`].
///
/// Client input is validated here, before the store is touched; lookups
/// that miss become [`ServiceError::NotFound`].
pub struct PetService {
    repo: Arc<dyn PetRepository>,
}

impl PetService {
    pub fn new(repo: Arc<dyn PetRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn find(&self, id: i32) -> Result<Pet, ServiceError> {
        let pet = self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("Pet", id))?;
        debug!(%pet, "pet found");
        Ok(pet)
    }

    #[instrument(skip(self))]
    pub async fn find_by_filter(&self, filter: &PetFilter) -> Result<Vec<Pet>, ServiceError> {
        let pets = self.repo.list(filter).await?;
        debug!(count = pets.len(), "pets listed");
        Ok(pets)
    }

    #[instrument(skip(self, raw))]
    pub async fn create(&self, raw: &Value) -> Result<Pet, ServiceError> {
        let candidate = NewPet::from_json(raw)?;
        let pet = self.repo.insert(candidate).await?;
        info!(id = pet.id, name = %pet.name, "pet created");
        Ok(pet)
    }

    /// Replace every attribute of an existing pet. The id in the path wins
    /// over any id in the body.
    #[instrument(skip(self, raw))]
    pub async fn update(&self, id: i32, raw: &Value) -> Result<Pet, ServiceError> {
        if self.repo.get(id).await?.is_none() {
            return Err(ServiceError::not_found("Pet", id));
        }
        let candidate = NewPet::from_json(raw)?;
        // deleted between the check and the write
        let pet = self.repo.replace(id, candidate).await?.ok_or_else(|| ServiceError::not_found("Pet", id))?;
        info!(id, "pet updated");
        Ok(pet)
    }

    /// Idempotent: deleting an absent pet succeeds.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let existed = self.repo.delete(id).await?;
        info!(id, existed, "pet deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_all(&self) -> Result<u64, ServiceError> {
        let removed = self.repo.remove_all().await?;
        info!(removed, "all pets removed");
        Ok(removed)
    }
}
