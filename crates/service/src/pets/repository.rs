use std::sync::Arc;

use async_trait::async_trait;
use models::pet::{Model as Pet, NewPet, PetFilter};

use crate::errors::ServiceError;
use crate::storage::KvStore;

/// Pet persistence. Implementations store and fetch; they do not validate
/// client input or decide what "not found" means to a caller.
#[async_trait]
pub trait PetRepository: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<Pet>, ServiceError>;
    /// Every pet matching `filter`, ordered by id.
    async fn list(&self, filter: &PetFilter) -> Result<Vec<Pet>, ServiceError>;
    /// Persist with a fresh store-assigned id.
    async fn insert(&self, pet: NewPet) -> Result<Pet, ServiceError>;
    /// Overwrite an existing pet; `None` when `id` is absent.
    async fn replace(&self, id: i32, pet: NewPet) -> Result<Option<Pet>, ServiceError>;
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    async fn remove_all(&self) -> Result<u64, ServiceError>;
}

const SEQ_KEY: &str = "seq:pet";
const KEY_PATTERN: &str = "pet:*";

fn pet_key(id: i32) -> String {
    format!("pet:{id}")
}

/// Pets as text records in a key-value store. Ids come from an atomic
/// sequence key, so they increase and are never handed out twice.
///
/// Replace checks existence and then writes, so a delete landing between the
/// two can bring the pet back under its old id.
pub struct KvPetRepository {
    kv: Arc<dyn KvStore>,
}

impl KvPetRepository {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    async fn load(&self, key: &str) -> Result<Option<Pet>, ServiceError> {
        match self.kv.get(key).await? {
            Some(text) => Ok(Some(Pet::from_store_text(&text)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PetRepository for KvPetRepository {
    async fn get(&self, id: i32) -> Result<Option<Pet>, ServiceError> {
        self.load(&pet_key(id)).await
    }

    async fn list(&self, filter: &PetFilter) -> Result<Vec<Pet>, ServiceError> {
        let mut pets = Vec::new();
        for key in self.kv.keys(KEY_PATTERN).await? {
            // a key deleted between the scan and the read is simply skipped
            if let Some(pet) = self.load(&key).await? {
                if filter.matches(&pet) {
                    pets.push(pet);
                }
            }
        }
        pets.sort_by_key(|p| p.id);
        Ok(pets)
    }

    async fn insert(&self, pet: NewPet) -> Result<Pet, ServiceError> {
        let next = self.kv.increment(SEQ_KEY).await?;
        let id = i32::try_from(next)
            .map_err(|_| ServiceError::Internal(format!("pet id sequence exhausted at {next}")))?;
        let pet = pet.with_id(id);
        self.kv.set(&pet_key(id), pet.to_store_text()).await?;
        Ok(pet)
    }

    async fn replace(&self, id: i32, pet: NewPet) -> Result<Option<Pet>, ServiceError> {
        let key = pet_key(id);
        if !self.kv.exists(&key).await? {
            return Ok(None);
        }
        let pet = pet.with_id(id);
        self.kv.set(&key, pet.to_store_text()).await?;
        Ok(Some(pet))
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(self.kv.delete(&pet_key(id)).await?)
    }

    async fn remove_all(&self) -> Result<u64, ServiceError> {
        let mut removed = 0;
        for key in self.kv.keys(KEY_PATTERN).await? {
            if self.kv.delete(&key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// In-memory repository for service-level tests.
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockPetRepository {
        pets: Mutex<BTreeMap<i32, Pet>>,
        last_id: Mutex<i32>,
    }

    #[async_trait]
    impl PetRepository for MockPetRepository {
        async fn get(&self, id: i32) -> Result<Option<Pet>, ServiceError> {
            Ok(self.pets.lock().unwrap().get(&id).cloned())
        }

        async fn list(&self, filter: &PetFilter) -> Result<Vec<Pet>, ServiceError> {
            let pets = self.pets.lock().unwrap();
            Ok(pets.values().filter(|p| filter.matches(p)).cloned().collect())
        }

        async fn insert(&self, pet: NewPet) -> Result<Pet, ServiceError> {
            let mut last = self.last_id.lock().unwrap();
            *last += 1;
            let pet = pet.with_id(*last);
            self.pets.lock().unwrap().insert(pet.id, pet.clone());
            Ok(pet)
        }

        async fn replace(&self, id: i32, pet: NewPet) -> Result<Option<Pet>, ServiceError> {
            let mut pets = self.pets.lock().unwrap();
            match pets.get_mut(&id) {
                Some(slot) => {
                    *slot = pet.with_id(id);
                    Ok(Some(slot.clone()))
                }
                None => Ok(None),
            }
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.pets.lock().unwrap().remove(&id).is_some())
        }

        async fn remove_all(&self) -> Result<u64, ServiceError> {
            let mut pets = self.pets.lock().unwrap();
            let n = pets.len() as u64;
            pets.clear();
            Ok(n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKvStore;
    use models::pet::Gender;

    fn new_pet(name: &str, category: &str) -> NewPet {
        NewPet { name: name.into(), category: category.into(), available: true, gender: Gender::Unknown }
    }

    #[tokio::test]
    async fn kv_ids_are_never_reused() -> Result<(), anyhow::Error> {
        let kv = Arc::new(MemoryKvStore::new());
        let repo = KvPetRepository::new(kv.clone());
        let a = repo.insert(new_pet("a", "dog")).await?;
        let b = repo.insert(new_pet("b", "cat")).await?;
        assert!(b.id > a.id);

        assert!(repo.delete(b.id).await?);
        assert_eq!(repo.remove_all().await?, 1);
        let c = repo.insert(new_pet("c", "dog")).await?;
        assert!(c.id > b.id);
        // only pet records are counted, the sequence key survives
        assert_eq!(kv.get("seq:pet").await?.as_deref(), Some("3"));
        Ok(())
    }

    #[tokio::test]
    async fn kv_replace_requires_existing_key() -> Result<(), anyhow::Error> {
        let repo = KvPetRepository::new(Arc::new(MemoryKvStore::new()));
        assert!(repo.replace(42, new_pet("x", "dog")).await?.is_none());
        assert!(repo.get(42).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn kv_corrupt_record_is_internal() -> Result<(), anyhow::Error> {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set("pet:1", "{\"id\":\"1\"}".into()).await?;
        let repo = KvPetRepository::new(kv);
        assert!(matches!(repo.get(1).await, Err(ServiceError::Internal(_))));
        Ok(())
    }
}
