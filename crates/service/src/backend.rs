use std::sync::Arc;

use configs::StoreConfig;

use crate::counters::{CounterService, KvCounterRepository, SeaOrmCounterRepository};
use crate::errors::ServiceError;
use crate::pets::{KvPetRepository, PetService, SeaOrmPetRepository};
use crate::storage::{self, StoreError, StoreHandle};

/// Both resource services wired to one store handle.
#[derive(Clone)]
pub struct Services {
    pub pets: Arc<PetService>,
    pub counters: Arc<CounterService>,
    pub store: StoreHandle,
}

impl Services {
    pub fn from_handle(store: StoreHandle) -> Self {
        let (pets, counters) = match &store {
            StoreHandle::Relational(db) => (
                PetService::new(Arc::new(SeaOrmPetRepository::new(db.clone()))),
                CounterService::new(Arc::new(SeaOrmCounterRepository::new(db.clone()))),
            ),
            StoreHandle::KeyValue(kv) => (
                PetService::new(Arc::new(KvPetRepository::new(kv.clone()))),
                CounterService::new(Arc::new(KvCounterRepository::new(kv.clone()))),
            ),
        };
        Self { pets: Arc::new(pets), counters: Arc::new(counters), store }
    }

    pub async fn connect(cfg: &StoreConfig) -> Result<Self, StoreError> {
        Ok(Self::from_handle(storage::connect(cfg).await?))
    }

    pub async fn ping(&self) -> Result<(), ServiceError> {
        Ok(self.store.ping().await?)
    }
}
