use std::sync::Arc;

use models::counter::{self, Model as Counter};
use tracing::{debug, info, instrument};

use super::repository::CounterRepository;
use crate::errors::ServiceError;

/// Counter lifecycle: names are validated, duplicates conflict, and
/// mutations on absent counters are not-found rather than implicit creates.
pub struct CounterService {
    repo: Arc<dyn CounterRepository>,
}

impl CounterService {
    pub fn new(repo: Arc<dyn CounterRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn find(&self, name: &str) -> Result<Counter, ServiceError> {
        counter::validate_name(name)?;
        let c = self.repo.get(name).await?.ok_or_else(|| not_found(name))?;
        debug!(count = c.count, "counter found");
        Ok(c)
    }

    pub async fn list(&self) -> Result<Vec<Counter>, ServiceError> {
        self.repo.list().await
    }

    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> Result<Counter, ServiceError> {
        counter::validate_name(name)?;
        if !self.repo.insert_if_absent(name).await? {
            return Err(ServiceError::Conflict(format!("Counter {name} already exists")));
        }
        info!("counter created");
        Ok(Counter::new(name))
    }

    #[instrument(skip(self))]
    pub async fn increment(&self, name: &str) -> Result<Counter, ServiceError> {
        counter::validate_name(name)?;
        let c = self.repo.increment(name).await?.ok_or_else(|| not_found(name))?;
        info!(count = c.count, "counter incremented");
        Ok(c)
    }

    #[instrument(skip(self))]
    pub async fn reset(&self, name: &str) -> Result<Counter, ServiceError> {
        counter::validate_name(name)?;
        let c = self.repo.reset(name).await?.ok_or_else(|| not_found(name))?;
        info!("counter reset");
        Ok(c)
    }

    /// Idempotent. Names that could never have been created are a no-op.
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<(), ServiceError> {
        if counter::validate_name(name).is_err() {
            return Ok(());
        }
        let existed = self.repo.delete(name).await?;
        info!(existed, "counter deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_all(&self) -> Result<u64, ServiceError> {
        let removed = self.repo.remove_all().await?;
        info!(removed, "all counters removed");
        Ok(removed)
    }
}

fn not_found(name: &str) -> ServiceError {
    ServiceError::NotFound(format!("Counter {name} does not exist"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::backends;

    #[tokio::test]
    async fn create_twice_conflicts() -> Result<(), anyhow::Error> {
        for svc in backends().await? {
            let c = svc.counters.create("foo").await?;
            assert_eq!((c.name.as_str(), c.count), ("foo", 0));
            assert!(matches!(svc.counters.create("foo").await, Err(ServiceError::Conflict(_))));
            assert_eq!(svc.counters.list().await?.len(), 1);
        }
        Ok(())
    }

    #[tokio::test]
    async fn increment_then_reset() -> Result<(), anyhow::Error> {
        for svc in backends().await? {
            svc.counters.create("foo").await?;
            for _ in 0..3 {
                svc.counters.increment("foo").await?;
            }
            assert_eq!(svc.counters.find("foo").await?.count, 3);
            assert_eq!(svc.counters.reset("foo").await?.count, 0);
            assert_eq!(svc.counters.find("foo").await?.count, 0);
        }
        Ok(())
    }

    #[tokio::test]
    async fn absent_counter_is_not_created_implicitly() -> Result<(), anyhow::Error> {
        for svc in backends().await? {
            assert!(matches!(svc.counters.increment("bar").await, Err(ServiceError::NotFound(_))));
            assert!(matches!(svc.counters.reset("bar").await, Err(ServiceError::NotFound(_))));
            assert!(matches!(svc.counters.find("bar").await, Err(ServiceError::NotFound(_))));
            svc.counters.delete("bar").await?;
            assert!(svc.counters.list().await?.is_empty());
        }
        Ok(())
    }

    #[tokio::test]
    async fn bad_names_are_validation_errors() -> Result<(), anyhow::Error> {
        for svc in backends().await? {
            assert!(matches!(svc.counters.create("a*b").await, Err(ServiceError::Validation(_))));
            assert!(matches!(svc.counters.increment("a:b").await, Err(ServiceError::Validation(_))));
            svc.counters.delete("a*").await?;
        }
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_all_apply() -> Result<(), anyhow::Error> {
        for svc in backends().await? {
            svc.counters.create("hits").await?;
            let mut tasks = Vec::new();
            for _ in 0..20 {
                let counters = svc.counters.clone();
                tasks.push(tokio::spawn(async move { counters.increment("hits").await }));
            }
            for t in tasks {
                t.await??;
            }
            assert_eq!(svc.counters.find("hits").await?.count, 20);
        }
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_have_one_winner() -> Result<(), anyhow::Error> {
        for svc in backends().await? {
            let mut tasks = Vec::new();
            for _ in 0..10 {
                let counters = svc.counters.clone();
                tasks.push(tokio::spawn(async move { counters.create("race").await }));
            }
            let mut created = 0;
            for t in tasks {
                match t.await? {
                    Ok(_) => created += 1,
                    Err(ServiceError::Conflict(_)) => {}
                    Err(e) => return Err(e.into()),
                }
            }
            assert_eq!(created, 1);
        }
        Ok(())
    }
}
