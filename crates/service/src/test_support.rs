#![cfg(test)]
use configs::StoreConfig;

use crate::backend::Services;

/// One fresh service set per backend family: key-value and relational.
pub async fn backends() -> Result<Vec<Services>, anyhow::Error> {
    let mut all = Vec::new();
    for uri in ["memory://", "sqlite::memory:"] {
        all.push(Services::connect(&StoreConfig::with_uri(uri)).await?);
    }
    Ok(all)
}
