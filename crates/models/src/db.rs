use std::time::Duration;

use configs::StoreConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};
use tracing::{debug, info};

use crate::{counter, pet};

/// Open a pool for a relational store URI, ping it, and make sure the
/// resource tables exist. Fails instead of returning a dead handle.
pub async fn connect_with_config(cfg: &StoreConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(cfg.uri.trim().to_string());
    if cfg.is_sqlite_memory() {
        // each pooled connection would otherwise see its own empty database
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs));
    }
    opt.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);

    let db = Database::connect(opt).await?;
    db.ping().await?;
    info!(uri = %cfg.redacted_uri(), backend = ?db.get_database_backend(), "relational store connected");
    ensure_schema(&db).await?;
    Ok(db)
}

async fn create_table_for<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Create the `pets` and `counters` tables when missing.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table_for(db, pet::Entity).await?;
    create_table_for(db, counter::Entity).await?;
    debug!("resource tables ensured");
    Ok(())
}
