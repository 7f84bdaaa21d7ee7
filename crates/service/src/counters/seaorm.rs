use async_trait::async_trait;
use models::counter::{self, Model as Counter};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::repository::CounterRepository;
use crate::errors::ServiceError;

/// Counters as rows; every mutation is a single statement.
pub struct SeaOrmCounterRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCounterRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CounterRepository for SeaOrmCounterRepository {
    async fn get(&self, name: &str) -> Result<Option<Counter>, ServiceError> {
        Ok(counter::Entity::find_by_id(name.to_string()).one(&self.db).await?)
    }

    async fn list(&self) -> Result<Vec<Counter>, ServiceError> {
        Ok(counter::Entity::find().order_by_asc(counter::Column::Name).all(&self.db).await?)
    }

    async fn insert_if_absent(&self, name: &str) -> Result<bool, ServiceError> {
        let am = counter::ActiveModel { name: Set(name.to_string()), count: Set(0) };
        let inserted = counter::Entity::insert(am)
            .on_conflict(OnConflict::column(counter::Column::Name).do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await?;
        Ok(inserted == 1)
    }

    async fn increment(&self, name: &str) -> Result<Option<Counter>, ServiceError> {
        let rows = counter::Entity::update_many()
            .col_expr(counter::Column::Count, Expr::col(counter::Column::Count).add(1))
            .filter(counter::Column::Name.eq(name))
            .exec_with_returning(&self.db)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn reset(&self, name: &str) -> Result<Option<Counter>, ServiceError> {
        let rows = counter::Entity::update_many()
            .col_expr(counter::Column::Count, Expr::value(0i64))
            .filter(counter::Column::Name.eq(name))
            .exec_with_returning(&self.db)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, name: &str) -> Result<bool, ServiceError> {
        let res = counter::Entity::delete_by_id(name.to_string()).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn remove_all(&self) -> Result<u64, ServiceError> {
        Ok(counter::Entity::delete_many().exec(&self.db).await?.rows_affected)
    }
}
