use async_trait::async_trait;
use models::pet::{self, Model as Pet, NewPet, PetFilter};
use models::ModelError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter, QueryOrder,
    QueryTrait, Set, Unchanged,
};

use super::repository::PetRepository;
use crate::errors::ServiceError;

pub struct SeaOrmPetRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmPetRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn active(id: Option<i32>, pet: NewPet) -> pet::ActiveModel {
    pet::ActiveModel {
        id: id.map_or(NotSet, Unchanged),
        name: Set(pet.name),
        category: Set(pet.category),
        available: Set(pet.available),
        gender: Set(pet.gender),
    }
}

#[async_trait]
impl PetRepository for SeaOrmPetRepository {
    async fn get(&self, id: i32) -> Result<Option<Pet>, ServiceError> {
        let found = pet::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(Pet::checked).transpose()?)
    }

    async fn list(&self, filter: &PetFilter) -> Result<Vec<Pet>, ServiceError> {
        let rows = pet::Entity::find()
            .apply_if(filter.name.clone(), |q, v| q.filter(pet::Column::Name.eq(v)))
            .apply_if(filter.category.clone(), |q, v| q.filter(pet::Column::Category.eq(v)))
            .apply_if(filter.available, |q, v| q.filter(pet::Column::Available.eq(v)))
            .apply_if(filter.gender, |q, v| q.filter(pet::Column::Gender.eq(v)))
            .order_by_asc(pet::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Pet::checked).collect::<Result<Vec<_>, ModelError>>()?)
    }

    async fn insert(&self, pet: NewPet) -> Result<Pet, ServiceError> {
        Ok(active(None, pet).insert(&self.db).await?)
    }

    async fn replace(&self, id: i32, pet: NewPet) -> Result<Option<Pet>, ServiceError> {
        match active(Some(id), pet).update(&self.db).await {
            Ok(saved) => Ok(Some(saved)),
            Err(DbErr::RecordNotUpdated | DbErr::RecordNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let res = pet::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn remove_all(&self) -> Result<u64, ServiceError> {
        Ok(pet::Entity::delete_many().exec(&self.db).await?.rows_affected)
    }
}
