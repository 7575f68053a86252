//! PostgreSQL content store.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use agora_core::domain::{ContentItem, ContentPatch, EnrichedContent};
use agora_core::error::StoreError;
use agora_core::ports::ContentStore;

use super::entity::content::{self, Entity as ContentEntity};
use super::entity::profile::Entity as ProfileEntity;

/// Content store over a SeaORM connection.
pub struct PostgresContentStore {
    db: DbConn,
}

impl PostgresContentStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    fn decode_all(models: Vec<content::Model>) -> Result<Vec<ContentItem>, StoreError> {
        models.into_iter().map(ContentItem::try_from).collect()
    }
}

fn query_error(e: DbErr) -> StoreError {
    match e {
        DbErr::Conn(err) => StoreError::Connection(err.to_string()),
        DbErr::ConnectionAcquire(err) => StoreError::Connection(err.to_string()),
        DbErr::RecordNotFound(_) => StoreError::NotFound,
        other => {
            let msg = other.to_string();
            if msg.contains("duplicate") || msg.contains("unique") || msg.contains("foreign key") {
                StoreError::Constraint(msg)
            } else {
                StoreError::Query(msg)
            }
        }
    }
}

#[async_trait]
impl ContentStore for PostgresContentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        ContentEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?
            .map(ContentItem::try_from)
            .transpose()
    }

    async fn list_by_creator(
        &self,
        creator_id: Uuid,
        limit: u64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        tracing::debug!(creator_id = %creator_id, limit, "Listing content by creator");

        let models = ContentEntity::find()
            .filter(content::Column::CreatorId.eq(creator_id))
            .order_by_desc(content::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Self::decode_all(models)
    }

    async fn list_published_by_creator(
        &self,
        creator_id: Uuid,
        limit: u64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let models = ContentEntity::find()
            .filter(content::Column::CreatorId.eq(creator_id))
            .filter(content::Column::IsPublished.eq(true))
            .order_by_desc(content::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Self::decode_all(models)
    }

    async fn list_published_global(&self, limit: u64) -> Result<Vec<ContentItem>, StoreError> {
        let models = ContentEntity::find()
            .filter(content::Column::IsPublished.eq(true))
            .order_by_desc(content::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Self::decode_all(models)
    }

    async fn list_published_global_enriched(
        &self,
        limit: u64,
    ) -> Result<Vec<EnrichedContent>, StoreError> {
        let rows = ContentEntity::find()
            .find_also_related(ProfileEntity)
            .filter(content::Column::IsPublished.eq(true))
            .order_by_desc(content::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        rows.into_iter()
            .map(|(model, profile)| {
                Ok(EnrichedContent {
                    item: ContentItem::try_from(model)?,
                    creator: profile.map(Into::into),
                })
            })
            .collect()
    }

    async fn insert(&self, item: ContentItem) -> Result<ContentItem, StoreError> {
        let active: content::ActiveModel = item.try_into()?;
        let model = active.insert(&self.db).await.map_err(query_error)?;
        ContentItem::try_from(model)
    }

    async fn update(&self, id: Uuid, patch: ContentPatch) -> Result<ContentItem, StoreError> {
        let mut item = self.find_by_id(id).await?.ok_or(StoreError::NotFound)?;
        patch.apply_to(&mut item);

        let active: content::ActiveModel = item.try_into()?;
        let model = active.update(&self.db).await.map_err(query_error)?;
        ContentItem::try_from(model)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = ContentEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}
