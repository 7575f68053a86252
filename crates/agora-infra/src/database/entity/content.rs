//! Content entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use agora_core::domain::{ContentItem, parse_timestamp};
use agora_core::error::StoreError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "content")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub content_type: String,
    pub content_data: Json,
    pub tier_required: String,
    pub is_published: bool,
    pub scheduled_publish_at: Option<DateTimeWithTimeZone>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub tags: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::CreatorId",
        to = "super::profile::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Creator,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to domain ContentItem.
///
/// Enum columns are free text in the table, so an unknown value is a decode error.
impl TryFrom<Model> for ContentItem {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let content_type = model
            .content_type
            .parse()
            .map_err(|e| StoreError::Decode(format!("content {}: {e}", model.id)))?;
        let tier_required = model
            .tier_required
            .parse()
            .map_err(|e| StoreError::Decode(format!("content {}: {e}", model.id)))?;
        let tags = serde_json::from_value(model.tags)
            .map_err(|e| StoreError::Decode(format!("content {} tags: {e}", model.id)))?;

        Ok(Self {
            id: model.id,
            creator_id: model.creator_id,
            title: model.title,
            description: model.description,
            content_type,
            content_data: model.content_data,
            tier_required,
            is_published: model.is_published,
            scheduled_publish_at: model.scheduled_publish_at.map(|ts| ts.to_rfc3339()),
            view_count: model.view_count,
            like_count: model.like_count,
            comment_count: model.comment_count,
            tags,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

/// Conversion from domain ContentItem to a fully-set ActiveModel.
impl TryFrom<ContentItem> for ActiveModel {
    type Error = StoreError;

    fn try_from(item: ContentItem) -> Result<Self, Self::Error> {
        let scheduled = item
            .scheduled_publish_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(|e| StoreError::Constraint(e.to_string()))?;

        Ok(Self {
            id: Set(item.id),
            creator_id: Set(item.creator_id),
            title: Set(item.title),
            description: Set(item.description),
            content_type: Set(item.content_type.as_str().to_string()),
            content_data: Set(item.content_data),
            tier_required: Set(item.tier_required.as_str().to_string()),
            is_published: Set(item.is_published),
            scheduled_publish_at: Set(scheduled.map(Into::into)),
            view_count: Set(item.view_count),
            like_count: Set(item.like_count),
            comment_count: Set(item.comment_count),
            tags: Set(serde_json::Value::from(item.tags)),
            created_at: Set(item.created_at.into()),
            updated_at: Set(item.updated_at.into()),
        })
    }
}
