//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{FromJsonQueryResult, Set};
use serde::{Deserialize, Serialize};

use quill_core::domain::{AccessLevel, Post, PostStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum DbAccessLevel {
    #[sea_orm(string_value = "free")]
    Free,
    #[sea_orm(string_value = "premium")]
    Premium,
}

impl From<DbAccessLevel> for AccessLevel {
    fn from(level: DbAccessLevel) -> Self {
        match level {
            DbAccessLevel::Free => AccessLevel::Free,
            DbAccessLevel::Premium => AccessLevel::Premium,
        }
    }
}

impl From<AccessLevel> for DbAccessLevel {
    fn from(level: AccessLevel) -> Self {
        match level {
            AccessLevel::Free => DbAccessLevel::Free,
            AccessLevel::Premium => DbAccessLevel::Premium,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum DbPostStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
}

impl From<DbPostStatus> for PostStatus {
    fn from(status: DbPostStatus) -> Self {
        match status {
            DbPostStatus::Draft => PostStatus::Draft,
            DbPostStatus::Published => PostStatus::Published,
        }
    }
}

impl From<PostStatus> for DbPostStatus {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Draft => DbPostStatus::Draft,
            PostStatus::Published => DbPostStatus::Published,
        }
    }
}

/// Tag set stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Tags(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub category: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub tags: Tags,
    pub access_level: DbAccessLevel,
    pub status: DbPostStatus,
    pub publish_date: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub view_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
    #[sea_orm(has_many = "super::like::Entity")]
    Likes,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            title: model.title,
            slug: model.slug,
            body: model.body,
            category: model.category,
            tags: model.tags.0,
            access_level: model.access_level.into(),
            status: model.status.into(),
            publish_date: model.publish_date.into(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            view_count: model.view_count.max(0) as u32,
        }
    }
}

impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            title: Set(post.title),
            slug: Set(post.slug),
            body: Set(post.body),
            category: Set(post.category),
            tags: Set(Tags(post.tags)),
            access_level: Set(post.access_level.into()),
            status: Set(post.status.into()),
            publish_date: Set(post.publish_date.into()),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
            view_count: Set(post.view_count as i32),
        }
    }
}
