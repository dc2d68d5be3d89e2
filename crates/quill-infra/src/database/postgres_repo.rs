//! PostgreSQL repository implementations.
//!
//! Every repository holds its own handle to the shared pool. Integrity
//! rules the in-memory store enforces structurally are enforced here by
//! the schema (unique like index, cascading foreign keys) or by a guard
//! query before the write (per-day slug uniqueness, parent validation).

use async_trait::async_trait;
use chrono::{NaiveTime, TimeDelta};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DbConn, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use quill_core::domain::{Comment, Like, Post, Profile, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CommentRepository, LikeRepository, PostRepository, ProfileRepository,
    UserRepository,
};

use super::entity::post::DbPostStatus;
use super::entity::{comment, like, post, profile, user};

/// Surface unique-constraint violations as `Constraint`, everything else
/// as a query failure.
fn map_db_err(e: DbErr) -> RepoError {
    let msg = e.to_string();
    if msg.contains("duplicate") || msg.contains("unique") {
        RepoError::Constraint(msg)
    } else {
        RepoError::Query(msg)
    }
}

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: User) -> Result<User, RepoError> {
        let active: user::ActiveModel = entity.into();
        let model = user::Entity::insert(active)
            .on_conflict(
                OnConflict::column(user::Column::Id)
                    .update_columns([
                        user::Column::Username,
                        user::Column::Email,
                        user::Column::PasswordHash,
                        user::Column::Role,
                        user::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let result = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.map(Into::into))
    }
}

/// PostgreSQL profile repository.
pub struct PostgresProfileRepository {
    db: DbConn,
}

impl PostgresProfileRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError> {
        let result = profile::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: Profile) -> Result<Profile, RepoError> {
        let active: profile::ActiveModel = entity.into();
        let model = profile::Entity::insert(active)
            .on_conflict(
                OnConflict::column(profile::Column::UserId)
                    .update_columns([
                        profile::Column::Bio,
                        profile::Column::IsSubscribed,
                        profile::Column::SubscriptionEndDate,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.into())
    }
}

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let active: post::ActiveModel = entity.into();
        let model = post::Entity::insert(active)
            .on_conflict(
                OnConflict::column(post::Column::Id)
                    .update_columns([
                        post::Column::Title,
                        post::Column::Body,
                        post::Column::Category,
                        post::Column::Tags,
                        post::Column::AccessLevel,
                        post::Column::Status,
                        post::Column::UpdatedAt,
                        post::Column::ViewCount,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.into())
    }

    /// Children go with the post via the cascading foreign keys.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = post::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        // slug uniqueness is scoped to the publish day, which a plain
        // unique index cannot express; guard with a range query
        let day_start = entity
            .publish_date
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc();
        let day_end = day_start + TimeDelta::days(1);

        let clashes = post::Entity::find()
            .filter(post::Column::Slug.eq(&entity.slug))
            .filter(post::Column::PublishDate.gte(day_start))
            .filter(post::Column::PublishDate.lt(day_end))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        if clashes > 0 {
            return Err(RepoError::SlugConflict);
        }

        let active: post::ActiveModel = entity.into();
        let model = post::Entity::insert(active)
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = post::Entity::find()
            .filter(post::Column::Slug.eq(slug))
            .order_by_desc(post::Column::PublishDate)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.map(Into::into))
    }

    async fn list_published(&self, page: u64, per_page: u64) -> Result<Vec<Post>, RepoError> {
        let models = post::Entity::find()
            .filter(post::Column::Status.eq(DbPostStatus::Published))
            .order_by_desc(post::Column::PublishDate)
            .paginate(&self.db, per_page)
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<(), RepoError> {
        let result = post::Entity::update_many()
            .col_expr(
                post::Column::ViewCount,
                Expr::col(post::Column::ViewCount).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

/// PostgreSQL comment repository.
pub struct PostgresCommentRepository {
    db: DbConn,
}

impl PostgresCommentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn insert(&self, entity: Comment) -> Result<Comment, RepoError> {
        if let Some(parent_id) = entity.parent_id {
            let parent = comment::Entity::find_by_id(parent_id)
                .one(&self.db)
                .await
                .map_err(map_db_err)?;
            match parent {
                Some(parent) if parent.post_id == entity.post_id => {}
                _ => return Err(RepoError::InvalidParent),
            }
        }

        let active: comment::ActiveModel = entity.into();
        let model = comment::Entity::insert(active)
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let result = comment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.map(Into::into))
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let models = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedDate)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL like repository.
///
/// The unique index on (post_id, user_id) is the authority: a racing
/// duplicate insert fails at the database rather than creating two rows.
pub struct PostgresLikeRepository {
    db: DbConn,
}

impl PostgresLikeRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn exists(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let count = like::Entity::find()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(count > 0)
    }

    async fn insert(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        let active: like::ActiveModel = Like::new(post_id, user_id).into();
        like::Entity::insert(active)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn remove(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        let result = like::Entity::delete_many()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        like::Entity::find()
            .filter(like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}
