use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use quill_core::domain::Comment;
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CommentRepository, LikeRepository};

use crate::database::entity::{comment, post};
use crate::database::postgres_repo::{
    PostgresCommentRepository, PostgresLikeRepository, PostgresPostRepository,
};

fn post_model(id: Uuid, author_id: Uuid, slug: &str) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id,
        author_id,
        title: "Test Post".to_owned(),
        slug: slug.to_owned(),
        body: "Content".to_owned(),
        category: None,
        tags: post::Tags(vec!["rust".to_owned()]),
        access_level: post::DbAccessLevel::Free,
        status: post::DbPostStatus::Published,
        publish_date: now.into(),
        created_at: now.into(),
        updated_at: now.into(),
        view_count: 0,
    }
}

#[tokio::test]
async fn find_post_by_id_maps_to_domain() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, author_id, "test-post")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let found = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert_eq!(found.id, post_id);
    assert_eq!(found.title, "Test Post");
    assert_eq!(found.tags, vec!["rust".to_string()]);
}

#[tokio::test]
async fn duplicate_like_surfaces_as_constraint() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_errors(vec![sea_orm::DbErr::Custom(
            "duplicate key value violates unique constraint \"idx_likes_post_user\"".to_owned(),
        )])
        .into_connection();

    let repo = PostgresLikeRepository::new(db);
    let result = repo.insert(Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::Constraint(_))));
}

#[tokio::test]
async fn parent_from_another_post_is_rejected() {
    let parent_post = Uuid::new_v4();
    let other_post = Uuid::new_v4();
    let author_id = Uuid::new_v4();
    let parent_id = Uuid::new_v4();

    let parent = comment::Model {
        id: parent_id,
        post_id: parent_post,
        author_id,
        body: "root".to_owned(),
        parent_id: None,
        created_date: chrono::Utc::now().into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![parent]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let stray = Comment::new(other_post, author_id, "wrong thread".into(), Some(parent_id));
    let result = repo.insert(stray).await;

    assert!(matches!(result, Err(RepoError::InvalidParent)));
}

#[tokio::test]
async fn missing_like_delete_reports_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresLikeRepository::new(db);
    let result = repo.remove(Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}
