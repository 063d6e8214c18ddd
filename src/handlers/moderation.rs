use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin, AuthUser};
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::moderation::{ModerationService, PendingReply, PendingTopic};
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct PendingTopicResponse {
    /// Topic ID
    pub id: i32,
    /// Topic title
    pub title: String,
    /// Topic content
    pub content: String,
    /// Author user ID
    pub user_id: i32,
    /// Author display name
    pub author_name: String,
    /// Category name
    pub category_name: String,
    /// Submission timestamp
    pub created_at: String,
}

impl From<PendingTopic> for PendingTopicResponse {
    fn from(t: PendingTopic) -> Self {
        Self {
            id: t.id,
            title: t.title,
            content: t.content,
            user_id: t.user_id,
            author_name: t.author_name,
            category_name: t.category_name,
            created_at: t.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PendingReplyResponse {
    /// Reply ID
    pub id: i32,
    /// Parent topic ID
    pub topic_id: i32,
    /// Parent topic title
    pub topic_title: String,
    /// Reply content
    pub content: String,
    /// Author user ID
    pub user_id: i32,
    /// Author display name
    pub author_name: String,
    /// Submission timestamp
    pub created_at: String,
}

impl From<PendingReply> for PendingReplyResponse {
    fn from(r: PendingReply) -> Self {
        Self {
            id: r.id,
            topic_id: r.topic_id,
            topic_title: r.topic_title,
            content: r.content,
            user_id: r.user_id,
            author_name: r.author_name,
            created_at: r.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/moderation/topics/pending",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Pending topics, oldest first", body = PaginatedResponse<PendingTopicResponse>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "moderation"
)]
pub async fn pending_topics(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = ModerationService::new(db);
    let (topics, total) = service.pending_topics(page, per_page).await?;

    let items: Vec<PendingTopicResponse> =
        topics.into_iter().map(PendingTopicResponse::from).collect();
    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/moderation/replies/pending",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Pending replies, oldest first", body = PaginatedResponse<PendingReplyResponse>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "moderation"
)]
pub async fn pending_replies(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = ModerationService::new(db);
    let (replies, total) = service.pending_replies(page, per_page).await?;

    let items: Vec<PendingReplyResponse> = replies
        .into_iter()
        .map(PendingReplyResponse::from)
        .collect();
    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/moderation/topics/{id}/approve",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Topic approved", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "moderation"
)]
pub async fn approve_topic(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let admin_id = require_admin(&auth_user)?;
    let service = ModerationService::new(db);
    service.approve_topic(id, admin_id).await?;
    Ok(ApiResponse::ok("Topic approved"))
}

#[utoipa::path(
    post,
    path = "/api/v1/moderation/topics/{id}/reject",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Topic and its replies deleted", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "moderation"
)]
pub async fn reject_topic(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    let service = ModerationService::new(db);
    service.reject_topic(id).await?;
    Ok(ApiResponse::ok("Topic rejected"))
}

#[utoipa::path(
    post,
    path = "/api/v1/moderation/replies/{id}/approve",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Reply ID")),
    responses(
        (status = 200, description = "Reply approved", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Reply not found", body = AppError),
    ),
    tag = "moderation"
)]
pub async fn approve_reply(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let admin_id = require_admin(&auth_user)?;
    let service = ModerationService::new(db);
    service.approve_reply(id, admin_id).await?;
    Ok(ApiResponse::ok("Reply approved"))
}

#[utoipa::path(
    post,
    path = "/api/v1/moderation/replies/{id}/reject",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Reply ID")),
    responses(
        (status = 200, description = "Reply deleted", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Reply not found", body = AppError),
    ),
    tag = "moderation"
)]
pub async fn reject_reply(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    let service = ModerationService::new(db);
    service.reject_reply(id).await?;
    Ok(ApiResponse::ok("Reply rejected"))
}

#[utoipa::path(
    post,
    path = "/api/v1/moderation/users/{id}/ban",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User banned", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "moderation"
)]
pub async fn ban_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    let service = ModerationService::new(db);
    service.ban_user(id).await?;
    Ok(ApiResponse::ok("User banned"))
}

#[utoipa::path(
    post,
    path = "/api/v1/moderation/users/{id}/unban",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User unbanned", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "moderation"
)]
pub async fn unban_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    let service = ModerationService::new(db);
    service.unban_user(id).await?;
    Ok(ApiResponse::ok("User unbanned"))
}
