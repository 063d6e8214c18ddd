use crate::error::{AppError, AppResult};
use crate::middleware::auth::{authenticate_optional, AuthUser};
use crate::models::ReplyModel;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::reply::{ReplyListItem, ReplyService};
use crate::services::visibility::Viewer;
use axum::{
    extract::{Path, Query},
    http::HeaderMap,
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReplyRequest {
    /// Parent topic ID
    pub topic_id: i32,
    /// Reply content
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReplyRequest {
    /// Reply content
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReplyResponse {
    /// Reply ID
    pub id: i32,
    /// Parent topic ID
    pub topic_id: i32,
    /// Author user ID
    pub user_id: i32,
    /// Reply content
    pub content: String,
    /// Whether the reply has been approved by a moderator
    pub is_approved: bool,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl From<ReplyModel> for ReplyResponse {
    fn from(r: ReplyModel) -> Self {
        Self {
            id: r.id,
            topic_id: r.topic_id,
            user_id: r.user_id,
            content: r.content,
            is_approved: r.is_approved,
            created_at: r.created_at.to_string(),
            updated_at: r.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReplyListResponse {
    /// Reply ID
    pub id: i32,
    /// Parent topic ID
    pub topic_id: i32,
    /// Author user ID
    pub user_id: i32,
    /// Author display name
    pub author_name: String,
    /// Reply content
    pub content: String,
    /// Creation timestamp
    pub created_at: String,
}

impl From<ReplyListItem> for ReplyListResponse {
    fn from(r: ReplyListItem) -> Self {
        Self {
            id: r.id,
            topic_id: r.topic_id,
            user_id: r.user_id,
            author_name: r.author_name,
            content: r.content,
            created_at: r.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/topics/{id}/replies",
    params(
        ("id" = i32, Path, description = "Topic ID"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Approved replies, oldest first", body = PaginatedResponse<ReplyListResponse>),
        (status = 404, description = "Topic not found or not visible", body = AppError),
    ),
    tag = "replies"
)]
pub async fn list_replies(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    Path(topic_id): Path<i32>,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let auth_user = authenticate_optional(&db, &headers).await;
    let viewer = Viewer::from(auth_user.as_ref());

    let service = ReplyService::new(db);
    let (replies, total) = service
        .list_by_topic(topic_id, viewer, page, per_page)
        .await?;

    let items: Vec<ReplyListResponse> = replies.into_iter().map(ReplyListResponse::from).collect();
    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/replies/{id}",
    params(("id" = i32, Path, description = "Reply ID")),
    responses(
        (status = 200, description = "Reply details", body = ReplyResponse),
        (status = 404, description = "Reply not found or not visible", body = AppError),
    ),
    tag = "replies"
)]
pub async fn get_reply(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let auth_user = authenticate_optional(&db, &headers).await;
    let viewer = Viewer::from(auth_user.as_ref());

    let service = ReplyService::new(db);
    let reply = service.get(id, viewer).await?;
    Ok(ApiResponse::ok(ReplyResponse::from(reply)))
}

#[utoipa::path(
    post,
    path = "/api/v1/replies",
    security(("jwt_token" = [])),
    request_body = CreateReplyRequest,
    responses(
        (status = 200, description = "Reply created, pending approval", body = ReplyResponse),
        (status = 404, description = "Topic not found", body = AppError),
        (status = 409, description = "Topic is locked", body = AppError),
    ),
    tag = "replies"
)]
pub async fn create_reply(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateReplyRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = ReplyService::new(db);
    let reply = service
        .create(auth_user.user_id, payload.topic_id, &payload.content)
        .await?;

    Ok(ApiResponse::with_message(
        ReplyResponse::from(reply),
        "Reply submitted for moderation".to_string(),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/replies/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Reply ID")),
    request_body = UpdateReplyRequest,
    responses(
        (status = 200, description = "Reply updated, back to pending", body = ReplyResponse),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Reply not found", body = AppError),
    ),
    tag = "replies"
)]
pub async fn update_reply(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateReplyRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = ReplyService::new(db);
    let reply = service
        .update(id, auth_user.user_id, &payload.content)
        .await?;

    Ok(ApiResponse::with_message(
        ReplyResponse::from(reply),
        "Reply resubmitted for moderation".to_string(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/replies/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Reply ID")),
    responses(
        (status = 200, description = "Reply deleted", body = String),
        (status = 403, description = "Not the owner or an admin", body = AppError),
        (status = 404, description = "Reply not found", body = AppError),
    ),
    tag = "replies"
)]
pub async fn delete_reply(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = ReplyService::new(db);
    service
        .delete(id, auth_user.user_id, auth_user.is_admin())
        .await?;
    Ok(ApiResponse::ok("Reply deleted"))
}
