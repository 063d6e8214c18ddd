use crate::error::{AppError, AppResult};
use crate::middleware::auth::{authenticate_optional, require_admin, AuthUser};
use crate::models::TopicModel;
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::topic::{TopicListItem, TopicService};
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
pub struct CreateTopicRequest {
    /// Category ID
    pub category_id: i32,
    /// Topic title (1-200 characters)
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Topic content
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTopicRequest {
    /// Topic title (1-200 characters)
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Topic content
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopicResponse {
    /// Topic ID
    pub id: i32,
    /// Author user ID
    pub user_id: i32,
    /// Category ID
    pub category_id: i32,
    /// Topic title
    pub title: String,
    /// Topic content
    pub content: String,
    /// Whether the topic has been approved by a moderator
    pub is_approved: bool,
    /// Whether the topic is locked (no new replies)
    pub is_locked: bool,
    /// Whether the topic is pinned to the top of listings
    pub is_pinned: bool,
    /// View count
    pub view_count: i32,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl From<TopicModel> for TopicResponse {
    fn from(t: TopicModel) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            category_id: t.category_id,
            title: t.title,
            content: t.content,
            is_approved: t.is_approved,
            is_locked: t.is_locked,
            is_pinned: t.is_pinned,
            view_count: t.view_count,
            created_at: t.created_at.to_string(),
            updated_at: t.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopicListResponse {
    /// Topic ID
    pub id: i32,
    /// Topic title
    pub title: String,
    /// Author user ID
    pub user_id: i32,
    /// Author display name
    pub author_name: String,
    /// Category ID
    pub category_id: i32,
    /// Category name
    pub category_name: String,
    /// Whether the topic is locked
    pub is_locked: bool,
    /// Whether the topic is pinned
    pub is_pinned: bool,
    /// View count
    pub view_count: i32,
    /// Number of approved replies
    pub reply_count: i64,
    /// Timestamp of the newest approved reply
    pub last_reply_at: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl From<TopicListItem> for TopicListResponse {
    fn from(t: TopicListItem) -> Self {
        Self {
            id: t.id,
            title: t.title,
            user_id: t.user_id,
            author_name: t.author_name,
            category_id: t.category_id,
            category_name: t.category_name,
            is_locked: t.is_locked,
            is_pinned: t.is_pinned,
            view_count: t.view_count,
            reply_count: t.reply_count,
            last_reply_at: t.last_reply_at.map(|ts| ts.to_string()),
            created_at: t.created_at.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TopicListQuery {
    /// Restrict to one category
    pub category_id: Option<i32>,
    /// Page number
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/topics",
    params(
        ("category_id" = Option<i32>, Query, description = "Restrict to one category"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Approved topics, pinned first then by activity", body = PaginatedResponse<TopicListResponse>),
    ),
    tag = "topics"
)]
pub async fn list_topics(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<TopicListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = TopicService::new(db);
    let (topics, total) = service.list(params.category_id, page, per_page).await?;

    let items: Vec<TopicListResponse> = topics.into_iter().map(TopicListResponse::from).collect();
    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/topics/{id}",
    params(("id" = i32, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Topic details", body = TopicResponse),
        (status = 404, description = "Topic not found or not visible", body = AppError),
    ),
    tag = "topics"
)]
pub async fn get_topic(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    // A bearer token widens visibility to the owner's own pending topics;
    // without one the request is served as anonymous.
    let auth_user = authenticate_optional(&db, &headers).await;
    let viewer = Viewer::from(auth_user.as_ref());

    let service = TopicService::new(db);
    let topic = service.get_and_record_view(id, viewer).await?;
    Ok(ApiResponse::ok(TopicResponse::from(topic)))
}

#[utoipa::path(
    post,
    path = "/api/v1/topics",
    security(("jwt_token" = [])),
    request_body = CreateTopicRequest,
    responses(
        (status = 200, description = "Topic created, pending approval", body = TopicResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Not authenticated", body = AppError),
    ),
    tag = "topics"
)]
pub async fn create_topic(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateTopicRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = TopicService::new(db);
    let topic = service
        .create(
            auth_user.user_id,
            payload.category_id,
            &payload.title,
            &payload.content,
        )
        .await?;

    Ok(ApiResponse::with_message(
        TopicResponse::from(topic),
        "Topic submitted for moderation".to_string(),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/topics/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Topic ID")),
    request_body = UpdateTopicRequest,
    responses(
        (status = 200, description = "Topic updated, back to pending", body = TopicResponse),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "topics"
)]
pub async fn update_topic(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTopicRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = TopicService::new(db);
    let topic = service
        .update(id, auth_user.user_id, &payload.title, &payload.content)
        .await?;

    Ok(ApiResponse::with_message(
        TopicResponse::from(topic),
        "Topic resubmitted for moderation".to_string(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/topics/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Topic and its replies deleted", body = String),
        (status = 403, description = "Not the owner or an admin", body = AppError),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "topics"
)]
pub async fn delete_topic(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = TopicService::new(db);
    service
        .delete(id, auth_user.user_id, auth_user.is_admin())
        .await?;
    Ok(ApiResponse::ok("Topic deleted"))
}

#[utoipa::path(
    post,
    path = "/api/v1/topics/{id}/lock",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Topic locked", body = TopicResponse),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "topics"
)]
pub async fn lock_topic(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    let service = TopicService::new(db);
    let topic = service.set_locked(id, true).await?;
    Ok(ApiResponse::ok(TopicResponse::from(topic)))
}

#[utoipa::path(
    post,
    path = "/api/v1/topics/{id}/unlock",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Topic unlocked", body = TopicResponse),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "topics"
)]
pub async fn unlock_topic(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    let service = TopicService::new(db);
    let topic = service.set_locked(id, false).await?;
    Ok(ApiResponse::ok(TopicResponse::from(topic)))
}

#[utoipa::path(
    post,
    path = "/api/v1/topics/{id}/pin",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Topic pinned", body = TopicResponse),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "topics"
)]
pub async fn pin_topic(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    let service = TopicService::new(db);
    let topic = service.set_pinned(id, true).await?;
    Ok(ApiResponse::ok(TopicResponse::from(topic)))
}

#[utoipa::path(
    post,
    path = "/api/v1/topics/{id}/unpin",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Topic unpinned", body = TopicResponse),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "topics"
)]
pub async fn unpin_topic(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    let service = TopicService::new(db);
    let topic = service.set_pinned(id, false).await?;
    Ok(ApiResponse::ok(TopicResponse::from(topic)))
}
