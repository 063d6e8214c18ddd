use crate::{
    error::AppError,
    models::{Role, User},
    utils::jwt::decode_jwt,
};
use axum::{
    extract::{FromRequestParts, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension,
};
use sea_orm::{DatabaseConnection, EntityTrait};

/// Authenticated caller identity, threaded explicitly through every
/// engine call. Role is resolved from the database at request time so a
/// demotion or ban takes effect on the next request.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i32,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.can_moderate()
    }
}

/// JWT authentication middleware for protected routes.
///
/// Verifies the bearer token, rejects banned (inactive) accounts, and
/// stores the caller identity in request extensions.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let auth_user = resolve_user(&db, &token).await?;

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Best-effort authentication for public routes where the owner or an
/// admin sees more than an anonymous visitor. A missing, invalid, or
/// banned credential degrades to anonymous instead of failing.
pub async fn authenticate_optional(db: &DatabaseConnection, headers: &HeaderMap) -> Option<AuthUser> {
    let token = extract_bearer_token(headers)?;
    resolve_user(db, &token).await.ok()
}

async fn resolve_user(db: &DatabaseConnection, token: &str) -> Result<AuthUser, AppError> {
    let claims = decode_jwt(token).map_err(|_| AppError::Unauthorized)?;

    let user_id: i32 = claims
        .sub
        .parse()
        .map_err(|_| AppError::Validation("Invalid user ID in token".to_string()))?;

    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // A banned account can no longer authenticate at all.
    if !user.is_active {
        return Err(AppError::Unauthorized);
    }

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Verify the caller holds the admin role.
pub fn require_admin(auth_user: &AuthUser) -> crate::error::AppResult<i32> {
    if !auth_user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(auth_user.user_id)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}
