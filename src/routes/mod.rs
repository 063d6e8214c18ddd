use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let public = public_routes();
    let protected = protected_routes().layer(middleware::from_fn(auth_middleware));

    public.merge(protected)
}

/// Public routes. Topic and reply GETs accept an optional bearer token so
/// owners and admins can see their own pending content.
fn public_routes() -> Router {
    Router::new()
        // Auth
        .route("/auth/register", routing::post(handlers::auth::register))
        .route("/auth/login", routing::post(handlers::auth::login))
        // Categories
        .route(
            "/categories",
            routing::get(handlers::category::list_categories),
        )
        .route(
            "/categories/{id}",
            routing::get(handlers::category::get_category),
        )
        // Topics
        .route("/topics", routing::get(handlers::topic::list_topics))
        .route("/topics/{id}", routing::get(handlers::topic::get_topic))
        .route(
            "/topics/{id}/replies",
            routing::get(handlers::reply::list_replies),
        )
        // Replies
        .route("/replies/{id}", routing::get(handlers::reply::get_reply))
}

/// Protected routes: authenticated writes plus the admin surface
/// (admin role checked in the handlers).
fn protected_routes() -> Router {
    Router::new()
        // Auth
        .route("/auth/me", routing::get(handlers::auth::me))
        // Categories (admin only)
        .route(
            "/categories",
            routing::post(handlers::category::create_category),
        )
        .route(
            "/categories/{id}",
            routing::put(handlers::category::update_category)
                .delete(handlers::category::delete_category),
        )
        // Topics
        .route("/topics", routing::post(handlers::topic::create_topic))
        .route(
            "/topics/{id}",
            routing::put(handlers::topic::update_topic).delete(handlers::topic::delete_topic),
        )
        .route(
            "/topics/{id}/lock",
            routing::post(handlers::topic::lock_topic),
        )
        .route(
            "/topics/{id}/unlock",
            routing::post(handlers::topic::unlock_topic),
        )
        .route(
            "/topics/{id}/pin",
            routing::post(handlers::topic::pin_topic),
        )
        .route(
            "/topics/{id}/unpin",
            routing::post(handlers::topic::unpin_topic),
        )
        // Replies
        .route("/replies", routing::post(handlers::reply::create_reply))
        .route(
            "/replies/{id}",
            routing::put(handlers::reply::update_reply).delete(handlers::reply::delete_reply),
        )
        // Moderation
        .route(
            "/moderation/topics/pending",
            routing::get(handlers::moderation::pending_topics),
        )
        .route(
            "/moderation/replies/pending",
            routing::get(handlers::moderation::pending_replies),
        )
        .route(
            "/moderation/topics/{id}/approve",
            routing::post(handlers::moderation::approve_topic),
        )
        .route(
            "/moderation/topics/{id}/reject",
            routing::post(handlers::moderation::reject_topic),
        )
        .route(
            "/moderation/replies/{id}/approve",
            routing::post(handlers::moderation::approve_reply),
        )
        .route(
            "/moderation/replies/{id}/reject",
            routing::post(handlers::moderation::reject_reply),
        )
        .route(
            "/moderation/users/{id}/ban",
            routing::post(handlers::moderation::ban_user),
        )
        .route(
            "/moderation/users/{id}/unban",
            routing::post(handlers::moderation::unban_user),
        )
}
