//! uspshare-api library - HTTP surface of the resource-sharing backend
//!
//! Public reads, bearer-token protected user actions and admin-only catalog
//! edits, plus static serving of uploaded files.

use axum::Router;
use uspshare_common::api::TokenKeys;
use uspshare_common::config::AppConfig;
use uspshare_common::db::Store;
use uspshare_common::notify::NotificationDispatcher;

pub mod api;
pub mod error;
pub mod storage;

pub use error::{ApiError, ApiResult};
pub use storage::LocalFileStorage;

/// Extra body allowance for multipart framing and text fields
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Size and listing limits applied by handlers
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_upload_bytes: usize,
    pub max_avatar_bytes: usize,
    pub notification_limit: i64,
}

/// Application state shared across HTTP handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Store,
    pub notifier: NotificationDispatcher,
    pub keys: TokenKeys,
    pub storage: LocalFileStorage,
    pub limits: Limits,
    /// Allowed browser origin; `None` allows any
    pub cors_origin: Option<String>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Store, keys: TokenKeys, config: &AppConfig) -> Self {
        Self {
            notifier: NotificationDispatcher::new(store.clone()),
            store,
            keys,
            storage: LocalFileStorage::new(&config.uploads_dir),
            limits: Limits {
                max_upload_bytes: config.max_upload_bytes,
                max_avatar_bytes: config.max_avatar_bytes,
                notification_limit: config.notification_limit,
            },
            cors_origin: config.cors_origin.clone(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::extract::DefaultBodyLimit;
    use axum::middleware;
    use axum::routing::{delete, get, post};
    use tower_http::services::ServeDir;
    use tower_http::trace::TraceLayer;

    // Admin routes (bearer token + admin role)
    let admin = Router::new()
        .route("/api/admin/tags", post(api::create_tag))
        .route("/api/admin/tags/:id", delete(api::delete_tag))
        .route("/api/admin/courses", post(api::create_course))
        .route("/api/admin/courses/:id", delete(api::delete_course))
        .route("/api/admin/professors", post(api::create_professor))
        .route("/api/admin/professors/:id", delete(api::delete_professor))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::admin_middleware,
        ));

    // Protected routes (bearer token required)
    let protected = Router::new()
        .route("/api/upload", post(api::upload_resource))
        .route("/api/profile", get(api::get_profile).put(api::update_profile))
        .route("/api/profile/avatar", post(api::upload_avatar))
        .route("/api/my-uploads", get(api::my_uploads))
        .route("/api/my-likes", get(api::my_likes))
        .route("/api/my-comment-likes", get(api::my_comment_likes))
        .route("/api/notifications", get(api::list_notifications))
        .route("/api/notifications/:id/read", post(api::mark_notification_read))
        .route("/api/users/search", get(api::search_users))
        .route("/api/resource/:id", delete(api::delete_resource))
        .route("/api/resource/:id/comments", post(api::post_comment))
        .route("/api/resource/:id/like", post(api::toggle_resource_like))
        .route("/api/resource/:id/share", post(api::share_resource))
        .route("/api/comment/:id/like", post(api::toggle_comment_like))
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/signup", post(api::signup))
        .route("/api/login", post(api::login))
        .route("/api/stats", get(api::get_stats))
        .route("/api/resources", get(api::list_resources))
        .route("/api/resource/:id", get(api::get_resource))
        .route("/api/resource/:id/comments", get(api::list_comments))
        .route("/api/resource/:id/related", get(api::related_resources))
        .route("/api/data/courses", get(api::list_courses))
        .route("/api/data/professors", get(api::list_professors))
        .route("/api/data/tags", get(api::list_tags))
        .merge(api::health_routes());

    // Uploaded files, downloaded as attachments unless ?inline=true
    let files = Router::new()
        .nest_service(
            storage::UPLOADS_URL_PREFIX,
            ServeDir::new(&state.storage.upload_dir),
        )
        .layer(middleware::from_fn(api::content_disposition));

    let body_limit = state.limits.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    let cors = api::cors_layer(state.cors_origin.as_deref());

    // Combine routers
    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
        .merge(files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
