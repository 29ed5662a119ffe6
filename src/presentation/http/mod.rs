pub mod documents;
pub mod files;
pub mod health;

use axum::Router;

use crate::bootstrap::app_context::AppContext;

/// All `/api` routes, without CORS, tracing or static upload serving.
pub fn api_routes(ctx: AppContext) -> Router {
    Router::new()
        .nest("/api", health::routes(ctx.clone()))
        .nest("/api", documents::routes(ctx.clone()))
        .nest("/api", files::routes(ctx))
}
