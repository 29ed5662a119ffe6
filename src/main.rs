use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use docvault::bootstrap::app_context::{AppContext, AppServices};
use docvault::bootstrap::config::Config;
use docvault::infrastructure::storage::FsUploadStore;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            docvault::presentation::http::documents::list_documents,
            docvault::presentation::http::documents::save_document,
            docvault::presentation::http::documents::get_document,
            docvault::presentation::http::documents::delete_document,
            docvault::presentation::http::files::upload_file,
            docvault::presentation::http::health::health,
        ),
        components(schemas(
            docvault::presentation::http::documents::Document,
            docvault::presentation::http::documents::DocumentRow,
            docvault::presentation::http::documents::DocumentListResponse,
            docvault::presentation::http::documents::SaveDocumentRequest,
            docvault::presentation::http::documents::SaveDocumentResponse,
            docvault::presentation::http::documents::StoreErrorBody,
            docvault::presentation::http::files::UploadFileResponse,
            docvault::presentation::http::files::UploadFileMultipart,
            docvault::presentation::http::health::HealthResp,
        )),
        tags(
            (name = "Documents", description = "Documents persistence"),
            (name = "Files", description = "File uploads"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

fn cors_layer(cfg: &Config) -> CorsLayer {
    let methods = [
        http::Method::GET,
        http::Method::POST,
        http::Method::DELETE,
        http::Method::OPTIONS,
    ];
    let base = CorsLayer::new()
        .allow_methods(methods)
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]);
    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        Some(Err(_)) | None if cfg.is_production => {
            // production requires FRONTEND_URL; deny everything if it is unusable
            base.allow_origin(AllowOrigin::exact(HeaderValue::from_static(
                "http://invalid",
            )))
        }
        _ => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = ?e, "ctrl_c_listener_failed");
        std::future::pending::<()>().await;
    }
    info!("shutdown_signal_received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "docvault=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting docvault");

    let document_store = docvault::bootstrap::store::connect_document_store(&cfg).await?;

    if let Err(e) = tokio::fs::create_dir_all(&cfg.uploads_dir).await {
        tracing::warn!(error = ?e, dir = %cfg.uploads_dir, "Failed to create uploads dir");
    }
    let upload_store = Arc::new(FsUploadStore::new(&cfg.uploads_dir));

    let services = AppServices::new(document_store, upload_store);
    let ctx = AppContext::new(cfg.clone(), services);

    let app = docvault::presentation::http::api_routes(ctx.clone())
        .nest_service("/api/uploads", ServeDir::new(&cfg.uploads_dir))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&cfg))
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        error!(error = ?e, "API server failed");
    }

    ctx.shutdown().await;
    served?;
    Ok(())
}
