/// HTTP server setup and routing
use crate::{
    context::AppContext,
    error::{ApiError, ApiResult, ErrorResponse},
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    response::Json,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

/// Build the main application router
///
/// Uploaded assets are served statically under /public straight from the
/// asset directory; everything else goes through the API routes, with a
/// JSON 404 fallback.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let assets_dir = ctx.config.storage.asset_directory.clone();
    let upload_limit = ctx.config.service.upload_limit;

    Router::new()
        .nest_service("/public", ServeDir::new(assets_dir))
        .merge(crate::api::routes())
        .with_state(ctx)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            message: "Endpoint not found".to_string(),
            error: None,
        }),
    )
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> ApiResult<()> {
    let addr = format!("{}:{}", ctx.config.service.hostname, ctx.config.service.port);

    info!("Atelier API listening on {}", addr);
    info!("   Public base URL: {}", ctx.config.service.public_base_url);
    info!("   Asset directory: {:?}", ctx.config.storage.asset_directory);

    let shutdown_ctx = ctx.clone();
    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    shutdown_ctx.shutdown().await;

    Ok(())
}
