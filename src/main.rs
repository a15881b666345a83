mod core;
mod features;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::products::{routes as products_routes, ProductService};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created: {}", config.database.url);

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    let app = build_app(&config, pool.clone());

    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let listener = bind_listener(socket_addr)?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Database pool closed");

    Ok(())
}

/// Catalog API routes plus health check, without static assets or HTTP layers
fn build_api_router(pool: SqlitePool) -> Router {
    let product_service = Arc::new(ProductService::new(pool.clone()));
    let category_service = Arc::new(CategoryService::new(pool));

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }

    Router::new()
        .merge(products_routes::routes(product_service))
        .merge(categories_routes::routes(category_service))
        .route("/health", axum::routing::get(health_check))
}

/// Serve files from `dir`, answering unknown paths with the SPA's index.html
fn static_files(dir: &str) -> ServeDir<ServeFile> {
    let index = Path::new(dir).join("index.html");
    ServeDir::new(dir).fallback(ServeFile::new(index))
}

fn build_app(config: &Config, pool: SqlitePool) -> Router {
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .merge(build_api_router(pool))
        .fallback_service(static_files(&config.app.static_dir))
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(axum::middleware::from_fn_with_state(
            config.app.request_timeout,
            middleware::request_timeout,
        ))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

fn bind_listener(socket_addr: std::net::SocketAddr) -> std::io::Result<tokio::net::TcpListener> {
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    tokio::net::TcpListener::from_std(socket.into())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AppConfig, DatabaseConfig, SwaggerConfig};
    use crate::shared::test_helpers::create_test_pool;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::time::Duration;

    fn config_with_static_dir(static_dir: &Path) -> Config {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_allowed_origins: vec!["*".to_string()],
                max_request_body_size: 64 * 1024,
                request_timeout: Duration::from_secs(5),
                static_dir: static_dir.to_string_lossy().into_owned(),
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                min_connections: 1,
                acquire_timeout_secs: 5,
                busy_timeout_secs: 5,
            },
            swagger: SwaggerConfig {
                title: "Catalog API".to_string(),
                version: "0.1.0".to_string(),
                description: "test".to_string(),
            },
        }
    }

    fn temp_static_dir(with_index: bool) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("catalog-static-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("app.js"), "console.log('catalog');").unwrap();
        if with_index {
            std::fs::write(dir.join("index.html"), "<html>catalog</html>").unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_static_asset_and_spa_fallback() {
        let dir = temp_static_dir(true);
        let app = build_app(&config_with_static_dir(&dir), create_test_pool().await);
        let server = TestServer::new(app).unwrap();

        let asset = server.get("/app.js").await;
        asset.assert_status_ok();
        assert!(asset.text().contains("catalog"));

        let root = server.get("/").await;
        root.assert_status_ok();
        assert!(root.text().contains("<html>catalog</html>"));

        let deep_link = server.get("/products/42").await;
        deep_link.assert_status_ok();
        assert!(deep_link.text().contains("<html>catalog</html>"));

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_missing_index_is_not_found() {
        let dir = temp_static_dir(false);
        let app = build_app(&config_with_static_dir(&dir), create_test_pool().await);
        let server = TestServer::new(app).unwrap();

        server.get("/nowhere").await.assert_status_not_found();

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_api_routes_take_precedence_over_static_files() {
        let dir = temp_static_dir(true);
        let app = build_app(&config_with_static_dir(&dir), create_test_pool().await);
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/categories").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert!(body.is_array());

        server.get("/health").await.assert_status(StatusCode::OK);

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let dir = temp_static_dir(true);
        let app = build_app(&config_with_static_dir(&dir), create_test_pool().await);
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;
        assert!(response.headers().contains_key("x-request-id"));

        std::fs::remove_dir_all(dir).ok();
    }
}
