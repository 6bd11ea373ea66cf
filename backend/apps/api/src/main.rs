//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::sync::Arc;
use std::time::Duration;

use admin::application::BootstrapAdminUseCase;
use admin::{AdminMiddlewareState, PgAdminRepository, admin_auth_router, require_admin_session};
use axum::{
    Json, Router,
    body::Body,
    http::{self, Method, Request, header},
    middleware::{self, Next},
    routing::get,
};
use content::{ContentAppState, content_public_router, content_viewer_router};
use platform::rate_limit::MemoryRateLimitStore;
use platform::storage::LocalStorage;
use review::{PgReviewRepository, review_admin_router, review_viewer_router};
use share::{
    OtpDelivery, PgShareRepository, ShareMiddlewareState, require_share_session,
    share_admin_router, share_public_router, share_viewer_router,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer, ExposeHeaders};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,admin=info,share=info,review=info,content=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    tokio::fs::create_dir_all(&config.storage_root).await?;
    let storage = Arc::new(LocalStorage::new(&config.storage_root));

    let admin_repo = Arc::new(PgAdminRepository::new(pool.clone()));
    let share_repo = Arc::new(PgShareRepository::new(pool.clone()));
    let review_repo = Arc::new(PgReviewRepository::new(pool.clone()));
    let limiter = Arc::new(MemoryRateLimitStore::new());

    let admin_config = Arc::new(config.admin);
    let share_config = Arc::new(config.share);
    let review_config = Arc::new(config.review);
    let content_config = Arc::new(config.content);

    // Bootstrap the first admin; a bad password here must stop startup
    if let Some((email, password)) = config.bootstrap_admin {
        BootstrapAdminUseCase::new(admin_repo.clone(), admin_config.clone())
            .execute(&email, password, None)
            .await?;
    }

    // Startup cleanup
    // Errors here should not prevent server startup
    run_cleanup(&admin_repo, &share_repo, &limiter).await;

    {
        let admin_repo = admin_repo.clone();
        let share_repo = share_repo.clone();
        let limiter = limiter.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                run_cleanup(&admin_repo, &share_repo, &limiter).await;
            }
        });
    }

    let delivery = Arc::new(match &config.otp_webhook_url {
        Some(url) => OtpDelivery::webhook(url.clone())?,
        None => {
            if !cfg!(debug_assertions) {
                tracing::warn!("OTP_WEBHOOK_URL not set, one-time codes are only logged");
            }
            OtpDelivery::Log
        }
    });

    // Guards
    let admin_guard = AdminMiddlewareState {
        repo: admin_repo.clone(),
        config: admin_config.clone(),
    };
    let share_guard = ShareMiddlewareState {
        repo: share_repo.clone(),
        config: share_config.clone(),
    };

    let content_state = ContentAppState {
        repo: review_repo.clone(),
        projects: share_repo.clone(),
        limiter: limiter.clone(),
        storage: storage.clone(),
        config: content_config,
        share_config: share_config.clone(),
    };

    let admin_routes = Router::new()
        .merge(share_admin_router(share_repo.clone(), share_config.clone()))
        .merge(review_admin_router(
            review_repo.clone(),
            share_repo.clone(),
            storage,
            review_config.clone(),
        ))
        .layer(middleware::from_fn(move |req: Request<Body>, next: Next| {
            require_admin_session(admin_guard.clone(), req, next)
        }));

    let viewer_routes = Router::new()
        .merge(share_viewer_router(
            share_repo.clone(),
            limiter.clone(),
            delivery.clone(),
            share_config.clone(),
        ))
        .merge(review_viewer_router(
            review_repo,
            share_repo.clone(),
            limiter.clone(),
            review_config,
        ))
        .merge(content_viewer_router(content_state.clone()))
        .layer(middleware::from_fn(move |req: Request<Body>, next: Next| {
            require_share_session(share_guard.clone(), req, next)
        }));

    let api = Router::new()
        .route("/health", get(health))
        .nest(
            "/admin/auth",
            admin_auth_router(admin_repo, limiter.clone(), admin_config),
        )
        .merge(share_public_router(share_repo, limiter, delivery, share_config))
        .merge(content_public_router(content_state))
        .merge(viewer_routes)
        .merge(admin_routes);

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::RANGE,
        ]))
        .expose_headers(ExposeHeaders::list([
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
            header::CONTENT_LENGTH,
            header::RETRY_AFTER,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// GET /api/health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Purge expired sessions, OTP challenges and rate-limit windows
async fn run_cleanup(
    admin_repo: &PgAdminRepository,
    share_repo: &PgShareRepository,
    limiter: &MemoryRateLimitStore,
) {
    match admin_repo.cleanup_expired().await {
        Ok(sessions) => {
            tracing::info!(sessions_deleted = sessions, "Admin session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Admin session cleanup failed, continuing anyway");
        }
    }

    match share_repo.cleanup_expired().await {
        Ok((sessions, challenges)) => {
            tracing::info!(
                sessions_deleted = sessions,
                challenges_deleted = challenges,
                "Share session cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "Share session cleanup failed, continuing anyway");
        }
    }

    let windows = limiter.purge_expired();
    tracing::debug!(windows_purged = windows, "Rate limit windows purged");
}
