//! ECE-Vision Hub API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Authentication and authorization
//! - Rate limiting
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post, put},
    Router,
};
use ecevision_common::{
    auth::JwtManager,
    cache::Cache,
    config::AppConfig,
    db::DbPool,
    errors::AppError,
    metrics,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn, Level};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub cache: Option<Arc<Cache>>,
    pub jwt: Arc<JwtManager>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting ECE-Vision Hub API Gateway v{}", ecevision_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();

    if config.observability.metrics_port > 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!("Prometheus exporter listening on {}", addr);
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    // Initialize cache (the service runs without it if Redis is unreachable)
    let cache = if config.redis.enabled {
        match Cache::new(&config.redis).await {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) => {
                warn!(error = %e, "Redis unavailable, continuing without cache");
                None
            }
        }
    } else {
        None
    };

    // JWT manager for session tokens
    let jwt_secret = config
        .auth
        .jwt_secret
        .clone()
        .ok_or_else(|| AppError::Configuration {
            message: "auth.jwt_secret must be configured".to_string(),
        })?;
    let jwt = Arc::new(JwtManager::new(&jwt_secret, config.auth.jwt_expiration_secs));

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        cache,
        jwt,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Public routes (no auth)
    let public_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Auth endpoints
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/password-reset/request", post(handlers::auth::request_password_reset))
        .route("/auth/password-reset/confirm", post(handlers::auth::confirm_password_reset))

        // Idea browsing
        .route("/ideas", get(handlers::ideas::list_ideas))
        .route("/ideas/{id}", get(handlers::ideas::get_idea))

        // Profile directory & explore stats
        .route("/profiles", get(handlers::social::list_profiles))
        .route("/profiles/{id}", get(handlers::social::get_profile))
        .route("/explore/stats", get(handlers::social::explore_stats))

        // News & merged updates feed
        .route("/news", get(handlers::news::list_news))
        .route("/news/{id}", get(handlers::news::get_news))
        .route("/feed", get(handlers::feed::updates_feed));

    // Routes requiring an authenticated user
    let protected_routes = Router::new()
        // Idea mutations
        .route("/ideas", post(handlers::ideas::create_idea))
        .route("/ideas/{id}", patch(handlers::ideas::update_idea))
        .route("/ideas/{id}/upvote", post(handlers::ideas::upvote_idea))

        // Suggestion thread
        .route(
            "/ideas/{id}/suggestions",
            get(handlers::suggestions::list_suggestions)
                .post(handlers::suggestions::create_suggestion),
        )
        .route(
            "/suggestions/{id}/upvote",
            post(handlers::suggestions::toggle_suggestion_upvote),
        )

        // Social graph
        .route("/profiles/me", patch(handlers::social::update_my_profile))
        .route(
            "/profiles/{id}/follow",
            post(handlers::social::follow).delete(handlers::social::unfollow),
        )

        // Personal surfaces
        .route("/notifications", get(handlers::feed::my_notifications))
        .route("/achievements", get(handlers::achievements::my_achievements))
        .route(
            "/queries",
            post(handlers::queries::create_query).get(handlers::queries::my_queries),
        )

        // Admin moderation
        .route("/admin/dashboard", get(handlers::admin::dashboard))
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users/{id}/block", put(handlers::admin::set_user_blocked))
        .route("/admin/users/{id}", delete(handlers::admin::delete_user))
        .route("/admin/ideas/{id}/status", put(handlers::admin::set_idea_status))
        .route("/admin/ideas/{id}/feature", put(handlers::admin::set_idea_featured))
        .route("/admin/ideas/{id}", delete(handlers::admin::delete_idea))
        .route(
            "/admin/notifications",
            post(handlers::admin::send_notification).get(handlers::admin::list_notifications),
        )
        .route(
            "/admin/notifications/{id}",
            delete(handlers::admin::delete_notification),
        )
        .route("/admin/news", post(handlers::admin::create_news))
        .route(
            "/admin/news/{id}",
            put(handlers::admin::update_news).delete(handlers::admin::delete_news),
        )
        .route("/admin/queries", get(handlers::admin::list_queries))
        .route("/admin/queries/{id}/response", put(handlers::admin::respond_to_query))
        .layer(from_fn_with_state(state.clone(), middleware::auth::require_auth));

    let api_routes = public_routes.merge(protected_routes);

    // Rate limiting across the API surface
    let mut router = Router::new().nest("/v1", api_routes);

    if state.config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            state.config.rate_limit.requests_per_second,
            state.config.rate_limit.burst,
        );
        router = router.layer(from_fn(move |request: axum::extract::Request, next: axum::middleware::Next| {
            let limiter = limiter.clone();
            async move { middleware::rate_limit::rate_limit_middleware(request, next, limiter).await }
        }));
    }

    // Compose the app
    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
