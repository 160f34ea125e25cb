//! Trigpage - Main Application Entry Point
//!
//! REST API server for a multi-tenant ABM landing page service.
//! Organizations create personalized pages per prospect, gate them behind
//! email capture, receive voice-call transcripts over a signed webhook,
//! and review call logs and leads.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: bearer API keys with SHA-256 hashing
//! - **Webhooks**: inbound HMAC-SHA256 signed deliveries
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let server_port = config.server_port;
    let app_state = AppState { pool, config };

    // Management API routes, all behind API key authentication
    let authenticated_routes = Router::new()
        // Page management routes
        .route("/api/v1/pages", post(handlers::pages::create_page))
        .route("/api/v1/pages", get(handlers::pages::list_pages))
        .route("/api/v1/pages/{id}", get(handlers::pages::get_page))
        .route("/api/v1/pages/{id}", put(handlers::pages::update_page))
        .route("/api/v1/pages/{id}", delete(handlers::pages::delete_page))
        // Review routes
        .route("/api/v1/pages/{id}/calls", get(handlers::calls::list_calls))
        .route("/api/v1/pages/{id}/leads", get(handlers::leads::list_leads))
        // Key management routes
        .route("/api/v1/api-keys", post(handlers::api_keys::create_api_key))
        .route("/api/v1/api-keys", get(handlers::api_keys::list_api_keys))
        .route(
            "/api/v1/api-keys/{id}",
            delete(handlers::api_keys::revoke_api_key),
        )
        // Prompt template routes
        .route("/api/v1/prompts", post(handlers::prompts::create_prompt))
        .route("/api/v1/prompts", get(handlers::prompts::list_prompts))
        .route("/api/v1/prompts/{id}", put(handlers::prompts::update_prompt))
        .route(
            "/api/v1/prompts/{id}",
            delete(handlers::prompts::delete_prompt),
        )
        // Content generation
        .route("/api/v1/generate", post(handlers::generate::generate_content))
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::auth_middleware,
        ));

    // Browser-facing routes: published pages, the email gate submit, and
    // the provider webhook. Landing pages are embedded cross-origin, so
    // these get a permissive CORS layer.
    let public_routes = Router::new()
        .route(
            "/api/public/pages/{slug}",
            get(handlers::public_pages::get_public_page),
        )
        .route(
            "/api/public/capture-email",
            post(handlers::capture::capture_email),
        )
        .route(
            "/api/webhooks/elevenlabs",
            post(handlers::webhooks::receive_webhook),
        )
        .layer(CorsLayer::permissive());

    let app = Router::new()
        // Health check (no authentication required)
        .route("/health", get(handlers::health::health_check))
        // Onboarding guards itself with the bootstrap token
        .route(
            "/api/v1/organizations",
            post(handlers::organizations::create_organization),
        )
        .merge(public_routes)
        .merge(authenticated_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Share pool + config with all handlers via State extraction
        .with_state(app_state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, app).await?;

    Ok(())
}
