use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_vault::{
    AppState, Argon2Hasher, HasherState, PostgresRepository, RepositoryState, UserService,
    config::{AppConfig, Env},
    create_router,
};

/// main
///
/// Asynchronous entry point: initializes configuration, logging, the database
/// pool, the service layer, and the HTTP server.
#[tokio::main]
async fn main() {
    // Configuration & environment loading (fail-fast).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // Log filter: RUST_LOG wins, with sensible local defaults otherwise.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "user_vault=debug,tower_http=info,axum=trace".into());

    // Structured logging format selected per environment: pretty output for
    // humans locally, JSON for log aggregators in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // Database initialization (Postgres).
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;
    let hasher = Arc::new(Argon2Hasher) as HasherState;
    let service = UserService::new(repo.clone(), hasher, config.clone());

    // Unified state assembly.
    let app_state = AppState {
        service,
        repo,
        config,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("FATAL: Failed to bind 0.0.0.0:3000");

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:3000/swagger-ui");

    axum::serve(listener, app).await.expect("server error");
}
