use dotenvy::dotenv;
use radportal::api::{self, AppState, ImageStore};
use radportal::assistant::{GeminiClient, SessionRegistry};
use radportal::config::{self, database};
use radportal::core::seed;
use radportal::errors::{Error, Result};
use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received, draining connections.");
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Initialize database and tables
    let database_url = database::resolve_database_url(app_config.database.url.as_deref());
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed guidelines and the default announcement (if missing)
    seed::seed_defaults(&db, &app_config.seed)
        .await
        .inspect(|report| {
            info!(
                "Seeding done: {} guidelines inserted, announcement written: {}",
                report.guidelines_inserted, report.announcement_written
            );
        })
        .inspect_err(|e| error!("Failed to seed database: {}", e))?;

    // 6. Assistant client
    // GEMINI_API_KEY is read here, directly before use, not stored in AppConfig
    let api_key = env::var("GEMINI_API_KEY").unwrap_or_else(|e| {
        warn!("GEMINI_API_KEY not available ({}); assistant answers will fail.", e);
        String::new()
    });
    let client = GeminiClient::from_config(&app_config.assistant, api_key);
    let assistant = SessionRegistry::with_capacity(
        Arc::new(client),
        app_config.assistant.max_sessions,
    );

    // 7. Image store
    let images = ImageStore::new(&app_config.server.upload_dir);
    images
        .ensure_dir()
        .await
        .inspect_err(|e| error!("Failed to prepare upload directory: {}", e))?;

    // 8. Serve HTTP until Ctrl-C
    let state = AppState::new(
        Arc::new(db),
        images,
        assistant,
        app_config.dashboard.devices.clone(),
    );
    let router = api::build_router(state, app_config.server.max_upload_bytes);

    let listener = TcpListener::bind(&app_config.server.bind)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", app_config.server.bind, e))?;
    info!("Server running on http://{}", app_config.server.bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::from)?;

    info!("Server stopped.");
    Ok(())
}
