use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lead_intake::config::{Backend, Config};
use lead_intake::db::Database;
use lead_intake::db_storage::LeadStorage;
use lead_intake::gateway_client::LeadApiClient;
use lead_intake::handlers::AppState;
use lead_intake::lead_sink::LeadSink;
use lead_intake::routes::build_router;

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, builds the single lead backend
/// selected by `LEAD_BACKEND`, and starts the Axum server. Missing or invalid
/// configuration stops the process before it binds the port.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_intake=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let sink: Arc<dyn LeadSink> = match &config.backend {
        Backend::Api(api) => {
            let client = LeadApiClient::new(api.url.clone(), api.timeout)?;
            tracing::info!("✓ Lead API client initialized: {}", api.url);
            Arc::new(client)
        }
        Backend::Database(settings) => {
            let db = Database::new(settings).await?;
            tracing::info!("Database connection pool established");
            db.ensure_schema().await?;
            tracing::info!("✓ usuarios table ready");
            Arc::new(LeadStorage::new(db.pool.clone()))
        }
    };

    let app_state = Arc::new(AppState { sink });
    let app = build_router(app_state, &config.public_dir);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Lead intake listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
