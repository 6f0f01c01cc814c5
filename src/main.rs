use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ddx_core::{DdxConfig, DiagnosisService, EnvValues};

/// Main entry point for the DDX server
///
/// Loads the reference dataset, then serves the REST API (with Swagger UI) until the process is
/// stopped. The dataset is loaded before the listener binds, so a bad dataset never serves
/// traffic.
///
/// # Environment Variables
/// - `DDX_REST_ADDR`: REST server address (default: "0.0.0.0:5001")
/// - `DDX_CORS_ALLOW_ORIGINS`: comma-separated allowed origins (unset: permissive)
/// - `DDX_DATA_DIR`, `DDX_PROFILES_FILE`, `DDX_SYMPTOM_LIBRARY_FILE`: dataset location
/// - `DDX_DEFAULT_TOP_N`, `DDX_DEFAULT_MIN_CONFIDENCE`: query defaults
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration or dataset is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ddx=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DdxConfig::from_env_values(EnvValues::from_process_env())?;
    let service = match DiagnosisService::load(&config) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, "refusing to start without a valid dataset");
            return Err(e.into());
        }
    };

    let rest_addr = std::env::var("DDX_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5001".into());
    let cors_origins = std::env::var("DDX_CORS_ALLOW_ORIGINS").ok();
    let cors = api_rest::cors_layer(cors_origins.as_deref())?;

    let app = api_rest::router(Arc::new(service), cors);

    tracing::info!("++ Starting DDX REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
