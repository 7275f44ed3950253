use dotenvy::dotenv;
use portal_frontend::config::get_configuration;
use portal_frontend::startup::build_router;
use portal_frontend::AppState;
use service_core::observability::{init_tracing, install_recorder};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "portal-frontend",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    )?;

    let metrics = install_recorder()?;

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    info!(api = %configuration.api.base_url, "Backend API configured");

    let state = AppState::new(configuration, metrics)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting portal-frontend on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
