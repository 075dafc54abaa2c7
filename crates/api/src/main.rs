use anyhow::Context;

use soil_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    soil_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        persistent = config.persistent(),
        require_auth = config.require_auth,
        "starting soil-api"
    );

    let app = soil_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
