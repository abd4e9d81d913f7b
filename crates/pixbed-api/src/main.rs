use pixbed_core::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let (_state, router) = pixbed_api::setup::initialize_app(config.clone()).await?;

    pixbed_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
