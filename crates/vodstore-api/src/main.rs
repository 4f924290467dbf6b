use vodstore_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    vodstore_api::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let config = Config::from_env()?;
    config.validate()?;

    let (_state, router) = vodstore_api::setup::initialize_app(config.clone()).await?;

    vodstore_api::setup::start_server(&config, router).await
}
