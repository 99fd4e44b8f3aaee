use docshelf_api::{setup, telemetry};
use docshelf_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    telemetry::init_telemetry()?;

    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (storage areas, services, routes)
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::server::start_server(&config, router).await?;

    Ok(())
}
