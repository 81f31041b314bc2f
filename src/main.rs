use color_eyre::eyre::Result;
use coachline_api::{Backends, config::ApiConfig};
use coachline_remote::create_client;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Connect the hosted backend behind every repository seam
    let client = create_client(config.remote_config())?;

    // Start API server
    coachline_api::start_server(config, Backends::from_client(client)).await?;

    Ok(())
}
