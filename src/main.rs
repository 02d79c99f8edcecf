#[cfg(feature = "web-interface")]
mod shutdown;
#[cfg(feature = "web-interface")]
mod startup;

#[cfg(feature = "web-interface")]
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    #[cfg(not(feature = "web-interface"))]
    {
        println!("Web interface feature not enabled. Please compile with --features web-interface");
        return Ok(());
    }

    #[cfg(feature = "web-interface")]
    {
        // Initialize logging
        startup::init_logging()?;

        info!("Starting Startup Billboard");

        // Load configuration
        let config = startup::load_config()?;

        // Serve the billboard
        startup::start_server(config).await
    }
}
