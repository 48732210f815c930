use ledger_server::{Server, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // 1. dotenv, config, logging
    let config = setup_environment();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        work_dir = %config.work_dir,
        environment = %config.environment,
        "Ledger server starting..."
    );
    if config.is_production() && !config.require_write_session {
        tracing::warn!("REQUIRE_WRITE_SESSION is off; writes are accepted without a session");
    }

    // 2. State is opened inside run; background tasks start with it
    let server = Server::new(config);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
