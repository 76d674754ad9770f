use anyhow::Context;
use bookings::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    init_tracing(&config).context("Failed to initialize tracing")?;

    let state = AppState::new(config.clone()).context("Failed to build template cache")?;
    let app = router(state).context("Failed to build router")?;

    Server::new(config)
        .serve(app)
        .await
        .context("Server exited with an error")?;

    Ok(())
}
