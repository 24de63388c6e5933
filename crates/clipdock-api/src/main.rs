use mimalloc::MiMalloc;

use clipdock_api::setup::{initialize_app, server::start_server};
use clipdock_api::telemetry::init_tracing;
use clipdock_core::Config;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();

    tracing::info!(
        environment = %config.environment,
        port = config.server_port,
        "starting clipdock-api"
    );

    let port = config.server_port;
    let app = initialize_app(config).await?;
    start_server(app, port).await
}
