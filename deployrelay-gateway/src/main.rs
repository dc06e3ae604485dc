use anyhow::Result;
use deployrelay_domain::telemetry::{get_subscriber, init_subscriber, log_sink};
use deployrelay_gateway::{
    config::Config,
    forwarder::Forwarder,
    server::{Server, SERVICE_NAME},
};
use dotenvy::dotenv;
use envconfig::Envconfig;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::init_from_env()?;

    let subscriber = get_subscriber(
        SERVICE_NAME,
        config.log_filter(),
        log_sink(&config.log_file)?,
    );
    init_subscriber(subscriber)?;

    config.validate()?;

    info!("Starting {SERVICE_NAME} with config:\n{config}");

    let forwarder = Forwarder::new(&config)?;

    let server = Server::new(config, Arc::new(forwarder));

    server.run().await?;

    Ok(())
}
