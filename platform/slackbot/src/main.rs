use anyhow::Context;
use slackbot::config::Config;
use slackbot::run;
use std::net::TcpListener;
use stockbot::logger::init_tracing;
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("invalid configuration")?;

    let address = format!("0.0.0.0:{}", config.port);
    let listener =
        TcpListener::bind(&address).with_context(|| format!("failed to bind to {}", address))?;

    info!(%address, "starting slackbot");

    run(listener, config)?.await?;

    Ok(())
}
