//! A request to an unroutable address that gives up after half a second.

use std::time::Duration;

use anyhow::Context;
use mwapi::{logger, params, Config, Error, Session};

const USER_AGENT: &str = "mwapi demo script";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    logger::init().context("initialize logger")?;

    let session = Session::new(
        Config::new("https://10.11.12.13")
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(500)),
    )
    .context("create session")?;

    println!("Making a request that should hang for 0.5 seconds and then timeout.");
    match session.get(params! { "action" => "fake" }).await {
        Err(err @ Error::Timeout(_)) => println!("Timeout: {}", err),
        Err(err) => println!("failed otherwise: {}", err),
        Ok(doc) => println!("unexpected response: {}", doc),
    }

    Ok(())
}
