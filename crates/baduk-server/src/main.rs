//! Standalone baduk server.
//!
//! ```text
//! RUST_LOG=debug BADUK_BIND=0.0.0.0:8080 BADUK_BOARD_SIZE=9 BADUK_COUNTDOWN_SECS=5 baduk-server
//! ```

mod config;

use baduk::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind,
        board_size = config.room.session.board_size,
        countdown = config.room.countdown.start,
        "starting baduk server"
    );

    let server = BadukServerBuilder::new()
        .bind(&config.bind)
        .room_config(config.room)
        .build::<GoRules>()
        .await?;

    server.run().await?;
    Ok(())
}
