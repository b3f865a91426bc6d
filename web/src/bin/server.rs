//! Standalone poker server binary
//!
//! Usage: cargo run -p holdem-web --bin holdem-server

use clap::Parser;
use holdem_web::{ServerConfig, TimerConfig, WebServer};
use std::time::Duration;

/// Multi-table no-limit hold'em room server
#[derive(Parser, Debug)]
#[command(name = "holdem-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind to
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Seconds a player has to act before being auto-folded
    #[arg(long, default_value_t = 30)]
    turn_deadline: u64,

    /// Seconds a disconnected player's seat is held for reconnection
    #[arg(long, default_value_t = 60)]
    disconnect_grace: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    holdem_web::init_logging();

    let args = Args::parse();
    let timers = TimerConfig {
        turn_deadline: Duration::from_secs(args.turn_deadline),
        disconnect_grace: Duration::from_secs(args.disconnect_grace),
    };
    let config = ServerConfig::new(args.host, args.port).with_timers(timers);

    let server = WebServer::new(config);
    let handle = server.start().await?;
    tracing::info!("server running at http://{}", handle.address());
    println!("server running at http://{}", handle.address());
    println!("press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down");
    handle.shutdown().await?;
    Ok(())
}
