//! Wallet Deep-Link CLI Harness
//!
//! Stands in for the GUI layer: prints the outbound wallet URLs it would
//! launch and accepts pasted callback URLs on stdin. Useful for walking the
//! connect / sign / disconnect flows against a real or simulated wallet.

use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use url::Url;

use wallet_session::{SessionConfig, SessionEvent, UrlLauncher, WalletSession};

/// Prints outbound URLs instead of handing them to a platform launcher
struct PrintLauncher;

impl UrlLauncher for PrintLauncher {
    fn launch(&self, url: &Url) {
        println!("OPEN {url}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wallet_cli=debug".parse()?)
                .add_directive("wallet_session=debug".parse()?),
        )
        .init();

    let app_url = std::env::var("APP_URL").unwrap_or_else(|_| "https://pbvote.com/".to_string());
    let redirect_base = std::env::var("REDIRECT_BASE").unwrap_or_else(|_| "pbvote://app/".to_string());
    let redirect_base = Url::parse(&redirect_base).context("REDIRECT_BASE is not a valid URL")?;

    info!(app_url = %app_url, redirect = %redirect_base, "starting wallet CLI");

    let config = SessionConfig::new(app_url, redirect_base);
    let session = Arc::new(Mutex::new(WalletSession::new(config, Arc::new(PrintLauncher))));

    // Report phase transitions driven by callbacks
    let mut phase_rx = session.lock().phase_watch();
    tokio::spawn(async move {
        while phase_rx.changed().await.is_ok() {
            let phase = *phase_rx.borrow_and_update();
            info!(?phase, "session phase changed");
        }
    });

    println!("commands: connect | disconnect | sign <json> | status | quit");
    println!("paste a callback URL to deliver it to the session");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let outcome = handle_line(&session, line);
        match outcome {
            Ok(true) => break,
            Ok(false) => {}
            Err(err) => warn!(error = %err, "command failed"),
        }
    }

    Ok(())
}

/// Returns Ok(true) when the user asked to quit
fn handle_line(session: &Mutex<WalletSession>, line: &str) -> Result<bool> {
    match line {
        "quit" | "exit" => return Ok(true),
        "status" => {
            let session = session.lock();
            println!(
                "phase: {:?}  wallet: {}",
                session.phase(),
                session.wallet_public_key().unwrap_or("-")
            );
        }
        "connect" => {
            session.lock().connect()?;
        }
        "disconnect" => {
            session.lock().disconnect()?;
        }
        _ if line.starts_with("sign ") => {
            let params = serde_json::from_str(&line["sign ".len()..])
                .context("sign expects a JSON object")?;
            session.lock().sign_request(params)?;
        }
        // Anything with a scheme is treated as an inbound callback
        _ if line.contains("://") => {
            let event = session.lock().handle_callback(line)?;
            report(event);
        }
        _ => println!("unknown command: {line}"),
    }
    Ok(false)
}

fn report(event: SessionEvent) {
    match event {
        SessionEvent::Ignored => println!("callback ignored"),
        SessionEvent::Rejected(error) => println!("wallet rejected: {error}"),
        SessionEvent::Established { wallet_public_key } => {
            println!("connected to wallet {wallet_public_key}")
        }
        SessionEvent::Disconnected => println!("disconnected"),
        SessionEvent::Response { action, value } => println!("{action} response: {value}"),
    }
}
