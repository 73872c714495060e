// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Smoke tool for the gazette session layer: log in, inspect the session,
//! fetch protected resources, log out.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;

use gazette_session::{
    is_authenticated, ApiClient, CredentialStore, Environment, FileBackend, LogNavigator,
    MemoryBackend, SessionConfig,
};

#[derive(Parser)]
#[command(name = "gazette-session")]
struct Cli {
    #[command(flatten)]
    config: SessionConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and cache the credential pair and profile.
    Login { username: String, password: String },
    /// Print the cached profile and authentication status.
    Whoami,
    /// Perform an authenticated GET against an API path.
    Get { path: String },
    /// Drop all credential state.
    Logout,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _ = rustls::crypto::ring::default_provider().install_default();

    if let Err(e) = run(cli).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let store = Arc::new(CredentialStore::new(
        Environment::full(),
        Box::new(MemoryBackend::new()),
        Box::new(FileBackend::new(&cli.config.state_dir())),
        &cli.config,
    ));
    let client = ApiClient::new(cli.config, Arc::clone(&store), Box::new(LogNavigator));

    match cli.command {
        Command::Login { username, password } => {
            let profile = client.login(&username, &password).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::Whoami => {
            println!("authenticated: {}", is_authenticated(&store));
            match store.profile() {
                Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
                None => println!("no cached profile"),
            }
        }
        Command::Get { path } => {
            let resp = client.get(&path).await?;
            let status = resp.status();
            let body = resp.text().await?;
            println!("{status}\n{body}");
        }
        Command::Logout => {
            client.logout();
            println!("logged out");
        }
    }
    Ok(())
}
