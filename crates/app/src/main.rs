use std::{process::ExitCode, time::Duration};

use clap::{Parser, Subcommand};
use remote::HttpBackend;

use crate::{
    commands::{Session, topup::TopUpCommand},
    error::Result,
};

mod busy;
mod commands;
mod error;
mod prompt;
mod settings;

#[derive(Debug, Parser)]
#[command(name = "cuadre", about = "Cash register shifts, daily closings and profit transfers")]
struct Cli {
    #[command(flatten)]
    config: settings::ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Shift state, till balances and low-balance alerts.
    Status,
    /// Repair the carried deficit, verify the fund and open a shift.
    OpenShift,
    /// Close today's open shift.
    CloseShift,
    /// Run the daily closing wizard.
    Closing,
    /// Transfer last month's profit to petty cash.
    Profit,
    /// Virtual balance top-ups.
    Topup {
        #[command(subcommand)]
        command: TopUpCommand,
    },
}

async fn run(cli: Cli) -> Result<()> {
    let settings = settings::load(cli.config)?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "cuadre={level},engine={level},remote={level}",
            level = settings.level
        ))
        .init();

    let loading_timeout = Duration::from_secs(settings.loading_timeout_secs);
    let backend = HttpBackend::builder()
        .base_url(&settings.base_url)
        .api_key(&settings.api_key)
        .access_token(&settings.access_token)
        .timeout(loading_timeout * 4)
        .build()?;
    let session = Session {
        engine: engine::Engine::builder().backend(backend).build()?,
        loading_timeout,
    };
    tracing::debug!(base_url = %settings.base_url, "session ready");

    match cli.command {
        Command::Status => commands::status::run(&session).await,
        Command::OpenShift => commands::shift::open(&session).await,
        Command::CloseShift => commands::shift::close(&session).await,
        Command::Closing => commands::closing::run(&session).await,
        Command::Profit => commands::profit::run(&session).await,
        Command::Topup { command } => commands::topup::run(&session, command).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
