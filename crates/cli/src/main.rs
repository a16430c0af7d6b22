// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! swath - queue-driven workflow dispatch with admission control

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod context;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{connections, dispatch, executions, feedback, lock, message, queue, semaphore};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::context::Context;
use crate::error::CliError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "swath",
    version,
    about = "Swath - admission-controlled workflow dispatch from work queues"
)]
struct Cli {
    /// State directory shared by every swath process on this host
    #[arg(long, global = true, env = "SWATH_ROOT", default_value = ".swath")]
    root: PathBuf,

    /// Config file (default: <root>/swath.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, short, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Log more (-v info, -vv debug); SWATH_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build workflow messages from templates
    Message(message::MessageArgs),
    /// Drain a queue, starting executions within its limit
    Dispatch(dispatch::DispatchArgs),
    /// Apply a workflow status event
    Feedback(feedback::FeedbackArgs),
    /// Inspect or adjust a queue semaphore
    Semaphore(semaphore::SemaphoreArgs),
    /// Named TTL locks
    Lock(lock::LockArgs),
    /// Per-provider connection permits
    Connections(connections::ConnectionsArgs),
    /// Send to or inspect a work queue
    Queue(queue::QueueArgs),
    /// List started executions
    Executions(executions::ExecutionsArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors exit 1 so that 2 and 3 keep their coordination meanings
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(error::EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let cli_err = CliError::from_anyhow(err);
            eprint!("{}", cli_err);
            ExitCode::from(cli_err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::load(cli.root, cli.config.as_deref(), cli.output)?;

    match cli.command {
        Commands::Message(args) => message::handle(args.command, &ctx).await,
        Commands::Dispatch(args) => dispatch::handle(args, &ctx).await,
        Commands::Feedback(args) => feedback::handle(args, &ctx).await,
        Commands::Semaphore(args) => semaphore::handle(args.command, &ctx).await,
        Commands::Lock(args) => lock::handle(args.command, &ctx).await,
        Commands::Connections(args) => connections::handle(args.command, &ctx).await,
        Commands::Queue(args) => queue::handle(args.command, &ctx).await,
        Commands::Executions(args) => executions::handle(args, &ctx),
    }
}

/// Logs go to stderr so command output on stdout stays parseable
fn setup_logging(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env("SWATH_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
