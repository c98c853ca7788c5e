#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod workspace;

use std::process;

use anyhow::Context;
use publist_engine::service::PublishService;

use crate::config::Cli;
use crate::workspace::Workspace;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "publist_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "publist_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "publist_cli::command";

fn main() {
    let Err(error) = run() else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %error,
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing()?;
    cli.log();
    cli.validate()?;

    let workspace = Workspace::load(&cli.repository)?;
    let service = PublishService::new(workspace.repository(), cli.publish.clone())
        .context("failed to create publish service")?;

    let output = cli.command.execute(&service, &workspace)?;
    println!("{output}");
    Ok(())
}
