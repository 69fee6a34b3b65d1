#![allow(dead_code)]
#![recursion_limit = "256"]

mod cli;
mod application;
mod domain;
mod data;
mod ml;
mod infra;

use anyhow::{Context, Result};
use cli::Cli;
use clap::Parser;

fn main() -> Result<()> {
    let directive: tracing_subscriber::filter::Directive = "vae_cli=info"
        .parse()
        .context("Invalid default log directive")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
