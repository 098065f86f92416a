mod cli;
mod tables;

use clap::{Parser, crate_version};
use meterstat::prelude::*;

use crate::cli::{Args, Command, realtime, report};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Report(args) => report(&args)?,
        Command::Realtime(args) => realtime(&args)?,
    }

    info!("done!");
    Ok(())
}
