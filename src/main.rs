//! ytharvest CLI: harvest a channel's videos into the store every 24 hours.

use anyhow::Result;
use clap::Parser;
use ytharvest::engine::arg_parser::Cli;
use ytharvest::engine::handle_run;

fn main() -> Result<()> {
    let cli = Cli::parse();
    handle_run(&cli)
}
