use anyhow::Context;
use clap::Parser;
use sample_diagnostics::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).context("sample-diagnostics failed")
}
