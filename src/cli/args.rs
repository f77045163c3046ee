use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::constants::DEFAULT_FILE_PREFIX;

#[derive(Parser)]
#[command(name = "sample-diagnostics")]
#[command(about = "Climatology and land-averaged diagnostics for gridded simulation samples")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate every configured simulation and variable, then plot the results
    Compare {
        #[arg(short, long, help = "Batch configuration file (TOML or JSON)")]
        config: PathBuf,

        #[arg(
            short,
            long,
            help = "Output directory for all runs [default: <source_root>/../diag_plots]"
        )]
        output_dir: Option<PathBuf>,
    },

    /// Extract the time series of one variable at one grid point
    Point {
        #[arg(short, long, help = "Directory holding the monthly sample partitions")]
        samples_dir: PathBuf,

        #[arg(long, default_value = "DN")]
        varname: String,

        #[arg(long = "level_index", alias = "level-index", default_value = "0")]
        level_index: usize,

        #[arg(long)]
        ix: usize,

        #[arg(long)]
        iy: usize,

        #[arg(long, default_value = DEFAULT_FILE_PREFIX)]
        prefix: String,

        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}
