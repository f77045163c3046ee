use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{warn, Level};

use crate::cli::args::{Cli, Commands};
use crate::error::{ProcessingError, Result};
use crate::models::GridPoint;
use crate::processors::{summarize_reports, PointExtractor, RunOrchestrator};
use crate::readers::{JsonFieldSource, SampleArchive};
use crate::settings::DiagnosticsConfig;
use crate::utils::progress::ProgressReporter;
use crate::writers::{DiagnosticsWriter, PointSeriesWriter};

/// Install the fmt subscriber; with a log file, output goes there without colours.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let installed = match log_file {
        Some(path) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(File::create(path)?))
            .try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| ProcessingError::Config(format!("Logging setup failed: {}", e)))
}

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Compare { config, output_dir } => compare(&config, output_dir),

        Commands::Point {
            samples_dir,
            varname,
            level_index,
            ix,
            iy,
            prefix,
            output_dir,
        } => {
            let point = GridPoint::new(ix, iy).with_level(level_index);
            extract_point(&samples_dir, &varname, &prefix, point, &output_dir)
        }
    }
}

fn compare(config_path: &Path, output_dir: Option<PathBuf>) -> Result<()> {
    println!("Loading configuration: {}", config_path.display());
    let config = DiagnosticsConfig::load(config_path)?;
    let specs = config.run_specs();
    println!(
        "Runs: {} ({} variables x {} simulations), climatology months {:?}",
        specs.len(),
        config.variables.len(),
        config.simulations.len(),
        config.climatology_months
    );
    if config.land_regions.is_empty() {
        warn!("No land regions configured; area averages will be absent");
    }

    let source = JsonFieldSource::new();
    let masker = config.masker();
    let orchestrator = RunOrchestrator::new(
        &source,
        &masker,
        config.climatology_months.iter().copied(),
    )
    .with_continue_on_error(config.continue_on_error);

    let mut writer = DiagnosticsWriter::new();
    if let Some(dir) = output_dir.or_else(|| config.output_dir.clone()) {
        println!("Output directory: {}", dir.display());
        writer = writer.with_output_dir(dir);
    }

    let reports = orchestrator.execute(&specs, &mut writer)?;
    println!("\n{}", summarize_reports(&reports));

    let failed = reports.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        return Err(ProcessingError::RunsFailed {
            failed,
            total: reports.len(),
        });
    }

    println!("Diagnostics complete!");
    Ok(())
}

fn extract_point(
    samples_dir: &Path,
    variable: &str,
    prefix: &str,
    point: GridPoint,
    output_dir: &Path,
) -> Result<()> {
    println!(
        "Extracting {} at ({}, {}, level {}) from {}",
        variable,
        point.ix,
        point.iy,
        point.level,
        samples_dir.display()
    );

    let progress = ProgressReporter::new_spinner("Extracting point series...", false);
    let source = JsonFieldSource::new();
    let extractor = PointExtractor::new(&source, variable, prefix, point);
    let partitions = SampleArchive::new(samples_dir).partitions()?;
    let series = extractor.extract(partitions, Some(&progress))?;
    progress.finish_with_message(&format!("Extracted {} values", series.len()));

    if series.is_empty() {
        return Err(ProcessingError::MissingData(format!(
            "No values of {} found under {}",
            variable,
            samples_dir.display()
        )));
    }

    let (csv_path, image_path) =
        PointSeriesWriter::new(output_dir).write(variable, point.ix, point.iy, &series)?;
    println!("Values: {}", csv_path.display());
    println!("Plot:   {}", image_path.display());
    Ok(())
}
