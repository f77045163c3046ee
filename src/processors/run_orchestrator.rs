use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{error, info};

use crate::error::Result;
use crate::masking::OceanMasker;
use crate::processors::{AggregationEngine, AggregationSettings, RunOutput};
use crate::readers::{FieldSource, SampleArchive};
use crate::utils::progress::ProgressReporter;

/// One independent aggregation: a simulation archive and the variable to diagnose
#[derive(Debug, Clone, PartialEq)]
pub struct RunSpec {
    pub label: String,
    pub variable: String,
    pub file_prefix: String,
    pub source_root: PathBuf,
    /// Factor applied to the final products before rendering
    pub unit_multiplier: f64,
}

/// Consumer of the scaled products of each successful run
pub trait DiagnosticsSink {
    fn render(&mut self, spec: &RunSpec, output: &RunOutput) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Completed {
        sample_count: usize,
        series_points: usize,
        partitions: usize,
    },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub label: String,
    pub variable: String,
    pub status: RunStatus,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Completed { .. })
    }
}

/// Sequences runs, giving each one a fresh grid context and running mean
pub struct RunOrchestrator<'a> {
    source: &'a dyn FieldSource,
    masker: &'a dyn OceanMasker,
    climatology_months: BTreeSet<u32>,
    continue_on_error: bool,
    silent: bool,
}

impl<'a> RunOrchestrator<'a> {
    pub fn new(
        source: &'a dyn FieldSource,
        masker: &'a dyn OceanMasker,
        climatology_months: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            source,
            masker,
            climatology_months: climatology_months.into_iter().collect(),
            continue_on_error: true,
            silent: false,
        }
    }

    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Execute `specs` in order, handing each run's products to `sink`.
    ///
    /// A failed run is reported and, unless `continue_on_error` is off, the next spec proceeds
    /// with its own fresh run state. With `continue_on_error` off the first failure is returned.
    pub fn execute(
        &self,
        specs: &[RunSpec],
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<Vec<RunReport>> {
        let mut reports = Vec::with_capacity(specs.len());

        for spec in specs {
            info!(
                "Starting run '{}' for {} from {}",
                spec.label,
                spec.variable,
                spec.source_root.display()
            );

            let status = match self.execute_one(spec, sink) {
                Ok(output) => RunStatus::Completed {
                    sample_count: output.sample_count,
                    series_points: output.time_series.len(),
                    partitions: output.partitions_processed,
                },
                Err(e) => {
                    error!("Run '{}' ({}) failed: {}", spec.label, spec.variable, e);
                    if !self.continue_on_error {
                        return Err(e);
                    }
                    RunStatus::Failed(e.to_string())
                }
            };

            reports.push(RunReport {
                label: spec.label.clone(),
                variable: spec.variable.clone(),
                status,
            });
        }

        Ok(reports)
    }

    fn execute_one(
        &self,
        spec: &RunSpec,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<RunOutput> {
        let settings = AggregationSettings::new(
            spec.variable.as_str(),
            spec.file_prefix.as_str(),
            self.climatology_months.iter().copied(),
        );
        let engine = AggregationEngine::new(self.source, self.masker, &settings);

        let progress = ProgressReporter::new_spinner(
            &format!("{} / {}", spec.label, spec.variable),
            self.silent,
        );
        let partitions = SampleArchive::new(&spec.source_root).partitions()?;
        let output = engine
            .run(partitions, Some(&progress))?
            .scaled(spec.unit_multiplier);
        progress.finish_with_message(&format!(
            "{} / {}: {} samples",
            spec.label, spec.variable, output.sample_count
        ));

        sink.render(spec, &output)?;
        Ok(output)
    }
}

/// Human-readable summary of a batch of runs
pub fn summarize_reports(reports: &[RunReport]) -> String {
    let succeeded = reports.iter().filter(|r| r.is_success()).count();
    let mut summary = format!(
        "Run Summary:\n  Runs: {}\n  Succeeded: {}\n  Failed: {}\n",
        reports.len(),
        succeeded,
        reports.len() - succeeded
    );

    for report in reports {
        match &report.status {
            RunStatus::Completed {
                sample_count,
                series_points,
                partitions,
            } => summary.push_str(&format!(
                "    {} / {}: {} partitions, {} climatology samples, {} series points\n",
                report.label, report.variable, partitions, sample_count, series_points
            )),
            RunStatus::Failed(message) => summary.push_str(&format!(
                "    {} / {}: FAILED ({})\n",
                report.label, report.variable, message
            )),
        }
    }

    summary
}
