//! Batch configuration for the `compare` command.
//!
//! Loaded from a TOML or JSON file with environment overrides (`DIAGS__CONTINUE_ON_ERROR=false`).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::masking::{LandRegion, RegionOceanMasker};
use crate::processors::RunSpec;
use crate::utils::constants::{CONFIG_ENV_PREFIX, DEFAULT_CLIMATOLOGY_MONTHS, DEFAULT_FILE_PREFIX};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SimulationConfig {
    #[validate(length(min = 1))]
    pub label: String,

    pub source_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct VariableConfig {
    #[validate(length(min = 1))]
    pub name: String,

    #[serde(default = "default_file_prefix")]
    #[validate(length(min = 1))]
    pub file_prefix: String,

    /// Unit conversion applied to the mean field and time series
    #[serde(default = "default_unit_multiplier")]
    pub unit_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_climatology_months")]
    #[validate(length(min = 1))]
    pub climatology_months: Vec<u32>,

    #[serde(default = "default_continue_on_error")]
    pub continue_on_error: bool,

    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[validate(length(min = 1), nested)]
    pub simulations: Vec<SimulationConfig>,

    #[validate(length(min = 1), nested)]
    pub variables: Vec<VariableConfig>,

    #[serde(default)]
    #[validate(nested)]
    pub land_regions: Vec<LandRegion>,
}

fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

fn default_unit_multiplier() -> f64 {
    1.0
}

fn default_climatology_months() -> Vec<u32> {
    DEFAULT_CLIMATOLOGY_MONTHS.to_vec()
}

fn default_continue_on_error() -> bool {
    true
}

impl DiagnosticsConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ProcessingError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let config: Self = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .add_source(
                ::config::Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.check()?;
        Ok(config)
    }

    /// Field validation plus the cross-field rules the derive cannot express
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if let Some(month) = self
            .climatology_months
            .iter()
            .find(|m| !(1..=12).contains(*m))
        {
            return Err(ProcessingError::Config(format!(
                "Climatology month {} is outside 1..=12",
                month
            )));
        }

        for variable in &self.variables {
            if !variable.unit_multiplier.is_finite() || variable.unit_multiplier == 0.0 {
                return Err(ProcessingError::Config(format!(
                    "Unit multiplier of {} must be finite and non-zero, got {}",
                    variable.name, variable.unit_multiplier
                )));
            }
        }

        let mut labels = HashSet::new();
        for simulation in &self.simulations {
            if !labels.insert(simulation.label.as_str()) {
                return Err(ProcessingError::Config(format!(
                    "Simulation label '{}' is used more than once",
                    simulation.label
                )));
            }
        }

        for region in &self.land_regions {
            region.check()?;
        }

        Ok(())
    }

    /// One run per (variable, simulation), variables outermost, both in file order
    pub fn run_specs(&self) -> Vec<RunSpec> {
        self.variables
            .iter()
            .flat_map(|variable| {
                self.simulations.iter().map(move |simulation| RunSpec {
                    label: simulation.label.clone(),
                    variable: variable.name.clone(),
                    file_prefix: variable.file_prefix.clone(),
                    source_root: simulation.source_root.clone(),
                    unit_multiplier: variable.unit_multiplier,
                })
            })
            .collect()
    }

    pub fn masker(&self) -> RegionOceanMasker {
        RegionOceanMasker::new(self.land_regions.clone())
    }
}
