use chrono::NaiveDateTime;
use ndarray::{Array, Array2, ArrayD, Dimension, IxDyn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::ProjectionParams;
use crate::readers::{FieldFile, FieldSource, FieldVariable};

/// Row-major variable payload of a JSON sample file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonVariable {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
    #[serde(default)]
    pub dates: Vec<NaiveDateTime>,
}

/// On-disk layout of a JSON sample file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonFieldDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitudes: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitudes: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<ProjectionParams>,
    #[serde(default)]
    pub variables: BTreeMap<String, JsonVariable>,
}

impl JsonFieldDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(
        mut self,
        longitudes: &Array2<f64>,
        latitudes: &Array2<f64>,
        projection: ProjectionParams,
    ) -> Self {
        self.longitudes = Some(to_rows(longitudes));
        self.latitudes = Some(to_rows(latitudes));
        self.projection = Some(projection);
        self
    }

    pub fn with_variable<D: Dimension>(
        mut self,
        name: &str,
        values: &Array<f64, D>,
        dates: Vec<NaiveDateTime>,
    ) -> Self {
        self.variables.insert(
            name.to_string(),
            JsonVariable {
                shape: values.shape().to_vec(),
                data: values.iter().copied().collect(),
                dates,
            },
        );
        self
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }
}

fn to_rows(values: &Array2<f64>) -> Vec<Vec<f64>> {
    values.rows().into_iter().map(|row| row.to_vec()).collect()
}

fn from_rows(rows: &[Vec<f64>], what: &str) -> Result<Array2<f64>> {
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(ProcessingError::InvalidFormat(format!(
            "{} rows have differing lengths",
            what
        )));
    }

    let data: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), ncols), data)
        .map_err(|e| ProcessingError::InvalidFormat(format!("{}: {}", what, e)))
}

/// A parsed JSON sample file
#[derive(Debug, Clone)]
pub struct JsonFieldFile {
    document: JsonFieldDocument,
}

impl JsonFieldFile {
    pub fn new(document: JsonFieldDocument) -> Self {
        Self { document }
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.document.variables.keys().map(String::as_str)
    }
}

impl FieldFile for JsonFieldFile {
    fn variable(&self, name: &str) -> Result<Option<FieldVariable>> {
        let Some(variable) = self.document.variables.get(name) else {
            return Ok(None);
        };

        let values = ArrayD::from_shape_vec(IxDyn(&variable.shape), variable.data.clone())
            .map_err(|e| {
                ProcessingError::InvalidFormat(format!(
                    "Variable {} with shape {:?} holds {} values: {}",
                    name,
                    variable.shape,
                    variable.data.len(),
                    e
                ))
            })?;

        Ok(Some(FieldVariable {
            values,
            dates: variable.dates.clone(),
        }))
    }

    fn coordinates(&self) -> Result<(Array2<f64>, Array2<f64>)> {
        let lons = self
            .document
            .longitudes
            .as_deref()
            .ok_or_else(|| ProcessingError::MissingData("longitudes".to_string()))?;
        let lats = self
            .document
            .latitudes
            .as_deref()
            .ok_or_else(|| ProcessingError::MissingData("latitudes".to_string()))?;

        Ok((from_rows(lons, "longitudes")?, from_rows(lats, "latitudes")?))
    }

    fn projection_params(&self) -> Result<ProjectionParams> {
        self.document
            .projection
            .clone()
            .ok_or_else(|| ProcessingError::MissingData("projection parameters".to_string()))
    }
}

/// Reads sample files stored as [`JsonFieldDocument`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFieldSource;

impl JsonFieldSource {
    pub fn new() -> Self {
        Self
    }
}

impl FieldSource for JsonFieldSource {
    fn open(&self, path: &Path) -> Result<Box<dyn FieldFile>> {
        let document = JsonFieldDocument::read_from(path)?;
        Ok(Box::new(JsonFieldFile::new(document)))
    }
}
