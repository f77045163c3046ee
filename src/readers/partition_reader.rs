use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::PeriodKey;
use crate::utils::constants::HIDDEN_PARTITION_MARKER;

/// One month directory of a sample archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthPartition {
    path: PathBuf,
    name: String,
}

impl MonthPartition {
    pub fn new(path: PathBuf) -> Result<Self> {
        let name = path
            .file_name()
            .ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "Partition path has no usable name: {}",
                    path.display()
                ))
            })?
            .to_string_lossy()
            .into_owned();
        Ok(Self { path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with(HIDDEN_PARTITION_MARKER)
    }

    pub fn period(&self) -> Result<PeriodKey> {
        PeriodKey::from_partition_name(&self.name)
    }

    /// Files of the partition, in directory order
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// Files whose name starts with `prefix`
    pub fn files_with_prefix(&self, prefix: &str) -> Result<Vec<PathBuf>> {
        Ok(self
            .files()?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |name| name.starts_with(prefix))
            })
            .collect())
    }
}

/// Root directory whose immediate subdirectories are month partitions
#[derive(Debug, Clone)]
pub struct SampleArchive {
    root: PathBuf,
}

impl SampleArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily enumerate partitions; entries that are not directories are skipped
    pub fn partitions(&self) -> Result<PartitionIter> {
        if !self.root.is_dir() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Sample archive is not a directory: {}",
                self.root.display()
            )));
        }

        Ok(PartitionIter {
            entries: fs::read_dir(&self.root)?,
        })
    }
}

pub struct PartitionIter {
    entries: ReadDir,
}

impl Iterator for PartitionIter {
    type Item = Result<MonthPartition>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };

            let path = entry.path();
            if !path.is_dir() {
                debug!("Skipping non-directory entry {}", path.display());
                continue;
            }

            return Some(MonthPartition::new(path));
        }
    }
}
