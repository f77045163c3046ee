use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{PERIOD_ANCHOR_DAY, PERIOD_SUFFIX_LEN};

/// Calendar month identifying one partition of a sample archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ProcessingError::InvalidFormat(format!(
                "Month must be between 1 and 12, got: {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// Parse the trailing `YYYYMM` suffix of a partition identifier.
    ///
    /// # Examples
    /// ```
    /// use sample_diagnostics::models::PeriodKey;
    ///
    /// let key = PeriodKey::from_partition_name("Samples_NA044_198001").unwrap();
    /// assert_eq!((key.year, key.month), (1980, 1));
    /// assert!(PeriodKey::from_partition_name("foo_bar").is_err());
    /// ```
    pub fn from_partition_name(name: &str) -> Result<Self> {
        let digits_start = name
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map_or(name.len(), |(i, _)| i);
        let suffix = &name[digits_start..];

        let malformed = || ProcessingError::MalformedPeriod {
            partition: name.to_string(),
            suffix: name.rsplit('_').next().unwrap_or(name).to_string(),
        };

        if suffix.len() != PERIOD_SUFFIX_LEN {
            return Err(malformed());
        }

        let year = suffix[..4].parse::<i32>().map_err(|_| malformed())?;
        let month = suffix[4..].parse::<u32>().map_err(|_| malformed())?;
        if !(1..=12).contains(&month) {
            return Err(malformed());
        }

        Ok(Self { year, month })
    }

    /// Date representing this month on a time axis (the 15th)
    pub fn anchor_date(&self) -> NaiveDate {
        // Month is validated on construction, day 15 exists in every month
        NaiveDate::from_ymd_opt(self.year, self.month, PERIOD_ANCHOR_DAY)
            .unwrap_or(NaiveDate::MIN)
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
