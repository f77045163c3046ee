pub mod aggregate;
pub mod field;
pub mod grid;
pub mod period;
pub mod point;
pub mod series;

pub use aggregate::{PartitionResult, RunningAggregate};
pub use field::{normalize_field, squeeze_leading, FieldSample};
pub use grid::{GridContext, GridSlot, ProjectionParams};
pub use period::PeriodKey;
pub use point::{GridPoint, PointSeries};
pub use series::TimeSeries;
