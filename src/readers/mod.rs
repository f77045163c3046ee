pub mod json_reader;
pub mod partition_reader;
pub mod source;

pub use json_reader::{JsonFieldDocument, JsonFieldFile, JsonFieldSource, JsonVariable};
pub use partition_reader::{MonthPartition, SampleArchive};
pub use source::{FieldFile, FieldSource, FieldVariable};
