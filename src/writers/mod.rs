pub mod chart;
pub mod diagnostics_writer;
pub mod point_writer;

pub use diagnostics_writer::DiagnosticsWriter;
pub use point_writer::PointSeriesWriter;
