/// Default file name prefix of the output stream holding surface fields
pub const DEFAULT_FILE_PREFIX: &str = "pm";

/// Calendar months feeding the climatological mean when none are configured (DJF)
pub const DEFAULT_CLIMATOLOGY_MONTHS: [u32; 3] = [1, 2, 12];

/// Partition names starting with this marker are never processed
pub const HIDDEN_PARTITION_MARKER: char = '.';

/// Number of trailing digits in a partition identifier (YYYYMM)
pub const PERIOD_SUFFIX_LEN: usize = 6;

/// Day of month used to anchor a monthly period on the time axis
pub const PERIOD_ANCHOR_DAY: u32 = 15;

/// Longitudes above this value are wrapped into the negative range
pub const LONGITUDE_WRAP_THRESHOLD: f64 = 180.0;

/// Directory names
pub const DIAG_PLOTS_DIR: &str = "diag_plots";
pub const SELECTED_DATA_DIR: &str = "selected_data";

/// Rendering defaults
pub const CONTOUR_LEVELS: usize = 21;
pub const PANEL_SIZE: u32 = 480;
pub const PANEL_MARGIN: u32 = 24;

/// Environment prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "DIAGS";
