//! KDL configuration parsing for actionsusage.
//!
//! This crate handles:
//! - Parsing `actionsusage.kdl` files
//! - Merging file settings with command-line overrides
//! - Validating repository slugs and limits

pub mod analysis;
pub mod error;

pub use analysis::{
    AnalysisConfig, DEFAULT_API_URL, DEFAULT_MAX_JOBS, DEFAULT_RUN_COUNT, FileConfig, Overrides,
    load_config, parse_config,
};
pub use error::{ConfigError, ConfigResult};
