pub mod config;
pub mod constants;

pub use config::{
    AnalysisConfig, ConfigLoadError, ResponseSelection, SWEEP_MANIFEST_FILE, load_analysis_config,
    load_json,
};
