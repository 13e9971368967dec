pub mod load;
pub mod types;

pub use types::{
    Config, DEFAULT_MAX_ANALYSIS_SECONDS, DEFAULT_SAMPLE_RATE, MediaExtensionTable,
    SETTINGS_FILE_NAME, SUBSTANDARD_SCORE_THRESHOLD, UserSettings,
};
