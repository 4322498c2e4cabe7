//! Engine configuration: windows, indicator thresholds, presets and the
//! `.maude-risk.toml` loader.

mod core;
mod loader;
pub mod presets;
mod thresholds;
pub mod validation;

pub use self::core::{EngineConfig, OutputConfig};
pub use loader::{
    directory_ancestors, load_config, load_config_from, load_config_from_dir,
    parse_and_validate_config, CONFIG_FILE_NAME, DEFAULT_CONFIG_TOML,
};
pub use presets::PresetLevel;
pub use thresholds::{BaselineWindow, ScoringThresholds, TimelineConfig, WindowConfig};
pub use validation::{validate_config, validate_config_result};
