use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::EngineConfig;
use super::validation::{run_validation, validate_config};
use crate::core::{Error, Result};

/// Config file name searched for in the working directory and its ancestors
pub const CONFIG_FILE_NAME: &str = ".maude-risk.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Pure function to read config file contents
pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Pure function to parse and validate config from TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<EngineConfig> {
    let config = toml::from_str::<EngineConfig>(contents).map_err(|e| {
        Error::Configuration(format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))
    })?;

    run_validation(validate_config(&config))?;
    Ok(config)
}

/// Load configuration from an explicit path. Errors are reported, not defaulted.
pub fn load_config_from(path: &Path) -> Result<EngineConfig> {
    let contents = read_config_file(path)?;
    let config = parse_and_validate_config(&contents)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Pure function to try loading config from a specific path
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<EngineConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// Handle file read errors with appropriate logging
pub(crate) fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for a config file.
pub fn load_config_from_dir(start: PathBuf) -> EngineConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            EngineConfig::default()
        })
}

pub fn load_config() -> EngineConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_from_dir(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            EngineConfig::default()
        }
    }
}

/// Documented default config written by `maude-risk init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# maude-risk configuration

[window]
# Months per analysis window (baseline and trailing)
size = 6
# Baseline: the first `size` months of each device's series.
# For a fixed baseline use:
# baseline = { mode = "explicit", start = "2012-01", end = "2012-06" }
baseline = { mode = "leading" }

[thresholds]
volume_spike_ratio = 3.0
reporter_mix_shift_pp = 50.0
death_escalation = 10
severity_mix_pct = 25.0

[timeline]
threshold_tier = "high"

[output]
default_format = "terminal"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_toml_round_trips_to_defaults() {
        let config = parse_and_validate_config(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(config.window, super::super::WindowConfig::default());
        assert_eq!(config.thresholds, super::super::ScoringThresholds::default());
        assert_eq!(
            config.output.and_then(|o| o.default_format).as_deref(),
            Some("terminal")
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = parse_and_validate_config("[window]\nsize = 0\n").unwrap_err();
        assert!(err.to_string().contains("window.size"));

        let err = parse_and_validate_config("[window\n").unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_directory_ancestors_limit() {
        let dirs: Vec<PathBuf> = directory_ancestors(PathBuf::from("/a/b/c/d"), 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c/d"), PathBuf::from("/a/b/c")]);
    }

    #[test]
    fn test_load_from_ancestor_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[thresholds]\ndeath_escalation = 3\n",
        )
        .unwrap();
        let nested = temp.path().join("data").join("2016");
        fs::create_dir_all(&nested).unwrap();

        let config = load_config_from_dir(nested);
        assert_eq!(config.thresholds.death_escalation, 3);
    }

    #[test]
    fn test_unreadable_config_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "[window]\nsize = 0\n").unwrap();
        let config = load_config_from_dir(temp.path().to_path_buf());
        assert_eq!(config.window.size, 6);
    }
}
