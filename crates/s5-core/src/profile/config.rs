use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;
pub const DEFAULT_MEAN_TOLERANCE: f64 = 1.0e-12;

/// Convergence limits for the mean-correction loop.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ShaperConfig {
    #[serde(rename = "maxIterations", default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(rename = "meanTolerance", default = "default_mean_tolerance")]
    pub mean_tolerance: f64,
}

impl Default for ShaperConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            mean_tolerance: DEFAULT_MEAN_TOLERANCE,
        }
    }
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_mean_tolerance() -> f64 {
    DEFAULT_MEAN_TOLERANCE
}

#[derive(Debug, thiserror::Error)]
pub enum ShaperConfigError {
    #[error("failed to read shaper config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse shaper config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("shaper config '{}' is invalid: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

pub fn load_shaper_config(
    config_path: impl AsRef<Path>,
) -> Result<ShaperConfig, ShaperConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| ShaperConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config: ShaperConfig =
        serde_json::from_str(&source).map_err(|source| ShaperConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;

    if config.max_iterations == 0 {
        return Err(ShaperConfigError::Invalid {
            path: config_path.to_path_buf(),
            message: "maxIterations must be at least 1".to_string(),
        });
    }
    if !config.mean_tolerance.is_finite() || config.mean_tolerance <= 0.0 {
        return Err(ShaperConfigError::Invalid {
            path: config_path.to_path_buf(),
            message: format!(
                "meanTolerance must be finite and > 0, got {}",
                config.mean_tolerance
            ),
        });
    }

    Ok(config)
}
