//! Mean-constrained shaping of distance-sampled profiles.
//!
//! Every mean here is distance-weighted: the trapezoidal integral over the
//! independent variable divided by its span, so unevenly spaced route markers
//! weigh by the distance they cover rather than by sample count.

pub mod config;

pub use config::{ShaperConfig, ShaperConfigError, load_shaper_config};

use crate::domain::{Diagnostic, DiagnosticCode, S5Error, S5Result};
use crate::numerics::{distance_weighted_mean, percentile, round_to_decimals, trapezoid};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::{debug, info};

pub const KPH_MIN: f64 = 10.0;
pub const KPH_MAX: f64 = 130.0;
pub const MS_MIN: f64 = KPH_MIN / 3.6;
pub const MS_MAX: f64 = KPH_MAX / 3.6;

/// Percentile used as the robust magnitude of a driver's variation.
pub const SPREAD_PERCENTILE: f64 = 68.0;
/// Decimal digits used by [`ProfileShaper::rescale_to_target`].
pub const RESCALE_PRECISION: u32 = 8;
/// Floor of the convergence tolerance, in units of `f64::EPSILON` times the
/// largest magnitude in play.
const MEAN_TOLERANCE_ULPS: f64 = 4.0;

/// Closed range applied to shaped values before the mean is re-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipPolicy {
    #[default]
    Unclipped,
    /// `[10, 130]` km/h.
    KphRange,
    /// `[10, 130]` km/h expressed in m/s.
    MsRange,
}

impl ClipPolicy {
    pub const fn bounds(self) -> Option<(f64, f64)> {
        match self {
            Self::Unclipped => None,
            Self::KphRange => Some((KPH_MIN, KPH_MAX)),
            Self::MsRange => Some((MS_MIN, MS_MAX)),
        }
    }

    pub fn apply(self, values: &mut [f64]) {
        if let Some((min, max)) = self.bounds() {
            for value in values {
                *value = value.clamp(min, max);
            }
        }
    }
}

impl FromStr for ClipPolicy {
    type Err = S5Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "none" | "unclipped" => Ok(Self::Unclipped),
            "kph" => Ok(Self::KphRange),
            "ms" => Ok(Self::MsRange),
            other => Err(S5Error::format(
                "clip policy",
                format!("'{other}' is not one of none, kph, ms"),
            )),
        }
    }
}

impl Display for ClipPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unclipped => f.write_str("none"),
            Self::KphRange => f.write_str("kph"),
            Self::MsRange => f.write_str("ms"),
        }
    }
}

/// Zero-mean component of a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Variation {
    pub values: Vec<f64>,
    /// Trapezoidal integral of `values`; zero up to rounding.
    pub residual: f64,
    pub diagnostic: Option<Diagnostic>,
}

/// Shaped samples whose distance-weighted mean matches the target.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedProfile {
    pub values: Vec<f64>,
    /// Correction passes after the initial shift; 0 when no correction was needed.
    pub iterations: usize,
    /// Final `mean(values) - target`.
    pub final_deviation: f64,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProfileShaper {
    config: ShaperConfig,
}

impl ProfileShaper {
    pub fn new(config: ShaperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ShaperConfig {
        self.config
    }

    /// `profile - mean(profile)` over `x`.
    ///
    /// The residual integral is checked at `precision` decimal digits; a miss
    /// is reported as a diagnostic, not an error.
    pub fn extract_variation(
        &self,
        profile: &[f64],
        x: &[f64],
        precision: u32,
    ) -> S5Result<Variation> {
        let mean = weighted_mean(profile, x)?;
        let values: Vec<f64> = profile.iter().map(|value| value - mean).collect();
        let residual = trapezoid(&values, x).unwrap_or_default();

        let diagnostic = (round_to_decimals(residual, precision) != 0.0).then(|| {
            Diagnostic::emit(
                DiagnosticCode::ResidualNotZero,
                format!("variation integrates to {residual:e}, not zero at {precision} decimals"),
            )
        });

        Ok(Variation {
            values,
            residual,
            diagnostic,
        })
    }

    /// Builds a profile around `mean_target` following the shape of `driver`.
    ///
    /// The driver's variation is normalised by its 68th percentile and scaled
    /// by `spread`. A zero spread gives a flat profile at `mean_target`.
    pub fn rescale_to_target(
        &self,
        driver: &[f64],
        spread: f64,
        mean_target: f64,
        x: &[f64],
        clip: ClipPolicy,
    ) -> S5Result<ShapedProfile> {
        validate_samples(driver, x)?;
        validate_finite("mean target", mean_target)?;
        validate_finite("spread", spread)?;

        if spread == 0.0 {
            return Ok(ShapedProfile {
                values: vec![round_to_decimals(mean_target, RESCALE_PRECISION); driver.len()],
                iterations: 0,
                final_deviation: 0.0,
                diagnostics: Vec::new(),
            });
        }

        let variation = self.extract_variation(driver, x, RESCALE_PRECISION)?;
        let scale = percentile(&variation.values, SPREAD_PERCENTILE).unwrap_or_default();
        if scale == 0.0 || !scale.is_finite() {
            return Err(S5Error::invalid_profile(format!(
                "driver variation has a {SPREAD_PERCENTILE}th percentile of {scale}, cannot normalise"
            )));
        }

        let values: Vec<f64> = variation
            .values
            .iter()
            .map(|value| mean_target + value / scale * spread)
            .collect();
        let mut shaped = self.set_mean(&values, mean_target, x, RESCALE_PRECISION, clip)?;
        shaped.diagnostics.splice(0..0, variation.diagnostic);
        Ok(shaped)
    }

    /// Shifts `values` so their distance-weighted mean is `mean_target`, then clips.
    ///
    /// The shift is taken from the variation of `values`, checked at
    /// `precision` decimals. When clipping moves the mean, the shift target is
    /// corrected by the accumulated deviation until the clipped mean is within
    /// tolerance or the iteration budget runs out.
    pub fn set_mean(
        &self,
        values: &[f64],
        mean_target: f64,
        x: &[f64],
        precision: u32,
        clip: ClipPolicy,
    ) -> S5Result<ShapedProfile> {
        validate_samples(values, x)?;
        validate_finite("mean target", mean_target)?;

        let variation = self.extract_variation(values, x, precision)?;
        let diagnostics: Vec<Diagnostic> = variation.diagnostic.into_iter().collect();
        let shifted: Vec<f64> = variation
            .values
            .iter()
            .map(|value| mean_target + value)
            .collect();
        let mut output = shifted.clone();
        clip.apply(&mut output);
        let tolerance = self.mean_tolerance(mean_target, &output);
        let mut deviation = weighted_mean(&output, x)? - mean_target;
        if deviation.abs() <= tolerance {
            debug!(%clip, deviation, "mean set without correction");
            return Ok(ShapedProfile {
                values: output,
                iterations: 0,
                final_deviation: deviation,
                diagnostics,
            });
        }

        let mut running_delta = deviation;
        for iteration in 1..=self.config.max_iterations {
            output = shift_to_mean(&shifted, mean_target - running_delta, x)?;
            clip.apply(&mut output);
            deviation = weighted_mean(&output, x)? - mean_target;

            if deviation.abs() <= tolerance {
                info!(%clip, iterations = iteration, deviation, "mean correction converged");
                return Ok(ShapedProfile {
                    values: output,
                    iterations: iteration,
                    final_deviation: deviation,
                    diagnostics,
                });
            }
            debug!(iteration, deviation, "mean correction pass");
            running_delta += deviation;
        }

        Err(S5Error::NonConvergence {
            iterations: self.config.max_iterations,
            deviation,
            best_effort: output,
        })
    }

    /// Configured tolerance, floored at a few ULPs of the largest magnitude involved.
    fn mean_tolerance(&self, mean_target: f64, values: &[f64]) -> f64 {
        let magnitude = values
            .iter()
            .fold(mean_target.abs(), |largest, value| largest.max(value.abs()));
        self.config
            .mean_tolerance
            .max(MEAN_TOLERANCE_ULPS * f64::EPSILON * magnitude)
    }
}

fn shift_to_mean(values: &[f64], mean_target: f64, x: &[f64]) -> S5Result<Vec<f64>> {
    let mean = weighted_mean(values, x)?;
    Ok(values.iter().map(|value| mean_target + value - mean).collect())
}

fn weighted_mean(values: &[f64], x: &[f64]) -> S5Result<f64> {
    distance_weighted_mean(values, x).ok_or_else(|| {
        S5Error::invalid_profile("distance grid must match the values and span a non-zero range")
    })
}

fn validate_samples(values: &[f64], x: &[f64]) -> S5Result<()> {
    if values.len() != x.len() {
        return Err(S5Error::invalid_profile(format!(
            "{} values for {} distance samples",
            values.len(),
            x.len()
        )));
    }
    if x.len() < 2 {
        return Err(S5Error::invalid_profile(format!(
            "at least 2 samples are required, got {}",
            x.len()
        )));
    }
    if let Some(index) = values.iter().chain(x).position(|value| !value.is_finite()) {
        let field = if index < values.len() { "values" } else { "distance" };
        return Err(S5Error::invalid_profile(format!(
            "{field} must be finite, index {} is not",
            index % values.len()
        )));
    }
    if let Some(index) = x.windows(2).position(|pair| pair[1] < pair[0]) {
        return Err(S5Error::invalid_profile(format!(
            "distance must be non-decreasing, index {} decreases",
            index + 1
        )));
    }
    if x[x.len() - 1] <= x[0] {
        return Err(S5Error::invalid_profile("distance must span a non-zero range"));
    }
    Ok(())
}

fn validate_finite(field: &str, value: f64) -> S5Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(S5Error::invalid_profile(format!("{field} must be finite, got {value}")))
    }
}
