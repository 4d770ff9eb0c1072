use super::document::FieldDocument;
use crate::domain::{S5Error, S5Result};
use crate::numerics::population_std;
use serde::Serialize;

pub const DRIVING_TIME_COLUMN: &str = "DrivingTime(s)";
pub const HISTORY_DISTANCE_COLUMN: &str = "Distance(km)";
pub const BATTERY_CHARGE_COLUMN: &str = "BatteryCharge(%)";
pub const AVERAGE_VELOCITY_COLUMN: &str = "AverageCarVel(km/h)";
pub const CAR_VELOCITY_COLUMN: &str = "CarVel(km/h)";
pub const DRIVING_FLAG_COLUMN: &str = "Driving";

/// Headline results of one simulator history file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub driving_time_s: f64,
    pub distance_km: f64,
    pub final_charge_pct: f64,
    pub average_velocity_kph: f64,
    /// Population standard deviation of `CarVel(km/h)` over rows flagged as driving.
    pub driving_velocity_std_kph: Option<f64>,
    pub max_charge_pct: f64,
    pub min_charge_pct: f64,
}

impl HistorySummary {
    /// Summarises the last row of a history document.
    ///
    /// Without an `AverageCarVel(km/h)` column the average velocity is
    /// distance over driving time.
    pub fn from_document(document: &FieldDocument) -> S5Result<Self> {
        let table = &document.data;
        let driving_time = table.numeric_column(DRIVING_TIME_COLUMN)?;
        let distance = table.numeric_column(HISTORY_DISTANCE_COLUMN)?;
        let charge = table.numeric_column(BATTERY_CHARGE_COLUMN)?;
        let driving = table.numeric_column(DRIVING_FLAG_COLUMN)?;
        let velocity = table.numeric_column(CAR_VELOCITY_COLUMN)?;

        let (Some(&driving_time_s), Some(&distance_km), Some(&final_charge_pct)) =
            (driving_time.last(), distance.last(), charge.last())
        else {
            return Err(S5Error::state("history document has no rows"));
        };

        let average_velocity_kph = match table.column(AVERAGE_VELOCITY_COLUMN) {
            Some(_) => table
                .numeric_column(AVERAGE_VELOCITY_COLUMN)?
                .last()
                .copied()
                .unwrap_or_default(),
            None if driving_time_s > 0.0 => distance_km / driving_time_s * 3600.0,
            None => 0.0,
        };

        let driving_velocity: Vec<f64> = velocity
            .iter()
            .zip(&driving)
            .filter(|(_, flag)| **flag == 1.0)
            .map(|(value, _)| *value)
            .collect();

        Ok(Self {
            driving_time_s,
            distance_km,
            final_charge_pct,
            average_velocity_kph,
            driving_velocity_std_kph: population_std(&driving_velocity),
            max_charge_pct: charge.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min_charge_pct: charge.iter().copied().fold(f64::INFINITY, f64::min),
        })
    }
}
