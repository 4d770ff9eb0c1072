use super::document::FieldDocument;
use super::table::{Column, ColumnData, FieldTable};
use crate::domain::{S5Error, S5Result};
use crate::numerics::arithmetic_mean;
use tracing::debug;

pub const DISTANCE_COLUMN: &str = "Distance (km)";
pub const TARGET_VELOCITY_COLUMN: &str = "TargetVel (km/h)";
pub const DEFAULT_ROUTE_LENGTH_KM: f64 = 3030.0;
pub const VELOCITY_TITLE: &str = "Velocity file generated by s5";

/// Index-aligned distance/value samples taken from two document columns.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityProfile {
    pub distance: Vec<f64>,
    pub value: Vec<f64>,
}

impl VelocityProfile {
    pub fn new(distance: Vec<f64>, value: Vec<f64>) -> S5Result<Self> {
        if distance.len() != value.len() {
            return Err(S5Error::invalid_profile(format!(
                "distance has {} samples but value has {}",
                distance.len(),
                value.len()
            )));
        }
        if let Some(index) = distance.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(S5Error::invalid_profile(format!(
                "distance decreases at sample {}",
                index + 1
            )));
        }
        Ok(Self { distance, value })
    }

    pub fn from_document(
        document: &FieldDocument,
        distance_column: &str,
        value_column: &str,
    ) -> S5Result<Self> {
        Self::new(
            document.data.numeric_column(distance_column)?,
            document.data.numeric_column(value_column)?,
        )
    }

    /// Stores both columns in `document` and resizes its zone to the row count.
    ///
    /// An unchanged distance column keeps its stored type. Other columns are
    /// kept in place when their length still matches and dropped otherwise.
    pub fn store_in(
        &self,
        document: &mut FieldDocument,
        distance_column: &str,
        value_column: &str,
    ) -> S5Result<()> {
        let mut table = FieldTable::new();
        for column in document.data.columns() {
            if column.name != distance_column && column.name != value_column {
                if column.data.len() != self.len() {
                    continue;
                }
                table.push_column(column.name.clone(), column.data.clone())?;
            }
        }
        let distance = match document.data.column(distance_column) {
            Some(column) if column.data.as_f64().as_deref() == Some(self.distance.as_slice()) => {
                column.data.clone()
            }
            _ => ColumnData::Float(self.distance.clone()),
        };
        table.set_column(distance_column, distance)?;
        table.set_column(value_column, ColumnData::Float(self.value.clone()))?;

        let order: Vec<String> = document
            .data
            .column_names()
            .into_iter()
            .filter(|name| table.column(name).is_some())
            .map(str::to_string)
            .collect();
        if order.len() == table.columns().len() {
            let order: Vec<&str> = order.iter().map(String::as_str).collect();
            table.reorder(&order)?;
        }

        document.data = table;
        document.update_zone_to_row_count();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.distance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }
}

/// Two-row target-velocity document holding `velocity` from 0 to `route_length_km`.
///
/// A whole-kilometre route length is stored as an integer distance column.
pub fn constant_velocity_document(velocity: f64, route_length_km: f64) -> S5Result<FieldDocument> {
    if !(route_length_km > 0.0 && route_length_km.is_finite()) {
        return Err(S5Error::invalid_profile(format!(
            "route length must be positive, got {route_length_km}"
        )));
    }
    let distance = if route_length_km.fract() == 0.0 && route_length_km <= i64::MAX as f64 {
        ColumnData::Integer(vec![0, route_length_km as i64])
    } else {
        ColumnData::Float(vec![0.0, route_length_km])
    };
    let table = FieldTable::from_columns(vec![
        Column::new(DISTANCE_COLUMN, distance),
        Column::new(
            TARGET_VELOCITY_COLUMN,
            ColumnData::Float(vec![velocity, velocity]),
        ),
    ])?;
    Ok(FieldDocument::from_table(VELOCITY_TITLE, table))
}

/// Shifts `value_column` so its sample mean is `mean_target`; returns the shift.
///
/// Every row moves by the same amount, so the shape is kept. This is the
/// per-row mean used for quick target edits, not the distance-weighted mean
/// of [`crate::profile::ProfileShaper::set_mean`].
pub fn adjust_velocity_mean(
    document: &mut FieldDocument,
    value_column: &str,
    mean_target: f64,
) -> S5Result<f64> {
    if !mean_target.is_finite() {
        return Err(S5Error::invalid_profile(format!(
            "mean target must be finite, got {mean_target}"
        )));
    }
    let values = document.data.numeric_column(value_column)?;
    let mean = arithmetic_mean(&values)
        .ok_or_else(|| S5Error::state(format!("column '{value_column}' has no rows")))?;
    let shift = mean_target - mean;

    let shifted = values.iter().map(|value| value + shift).collect();
    document.data.set_column(value_column, ColumnData::Float(shifted))?;
    debug!(column = value_column, shift, "shifted velocity column");
    Ok(shift)
}
