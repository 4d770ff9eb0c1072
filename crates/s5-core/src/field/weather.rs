use super::document::FieldDocument;
use crate::domain::{Diagnostic, DiagnosticCode, S5Error, S5Result};
use std::collections::BTreeSet;

pub const WEATHER_DISTANCE_COLUMN: &str = "Distance (km)";
pub const WEATHER_DAY_COLUMN: &str = "Day";
pub const WEATHER_TIME_COLUMN: &str = "Time (HHMM)";

/// Checks that a weather document is a full distance x time grid.
///
/// Stations that sample at slightly different minutes inflate the number of
/// distinct time stamps, so `ni` no longer matches even when the row count does.
pub fn check_rectangular(document: &FieldDocument) -> S5Result<Vec<Diagnostic>> {
    let table = &document.data;
    let distances = table
        .distinct_count(WEATHER_DISTANCE_COLUMN)
        .ok_or_else(|| S5Error::not_found(WEATHER_DISTANCE_COLUMN, "weather columns"))?;
    let day = table
        .column(WEATHER_DAY_COLUMN)
        .ok_or_else(|| S5Error::not_found(WEATHER_DAY_COLUMN, "weather columns"))?;
    let time = table
        .column(WEATHER_TIME_COLUMN)
        .ok_or_else(|| S5Error::not_found(WEATHER_TIME_COLUMN, "weather columns"))?;

    let stamps: BTreeSet<(String, String)> = (0..table.row_count())
        .filter_map(|row| Some((day.data.cell_text(row)?, time.data.cell_text(row)?)))
        .collect();

    let mut diagnostics = Vec::new();
    if document.zone.nj != distances {
        diagnostics.push(Diagnostic::emit(
            DiagnosticCode::DistanceAxisMismatch,
            format!(
                "Zone data nj (Distance) mismatch: nj = {} but {distances} distinct distances",
                document.zone.nj
            ),
        ));
    }
    if document.zone.ni != stamps.len() {
        diagnostics.push(Diagnostic::emit(
            DiagnosticCode::TimeAxisMismatch,
            format!(
                "Zone data ni (Time) mismatch: ni = {} but {} distinct time stamps",
                document.zone.ni,
                stamps.len()
            ),
        ));
    }
    Ok(diagnostics)
}
