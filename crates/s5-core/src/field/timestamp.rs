//! Calendar stamps for history and weather documents.
//!
//! Simulator and weather files count days from 1 on the race start day and
//! carry the clock time as packed digits. These helpers expand them into a
//! `DateTime` text column and back.

use super::document::FieldDocument;
use super::table::ColumnData;
use crate::domain::{S5Error, S5Result};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::debug;

pub const DAY_COLUMN: &str = "Day";
pub const DATETIME_COLUMN: &str = "DateTime";
pub const HISTORY_STAMP_COLUMN: &str = "DDHHMMSS";
pub const DEFAULT_START_DAY: &str = "20191013";
/// Cell text of a `DateTime` column. Contains no whitespace so it stays one token.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const STAMP_CONTEXT: &str = "timestamp";

/// Accepts `YYYYMMDD` or `YYYY-MM-DD`.
pub fn parse_start_day(text: &str) -> S5Result<NaiveDate> {
    let text = text.trim();
    ["%Y%m%d", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .ok_or_else(|| {
            S5Error::format(
                STAMP_CONTEXT,
                format!("start day '{text}' is not YYYYMMDD or YYYY-MM-DD"),
            )
        })
}

/// Decodes a packed `DDHHMMSS` history column into `Day` and `DateTime` columns.
///
/// Day 1 is `start_day`.
pub fn add_history_timestamp(
    document: &mut FieldDocument,
    start_day: NaiveDate,
    stamp_column: &str,
) -> S5Result<()> {
    let packed = whole_numbers(document, stamp_column)?;
    let mut days = Vec::with_capacity(packed.len());
    let mut stamps = Vec::with_capacity(packed.len());

    for value in packed {
        let (day, clock) = (value / 1_000_000, value % 1_000_000);
        let time = clock_time(clock / 10_000, clock / 100 % 100, clock % 100, value)?;
        stamps.push(format_stamp(start_day, day, time)?);
        days.push(day);
    }

    debug!(rows = days.len(), %start_day, "decoded history time stamps");
    document.data.set_column(DAY_COLUMN, ColumnData::Integer(days))?;
    document.data.set_column(DATETIME_COLUMN, ColumnData::Text(stamps))
}

/// Builds `DateTime` from a day counter and an `HHMM` clock column.
pub fn add_weather_timestamp(
    document: &mut FieldDocument,
    start_day: NaiveDate,
    day_column: &str,
    time_column: &str,
) -> S5Result<()> {
    let days = whole_numbers(document, day_column)?;
    let clocks = whole_numbers(document, time_column)?;

    let stamps = days
        .iter()
        .zip(&clocks)
        .map(|(&day, &hhmm)| {
            let time = clock_time(hhmm / 100, hhmm % 100, 0, hhmm)?;
            format_stamp(start_day, day, time)
        })
        .collect::<S5Result<Vec<_>>>()?;

    debug!(rows = stamps.len(), %start_day, "built weather time stamps");
    document.data.set_column(DATETIME_COLUMN, ColumnData::Text(stamps))
}

/// Rebuilds the day counter and `HHMM` clock columns from a `DateTime` column.
///
/// The first row's date is day 1.
pub fn add_weather_day_time(
    document: &mut FieldDocument,
    datetime_column: &str,
    day_column: &str,
    time_column: &str,
) -> S5Result<()> {
    let column = document
        .data
        .column(datetime_column)
        .ok_or_else(|| S5Error::not_found(datetime_column, "table columns"))?;
    let ColumnData::Text(cells) = &column.data else {
        return Err(S5Error::format(
            STAMP_CONTEXT,
            format!("column '{datetime_column}' does not hold date-time text"),
        ));
    };

    let stamps = cells
        .iter()
        .map(|cell| {
            NaiveDateTime::parse_from_str(cell, DATETIME_FORMAT).map_err(|error| {
                S5Error::format(STAMP_CONTEXT, format!("bad date-time '{cell}': {error}"))
            })
        })
        .collect::<S5Result<Vec<_>>>()?;
    let Some(first_day) = stamps.first().map(NaiveDateTime::date) else {
        return Err(S5Error::state(format!("column '{datetime_column}' has no rows")));
    };

    let days = stamps
        .iter()
        .map(|stamp| stamp.date().signed_duration_since(first_day).num_days() + 1)
        .collect();
    let clocks = stamps
        .iter()
        .map(|stamp| i64::from(stamp.hour() * 100 + stamp.minute()))
        .collect();

    document.data.set_column(day_column, ColumnData::Integer(days))?;
    document.data.set_column(time_column, ColumnData::Integer(clocks))
}

fn whole_numbers(document: &FieldDocument, column: &str) -> S5Result<Vec<i64>> {
    document
        .data
        .numeric_column(column)?
        .into_iter()
        .map(|value| {
            if value >= 0.0 && value.fract() == 0.0 && value <= i64::MAX as f64 {
                Ok(value as i64)
            } else {
                Err(S5Error::format(
                    STAMP_CONTEXT,
                    format!("column '{column}' holds {value}, not a whole non-negative number"),
                ))
            }
        })
        .collect()
}

fn clock_time(hour: i64, minute: i64, second: i64, packed: i64) -> S5Result<NaiveTime> {
    let part = |value: i64| u32::try_from(value).ok();
    let time = match (part(hour), part(minute), part(second)) {
        (Some(hour), Some(minute), Some(second)) => NaiveTime::from_hms_opt(hour, minute, second),
        _ => None,
    };
    time.ok_or_else(|| {
        S5Error::format(STAMP_CONTEXT, format!("{packed} is not a valid clock time"))
    })
}

fn format_stamp(start_day: NaiveDate, day: i64, time: NaiveTime) -> S5Result<String> {
    let date = u64::try_from(day - 1)
        .ok()
        .and_then(|offset| start_day.checked_add_days(Days::new(offset)))
        .ok_or_else(|| {
            S5Error::format(
                STAMP_CONTEXT,
                format!("day {day} cannot be placed on the calendar from {start_day}"),
            )
        })?;
    Ok(date.and_time(time).format(DATETIME_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        DATETIME_COLUMN, DAY_COLUMN, HISTORY_STAMP_COLUMN, add_history_timestamp,
        add_weather_day_time, add_weather_timestamp, parse_start_day,
    };
    use crate::domain::S5ErrorCategory;
    use crate::field::{ColumnData, FieldDocument};

    const HISTORY: &str = "\
Title = \"SolarSim4.1\"
Variables = \"DDHHMMSS\", \"Distance(km)\"
Zone T = \" \", I = 3, J = 1, K = 1, F = POINT
01083000   0.0
01170000 511.2
03100530 2019.7";

    const WEATHER: &str = "\
Title = \"Weather\"
Variables = \"Day\", \"Time (HHMM)\", \"Distance (km)\"
Zone T = \" \", I = 3, J = 1, K = 1, F = POINT
1  830   0
1 1700 100
2  805 400";

    fn text_column(document: &FieldDocument, name: &str) -> Vec<String> {
        match &document.data.column(name).expect("column").data {
            ColumnData::Text(cells) => cells.clone(),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn start_day_accepts_compact_and_dashed_dates() {
        let compact = parse_start_day("20191013").expect("compact");
        assert_eq!(parse_start_day(" 2019-10-13 ").expect("dashed"), compact);
        let error = parse_start_day("13/10/2019").expect_err("slashes");
        assert_eq!(error.category(), S5ErrorCategory::FormatError);
    }

    #[test]
    fn history_stamps_decode_day_and_clock() {
        let mut document = FieldDocument::parse_str(HISTORY, "hist.dat").expect("parse");
        let start = parse_start_day("20191013").expect("start");
        add_history_timestamp(&mut document, start, HISTORY_STAMP_COLUMN).expect("stamp");

        assert_eq!(
            document.data.numeric_column(DAY_COLUMN).expect("day"),
            vec![1.0, 1.0, 3.0]
        );
        assert_eq!(
            text_column(&document, DATETIME_COLUMN),
            vec![
                "2019-10-13T08:30:00",
                "2019-10-13T17:00:00",
                "2019-10-15T10:05:30",
            ]
        );
    }

    #[test]
    fn stamped_history_round_trips_through_the_codec() {
        let mut document = FieldDocument::parse_str(HISTORY, "hist.dat").expect("parse");
        let start = parse_start_day("20191013").expect("start");
        add_history_timestamp(&mut document, start, HISTORY_STAMP_COLUMN).expect("stamp");

        let text = document.to_text(false).expect("render");
        let reread = FieldDocument::parse_str(&text, "hist.dat").expect("reparse");
        assert_eq!(
            text_column(&reread, DATETIME_COLUMN),
            text_column(&document, DATETIME_COLUMN)
        );
    }

    #[test]
    fn invalid_history_clock_or_day_is_a_format_error() {
        let start = parse_start_day("20191013").expect("start");
        for bad in ["01250000", "01086100", "00083000"] {
            let source = HISTORY.replacen("01083000", bad, 1);
            let mut document = FieldDocument::parse_str(&source, "hist.dat").expect("parse");
            let error = add_history_timestamp(&mut document, start, HISTORY_STAMP_COLUMN)
                .expect_err(bad);
            assert_eq!(error.category(), S5ErrorCategory::FormatError, "{bad}");
        }
    }

    #[test]
    fn weather_stamps_combine_day_and_hhmm() {
        let mut document = FieldDocument::parse_str(WEATHER, "weather.dat").expect("parse");
        let start = parse_start_day("2019-10-13").expect("start");
        add_weather_timestamp(&mut document, start, "Day", "Time (HHMM)").expect("stamp");

        assert_eq!(
            text_column(&document, DATETIME_COLUMN),
            vec![
                "2019-10-13T08:30:00",
                "2019-10-13T17:00:00",
                "2019-10-14T08:05:00",
            ]
        );
    }

    #[test]
    fn weather_day_and_time_are_rebuilt_from_stamps() {
        let mut document = FieldDocument::parse_str(WEATHER, "weather.dat").expect("parse");
        let start = parse_start_day("20191031").expect("start");
        add_weather_timestamp(&mut document, start, "Day", "Time (HHMM)").expect("stamp");
        let original = document.data.clone();

        document.data.remove_column("Day");
        document.data.remove_column("Time (HHMM)");
        add_weather_day_time(&mut document, DATETIME_COLUMN, "Day", "Time (HHMM)")
            .expect("rebuild");

        for name in ["Day", "Time (HHMM)"] {
            assert_eq!(
                document.data.numeric_column(name).expect("rebuilt"),
                original.numeric_column(name).expect("original"),
                "{name}"
            );
        }
    }

    #[test]
    fn day_time_rebuild_requires_date_time_text() {
        let mut document = FieldDocument::parse_str(WEATHER, "weather.dat").expect("parse");
        let error = add_weather_day_time(&mut document, "Distance (km)", "Day", "Time (HHMM)")
            .expect_err("numeric column");
        assert_eq!(error.category(), S5ErrorCategory::FormatError);

        let error = add_weather_day_time(&mut document, DATETIME_COLUMN, "Day", "Time (HHMM)")
            .expect_err("missing column");
        assert!(error.to_string().contains(DATETIME_COLUMN));
    }
}
