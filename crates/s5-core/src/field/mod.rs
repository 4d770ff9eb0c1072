//! Field-document codec: titled, zone-tagged text tables used for velocity
//! targets, simulator histories, weather grids and road profiles.

pub mod document;
pub mod history;
pub mod table;
pub mod timestamp;
pub mod velocity;
pub mod weather;
pub mod zone;

pub use document::{FieldDocument, ZoneCheck};
pub use history::HistorySummary;
pub use table::{Column, ColumnData, FieldTable};
pub use timestamp::{
    DATETIME_COLUMN, DAY_COLUMN, DEFAULT_START_DAY, HISTORY_STAMP_COLUMN, add_history_timestamp,
    add_weather_day_time, add_weather_timestamp, parse_start_day,
};
pub use velocity::{
    DEFAULT_ROUTE_LENGTH_KM, DISTANCE_COLUMN, TARGET_VELOCITY_COLUMN, VelocityProfile,
    adjust_velocity_mean, constant_velocity_document,
};
pub use weather::{WEATHER_DAY_COLUMN, WEATHER_TIME_COLUMN, check_rectangular};
pub use zone::{DEFAULT_ZONE_FORMAT, GridDescriptor};
