//! Departure board filtering.
//!
//! This module answers: "of everything on this board, which few departures
//! should the display show?" Bus and train boards share one mechanism,
//! configured per mode by a [`FilterSpec`]; which operators matter is
//! business policy carried in a [`BoardPolicy`].

mod policy;
mod select;
mod spec;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::domain::NormalizedDeparture;
use crate::transport_api::{BusTimetable, TrainBoard, bus_departures, train_departures};

pub use policy::{
    BoardPolicy, DEFAULT_MIN_LEAD_MINUTES, DEFAULT_RESULT_CAP, parse_operator_list,
};
pub use select::select;
pub use spec::{FilterSpec, FilterSpecError};

/// Select the bus departures to show.
///
/// Departures from every line group are pooled before sorting. A missing
/// timetable (fetch failed) gives an empty list.
pub fn select_bus_departures(
    timetable: Option<&BusTimetable>,
    direction_filter: Option<&str>,
    policy: &BoardPolicy,
    now: DateTime<Tz>,
) -> Result<Vec<NormalizedDeparture>, FilterSpecError> {
    let spec = FilterSpec::bus(policy, direction_filter, now)?;

    Ok(timetable
        .map(|t| select(&bus_departures(t), &spec))
        .unwrap_or_default())
}

/// Select the train departures to show.
///
/// A missing board (fetch failed) gives an empty list.
pub fn select_train_departures(
    board: Option<&TrainBoard>,
    destination_filter: Option<&str>,
    min_lead_minutes: i64,
    policy: &BoardPolicy,
    now: DateTime<Tz>,
) -> Result<Vec<NormalizedDeparture>, FilterSpecError> {
    let spec = FilterSpec::train(policy, destination_filter, min_lead_minutes, now)?;

    Ok(board
        .map(|b| select(&train_departures(b), &spec))
        .unwrap_or_default())
}
