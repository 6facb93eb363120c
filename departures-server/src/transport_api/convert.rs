//! Conversion from Transport API DTOs to domain types.
//!
//! All defaulting of missing fields happens here, once, so the board
//! filter can work with plain values.

use crate::domain::Departure;

use super::types::{BusDepartureDto, BusTimetable, TrainBoard, TrainDepartureDto};

/// Flatten a bus timetable into departures.
///
/// Line groups are visited in board order. A departure without a line name
/// takes the name of the group it was listed under.
pub fn bus_departures(timetable: &BusTimetable) -> Vec<Departure> {
    timetable
        .departures
        .iter()
        .flat_map(|(group, deps)| deps.iter().map(move |dep| convert_bus(dep, group)))
        .collect()
}

/// Convert the departures on a train board, keeping board order.
pub fn train_departures(board: &TrainBoard) -> Vec<Departure> {
    board.departures.all.iter().map(convert_train).collect()
}

fn convert_bus(dep: &BusDepartureDto, group: &str) -> Departure {
    Departure {
        line: text(&dep.line_name).or_else(|| Some(group.to_string())),
        destination: text(&dep.direction).unwrap_or_default(),
        aimed_departure: text(&dep.aimed_departure_time),
        expected_departure: text(&dep.expected_departure_time),
        operator: text(&dep.operator_name).unwrap_or_default(),
        status: None,
        platform: None,
    }
}

fn convert_train(dep: &TrainDepartureDto) -> Departure {
    Departure {
        line: None,
        destination: text(&dep.destination_name).unwrap_or_default(),
        aimed_departure: text(&dep.aimed_departure_time),
        expected_departure: text(&dep.expected_departure_time),
        operator: text(&dep.operator_name).unwrap_or_default(),
        status: dep.status.clone(),
        platform: dep.platform.clone(),
    }
}

/// An empty string carries no more information than a missing one.
fn text(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}
