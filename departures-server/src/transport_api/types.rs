//! Transport API response DTOs.
//!
//! These types map directly to the bus stop-timetable and train live-board
//! JSON responses. Every field is optional: the provider omits fields
//! freely, and a missing field must never reject the whole board.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Response from `/v3/uk/bus/stop_timetables/{atco}.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BusTimetable {
    /// ATCO code of the stop.
    pub atcocode: Option<String>,

    /// Human-readable stop name.
    pub name: Option<String>,

    /// Departures grouped by line name, in board order.
    #[serde(default)]
    pub departures: BusLineGroups,
}

/// Line groups of a bus timetable, in the order the provider listed them.
///
/// Group order breaks ties between departures at the same minute, so it
/// must survive deserialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusLineGroups(Vec<(String, Vec<BusDepartureDto>)>);

impl BusLineGroups {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[BusDepartureDto])> {
        self.0.iter().map(|(line, deps)| (line.as_str(), deps.as_slice()))
    }

    /// Departures listed under `line`, if that group exists.
    pub fn get(&self, line: &str) -> Option<&[BusDepartureDto]> {
        self.iter().find(|(l, _)| *l == line).map(|(_, deps)| deps)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<BusDepartureDto>)> for BusLineGroups {
    fn from_iter<I: IntoIterator<Item = (String, Vec<BusDepartureDto>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for BusLineGroups {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = BusLineGroups;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of line name to departures")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut groups = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((line, deps)) = map.next_entry::<String, Vec<BusDepartureDto>>()? {
                    groups.push((line, deps));
                }
                Ok(BusLineGroups(groups))
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}

impl Serialize for BusLineGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (line, deps) in &self.0 {
            map.serialize_entry(line, deps)?;
        }
        map.end()
    }
}

/// A single bus departure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BusDepartureDto {
    /// Line name, e.g. "19".
    pub line_name: Option<String>,

    /// Direction of travel, usually the terminus.
    pub direction: Option<String>,

    /// Scheduled departure time, "HH:MM".
    pub aimed_departure_time: Option<String>,

    /// Live departure estimate, "HH:MM", when tracking is available.
    pub expected_departure_time: Option<String>,

    /// Operating company, e.g. "First Leeds".
    pub operator_name: Option<String>,
}

/// Response from `/v3/uk/train/station/{crs}/live.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrainBoard {
    /// Station name.
    pub station_name: Option<String>,

    /// CRS code of the station.
    pub station_code: Option<String>,

    /// Departures, wrapped in a keyed object.
    #[serde(default)]
    pub departures: TrainDepartures,
}

/// The departures wrapper on a train board.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrainDepartures {
    /// All departures, in board order.
    #[serde(default)]
    pub all: Vec<TrainDepartureDto>,
}

/// A single train departure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrainDepartureDto {
    /// Final destination of the service.
    pub destination_name: Option<String>,

    /// Scheduled departure time, "HH:MM".
    pub aimed_departure_time: Option<String>,

    /// Expected departure time, "HH:MM".
    pub expected_departure_time: Option<String>,

    /// Running status, e.g. "ON TIME", "LATE", "CANCELLED".
    pub status: Option<String>,

    /// Platform, when known.
    pub platform: Option<String>,

    /// Train operating company name.
    pub operator_name: Option<String>,
}
