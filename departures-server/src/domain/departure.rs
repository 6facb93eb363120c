//! Departure records.

use std::fmt;

use serde::Serialize;

/// Which kind of board a departure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportMode {
    Bus,
    Train,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Bus => f.write_str("bus"),
            TransportMode::Train => f.write_str("train"),
        }
    }
}

/// A departure as reported by the upstream board, with defaults applied.
///
/// Times are kept as the raw strings the provider sent; they are only
/// interpreted when a board is filtered, against that request's "now".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Departure {
    /// Line or route name (buses only).
    pub line: Option<String>,

    /// Bus direction or train destination name. Empty when not given.
    pub destination: String,

    /// Scheduled ("aimed") departure time, nominally "HH:MM".
    pub aimed_departure: Option<String>,

    /// Live expected departure time, nominally "HH:MM".
    pub expected_departure: Option<String>,

    /// Operating company as free text, e.g. "First Leeds". Empty when not given.
    pub operator: String,

    /// Running status such as "ON TIME" or "LATE" (trains only).
    pub status: Option<String>,

    /// Platform (trains only).
    pub platform: Option<String>,
}

impl Departure {
    /// The time this departure is judged by: aimed if present, otherwise
    /// expected.
    pub fn effective_time(&self) -> Option<&str> {
        self.aimed_departure
            .as_deref()
            .or(self.expected_departure.as_deref())
    }
}

/// A departure reduced to what the display needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedDeparture {
    pub line: Option<String>,
    pub destination: String,
    pub time: String,
    pub status: Option<String>,
    pub platform: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_time_prefers_aimed() {
        let dep = Departure {
            aimed_departure: Some("12:00".into()),
            expected_departure: Some("12:07".into()),
            ..Default::default()
        };
        assert_eq!(dep.effective_time(), Some("12:00"));
    }

    #[test]
    fn effective_time_falls_back_to_expected() {
        let dep = Departure {
            expected_departure: Some("12:07".into()),
            ..Default::default()
        };
        assert_eq!(dep.effective_time(), Some("12:07"));
    }

    #[test]
    fn effective_time_missing() {
        assert_eq!(Departure::default().effective_time(), None);
    }

    #[test]
    fn mode_display() {
        assert_eq!(TransportMode::Bus.to_string(), "bus");
        assert_eq!(TransportMode::Train.to_string(), "train");
    }
}
