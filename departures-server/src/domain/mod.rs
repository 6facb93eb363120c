//! Domain types for the departures widget.
//!
//! This module contains the validated value types shared by the board
//! filter, the upstream client, the installation store and the web layer,
//! plus the time handling used to judge departures against "now".

mod departure;
mod settings;
mod station;
mod time;

pub use departure::{Departure, NormalizedDeparture, TransportMode};
pub use settings::{ApiCredentials, Settings};
pub use station::{AtcoCode, Crs, InvalidAtcoCode, InvalidCrs};
pub use time::{TimeError, lead_time, parse_hhmm, resolve_departure};
