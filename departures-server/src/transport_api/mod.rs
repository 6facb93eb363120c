//! Transport API client.
//!
//! This module fetches the two upstream boards the widget is built from:
//!
//! - the bus **stop timetable** for an ATCO stop code, grouped by line
//! - the live **train departure board** for a CRS station code
//!
//! Key characteristics of the provider:
//! - Credentials (`app_id`, `app_key`) belong to each installation
//! - Times are in "HH:MM" format (UK local time), with no date
//! - Any field may be missing; conversion to [`Departure`](crate::domain::Departure)
//!   fills in defaults once

mod client;
mod convert;
mod demo;
mod error;
mod types;

pub use client::{TransportApiClient, TransportApiConfig};
pub use convert::{bus_departures, train_departures};
pub use demo::{DemoBoards, demo_now};
pub use error::TransportApiError;
pub use types::{
    BusDepartureDto, BusLineGroups, BusTimetable, TrainBoard, TrainDepartureDto, TrainDepartures,
};
