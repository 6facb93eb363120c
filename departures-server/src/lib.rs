//! Departures widget server.
//!
//! A backend for an e-ink display plugin that answers: "which few buses
//! and trains near me are worth heading out for?"

pub mod board;
pub mod cache;
pub mod config;
pub mod domain;
pub mod store;
pub mod transport_api;
pub mod trmnl;
pub mod web;
