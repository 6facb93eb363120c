//! Web layer for the departures widget.
//!
//! Provides the install handshake, platform webhooks, the settings page,
//! and the JSON endpoint the device polls.

mod auth;
mod dto;
mod routes;
mod state;
pub mod templates;

pub use auth::{authenticate, bearer_token};
pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
