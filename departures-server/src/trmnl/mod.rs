//! Device platform (TRMNL) OAuth client.
//!
//! Installing the plugin is a standard authorization-code flow: redirect
//! the user to [`TrmnlClient::authorize_url`], exchange the returned code
//! for an access token, then look up the account it belongs to.

mod client;
mod error;
mod types;

pub use client::{TrmnlClient, TrmnlConfig};
pub use error::TrmnlError;
pub use types::{Account, AccountId, TokenResponse};
