//! Application state for the web layer.

use std::sync::Arc;

use chrono_tz::Tz;

use crate::board::BoardPolicy;
use crate::cache::CachedTransportApi;
use crate::store::Store;
use crate::transport_api::DemoBoards;
use crate::trmnl::TrmnlClient;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Installation records
    pub store: Store,

    /// Cached Transport API client
    pub transport: Arc<CachedTransportApi>,

    /// Device platform OAuth client
    pub trmnl: Arc<TrmnlClient>,

    /// Operator allow-lists and limits
    pub policy: Arc<BoardPolicy>,

    /// Boards served to installations without credentials
    pub demo: Arc<DemoBoards>,

    /// Zone that upstream "HH:MM" times are local to
    pub timezone: Tz,

    /// Externally visible origin, e.g. `https://boards.example.org`
    pub public_base_url: Option<String>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        store: Store,
        transport: CachedTransportApi,
        trmnl: TrmnlClient,
        policy: BoardPolicy,
        demo: DemoBoards,
        timezone: Tz,
    ) -> Self {
        Self {
            store,
            transport: Arc::new(transport),
            trmnl: Arc::new(trmnl),
            policy: Arc::new(policy),
            demo: Arc::new(demo),
            timezone,
            public_base_url: None,
        }
    }

    pub fn with_public_base_url(mut self, url: Option<String>) -> Self {
        self.public_base_url = url;
        self
    }
}
