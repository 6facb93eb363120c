//! Per-installation display preferences.

/// Credentials for the upstream transport data API.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub app_id: String,
    pub app_key: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("app_id", &self.app_id)
            .field("app_key", &"<redacted>")
            .finish()
    }
}

/// Preferences stored for one installation.
///
/// Text fields are stored as the user typed them. `min_train_time` is
/// `None` only when never set; `Some(0)` is a real choice meaning "show
/// trains leaving now".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub bus_stop: Option<String>,
    pub bus_direction: Option<String>,
    pub train_station: Option<String>,
    pub train_destination: Option<String>,
    pub min_train_time: Option<i64>,
    pub app_id: Option<String>,
    pub app_key: Option<String>,
}

impl Settings {
    /// Upstream credentials, if both halves are filled in.
    pub fn credentials(&self) -> Option<ApiCredentials> {
        Some(ApiCredentials {
            app_id: non_empty(&self.app_id)?.to_string(),
            app_key: non_empty(&self.app_key)?.to_string(),
        })
    }

    pub fn bus_stop(&self) -> Option<&str> {
        non_empty(&self.bus_stop)
    }

    pub fn train_station(&self) -> Option<&str> {
        non_empty(&self.train_station)
    }

    pub fn bus_direction(&self) -> Option<&str> {
        non_empty(&self.bus_direction)
    }

    pub fn train_destination(&self) -> Option<&str> {
        non_empty(&self.train_destination)
    }

    /// Minimum lead time for trains, falling back to `default` only when
    /// unset.
    pub fn min_train_minutes(&self, default: i64) -> i64 {
        self.min_train_time.unwrap_or(default)
    }
}

/// Treat blank strings the same as missing ones.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
