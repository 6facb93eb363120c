//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::NormalizedDeparture;

/// Response body of `GET /api/data`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DataResponse {
    pub buses: Vec<BusDepartureView>,
    pub trains: Vec<TrainDepartureView>,
}

/// A bus departure as shown on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusDepartureView {
    /// Line name, e.g. "19"
    pub line: String,

    /// Direction of travel
    pub destination: String,

    /// Departure time, "HH:MM"
    pub time: String,
}

impl From<NormalizedDeparture> for BusDepartureView {
    fn from(dep: NormalizedDeparture) -> Self {
        Self {
            line: dep.line.unwrap_or_default(),
            destination: dep.destination,
            time: dep.time,
        }
    }
}

/// A train departure as shown on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainDepartureView {
    pub destination: String,

    /// Departure time, "HH:MM"
    pub time: String,

    /// Running status, e.g. "ON TIME"
    pub status: Option<String>,

    pub platform: Option<String>,
}

impl From<NormalizedDeparture> for TrainDepartureView {
    fn from(dep: NormalizedDeparture) -> Self {
        Self {
            destination: dep.destination,
            time: dep.time,
            status: dep.status,
            platform: dep.platform,
        }
    }
}

/// Query string of `GET /callback`.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

/// Installation ids arrive as either JSON numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InstallationId {
    Number(i64),
    Text(String),
}

impl InstallationId {
    /// Canonical text form, as stored. Blank text counts as absent.
    pub fn to_key(&self) -> Option<String> {
        match self {
            InstallationId::Number(n) => Some(n.to_string()),
            InstallationId::Text(s) if s.trim().is_empty() => None,
            InstallationId::Text(s) => Some(s.trim().to_string()),
        }
    }
}

/// Body of `POST /webhook/installation_success`.
#[derive(Debug, Deserialize)]
pub struct InstallationSuccessWebhook {
    pub state: Option<String>,
    pub id: Option<InstallationId>,
}

/// Body of `POST /webhook/uninstall`.
#[derive(Debug, Deserialize)]
pub struct UninstallWebhook {
    pub id: Option<InstallationId>,
}

/// Generic acknowledgement.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Settings form submitted to `POST /manage`.
///
/// Every field arrives as text; blank means "not set".
#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub bus_stop: String,
    #[serde(default)]
    pub bus_direction: String,
    #[serde(default)]
    pub train_station: String,
    #[serde(default)]
    pub train_destination: String,
    #[serde(default)]
    pub min_train_time: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_key: String,
}

/// Query string of `GET /manage`.
#[derive(Debug, Default, Deserialize)]
pub struct ManageQuery {
    pub saved: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
