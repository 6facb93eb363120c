//! Demo boards for installations without Transport API credentials.

use std::path::Path;

use chrono::{DateTime, NaiveTime, TimeZone};

use super::error::TransportApiError;
use super::types::{BusTimetable, TrainBoard};

const EMBEDDED_BUS: &str = include_str!("../../data/demo/bus.json");
const EMBEDDED_TRAIN: &str = include_str!("../../data/demo/train.json");

/// Wall-clock time the demo boards are viewed at.
const DEMO_HOUR: u32 = 11;
const DEMO_MINUTE: u32 = 45;

/// A fixed pair of boards shown in place of live data.
#[derive(Debug, Clone)]
pub struct DemoBoards {
    pub bus: BusTimetable,
    pub train: TrainBoard,
}

impl DemoBoards {
    /// The boards compiled into the binary.
    pub fn embedded() -> Result<Self, TransportApiError> {
        Self::from_json(EMBEDDED_BUS, EMBEDDED_TRAIN)
    }

    /// Load `bus.json` and `train.json` from a directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, TransportApiError> {
        let dir = dir.as_ref();
        let bus = read(&dir.join("bus.json"))?;
        let train = read(&dir.join("train.json"))?;
        Self::from_json(&bus, &train)
    }

    fn from_json(bus: &str, train: &str) -> Result<Self, TransportApiError> {
        let bus = serde_json::from_str(bus)
            .map_err(|e| TransportApiError::Demo(format!("bus board: {e}")))?;
        let train = serde_json::from_str(train)
            .map_err(|e| TransportApiError::Demo(format!("train board: {e}")))?;
        Ok(Self { bus, train })
    }
}

fn read(path: &Path) -> Result<String, TransportApiError> {
    std::fs::read_to_string(path)
        .map_err(|e| TransportApiError::Demo(format!("{}: {e}", path.display())))
}

/// The instant demo boards are evaluated against: 11:45 on the same local
/// date as `real_now`.
pub fn demo_now<Tz: TimeZone>(real_now: &DateTime<Tz>) -> DateTime<Tz> {
    let Some(demo_time) = NaiveTime::from_hms_opt(DEMO_HOUR, DEMO_MINUTE, 0) else {
        return real_now.clone();
    };
    let naive = real_now.date_naive().and_time(demo_time);

    // Falls back to the real clock if 11:45 is skipped locally
    real_now
        .timezone()
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| real_now.clone())
}
