//! Which departures are worth showing.

/// Default minimum lead time for trains (minutes).
pub const DEFAULT_MIN_LEAD_MINUTES: i64 = 30;

/// Default number of departures shown per board.
pub const DEFAULT_RESULT_CAP: usize = 3;

/// Business policy applied to every board.
///
/// Operator lists are substring patterns: a departure is kept if its
/// operator name contains any of them, so "First" matches "First Leeds"
/// and "First West Yorkshire".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardPolicy {
    /// Bus operators to show.
    pub bus_operators: Vec<String>,

    /// Train operators to show.
    pub train_operators: Vec<String>,

    /// Minimum lead time for trains when an installation has not set one.
    pub default_min_lead_minutes: i64,

    /// Maximum departures per board.
    pub result_cap: usize,
}

impl BoardPolicy {
    /// Create a policy with the given operator lists and default limits.
    pub fn new(bus_operators: Vec<String>, train_operators: Vec<String>) -> Self {
        Self {
            bus_operators,
            train_operators,
            default_min_lead_minutes: DEFAULT_MIN_LEAD_MINUTES,
            result_cap: DEFAULT_RESULT_CAP,
        }
    }

    /// Set the default minimum lead time for trains.
    pub fn with_default_min_lead(mut self, minutes: i64) -> Self {
        self.default_min_lead_minutes = minutes;
        self
    }

    /// Set the maximum number of departures per board.
    pub fn with_result_cap(mut self, cap: usize) -> Self {
        self.result_cap = cap;
        self
    }
}

impl Default for BoardPolicy {
    fn default() -> Self {
        Self::new(vec!["First".to_string()], vec!["Greater Anglia".to_string()])
    }
}

/// Split a comma-separated operator list, dropping blank entries.
pub fn parse_operator_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
