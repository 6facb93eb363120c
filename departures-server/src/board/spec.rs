//! Per-request filter configuration.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

use crate::domain::TransportMode;

use super::policy::BoardPolicy;

/// A filter configuration that cannot be applied.
///
/// These are caller mistakes, reported instead of being quietly replaced
/// by defaults.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterSpecError {
    /// Minimum lead time below zero
    #[error("minimum lead time must not be negative (got {0} minutes)")]
    NegativeLeadTime(i64),

    /// An operator pattern that would match every operator
    #[error("operator patterns must not be empty")]
    EmptyOperatorPattern,

    /// A board that could never show anything
    #[error("result cap must be at least 1")]
    ZeroResultCap,
}

/// Everything needed to filter one board.
///
/// `now` is fixed at construction so every departure in a response is
/// judged against the same instant.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    mode: TransportMode,
    operator_patterns: Vec<String>,
    direction_filter: Option<String>,
    min_lead: Option<Duration>,
    now: DateTime<Tz>,
    result_cap: usize,
}

impl FilterSpec {
    /// Build a filter from its parts.
    ///
    /// `direction_filter` is matched case-insensitively; blank means no
    /// filter. `min_lead_minutes` of `None` disables the lead-time gate.
    pub fn new(
        mode: TransportMode,
        operator_patterns: Vec<String>,
        direction_filter: Option<&str>,
        min_lead_minutes: Option<i64>,
        now: DateTime<Tz>,
        result_cap: usize,
    ) -> Result<Self, FilterSpecError> {
        if operator_patterns.iter().any(|p| p.is_empty()) {
            return Err(FilterSpecError::EmptyOperatorPattern);
        }

        if let Some(mins) = min_lead_minutes.filter(|m| *m < 0) {
            return Err(FilterSpecError::NegativeLeadTime(mins));
        }

        if result_cap == 0 {
            return Err(FilterSpecError::ZeroResultCap);
        }

        let direction_filter = direction_filter
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_lowercase);

        Ok(Self {
            mode,
            operator_patterns,
            direction_filter,
            min_lead: min_lead_minutes.map(Duration::minutes),
            now,
            result_cap,
        })
    }

    /// Filter for a bus board. Buses have no lead-time gate.
    pub fn bus(
        policy: &BoardPolicy,
        direction_filter: Option<&str>,
        now: DateTime<Tz>,
    ) -> Result<Self, FilterSpecError> {
        Self::new(
            TransportMode::Bus,
            policy.bus_operators.clone(),
            direction_filter,
            None,
            now,
            policy.result_cap,
        )
    }

    /// Filter for a train board.
    pub fn train(
        policy: &BoardPolicy,
        destination_filter: Option<&str>,
        min_lead_minutes: i64,
        now: DateTime<Tz>,
    ) -> Result<Self, FilterSpecError> {
        Self::new(
            TransportMode::Train,
            policy.train_operators.clone(),
            destination_filter,
            Some(min_lead_minutes),
            now,
            policy.result_cap,
        )
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    pub fn now(&self) -> &DateTime<Tz> {
        &self.now
    }

    pub fn min_lead(&self) -> Option<Duration> {
        self.min_lead
    }

    pub fn result_cap(&self) -> usize {
        self.result_cap
    }

    /// Whether the operator name contains any allowed pattern.
    /// Matching is case-sensitive.
    pub fn allows_operator(&self, operator: &str) -> bool {
        self.operator_patterns
            .iter()
            .any(|p| operator.contains(p.as_str()))
    }

    /// Whether the direction or destination passes the optional filter.
    pub fn matches_direction(&self, destination: &str) -> bool {
        match &self.direction_filter {
            Some(filter) => destination.to_lowercase().contains(filter.as_str()),
            None => true,
        }
    }
}
