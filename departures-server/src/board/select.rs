//! Departure filtering and ranking.
//!
//! Turns a raw board into the handful of departures worth showing:
//! operator gate, direction gate, lead-time gate (trains only), sort by
//! time of day, cap, project.

use chrono::NaiveTime;
use chrono_tz::Tz;
use tracing::debug;

use crate::domain::{
    Departure, NormalizedDeparture, TransportMode, lead_time, parse_hhmm, resolve_departure,
};

use super::spec::FilterSpec;

/// Select the departures to show from a board.
///
/// Never fails on bad data: records with unknown operators, missing
/// fields or malformed times are dropped or sorted last as described on
/// each step. The result is at most `spec.result_cap()` long.
pub fn select<'a>(
    departures: impl IntoIterator<Item = &'a Departure>,
    spec: &FilterSpec,
) -> Vec<NormalizedDeparture> {
    let mut considered = 0usize;

    let mut kept: Vec<&Departure> = departures
        .into_iter()
        .inspect(|_| considered += 1)
        .filter(|d| spec.allows_operator(&d.operator))
        .filter(|d| spec.matches_direction(&d.destination))
        .filter(|d| passes_lead_gate(d, spec))
        .collect();

    // Stable: equal times keep board order
    kept.sort_by_key(|d| sort_key(d));

    debug!(
        mode = %spec.mode(),
        considered,
        kept = kept.len(),
        cap = spec.result_cap(),
        "filtered board"
    );

    kept.into_iter()
        .take(spec.result_cap())
        .map(|d| project(d, spec.mode()))
        .collect()
}

/// Keep a departure only if it leaves at least `min_lead` after now.
///
/// Without a gate (buses) everything passes. With a gate, a departure
/// whose time is missing or unreadable cannot be judged and is dropped.
fn passes_lead_gate(dep: &Departure, spec: &FilterSpec) -> bool {
    let Some(min_lead) = spec.min_lead() else {
        return true;
    };

    let Some(time_str) = dep.effective_time() else {
        debug!(destination = %dep.destination, "dropping departure with no time");
        return false;
    };

    match resolve_departure::<Tz>(time_str, spec.now()) {
        Ok(at) => lead_time(&at, spec.now()) >= min_lead,
        Err(e) => {
            debug!(time = time_str, error = %e, "dropping departure with unreadable time");
            false
        }
    }
}

/// Order key: time of day, with unreadable or missing times after every
/// real time.
fn sort_key(dep: &Departure) -> (bool, NaiveTime) {
    match dep.effective_time().map(parse_hhmm) {
        Some(Ok(time)) => (false, time),
        _ => (true, NaiveTime::MIN),
    }
}

fn project(dep: &Departure, mode: TransportMode) -> NormalizedDeparture {
    let (status, platform) = match mode {
        TransportMode::Train => (dep.status.clone(), dep.platform.clone()),
        TransportMode::Bus => (None, None),
    };

    NormalizedDeparture {
        line: dep.line.clone(),
        destination: dep.destination.clone(),
        time: dep.effective_time().unwrap_or_default().to_string(),
        status,
        platform,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::board::BoardPolicy;
    use chrono::TimeZone;
    use chrono_tz::Europe::London;
    use proptest::prelude::*;

    fn departure_strategy() -> impl Strategy<Value = Departure> {
        (
            prop_oneof![
                (0u32..24, 0u32..60).prop_map(|(h, m)| format!("{:02}:{:02}", h, m)),
                Just("not-a-time".to_string()),
            ],
            prop_oneof![Just("First Leeds"), Just("Arriva"), Just("Greater Anglia")],
        )
            .prop_map(|(time, operator)| Departure {
                destination: "Somewhere".to_string(),
                aimed_departure: Some(time),
                operator: operator.to_string(),
                ..Default::default()
            })
    }

    proptest! {
        /// Output never exceeds the cap
        #[test]
        fn never_exceeds_cap(deps in proptest::collection::vec(departure_strategy(), 0..20)) {
            let now = London.with_ymd_and_hms(2024, 6, 12, 11, 45, 0).unwrap();
            let spec = FilterSpec::bus(&BoardPolicy::default(), None, now).unwrap();
            prop_assert!(select(&deps, &spec).len() <= 3);
        }

        /// Output times are in non-decreasing time-of-day order, malformed last
        #[test]
        fn output_is_sorted(deps in proptest::collection::vec(departure_strategy(), 0..20)) {
            let now = London.with_ymd_and_hms(2024, 6, 12, 11, 45, 0).unwrap();
            let spec = FilterSpec::new(
                TransportMode::Bus, vec!["First".into()], None, None, now, 100,
            ).unwrap();
            let result = select(&deps, &spec);
            let keys: Vec<_> = result
                .iter()
                .map(|d| match parse_hhmm(&d.time) {
                    Ok(t) => (false, t),
                    Err(_) => (true, NaiveTime::MIN),
                })
                .collect();
            prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        }

        /// Every train that survives leaves at least the minimum lead after now
        #[test]
        fn trains_respect_lead(
            deps in proptest::collection::vec(departure_strategy(), 0..20),
            min_lead in 0i64..180,
        ) {
            let now = London.with_ymd_and_hms(2024, 6, 12, 11, 45, 0).unwrap();
            let spec = FilterSpec::new(
                TransportMode::Train, vec!["Greater Anglia".into()], None, Some(min_lead), now, 100,
            ).unwrap();
            for dep in select(&deps, &spec) {
                let at = resolve_departure(&dep.time, &now).unwrap();
                prop_assert!(lead_time(&at, &now) >= chrono::Duration::minutes(min_lead));
            }
        }
    }
}
