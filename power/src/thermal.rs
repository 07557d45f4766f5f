//! Linear thermal model and trip-point throttling.
//!
//! Grounded on `original_source/DTPM_power_models.py`'s `predict_temperature`
//! and `evaluate_throttling`.

use crate::constants::{A_MODEL, B_MODEL_ACC, B_MODEL_BIG, B_MODEL_GPU, B_MODEL_LITTLE, B_MODEL_MEM, T_AMBIENT_C};
use soc_types::PeKind;

/// Assemble the B-model column (5-vector) for a cluster's resource type,
/// matching `DTPM_power_models.py`'s `initialize_B_model` (memory and GPU
/// columns are fixed; one column per non-memory cluster, chosen by type).
#[must_use]
pub fn b_column(kind: PeKind) -> [f64; 5] {
    match kind {
        PeKind::Big | PeKind::Cpu => B_MODEL_BIG,
        PeKind::Little => B_MODEL_LITTLE,
        PeKind::Gpu => B_MODEL_GPU,
        PeKind::Mem => B_MODEL_MEM,
        PeKind::Acc | PeKind::Cac => B_MODEL_ACC,
    }
}

/// Predict the next temperature vector:
/// `temp_new = A · (temp_cur − T_ambient) + B · power_vector + T_ambient`.
///
/// `power_vector` must be ordered `[P_mem, P_GPU, cluster_powers...]` and
/// `b_columns` must supply one 5-vector per entry of `power_vector`, in the
/// same order (spec.md §4.6).
#[must_use]
pub fn predict_temperature(temp_cur: [f64; 5], power_vector: &[f64], b_columns: &[[f64; 5]]) -> [f64; 5] {
    debug_assert_eq!(power_vector.len(), b_columns.len());
    let mut next = [T_AMBIENT_C; 5];
    for (row_idx, out) in next.iter_mut().enumerate() {
        let a_term: f64 = A_MODEL[row_idx]
            .iter()
            .zip(temp_cur.iter())
            .map(|(a, t)| a * (t - T_AMBIENT_C))
            .sum();
        let b_term: f64 = b_columns
            .iter()
            .zip(power_vector.iter())
            .map(|(col, p)| col[row_idx] * p)
            .sum();
        *out = T_AMBIENT_C + a_term + b_term;
    }
    next
}

/// One thermal trip point: temperature threshold, hysteresis band, and a
/// per-cluster frequency cap list (`-1` meaning "no cap", spec.md §4.6).
#[derive(Debug, Clone)]
pub struct TripPoint {
    /// Temperature (°C) above which this trip point activates.
    pub temperature_c: f64,
    /// Hysteresis band (°C) that must clear before reverting.
    pub hysteresis_c: f64,
}

/// Result of one throttling evaluation: the new throttling state index
/// (`-1` = not throttled) and, if it changed, the frequency cap to apply
/// per cluster (`None` entries mean "no change for this cluster").
#[derive(Debug, Clone, PartialEq)]
pub struct ThrottleDecision {
    /// New throttling state. `-1` means not throttled.
    pub state: i32,
    /// Whether the state changed (and caps should be (re)applied) this call.
    pub changed: bool,
}

/// Evaluate thermal trip points against the current max temperature and the
/// previous throttling state, ascending through every entry of
/// `trip_points` exactly as `DTPM_power_models.py`'s `evaluate_throttling`
/// does: it never returns early, instead threading its running
/// `throttling_state` through the whole loop, escalating it each time a
/// trip point is exceeded and its index is above the running state, and
/// de-escalating one step once temperature drops below
/// `trip_temperature[state] - hysteresis[state]` for the trip point the
/// running state currently sits at. A sample that jumps past several trip
/// points in one call therefore escalates straight to the highest one
/// exceeded, rather than stopping at the first.
#[must_use]
pub fn evaluate_throttling(max_temp_c: f64, previous_state: i32, trip_points: &[TripPoint]) -> ThrottleDecision {
    let mut state = previous_state;
    for (k, trip) in trip_points.iter().enumerate() {
        let k = k as i32;
        if max_temp_c > trip.temperature_c {
            if state < k {
                state = k;
            }
        } else if state == k && max_temp_c < trip.temperature_c - trip.hysteresis_c {
            state = k - 1;
        }
    }
    ThrottleDecision { state, changed: state != previous_state }
}

/// Cap `desired_freq_mhz` at `trip_freq_mhz` if the latter is not `-1` and
/// lower than the desired frequency (spec.md §4.6: "cap each cluster's
/// frequency at `cluster.trip_freq[k]`, value `-1` meaning no cap").
#[must_use]
pub fn apply_trip_cap(desired_freq_mhz: u32, trip_freq_mhz: i64) -> u32 {
    if trip_freq_mhz < 0 {
        desired_freq_mhz
    } else {
        desired_freq_mhz.min(trip_freq_mhz as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_escalates_past_exceeded_trip_point() {
        let trips = vec![
            TripPoint { temperature_c: 80.0, hysteresis_c: 5.0 },
            TripPoint { temperature_c: 90.0, hysteresis_c: 5.0 },
        ];
        let decision = evaluate_throttling(85.0, -1, &trips);
        assert_eq!(decision.state, 0);
        assert!(decision.changed);
    }

    #[test]
    fn throttling_escalates_straight_to_highest_trip_point_exceeded() {
        let trips = vec![
            TripPoint { temperature_c: 80.0, hysteresis_c: 5.0 },
            TripPoint { temperature_c: 90.0, hysteresis_c: 5.0 },
        ];
        let decision = evaluate_throttling(95.0, -1, &trips);
        assert_eq!(decision.state, 1);
        assert!(decision.changed);
    }

    #[test]
    fn throttling_holds_state_without_hysteresis_clearance() {
        let trips = vec![TripPoint { temperature_c: 80.0, hysteresis_c: 5.0 }];
        let decision = evaluate_throttling(78.0, 0, &trips);
        assert_eq!(decision.state, 0);
        assert!(!decision.changed);
    }

    #[test]
    fn throttling_deescalates_after_hysteresis_clears() {
        let trips = vec![TripPoint { temperature_c: 80.0, hysteresis_c: 5.0 }];
        let decision = evaluate_throttling(74.0, 0, &trips);
        assert_eq!(decision.state, -1);
        assert!(decision.changed);
    }

    #[test]
    fn trip_cap_of_minus_one_means_no_cap() {
        assert_eq!(apply_trip_cap(2000, -1), 2000);
        assert_eq!(apply_trip_cap(2000, 1200), 1200);
    }
}
