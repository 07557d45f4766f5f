//! Static (leakage) power and frequency/voltage unit conversions.
//!
//! Grounded on `original_source/DTPM_power_models.py`'s
//! `compute_static_power_dissipation` and the unit-conversion helpers at
//! the bottom of the same file.

use crate::constants::{C1, C2, IGATE, MAX_CORES_PER_CLUSTER};
use soc_types::PeKind;

/// Convert a frequency in MHz to Hz (spec.md §4.7).
#[must_use]
pub fn freq_hz(freq_mhz: u32) -> f64 {
    f64::from(freq_mhz) * 1e6
}

/// Convert a voltage in mV to V (spec.md §4.7).
#[must_use]
pub fn volt_v(volt_mv: u32) -> f64 {
    f64::from(volt_mv) * 1e-3
}

/// Per-core static (leakage) power dissipation for a cluster of the given
/// type, at the given voltage (mV) and temperature (°C, typically the
/// current max-hotspot temperature).
///
/// `ACC` clusters dissipate no static power in this model. `LTL` (little)
/// clusters are quartered to reflect the area difference from the `BIG`
/// cluster the leakage coefficients were profiled on (a `/4` on top of the
/// `/MAX_CORES_PER_CLUSTER` below, so `LTL` ends up at a quarter of `BIG`,
/// not a half). The result is always divided by [`MAX_CORES_PER_CLUSTER`]
/// to go from cluster-level to per-core power.
#[must_use]
pub fn static_power(kind: PeKind, voltage_mv: u32, temperature_c: f64) -> f64 {
    if matches!(kind, PeKind::Acc) {
        return 0.0;
    }
    let temp_k = 273.0 + temperature_c;
    let voltage = volt_v(voltage_mv);
    let mut static_power_cluster = voltage * C1 * temp_k * temp_k * (-C2 / temp_k).exp() + IGATE * voltage;
    if matches!(kind, PeKind::Little) {
        static_power_cluster /= 4.0;
    }
    static_power_cluster / MAX_CORES_PER_CLUSTER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acc_clusters_have_no_static_power() {
        assert_eq!(static_power(PeKind::Acc, 1000, 45.0), 0.0);
    }

    #[test]
    fn little_clusters_quarter_area_scaled_leakage() {
        let big = static_power(PeKind::Big, 1000, 45.0);
        let little = static_power(PeKind::Little, 1000, 45.0);
        assert!((little - big / 4.0).abs() < 1e-12);
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(freq_hz(1200), 1.2e9);
        assert!((volt_v(1000) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn static_power_increases_with_temperature() {
        let cold = static_power(PeKind::Big, 1000, 30.0);
        let hot = static_power(PeKind::Big, 1000, 80.0);
        assert!(hot > cold);
    }
}
