//! Dynamic power dissipation and the Cdyn·α extraction procedure.
//!
//! Grounded on `original_source/DTPM_power_models.py`'s
//! `compute_Cdyn_and_alpha` / `compute_dynamic_power_dissipation` and the
//! exact extraction formula spec.md §4.7 states in terms of a profiled
//! power table.

use crate::static_power::{freq_hz, volt_v};

/// Dynamic power dissipation: `Cdyn·α · f_Hz · V_V²` (spec.md §4.5e, §4.7).
#[must_use]
pub fn dynamic_power(freq_mhz: u32, volt_mv: u32, cdyn_alpha: f64) -> f64 {
    cdyn_alpha * freq_hz(freq_mhz) * volt_v(volt_mv).powi(2)
}

/// Extract the effective `Cdyn·α` for one active core from a profiled
/// `(max_power_for_n_tasks, freq_threshold)` table entry.
///
/// `profiled_power_n_tasks` is the table value for `n_active_tasks` tasks
/// at `freq_threshold_mhz`; `leakage_per_core` is the current per-core
/// static power (so it can be subtracted out, leaving only the dynamic
/// component); `n_profile_cores` is the number of cores the table entry
/// was profiled across (spec.md §4.7: "subtracting leakage for all profiled
/// cores and dividing by the count of tasks currently running").
#[must_use]
pub fn extract_cdyn_alpha(
    profiled_power_n_tasks: f64,
    freq_threshold_mhz: u32,
    volt_mv: u32,
    leakage_per_core: f64,
    n_profile_cores: u32,
    n_active_tasks: u32,
) -> f64 {
    if n_active_tasks == 0 {
        return 0.0;
    }
    let p_dyn_max_freq_per_core = (profiled_power_n_tasks - leakage_per_core * f64::from(n_profile_cores))
        / f64::from(n_active_tasks);
    let max_freq = freq_hz(freq_threshold_mhz);
    let max_volt = volt_v(volt_mv);
    if max_freq == 0.0 || max_volt == 0.0 {
        return 0.0;
    }
    p_dyn_max_freq_per_core / (max_freq * max_volt.powi(2))
}

/// Look up the smallest profiled frequency threshold `k >= current_frequency`
/// in a power (or PG) profile table, returning `(power_for_n_cores, k)`.
///
/// Grounded on `DTPM_power_models.py`'s `get_max_power_consumption`: table
/// keys are ascending frequency thresholds, each mapping to a vector of
/// power values indexed by `active_cores - 1` (clamped to the profiled
/// core count when more tasks are running than cores were profiled for).
#[must_use]
pub fn lookup_profiled_power(
    profile: &std::collections::BTreeMap<u32, Vec<f64>>,
    current_frequency_mhz: u32,
    n_active_tasks: u32,
    n_active_cores: u32,
) -> Option<(f64, u32)> {
    if n_active_tasks == 0 {
        return Some((0.0, 0));
    }
    for (&threshold, values) in profile {
        if current_frequency_mhz <= threshold {
            let idx = if n_active_tasks <= n_active_cores {
                n_active_tasks - 1
            } else {
                n_active_cores - 1
            };
            return values.get(idx as usize).map(|&p| (p, threshold));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn dynamic_power_scales_with_voltage_squared() {
        let p1 = dynamic_power(1000, 1000, 1e-9);
        let p2 = dynamic_power(1000, 2000, 1e-9);
        assert!((p2 - p1 * 4.0).abs() < 1e-15);
    }

    #[test]
    fn cdyn_alpha_is_zero_with_no_active_tasks() {
        assert_eq!(extract_cdyn_alpha(1.0, 1000, 1000, 0.01, 4, 0), 0.0);
    }

    #[test]
    fn lookup_picks_smallest_threshold_above_current() {
        let mut profile = BTreeMap::new();
        profile.insert(600, vec![0.1, 0.2, 0.3, 0.4]);
        profile.insert(1200, vec![0.2, 0.4, 0.6, 0.8]);
        let (p, k) = lookup_profiled_power(&profile, 800, 2, 4).unwrap();
        assert_eq!(k, 1200);
        assert!((p - 0.4).abs() < 1e-12);
    }

    #[test]
    fn lookup_clamps_to_profiled_core_count() {
        let mut profile = BTreeMap::new();
        profile.insert(1200, vec![0.2, 0.4]);
        let (p, _) = lookup_profiled_power(&profile, 1000, 4, 4).unwrap();
        assert!((p - 0.4).abs() < 1e-12);
    }
}
