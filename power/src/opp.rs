//! Operating-point stepping helpers shared by the DVFS policies.
//!
//! Grounded on `original_source/DTPM_power_models.py`'s
//! `increase_frequency`/`decrease_frequency`/`set_max_frequency`.

use crate::error::PowerError;
use soc_types::Cluster;

/// Step `cluster` to the next-higher OPP, if any. Returns whether the
/// frequency actually changed (false means it was already at the maximum).
pub fn increase_frequency(cluster: &mut Cluster) -> Result<bool, PowerError> {
    let idx = cluster.current_opp_index().ok_or_else(|| PowerError::FrequencyNotInOpp {
        cluster: cluster.name.clone(),
        freq_mhz: cluster.current_frequency,
    })?;
    if idx + 1 == cluster.opp.len() {
        return Ok(false);
    }
    let next = cluster.opp[idx + 1];
    cluster.current_frequency = next.freq_mhz;
    cluster.current_voltage = next.volt_mv;
    Ok(true)
}

/// Step `cluster` to the next-lower OPP, if any. Returns whether the
/// frequency actually changed (false means it was already at the minimum).
pub fn decrease_frequency(cluster: &mut Cluster) -> Result<bool, PowerError> {
    let idx = cluster.current_opp_index().ok_or_else(|| PowerError::FrequencyNotInOpp {
        cluster: cluster.name.clone(),
        freq_mhz: cluster.current_frequency,
    })?;
    if idx == 0 {
        return Ok(false);
    }
    let prev = cluster.opp[idx - 1];
    cluster.current_frequency = prev.freq_mhz;
    cluster.current_voltage = prev.volt_mv;
    Ok(true)
}

/// Pin `cluster` to its maximum OPP.
pub fn set_max_frequency(cluster: &mut Cluster) {
    cluster.current_frequency = cluster.max_freq();
    cluster.current_voltage = cluster.max_voltage();
}

/// Pin `cluster` to its minimum OPP.
pub fn set_min_frequency(cluster: &mut Cluster) {
    cluster.current_frequency = cluster.min_freq();
    cluster.current_voltage = cluster.min_voltage();
}

/// Pin `cluster` to exactly `freq_mhz`, failing loudly if that frequency is
/// not one of its OPPs (spec.md §7: "freq not in OPP" is a configuration error).
pub fn set_constant_frequency(cluster: &mut Cluster, freq_mhz: u32) -> Result<(), PowerError> {
    let volt = cluster.voltage_for(freq_mhz).ok_or_else(|| PowerError::ConstantFrequencyOutOfRange {
        cluster: cluster.name.clone(),
        freq_mhz,
    })?;
    cluster.current_frequency = freq_mhz;
    cluster.current_voltage = volt;
    Ok(())
}

/// Slowdown factor applied to a task's remaining work when a cluster is
/// running below its maximum frequency: `max_freq / current_freq - 1`.
/// Zero when the cluster has no OPP table or hasn't been initialized yet.
pub fn compute_dvfs_performance_slowdown(cluster: &Cluster) -> f64 {
    if cluster.current_frequency == 0 || cluster.opp.is_empty() {
        return 0.0;
    }
    f64::from(cluster.max_freq()) / f64::from(cluster.current_frequency) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use soc_types::{ClusterId, DvfsMode, Opp, PeKind};

    fn test_cluster() -> Cluster {
        let mut c = Cluster::new(ClusterId(0), "big", PeKind::Big, DvfsMode::Ondemand);
        c.opp = vec![
            Opp { freq_mhz: 600, volt_mv: 800 },
            Opp { freq_mhz: 1200, volt_mv: 1000 },
            Opp { freq_mhz: 2000, volt_mv: 1200 },
        ];
        c.current_frequency = 1200;
        c.current_voltage = 1000;
        c
    }

    #[test]
    fn increase_steps_to_next_opp() {
        let mut c = test_cluster();
        assert!(increase_frequency(&mut c).unwrap());
        assert_eq!(c.current_frequency, 2000);
    }

    #[test]
    fn increase_at_max_is_a_no_op() {
        let mut c = test_cluster();
        c.current_frequency = 2000;
        c.current_voltage = 1200;
        assert!(!increase_frequency(&mut c).unwrap());
        assert_eq!(c.current_frequency, 2000);
    }

    #[test]
    fn decrease_at_min_is_a_no_op() {
        let mut c = test_cluster();
        c.current_frequency = 600;
        c.current_voltage = 800;
        assert!(!decrease_frequency(&mut c).unwrap());
    }

    #[test]
    fn constant_frequency_rejects_unknown_opp() {
        let mut c = test_cluster();
        assert!(set_constant_frequency(&mut c, 900).is_err());
    }
}
