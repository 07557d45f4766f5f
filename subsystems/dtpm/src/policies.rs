//! DVFS policies: initial operating-point selection and the `ondemand`
//! governor. Grounded on `original_source/DTPM_policies.py`'s
//! `initialize_frequency`/`ondemand_policy`.

use crate::error::DtpmError;
use soc_power::opp;
use soc_types::{Cluster, DvfsMode};

/// Set a cluster's initial frequency/voltage the first time it is touched
/// (`cluster.current_frequency == 0`), per the DVFS mode it was configured
/// with. A no-op for clusters whose frequency was already initialized.
pub fn initialize_frequency(cluster: &mut Cluster) -> Result<(), DtpmError> {
    if cluster.current_frequency != 0 {
        return Ok(());
    }
    match cluster.dvfs.clone() {
        DvfsMode::Ondemand | DvfsMode::Performance => {
            opp::set_max_frequency(cluster);
            cluster.policy_frequency = cluster.current_frequency;
        }
        DvfsMode::Powersave => {
            opp::set_min_frequency(cluster);
            cluster.policy_frequency = cluster.current_frequency;
        }
        DvfsMode::Constant(freq_mhz) => {
            opp::set_constant_frequency(cluster, freq_mhz)?;
            cluster.policy_frequency = freq_mhz;
        }
        DvfsMode::None => {}
    }
    Ok(())
}

/// Linux-style `ondemand` governor: raise to max when utilization exceeds
/// `util_high_threshold` (unless currently throttled), drop one OPP when
/// below `util_low_threshold`, otherwise hold. `utilization` is the
/// cluster's summed per-core utilization (already scaled by
/// `num_active_cores`, spec.md §4.6).
pub fn ondemand_policy(
    cluster: &mut Cluster,
    utilization: f64,
    util_high_threshold: f64,
    util_low_threshold: f64,
    currently_throttled: bool,
) -> Result<(), DtpmError> {
    if utilization <= util_high_threshold && utilization >= util_low_threshold {
        // Hold the current frequency.
    } else if utilization > util_high_threshold {
        if !currently_throttled {
            opp::set_max_frequency(cluster);
        }
    } else {
        opp::decrease_frequency(cluster)?;
    }
    cluster.policy_frequency = cluster.current_frequency;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use soc_types::{ClusterId, Opp, PeKind};

    fn test_cluster(dvfs: DvfsMode) -> Cluster {
        let mut c = Cluster::new(ClusterId(0), "big", PeKind::Big, dvfs);
        c.opp = vec![
            Opp { freq_mhz: 600, volt_mv: 800 },
            Opp { freq_mhz: 1200, volt_mv: 1000 },
            Opp { freq_mhz: 2000, volt_mv: 1200 },
        ];
        c
    }

    #[test]
    fn initialize_ondemand_starts_at_max() {
        let mut c = test_cluster(DvfsMode::Ondemand);
        initialize_frequency(&mut c).unwrap();
        assert_eq!(c.current_frequency, 2000);
        assert_eq!(c.policy_frequency, 2000);
    }

    #[test]
    fn initialize_powersave_starts_at_min() {
        let mut c = test_cluster(DvfsMode::Powersave);
        initialize_frequency(&mut c).unwrap();
        assert_eq!(c.current_frequency, 600);
    }

    #[test]
    fn initialize_is_idempotent_once_set() {
        let mut c = test_cluster(DvfsMode::Ondemand);
        initialize_frequency(&mut c).unwrap();
        c.current_frequency = 1200;
        initialize_frequency(&mut c).unwrap();
        assert_eq!(c.current_frequency, 1200);
    }

    #[test]
    fn ondemand_raises_frequency_over_high_threshold() {
        let mut c = test_cluster(DvfsMode::Ondemand);
        c.current_frequency = 1200;
        c.current_voltage = 1000;
        ondemand_policy(&mut c, 0.95, 0.8, 0.2, false).unwrap();
        assert_eq!(c.current_frequency, 2000);
    }

    #[test]
    fn ondemand_does_not_raise_while_throttled() {
        let mut c = test_cluster(DvfsMode::Ondemand);
        c.current_frequency = 1200;
        c.current_voltage = 1000;
        ondemand_policy(&mut c, 0.95, 0.8, 0.2, true).unwrap();
        assert_eq!(c.current_frequency, 1200);
    }

    #[test]
    fn ondemand_drops_one_opp_under_low_threshold() {
        let mut c = test_cluster(DvfsMode::Ondemand);
        c.current_frequency = 1200;
        c.current_voltage = 1000;
        ondemand_policy(&mut c, 0.05, 0.8, 0.2, false).unwrap();
        assert_eq!(c.current_frequency, 600);
    }

    #[test]
    fn ondemand_holds_within_band() {
        let mut c = test_cluster(DvfsMode::Ondemand);
        c.current_frequency = 1200;
        c.current_voltage = 1000;
        ondemand_policy(&mut c, 0.5, 0.8, 0.2, false).unwrap();
        assert_eq!(c.current_frequency, 1200);
    }
}
