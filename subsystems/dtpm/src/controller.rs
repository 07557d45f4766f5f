//! The DTPM controller: per-(PE, tick) and per-(cluster, tick) evaluation,
//! temperature sampling, throttling, and idle-PE energy accounting.
//!
//! Grounded on `original_source/DTPM.py`'s `DTPMmodule` class. The Python
//! module tracks "already evaluated this tick" with two parallel
//! `[-1] * len(...)` lists; here that becomes `last_evaluated_pe` /
//! `last_evaluated_cluster`, `Vec<Option<i64>>` indexed by dense id.

use crate::error::DtpmError;
use crate::policies;
use soc_power::constants::{P_GPU, P_MEM};
use soc_power::thermal::{apply_trip_cap, b_column, evaluate_throttling, predict_temperature, TripPoint};
use soc_power::static_power;
use soc_trace::{FrequencyTraceRecord, LoadTraceRecord, PeTraceRecord, TemperatureTraceRecord, TraceSink};
use soc_types::{Cluster, DvfsMode, Pe, PeId, PeKind, QueueKind, TaskQueues};

/// Numeric knobs the DTPM controller needs, generalized out of
/// `common.py`'s module-level globals into a plain owned struct (spec.md
/// §9's "banish hidden globals").
#[derive(Debug, Clone)]
pub struct DtpmConfig {
    /// Utilization/power sampling period, in µs.
    pub sampling_rate: i64,
    /// Temperature sampling period, in µs (a multiple of `sampling_rate`).
    pub sampling_rate_temperature: i64,
    /// Upper `ondemand` utilization threshold.
    pub util_high_threshold: f64,
    /// Lower `ondemand` utilization threshold.
    pub util_low_threshold: f64,
    /// Virtual time before which samples are not accumulated into results.
    pub warmup_period: i64,
    /// Regular thermal trip points, ascending.
    pub trip_points: Vec<TripPoint>,
    /// DTPM-specific thermal trip points, ascending.
    pub dtpm_trip_points: Vec<TripPoint>,
    /// Whether the regular throttling table is active.
    pub enable_throttling: bool,
    /// Whether the DTPM-specific throttling table is active.
    pub enable_dtpm_throttling: bool,
}

/// Energy deltas produced by one [`DtpmController::evaluate_idle_pes`] call,
/// split the way `common.results` splits them: an unconditional tally and a
/// tally that only counts once the simulation is past warmup (or is in
/// validation mode) — the engine adds each into its own running totals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IdleEnergySample {
    /// Energy to add to the always-on running total.
    pub energy_consumption_delta: f64,
    /// Energy to add to the warmup-gated cumulative total.
    pub cumulative_energy_delta: f64,
}

/// Per-run DTPM state: evaluation guards, the live temperature vector, and
/// both throttling state machines.
#[derive(Debug)]
pub struct DtpmController {
    config: DtpmConfig,
    last_evaluated_pe: Vec<Option<i64>>,
    last_evaluated_cluster: Vec<Option<i64>>,
    temperature_vector: [f64; 5],
    throttling_state: i32,
    dtpm_throttling_state: i32,
}

/// Count PEs in `cluster` that are currently running a task. Grounded on
/// `DASH_Sim_utils.py`'s `get_num_tasks_being_executed`; exposed publicly
/// because the PE executor needs the same count to split cluster-level
/// power across active cores.
#[must_use]
pub fn num_tasks_being_executed(cluster: &Cluster, pes: &[Pe]) -> u32 {
    cluster.pe_list.iter().filter(|&&pe_id| !pes[pe_id.index()].idle).count() as u32
}

fn cluster_utilization(cluster: &Cluster, pes: &[Pe]) -> f64 {
    let sum: f64 = cluster.pe_list.iter().map(|&pe_id| pes[pe_id.index()].utilization).sum();
    sum / cluster.pe_list.len() as f64
}

fn update_pe_utilization_and_info(pe: &mut Pe, queues: &TaskQueues, timestamp: i64, sampling_rate: i64) {
    let lower_bound = timestamp - sampling_rate;
    let mut merged = Vec::new();
    for &id in queues.list(QueueKind::Completed) {
        let task = queues.task(id);
        if task.pe_id != pe.id {
            continue;
        }
        if task.start_time < lower_bound && task.finish_time < lower_bound {
            continue;
        } else if task.start_time < lower_bound && task.finish_time >= lower_bound {
            merged.push(lower_bound);
            merged.push(task.finish_time);
        } else {
            merged.push(task.start_time);
            merged.push(task.finish_time);
        }
    }
    for &id in queues.list(QueueKind::Running) {
        let task = queues.task(id);
        if task.pe_id != pe.id {
            continue;
        }
        merged.push(task.start_time.max(lower_bound));
        merged.push(timestamp);
    }
    let sum_active: i64 = merged.chunks_exact(2).map(|w| w[1] - w[0]).sum();
    pe.utilization = (sum_active as f64 / sampling_rate as f64) / pe.capacity as f64;
    let mut info = vec![0i64; 12];
    for (slot, value) in info.iter_mut().zip(merged.iter()) {
        *slot = *value;
    }
    pe.info = info;
}

impl DtpmController {
    /// Construct a controller with no PE or cluster evaluated yet.
    #[must_use]
    pub fn new(config: DtpmConfig, n_pes: usize, n_clusters: usize) -> Self {
        Self {
            config,
            last_evaluated_pe: vec![None; n_pes],
            last_evaluated_cluster: vec![None; n_clusters],
            temperature_vector: [soc_power::constants::T_AMBIENT_C; 5],
            throttling_state: -1,
            dtpm_throttling_state: -1,
        }
    }

    fn max_temperature(&self) -> f64 {
        self.temperature_vector.iter().copied().fold(f64::MIN, f64::max)
    }

    /// Evaluate one PE at `timestamp`: refresh its utilization/info, and, if
    /// every other non-memory cluster has already been evaluated this tick,
    /// run its cluster's DVFS policy, temperature sampling, and throttling.
    ///
    /// Matches `DTPM.py`'s `evaluate_PE`: a no-op if this PE (or cluster) was
    /// already evaluated at this exact `timestamp`, and timestamp `0` is
    /// always skipped (nothing has run yet).
    pub fn evaluate_pe(
        &mut self,
        pes: &mut [Pe],
        clusters: &mut [Cluster],
        queues: &TaskQueues,
        pe_id: PeId,
        timestamp: i64,
        trace: &mut dyn TraceSink,
    ) -> Result<(), DtpmError> {
        let pe_idx = pe_id.index();
        let cluster_id = pes[pe_idx].cluster_id;
        let cluster_idx = cluster_id.index();

        if self.last_evaluated_pe[pe_idx] != Some(timestamp) && timestamp != 0 {
            self.last_evaluated_pe[pe_idx] = Some(timestamp);
            update_pe_utilization_and_info(&mut pes[pe_idx], queues, timestamp, self.config.sampling_rate);
            if timestamp > self.config.warmup_period {
                let util = pes[pe_idx].utilization;
                pes[pe_idx].utilization_list.push(util);
            }
            if clusters[cluster_idx].dvfs != DvfsMode::None {
                let _ = trace.record_pe(PeTraceRecord { timestamp, pe: pe_id.0, info: pes[pe_idx].info.clone() });
            }
        }

        if clusters[cluster_idx].kind == PeKind::Mem {
            return Ok(());
        }

        if self.last_evaluated_cluster[cluster_idx] != Some(timestamp) && timestamp != 0 {
            self.last_evaluated_cluster[cluster_idx] = Some(timestamp);

            clusters[cluster_idx].snippet_power_list.push(clusters[cluster_idx].current_power_cluster);
            let num_tasks = num_tasks_being_executed(&clusters[cluster_idx], pes);
            clusters[cluster_idx].snippet_num_tasks_list.push(num_tasks);

            let dvfs = clusters[cluster_idx].dvfs.clone();
            let requires_opp = matches!(dvfs, DvfsMode::Ondemand | DvfsMode::Powersave | DvfsMode::Constant(_));
            if requires_opp && clusters[cluster_idx].opp.is_empty() {
                return Err(DtpmError::MissingOpp {
                    cluster: clusters[cluster_idx].name.clone(),
                    dvfs_mode: format!("{dvfs:?}"),
                });
            }

            if dvfs == DvfsMode::Ondemand {
                let utilization = cluster_utilization(&clusters[cluster_idx], pes) * clusters[cluster_idx].num_active_cores as f64;
                let currently_throttled = self.throttling_state != -1 || self.dtpm_throttling_state != -1;
                policies::ondemand_policy(
                    &mut clusters[cluster_idx],
                    utilization,
                    self.config.util_high_threshold,
                    self.config.util_low_threshold,
                    currently_throttled,
                )?;
            }

            let evaluated_count = self.last_evaluated_cluster.iter().filter(|&&t| t == Some(timestamp)).count();
            let all_but_mem_evaluated = evaluated_count == self.last_evaluated_cluster.len() - 1;

            if timestamp % self.config.sampling_rate_temperature == 0 && all_but_mem_evaluated {
                let mut power_vector = vec![P_MEM, P_GPU];
                let mut b_columns = vec![b_column(PeKind::Mem), b_column(PeKind::Gpu)];
                for cluster in clusters.iter() {
                    if cluster.kind == PeKind::Mem || cluster.kind == PeKind::Gpu {
                        continue;
                    }
                    power_vector.push(cluster.current_power_cluster);
                    b_columns.push(b_column(cluster.kind));
                }
                self.temperature_vector = predict_temperature(self.temperature_vector, &power_vector, &b_columns);

                if self.config.enable_throttling && self.config.enable_dtpm_throttling {
                    return Err(DtpmError::ConflictingThrottlingModes);
                }
                if self.config.enable_throttling || self.config.enable_dtpm_throttling {
                    let max_temp = self.max_temperature();
                    let trips = if self.config.enable_throttling { &self.config.trip_points } else { &self.config.dtpm_trip_points };
                    let previous_state = if self.config.enable_throttling { self.throttling_state } else { self.dtpm_throttling_state };
                    let decision = evaluate_throttling(max_temp, previous_state, trips);
                    if self.config.enable_throttling {
                        self.throttling_state = decision.state;
                    } else {
                        self.dtpm_throttling_state = decision.state;
                    }
                    if decision.changed {
                        for cluster in clusters.iter_mut() {
                            if cluster.dvfs == DvfsMode::None {
                                continue;
                            }
                            let trip_table = if self.config.enable_throttling { &cluster.trip_freq } else { &cluster.dtpm_trip_freq };
                            let cap = if decision.state >= 0 { trip_table[decision.state as usize] } else { -1 };
                            let capped = apply_trip_cap(cluster.policy_frequency, cap);
                            cluster.current_frequency = capped;
                            if let Some(volt) = cluster.voltage_for(capped) {
                                cluster.current_voltage = volt;
                            }
                        }
                    }
                }

                let _ = trace.record_temperature(TemperatureTraceRecord {
                    timestamp,
                    snippet: String::new(),
                    t_max_c: self.max_temperature(),
                    throttle_state: if self.config.enable_throttling { self.throttling_state } else { self.dtpm_throttling_state },
                });
            }

            if dvfs != DvfsMode::None && all_but_mem_evaluated {
                let _ = trace.record_frequency(FrequencyTraceRecord {
                    pe: clusters[cluster_idx].name.clone(),
                    timestamp,
                    frequency_mhz: clusters[cluster_idx].current_frequency,
                });
            }
            if all_but_mem_evaluated {
                let mut n_per_cluster = Vec::new();
                let mut n_total = 0;
                for cluster in clusters.iter() {
                    if cluster.kind == PeKind::Mem {
                        continue;
                    }
                    let n = num_tasks_being_executed(cluster, pes);
                    n_per_cluster.push(n);
                    n_total += n;
                }
                let _ = trace.record_load(LoadTraceRecord { timestamp, snippet: String::new(), n_per_cluster, n_total });
            }
        }
        Ok(())
    }

    /// Evaluate every idle, non-memory PE and accumulate its leakage energy
    /// for this sampling period. Matches `DTPM.py`'s `evaluate_idle_PEs`.
    pub fn evaluate_idle_pes(
        &mut self,
        pes: &mut [Pe],
        clusters: &mut [Cluster],
        queues: &TaskQueues,
        timestamp: i64,
        trace: &mut dyn TraceSink,
        count_toward_totals: bool,
    ) -> Result<IdleEnergySample, DtpmError> {
        let base_power = P_MEM + P_GPU;
        let base_energy = base_power * self.config.sampling_rate as f64 * 1e-6 / (pes.len() as f64 - 1.0);
        let mut sample = IdleEnergySample::default();

        for i in 0..pes.len() {
            let cluster_id = pes[i].cluster_id;
            if clusters[cluster_id.index()].kind == PeKind::Mem {
                continue;
            }
            if pes[i].busy_slots == 0 {
                self.evaluate_pe(pes, clusters, queues, PeId(i as u32), timestamp, trace)?;
                let temp = self.max_temperature();
                let kind = pes[i].kind;
                let volt = clusters[cluster_id.index()].current_voltage;
                pes[i].current_leakage_core = static_power(kind, volt, temp);
                if num_tasks_being_executed(&clusters[cluster_id.index()], pes) == 0 {
                    let leakage = pes[i].current_leakage_core;
                    let active_cores = clusters[cluster_id.index()].num_active_cores;
                    clusters[cluster_id.index()].current_power_cluster = leakage * active_cores as f64 + base_power;
                }
            }
            if pes[i].busy_slots < pes[i].capacity {
                let energy_sample = pes[i].current_leakage_core * self.config.sampling_rate as f64 * 1e-6 + base_energy;
                sample.energy_consumption_delta += energy_sample;
                if count_toward_totals {
                    pes[i].snippet_energy += energy_sample;
                    pes[i].total_energy += energy_sample;
                    sample.cumulative_energy_delta += energy_sample;
                }
            } else {
                sample.energy_consumption_delta += base_energy;
                if count_toward_totals {
                    pes[i].snippet_energy += base_energy;
                    pes[i].total_energy += base_energy;
                    sample.cumulative_energy_delta += base_energy;
                }
            }
        }
        Ok(sample)
    }

    /// Current throttling state of the active table (`-1` = not throttled).
    #[must_use]
    pub fn throttling_state(&self) -> i32 {
        if self.config.enable_throttling { self.throttling_state } else { self.dtpm_throttling_state }
    }

    /// Current maximum hotspot temperature, in °C.
    #[must_use]
    pub fn max_temperature_c(&self) -> f64 {
        self.max_temperature()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soc_types::{ClusterId, Opp, PeKind};

    fn make_cfg() -> DtpmConfig {
        DtpmConfig {
            sampling_rate: 100,
            sampling_rate_temperature: 200,
            util_high_threshold: 0.8,
            util_low_threshold: 0.2,
            warmup_period: 0,
            trip_points: vec![TripPoint { temperature_c: 80.0, hysteresis_c: 5.0 }],
            dtpm_trip_points: vec![],
            enable_throttling: false,
            enable_dtpm_throttling: false,
        }
    }

    fn make_cluster(id: u32, kind: PeKind, dvfs: DvfsMode) -> Cluster {
        let mut c = Cluster::new(ClusterId(id), format!("c{id}"), kind, dvfs);
        c.opp = vec![Opp { freq_mhz: 600, volt_mv: 800 }, Opp { freq_mhz: 2000, volt_mv: 1200 }];
        c.current_frequency = 2000;
        c.current_voltage = 1200;
        c.num_active_cores = 1;
        c.pe_list = vec![PeId(id)];
        c
    }

    #[test]
    fn evaluate_pe_is_a_no_op_at_timestamp_zero() {
        let cfg = make_cfg();
        let mut ctrl = DtpmController::new(cfg, 1, 1);
        let mut pes = vec![Pe::new(PeId(0), ClusterId(0), "big_0", PeKind::Big, 1)];
        let mut clusters = vec![make_cluster(0, PeKind::Big, DvfsMode::Ondemand)];
        let queues = TaskQueues::new();
        let mut sink = soc_trace::NullSink;
        ctrl.evaluate_pe(&mut pes, &mut clusters, &queues, PeId(0), 0, &mut sink).unwrap();
        assert!(ctrl.last_evaluated_pe[0].is_none());
    }

    #[test]
    fn evaluate_pe_records_evaluation_at_nonzero_timestamp() {
        let cfg = make_cfg();
        let mut ctrl = DtpmController::new(cfg, 1, 1);
        let mut pes = vec![Pe::new(PeId(0), ClusterId(0), "big_0", PeKind::Big, 1)];
        let mut clusters = vec![make_cluster(0, PeKind::Big, DvfsMode::Ondemand)];
        let queues = TaskQueues::new();
        let mut sink = soc_trace::NullSink;
        ctrl.evaluate_pe(&mut pes, &mut clusters, &queues, PeId(0), 100, &mut sink).unwrap();
        assert_eq!(ctrl.last_evaluated_pe[0], Some(100));
    }

    #[test]
    fn missing_opp_is_rejected() {
        let cfg = make_cfg();
        let mut ctrl = DtpmController::new(cfg, 1, 1);
        let mut pes = vec![Pe::new(PeId(0), ClusterId(0), "big_0", PeKind::Big, 1)];
        let mut clusters = vec![make_cluster(0, PeKind::Big, DvfsMode::Ondemand)];
        clusters[0].opp.clear();
        clusters[0].current_frequency = 0;
        let queues = TaskQueues::new();
        let mut sink = soc_trace::NullSink;
        let err = ctrl.evaluate_pe(&mut pes, &mut clusters, &queues, PeId(0), 100, &mut sink).unwrap_err();
        assert!(matches!(err, DtpmError::MissingOpp { .. }));
    }
}
