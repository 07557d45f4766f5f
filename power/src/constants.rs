//! Fixed numeric constants pinned from `original_source/DTPM_power_models.py`
//! and `original_source/common.py`, where spec.md §4.7 leaves them as
//! symbols ("fixed" thermal matrix, "config-driven" leakage coefficients)
//! but a complete implementation needs literal values to reproduce the
//! original's golden traces.

/// Leakage model coefficient C1 (config `POWER MANAGEMENT.C1`, observed value).
pub const C1: f64 = 3.825e-5;
/// Leakage model coefficient C2 (config `POWER MANAGEMENT.C2`, observed value).
pub const C2: f64 = 5132.5;
/// Leakage model gate current coefficient (config `POWER MANAGEMENT.Igate`).
pub const IGATE: f64 = 0.002;
/// Ambient temperature in Celsius (config `POWER MANAGEMENT.T_ambient`).
pub const T_AMBIENT_C: f64 = 45.0;

/// Fixed maximum cores per cluster used to scale static power from
/// cluster-level to per-core (Odroid XU3 board model).
pub const MAX_CORES_PER_CLUSTER: f64 = 4.0;

/// 5x5 linear thermal transfer matrix (Odroid XU3 board), row-major.
/// Hotspot order: \[mem, gpu, big, little, acc\].
pub const A_MODEL: [[f64; 5]; 5] = [
    [0.9928, 0.000_566, 0.004_281, 0.000_372_5, 1.34e-5],
    [0.006_084, 0.9909, 0.0, 0.001_016, 8.863e-5],
    [0.0, 0.000_860_8, 0.993, 0.0, 0.000_884_2],
    [0.006_844, -0.000_511_9, 0.0, 0.9904, 0.000_339_2],
    [0.000_748_8, 0.003_932, 8.654e-5, 0.002_473, 0.9905],
];

/// B-model column for the memory hotspot.
pub const B_MODEL_MEM: [f64; 5] = [0.074_23, 0.0, 0.6708, 0.0, 0.014_04];
/// B-model column for the GPU hotspot.
pub const B_MODEL_GPU: [f64; 5] = [6.898e-7, 0.001_971, 2.108e-6, 0.016_82, 0.038_11];
/// B-model column for a big-cluster hotspot.
pub const B_MODEL_BIG: [f64; 5] = [0.0471, 0.012_65, 0.113, 0.016_46, 0.014_76];
/// B-model column for a little-cluster hotspot.
pub const B_MODEL_LITTLE: [f64; 5] = [0.023_99, 0.0, 0.028_19, 0.007_198, 0.039_02];
/// B-model column for an accelerator hotspot (thermally inert in this model).
pub const B_MODEL_ACC: [f64; 5] = [0.0, 0.0, 0.0, 0.0, 0.0];

/// Fixed memory subsystem power draw in watts (Odroid XU3 board).
pub const P_MEM: f64 = 0.0473;
/// Fixed GPU power draw in watts (Odroid XU3 board).
pub const P_GPU: f64 = 0.1201;
