//! A minimal, hard-coded SoC and workload wired through `soc-engine` end to
//! end: two big cores, two little cores, one memory PE, and a three-task
//! DAG injected once and run to completion.
//!
//! Analogous to the host framework's `profiles/minimal` being a thin binary
//! over library subsystems — this binary builds its SoC/workload in-process
//! rather than parsing a text format (spec.md §6's explicit scope line).

use anyhow::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use soc_dtpm::DtpmConfig;
use soc_engine::{JobGenerator, JobGeneratorConfig, SimConfig, Simulation};
use soc_trace::csv_sink::{CsvTraceSink, TraceFlags};
use soc_types::{Application, ApplicationCatalog, BandwidthMatrix, Cluster, ClusterId, DvfsMode, Opp, Pe, PeId, PeKind, TaskTemplate};

fn build_soc() -> (Vec<Pe>, Vec<Cluster>, BandwidthMatrix, PeId) {
    let mut big = Cluster::new(ClusterId(0), "big", PeKind::Big, DvfsMode::Ondemand);
    big.opp = vec![Opp { freq_mhz: 1200, volt_mv: 900 }, Opp { freq_mhz: 2000, volt_mv: 1100 }];
    big.num_total_cores = 2;
    big.num_active_cores = 2;
    big.power_profile.insert(2000, vec![0.8, 1.4]);

    let mut little = Cluster::new(ClusterId(1), "little", PeKind::Little, DvfsMode::Ondemand);
    little.opp = vec![Opp { freq_mhz: 600, volt_mv: 700 }, Opp { freq_mhz: 1400, volt_mv: 900 }];
    little.num_total_cores = 2;
    little.num_active_cores = 2;
    little.power_profile.insert(1400, vec![0.2, 0.35]);

    let mem = Cluster::new(ClusterId(2), "mem", PeKind::Mem, DvfsMode::None);

    let mut pes = Vec::new();

    let mut big0 = Pe::new(PeId(0), ClusterId(0), "big_0", PeKind::Big, 1);
    big0.supported_functionalities = vec!["decode".to_string(), "detect".to_string(), "encode".to_string()];
    big0.performance = vec![800.0, 2400.0, 1200.0];
    pes.push(big0);

    let mut big1 = Pe::new(PeId(1), ClusterId(0), "big_1", PeKind::Big, 1);
    big1.supported_functionalities = big0_functionalities();
    big1.performance = vec![800.0, 2400.0, 1200.0];
    pes.push(big1);

    let mut little0 = Pe::new(PeId(2), ClusterId(1), "little_0", PeKind::Little, 1);
    little0.supported_functionalities = vec!["decode".to_string(), "encode".to_string()];
    little0.performance = vec![1800.0, 2600.0];
    pes.push(little0);

    let mut little1 = Pe::new(PeId(3), ClusterId(1), "little_1", PeKind::Little, 1);
    little1.supported_functionalities = little0_functionalities();
    little1.performance = vec![1800.0, 2600.0];
    pes.push(little1);

    let mem_pe = Pe::new(PeId(4), ClusterId(2), "mem_0", PeKind::Mem, 1);
    pes.push(mem_pe);

    let mut big = big;
    let mut little = little;
    let mut mem = mem;
    big.pe_list = vec![PeId(0), PeId(1)];
    little.pe_list = vec![PeId(2), PeId(3)];
    mem.pe_list = vec![PeId(4)];

    let mut bandwidth = BandwidthMatrix::new(5, 400.0, 1.0e6);
    for pe in 0..4 {
        bandwidth.set(pe, 4, 800.0);
    }

    (pes, vec![big, little, mem], bandwidth, PeId(4))
}

fn big0_functionalities() -> Vec<String> {
    vec!["decode".to_string(), "detect".to_string(), "encode".to_string()]
}

fn little0_functionalities() -> Vec<String> {
    vec!["decode".to_string(), "encode".to_string()]
}

fn build_catalog() -> ApplicationCatalog {
    let templates = vec![
        TaskTemplate::new("decode", 0, vec![]).as_head(),
        TaskTemplate::new("detect", 1, vec![0]),
        TaskTemplate::new("encode", 2, vec![1]).as_tail(),
    ];
    let comm_vol = vec![vec![0, 2_000_000, 0], vec![0, 0, 1_500_000], vec![0, 0, 0]];
    let app = Application::new("video_pipeline", templates, comm_vol).expect("demo DAG is internally consistent");

    let mut catalog = ApplicationCatalog::new();
    catalog.push(app);
    catalog
}

fn main() -> Result<()> {
    env_logger::init();

    let (pes, clusters, bandwidth, memory_pe) = build_soc();
    let catalog = build_catalog();

    let config = SimConfig {
        simulation_length: 200_000,
        sampling_rate: 1000,
        sampling_rate_temperature: 5000,
        max_jobs_in_parallel: 4,
        max_num_jobs: 20,
        fixed_injection_rate: false,
        scale: 5000.0,
        inject_fixed_num_jobs: true,
        ..SimConfig::default()
    };

    let dtpm_config = DtpmConfig {
        sampling_rate: config.sampling_rate,
        sampling_rate_temperature: config.sampling_rate_temperature,
        util_high_threshold: config.util_high_threshold,
        util_low_threshold: config.util_low_threshold,
        warmup_period: config.warmup_period,
        trip_points: vec![],
        dtpm_trip_points: vec![],
        enable_throttling: false,
        enable_dtpm_throttling: false,
    };

    let generator = JobGenerator::new(
        JobGeneratorConfig::default(),
        ChaCha8Rng::seed_from_u64(config.selection_seed),
        ChaCha8Rng::seed_from_u64(config.interarrival_seed),
    );

    let trace = CsvTraceSink::new("./trace-out", TraceFlags::default())?;
    let scheduler = soc_scheduler::build("EFT")?;

    let mut sim = Simulation::new(config, pes, clusters, catalog, bandwidth, memory_pe, scheduler, generator, Box::new(trace), dtpm_config);

    let ticks = sim.run()?;
    log::info!(
        "run complete after {ticks} ticks (t={}us): {} tasks completed, {:.6}J total energy",
        sim.now,
        sim.queues.list(soc_types::QueueKind::Completed).len(),
        sim.cumulative_energy_j,
    );

    Ok(())
}
