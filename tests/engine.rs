//! Tests for the simulation kernel.
//!
//! These tests verify the correctness of:
//! - Configuration-driven runs (YAML/JSON, validation)
//! - Parallel rounds producing the same token streams as sequential ones
//! - Statistics export
//! - Error propagation and port binding rules
//! - Manual stepping and model descriptions

use forsyde::config::ConfigError;
use forsyde::moc::{de, sdf, sy};
use forsyde::{
    AbstExt, Moc, RunOutcome, SimConfig, SimConfigBuilder, SimError, Simulation, TtEvent,
};

/// An SDF chain: 1..=n, pairwise sums, then doubled.
fn sdf_chain(threads: usize, n: i32) -> (Simulation, forsyde::Signal<i32>) {
    let mut sim = Simulation::new().with_threads(threads);
    let (a, b, c) = (sim.signal("a"), sim.signal("b"), sim.signal("c"));
    sim.add(sdf::VSource::new("src", (1..=n).collect(), a.writer().unwrap()));
    sim.add(sdf::Comb::new(
        "pairs",
        |xs: &[i32]| vec![xs[0] + xs[1]],
        1,
        2,
        a.reader().unwrap(),
        b.writer().unwrap(),
    ));
    sim.add(sdf::Comb::new(
        "double",
        |xs: &[i32]| vec![xs[0] * 2],
        1,
        1,
        b.reader().unwrap(),
        c.writer().unwrap(),
    ));
    (sim, c)
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_yaml_config_drives_timed_run() {
    let yaml = r#"
simulation:
  name: ticker
  stop_time: 25
  default_capacity: 4
"#;
    let config = SimConfig::from_yaml(yaml).unwrap();
    let mut sim = Simulation::from_config(&config).unwrap();
    let s = sim.signal("s");
    sim.add(de::Source::new(
        "tick",
        |ev: &TtEvent<u32>| TtEvent::new(ev.value + 1, ev.time + 10),
        TtEvent::new(0, 0),
        0,
        s.writer().unwrap(),
    ));

    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::StopTime);
    let times: Vec<_> = s.contents().iter().map(TtEvent::time).collect();
    assert_eq!(times, vec![0, 10, 20]);

    let stats = sim.stats();
    assert_eq!(stats.metadata.name, "ticker");
    assert_eq!(stats.metadata.stop_time, Some(25));
    assert_eq!(stats.signal("s").and_then(|s| s.capacity), Some(4));
    let tick = stats.process("tick").unwrap();
    assert!(tick.parked);
    assert_eq!(tick.local_time, Some(30));
}

#[test]
fn test_json_config_round_limit() {
    let config = SimConfig::from_json(r#"{ "simulation": { "max_rounds": 4 } }"#).unwrap();
    let mut sim = Simulation::from_config(&config).unwrap();
    let s = sim.signal("s");
    sim.add(sy::Source::new("nat", |x: &AbstExt<u64>| x.map(|v| v + 1), AbstExt::Present(0), 0, s.writer().unwrap()));

    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::RoundLimit);
    assert_eq!(report.rounds, 4);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = SimConfig::new();
    config.simulation.max_rounds = 0;
    let err = Simulation::from_config(&config).err().unwrap();
    assert!(matches!(err, SimError::Config(ConfigError::Validation(_))));
}

#[test]
fn test_builder_params_reach_kernel() {
    let config = SimConfigBuilder::new()
        .name("built")
        .stop_time(7)
        .threads(1)
        .build()
        .unwrap();
    let sim = Simulation::from_config(&config).unwrap();
    assert_eq!(sim.params().name, "built");
    assert_eq!(sim.params().stop_time, 7);
    assert!(!sim.is_parallel());
}

// ============================================================================
// Parallel Rounds
// ============================================================================

#[test]
fn test_parallel_rounds_match_sequential() {
    let (mut seq, out_seq) = sdf_chain(1, 40);
    let (mut par, out_par) = sdf_chain(4, 40);
    assert_eq!(seq.run().unwrap().outcome, RunOutcome::Finished);
    assert_eq!(par.run().unwrap().outcome, RunOutcome::Finished);

    let expected: Vec<i32> = (1..=40).collect::<Vec<_>>().chunks(2).map(|c| 2 * (c[0] + c[1])).collect();
    assert_eq!(out_seq.contents(), expected);
    assert_eq!(out_par.contents(), expected);
    assert_eq!(par.is_parallel(), cfg!(feature = "parallel"));
}

// ============================================================================
// Statistics
// ============================================================================

#[test]
fn test_stats_export() {
    let (mut sim, _) = sdf_chain(1, 6);
    sim.run().unwrap();

    let json = sim.export_stats();
    assert_eq!(json["kernel"]["outcome"], "finished");
    assert_eq!(json["kernel"]["process_count"], 3);
    assert_eq!(json["processes"][1]["name"], "pairs");
    assert_eq!(json["processes"][1]["firings"], 3);

    let stats = sim.stats();
    assert_eq!(stats.kernel.finished_processes, 3);
    assert_eq!(stats.signal("a").map(|s| (s.written, s.read)), Some((6, 6)));
    assert_eq!(stats.processes_to_csv().lines().count(), 4);
    assert!(stats.summary().contains("Outcome: finished"));
}

// ============================================================================
// Errors and Binding
// ============================================================================

#[test]
fn test_process_error_aborts_run() {
    let mut sim = Simulation::new();
    let (a, b) = (sim.signal::<i32>("a"), sim.signal::<i32>("b"));
    sim.add(sdf::VSource::new("src", vec![1], a.writer().unwrap()));
    sim.add(sdf::Comb::new(
        "zero",
        |xs: &[i32]| xs.to_vec(),
        1,
        0,
        a.reader().unwrap(),
        b.writer().unwrap(),
    ));

    let err = sim.run().unwrap_err();
    assert!(matches!(err, SimError::Process { ref process, .. } if process == "zero"));
    assert!(b.is_empty());
}

#[test]
fn test_signal_accepts_one_reader_and_one_writer() {
    let mut sim = Simulation::new();
    let s = sim.signal::<u8>("s");
    let _r = s.reader().unwrap();
    let _w = s.writer().unwrap();
    assert!(matches!(s.reader(), Err(SimError::ReaderBound(ref n)) if n == "s"));
    assert!(matches!(s.writer(), Err(SimError::WriterBound(ref n)) if n == "s"));
}

#[test]
fn test_zero_capacity_signal_still_flows() {
    let mut sim = Simulation::new();
    let (a, b) = (sim.bounded_signal("a", 0), sim.signal("b"));
    sim.add(sdf::VSource::new("src", vec![1, 2, 3], a.writer().unwrap()));
    sim.add(sdf::Comb::new(
        "inc",
        |xs: &[i32]| vec![xs[0] + 1],
        1,
        1,
        a.reader().unwrap(),
        b.writer().unwrap(),
    ));

    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Finished);
    assert_eq!(b.contents(), vec![2, 3, 4]);
    assert_eq!(sim.stats().signal("a").and_then(|s| s.capacity), Some(1));
}

// ============================================================================
// Stepping and Description
// ============================================================================

#[test]
fn test_manual_stepping_reaches_same_result() {
    let (mut sim, out) = sdf_chain(1, 8);
    let mut steps = 0;
    while sim.step().unwrap() {
        steps += 1;
    }
    assert_eq!(sim.rounds(), steps + 1);
    assert_eq!(out.contents(), vec![6, 14, 22, 30]);
    assert!((0..sim.process_count()).all(|id| sim.is_done(id)));
}

#[test]
fn test_describe_reports_mocs() {
    let mut sim = Simulation::new();
    let a = sim.signal_with("a", Moc::Sy);
    let (b, c) = (sim.signal("b"), sim.signal("c"));
    let x = sim.signal::<i32>("x");
    sim.add(sy::Constant::new("k", AbstExt::Present(1), 2, a.writer().unwrap()));
    sim.add(sdf::Delay::new("z", 0, x.reader().unwrap(), b.writer().unwrap()));
    sim.add(de::Constant::new("e", 'e', 5, c.writer().unwrap()));

    let mocs: Vec<_> = sim.describe().into_iter().map(|d| d.moc).collect();
    assert_eq!(mocs, vec![Some(Moc::Sy), Some(Moc::Sdf), Some(Moc::De)]);

    let stats = sim.stats();
    assert_eq!(stats.signal("a").and_then(|s| s.moc.clone()), Some("SY".to_string()));
    assert_eq!(stats.signal("b").and_then(|s| s.moc.clone()), None);
    assert_eq!(stats.process("e").and_then(|p| p.moc.clone()), Some("DE".to_string()));
}
