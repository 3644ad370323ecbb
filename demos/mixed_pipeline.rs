//! Mixed-MoC heater simulation example.
//!
//! A synchronous controller emits one setpoint per 10 ns period. The
//! setpoints are interpolated into a continuous heater profile, passed
//! through a static plant model, and observed two ways:
//! - a CT monitor samples the temperature directly
//! - an ADC turns it into DDE events, a comparator flags overheating and
//!   the flags are synchronized back onto the controller clock
//!
//! The simulation showcases:
//! - SY -> CT -> DDE -> SY interfaces in one model
//! - Configuration through the builder
//! - Statistics and model description

use forsyde::moc::mi::{Ct2Dde, Dde2Sy, Interpolation, Sy2Ct};
use forsyde::moc::{ct, dde, sy};
use forsyde::{AbstExt, SimConfigBuilder, SimResult, SimTime, Simulation, TimeAlignment};

const CONTROL_PERIOD: SimTime = 10;
const ADC_PERIOD: SimTime = 5;
const MONITOR_PERIOD: SimTime = 10;
const OVERHEAT: f64 = 21.0;
const SIM_TIME: SimTime = 60;

// ============================================================================
// Main simulation
// ============================================================================

fn main() -> SimResult<()> {
    let config = SimConfigBuilder::new()
        .name("heater")
        .stop_time(SIM_TIME)
        .log_level("info")
        .collect_stats(true)
        .build()?;
    forsyde::init_logging(&config.simulation.log_level);

    println!("==== Mixed pipeline example ====");
    println!("SY setpoints drive a CT plant, observed through CT and DDE.\n");

    let mut sim = Simulation::from_config(&config)?;
    let setpoints = sim.signal("setpoints");
    let profile = sim.signal("profile");
    let temperature = sim.signal("temperature");
    let monitored = sim.signal("monitored");
    let sampled = sim.signal("sampled");
    let events = sim.signal("events");
    let flags = sim.signal("flags");
    let alarms = sim.signal("alarms");

    // Controller: SY
    sim.add(sy::VSource::new(
        "controller",
        vec![20.0, 22.0, 25.0, 25.0, 21.0, 18.0],
        setpoints.writer()?,
    ));

    // Heater and plant: CT
    sim.add(Sy2Ct::new(
        "dac",
        CONTROL_PERIOD,
        Interpolation::Linear,
        setpoints.reader()?,
        profile.writer()?,
    ));
    sim.add(ct::Comb::new("plant", |v| 0.9 * v + 1.0, profile.reader()?, temperature.writer()?));
    sim.add(ct::Fanout::new("split", temperature.reader()?, monitored.writer()?.and(&sampled)?));
    sim.add(ct::Sink::new(
        "monitor",
        MONITOR_PERIOD,
        |t, v| println!("[{:>3} ns] temperature = {:.2}", t, v),
        monitored.reader()?,
    ));

    // Comparator: DDE
    sim.add(Ct2Dde::new("adc", ADC_PERIOD, sampled.reader()?, events.writer()?));
    sim.add(dde::Comb::new(
        "comparator",
        |x: &AbstExt<f64>| x.map(|v| v > OVERHEAT),
        events.reader()?,
        flags.writer()?,
    ));

    // Alarms back on the controller clock: SY
    sim.add(Dde2Sy::new(
        "sync",
        CONTROL_PERIOD,
        TimeAlignment::CeilToTick,
        flags.reader()?,
        alarms.writer()?,
    ));
    let mut cycle = 0u64;
    sim.add(sy::Sink::new(
        "alarm",
        move |flag: &AbstExt<bool>| {
            if let AbstExt::Present(true) = flag {
                println!("[{:>3} ns] overheat alarm", cycle * CONTROL_PERIOD);
            }
            cycle += 1;
        },
        alarms.reader()?,
    ));

    let report = sim.run()?;
    println!("\nRun ended: {} after {} rounds", report.outcome.label(), report.rounds);

    println!("\nModel:");
    for desc in sim.describe() {
        let moc = desc.moc.map(|m| m.to_string()).unwrap_or_default();
        let reads: Vec<_> = desc.inputs.iter().flat_map(|p| p.signals.clone()).collect();
        let writes: Vec<_> = desc.outputs.iter().flat_map(|p| p.signals.clone()).collect();
        println!(
            "  {:<12} {:<14} {:<4} [{}] -> [{}]",
            desc.name,
            desc.kind,
            moc,
            reads.join(", "),
            writes.join(", ")
        );
    }

    println!();
    print!("{}", sim.stats().summary());
    Ok(())
}
