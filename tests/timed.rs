//! Tests for the discrete-event MoCs: DE and DDE.
//!
//! These tests verify the correctness of:
//! - Feedback loops through delays under the clock merge
//! - Stop times: parking and resuming timed processes
//! - Held values (DE) versus absent values (DDE)
//! - Sources, sinks and fanout
//! - N-way zips over the clock merge

use std::sync::Arc;

use forsyde::moc::{dde, de};
use forsyde::{AbstExt, RunOutcome, Simulation, TtEvent, TtnEvent};
use parking_lot::Mutex;

// ============================================================================
// DE Tests
// ============================================================================

#[test]
fn test_de_feedback_accumulator() {
    // out = in + delay(out, 5)
    let mut sim = Simulation::new();
    let (i, fb, out, tap) = (sim.signal("in"), sim.signal("fb"), sim.signal("out"), sim.signal("tap"));
    sim.add(de::VSource::new("src", vec![1, 1, 1], vec![0, 10, 20], i.writer().unwrap()));
    sim.add(de::Comb2::new(
        "add",
        |x: &i32, y: &i32| x + y,
        i.reader().unwrap(),
        fb.reader().unwrap(),
        out.writer().unwrap().and(&tap).unwrap(),
    ));
    sim.add(de::Delay::new("z", 0, 5, out.reader().unwrap(), fb.writer().unwrap()));

    let report = sim.run_until(20).unwrap();
    assert_eq!(report.outcome, RunOutcome::StopTime);
    assert_eq!(
        tap.contents(),
        vec![
            TtEvent::new(1, 0),
            TtEvent::new(2, 5),
            TtEvent::new(3, 10),
            TtEvent::new(4, 15),
            TtEvent::new(5, 20),
        ]
    );
}

#[test]
fn test_de_source_resumes_after_stop_time() {
    let mut sim = Simulation::new();
    let s = sim.signal("s");
    sim.add(de::Source::new(
        "tick",
        |ev: &TtEvent<u32>| TtEvent::new(ev.value + 1, ev.time + 10),
        TtEvent::new(0, 0),
        0,
        s.writer().unwrap(),
    ));

    let report = sim.run_until(35).unwrap();
    assert_eq!(report.outcome, RunOutcome::StopTime);
    let times: Vec<_> = s.contents().iter().map(TtEvent::time).collect();
    assert_eq!(times, vec![0, 10, 20, 30]);

    sim.run_until(55).unwrap();
    let times: Vec<_> = s.contents().iter().map(TtEvent::time).collect();
    assert_eq!(times, vec![0, 10, 20, 30, 40, 50]);
}

#[test]
fn test_de_zip_comb_unzip_pipeline() {
    let mut sim = Simulation::new();
    let (a, b, z, w, x, y) = (
        sim.signal("a"),
        sim.signal("b"),
        sim.signal("z"),
        sim.signal("w"),
        sim.signal("x"),
        sim.signal("y"),
    );
    sim.add(de::VSource::new("a", vec![2, 3], vec![0, 6], a.writer().unwrap()));
    sim.add(de::VSource::new("b", vec![10], vec![3], b.writer().unwrap()));
    sim.add(de::Zip::new("zip", a.reader().unwrap(), b.reader().unwrap(), z.writer().unwrap()));
    sim.add(de::Comb::new(
        "swap",
        |(p, q): &(i32, i32)| (*q, *p),
        z.reader().unwrap(),
        w.writer().unwrap(),
    ));
    sim.add(de::Unzip::new("unzip", w.reader().unwrap(), x.writer().unwrap(), y.writer().unwrap()));
    sim.run().unwrap();

    assert_eq!(
        x.contents(),
        vec![TtEvent::new(0, 0), TtEvent::new(10, 3), TtEvent::new(10, 6)]
    );
    assert_eq!(
        y.contents(),
        vec![TtEvent::new(2, 0), TtEvent::new(2, 3), TtEvent::new(3, 6)]
    );
}

#[test]
fn test_de_fanout_and_sink() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    let mut sim = Simulation::new();
    let (i, o1, o2) = (sim.signal("i"), sim.signal("o1"), sim.signal("o2"));
    sim.add(de::Constant::new("k", 'c', 7, i.writer().unwrap()));
    sim.add(de::Fanout::new("fan", i.reader().unwrap(), o1.writer().unwrap().and(&o2).unwrap()));
    sim.add(de::Sink::new("monitor", move |ev: &TtEvent<char>| log.lock().push(ev.time), o1.reader().unwrap()));
    sim.run().unwrap();

    assert_eq!(*seen.lock(), vec![0, 7]);
    assert_eq!(o2.len(), 2);
}

#[test]
fn test_de_zipn_holds_values_then_unzipn_splits() {
    let mut sim = Simulation::new();
    let (a, b, c) = (sim.signal("a"), sim.signal("b"), sim.signal("c"));
    let (z, tap) = (sim.signal("z"), sim.signal("tap"));
    let (x, y, w) = (sim.signal("x"), sim.signal("y"), sim.signal("w"));
    sim.add(de::VSource::new("a", vec![1, 2], vec![0, 4], a.writer().unwrap()));
    sim.add(de::VSource::new("b", vec![10], vec![2], b.writer().unwrap()));
    sim.add(de::VSource::new("c", vec![100], vec![4], c.writer().unwrap()));
    sim.add(de::ZipN::new(
        "zip",
        vec![a.reader().unwrap(), b.reader().unwrap(), c.reader().unwrap()],
        z.writer().unwrap().and(&tap).unwrap(),
    ));
    sim.add(de::UnzipN::new(
        "unzip",
        z.reader().unwrap(),
        vec![x.writer().unwrap(), y.writer().unwrap(), w.writer().unwrap()],
    ));

    let report = sim.run().unwrap();
    assert_eq!(report.outcome, RunOutcome::Finished);
    assert_eq!(
        tap.contents(),
        vec![
            TtEvent::new(vec![1, 0, 0], 0),
            TtEvent::new(vec![1, 10, 0], 2),
            TtEvent::new(vec![2, 10, 100], 4),
        ]
    );
    assert_eq!(x.contents(), vec![TtEvent::new(1, 0), TtEvent::new(1, 2), TtEvent::new(2, 4)]);
    assert_eq!(w.contents(), vec![TtEvent::new(0, 0), TtEvent::new(0, 2), TtEvent::new(100, 4)]);
    assert_eq!(y.len(), 3);
}

// ============================================================================
// DDE Tests
// ============================================================================

#[test]
fn test_dde_comb_propagates_absent_events() {
    let mut sim = Simulation::new();
    let (i, o) = (sim.signal("i"), sim.signal("o"));
    sim.add(dde::VSource::from_events(
        "src",
        vec![
            TtEvent::present(4, 0),
            TtEvent::absent(3),
            TtEvent::present(5, 8),
        ],
        i.writer().unwrap(),
    ));
    sim.add(dde::Comb::new(
        "square",
        |x: &AbstExt<i32>| x.map(|v| v * v),
        i.reader().unwrap(),
        o.writer().unwrap(),
    ));
    sim.run().unwrap();

    let expected: Vec<TtnEvent<i32>> = vec![
        TtEvent::present(16, 0),
        TtEvent::absent(3),
        TtEvent::present(25, 8),
    ];
    assert_eq!(o.contents(), expected);
}

#[test]
fn test_dde_source_with_take() {
    let mut sim = Simulation::new();
    let s = sim.signal("s");
    sim.add(dde::Source::new(
        "toggle",
        |ev: &TtnEvent<bool>| TtEvent::new(ev.value.map(|b| !b), ev.time + 4),
        TtEvent::present(true, 0),
        3,
        s.writer().unwrap(),
    ));
    sim.run().unwrap();
    assert_eq!(
        s.contents(),
        vec![
            TtEvent::present(true, 0),
            TtEvent::present(false, 4),
            TtEvent::present(true, 8),
        ]
    );
}

#[test]
fn test_dde_mealy2_running_maximum() {
    // running maximum of two event streams, emitted 1 later
    let mut sim = Simulation::new();
    let (a, b, o) = (sim.signal("a"), sim.signal("b"), sim.signal("o"));
    sim.add(dde::VSource::new("a", vec![3, 1], vec![0, 4], a.writer().unwrap()));
    sim.add(dde::VSource::new("b", vec![7], vec![2], b.writer().unwrap()));
    sim.add(dde::Mealy2::new(
        "max",
        |s: &i32, x: &AbstExt<i32>, y: &AbstExt<i32>| {
            let m = (*s).max(x.from_abst_ext(i32::MIN));
            m.max(y.from_abst_ext(i32::MIN))
        },
        |s: &i32, x: &AbstExt<i32>, y: &AbstExt<i32>| {
            let m = (*s).max(x.from_abst_ext(i32::MIN));
            AbstExt::Present(m.max(y.from_abst_ext(i32::MIN)))
        },
        i32::MIN,
        1,
        a.reader().unwrap(),
        b.reader().unwrap(),
        o.writer().unwrap(),
    ));
    sim.run().unwrap();
    assert_eq!(
        o.contents(),
        vec![
            TtEvent::present(3, 1),
            TtEvent::present(7, 3),
            TtEvent::present(7, 5),
        ]
    );
}

#[test]
fn test_dde_zipn_marks_non_current_inputs_absent() {
    let mut sim = Simulation::new();
    let (a, b) = (sim.signal("a"), sim.signal("b"));
    let (z, tap) = (sim.signal("z"), sim.signal("tap"));
    let (x, y) = (sim.signal("x"), sim.signal("y"));
    sim.add(dde::VSource::from_events(
        "a",
        vec![TtEvent::absent(0), TtEvent::present(1, 2)],
        a.writer().unwrap(),
    ));
    sim.add(dde::VSource::from_events("b", vec![TtEvent::present(5, 2)], b.writer().unwrap()));
    sim.add(dde::ZipN::new(
        "zip",
        vec![a.reader().unwrap(), b.reader().unwrap()],
        z.writer().unwrap().and(&tap).unwrap(),
    ));
    sim.add(dde::UnzipN::new(
        "unzip",
        z.reader().unwrap(),
        vec![x.writer().unwrap(), y.writer().unwrap()],
    ));
    sim.run().unwrap();

    // only `a` is current at 0, and its event is absent
    let zipped: Vec<TtnEvent<Vec<AbstExt<i32>>>> = vec![
        TtEvent::absent(0),
        TtEvent::present(vec![AbstExt::Present(1), AbstExt::Present(5)], 2),
    ];
    assert_eq!(tap.contents(), zipped);
    assert_eq!(x.contents(), vec![TtEvent::absent(0), TtEvent::present(1, 2)]);
    assert_eq!(y.contents(), vec![TtEvent::absent(0), TtEvent::present(5, 2)]);
}
