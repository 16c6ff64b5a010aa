use super::*;
use crate::engine::state::UNIT_CLASS;
use crate::foundation::rng::Rng64;

fn unit_doc(n: usize) -> (Document, Vec<AnimatableUnit>) {
    let mut doc = Document::new("body");
    let root = doc.root();
    let mut units = Vec::new();
    for i in 0..n {
        let span = doc.create_element("span");
        doc.add_class(span, UNIT_CLASS);
        doc.append_child(root, span).unwrap();
        units.push(AnimatableUnit {
            node: span,
            container: root,
            glyph: 'x',
            pop_delay: Millis(i as u64 * 10),
            rotation_deg: None,
            phase: Phase::Idle,
        });
    }
    (doc, units)
}

#[test]
fn sync_point_uses_the_latest_delay() {
    let at = fall_sync_point([Millis(10), Millis(50), Millis(30)], Millis(100), Millis(20));
    assert_eq!(at, Millis(170));
    assert_eq!(
        fall_sync_point(Vec::<Millis>::new(), Millis(100), Millis(20)),
        Millis(120)
    );
}

#[test]
fn schedule_chains_phase_boundaries() {
    let timing = TimingConfig {
        pop_max_delay: Millis(600),
        pop_duration: Millis(100),
        fall_duration: Millis(1000),
        rise_duration: Millis(400),
    };
    let s = CycleSchedule::compute([Millis(10), Millis(50), Millis(30)], &timing, Millis(20));
    assert_eq!(s.last_pop, Millis(50));
    assert_eq!(s.fall_at, Millis(170));
    assert_eq!(s.rise_at, Millis(1170));
    assert_eq!(s.restore_at, Millis(1590));
}

#[test]
fn phase_change_reflows_between_classes() {
    let (mut doc, mut units) = unit_doc(1);
    let u = &mut units[0];

    apply_pop(&mut doc, u);
    assert_eq!(doc.reflow_count(), 1);
    assert!(doc.has_class(u.node, "char-pop-active"));

    enter_phase(&mut doc, u, Phase::Fall);
    assert_eq!(doc.reflow_count(), 2);
    assert!(!doc.has_class(u.node, "char-pop-active"));
    assert!(doc.has_class(u.node, "char-fall-active"));
    assert_eq!(u.phase, Phase::Fall);

    // A unit that already left Idle is not popped again.
    apply_pop(&mut doc, u);
    assert_eq!(doc.reflow_count(), 2);
}

#[test]
fn fall_assigns_bounded_signed_rotation() {
    let (mut doc, mut units) = unit_doc(50);
    apply_fall(&mut doc, &mut units, &mut Rng64::new(11));
    let mut signs = (false, false);
    for u in &units {
        let r = u.rotation_deg.unwrap();
        assert!((MIN_ROTATION_DEG..MIN_ROTATION_DEG + ROTATION_SPREAD_DEG).contains(&r.abs()));
        signs = (signs.0 || r < 0.0, signs.1 || r > 0.0);
        assert_eq!(doc.style(u.node, ROTATION_VAR), Some(format!("{r:.2}deg").as_str()));
        assert_eq!(u.phase, Phase::Fall);
    }
    assert_eq!(signs, (true, true));

    apply_rise(&mut doc, &mut units);
    assert!(units.iter().all(|u| doc.has_class(u.node, "char-rise-active")
        && !doc.has_class(u.node, "char-fall-active")));
}

#[test]
fn scheduling_reads_back_unit_delays() {
    let (mut doc, units) = unit_doc(3);
    // The marker property wins over the in-memory value.
    doc.set_style(units[2].node, POP_DELAY_VAR, "75ms");

    let mut run = RunContext::new(Millis::ZERO);
    run.units = units;
    let mut timers = TimerQueue::new();
    let timing = TimingConfig {
        pop_duration: Millis(100),
        ..TimingConfig::default()
    };
    let s = schedule_cycle(
        &doc,
        &mut run,
        &mut timers,
        &TimingReader::default(),
        &timing,
        Millis(20),
    );

    assert_eq!(s.last_pop, Millis(75));
    assert_eq!(s.fall_at, Millis(195));
    assert_eq!(run.pending().len(), 3 + 3);
    assert_eq!(timers.pending_len(), 6);

    let mut order = Vec::new();
    while let Some(f) = timers.pop_due(Millis(u64::MAX)) {
        order.push((f.due.0, f.task));
    }
    assert_eq!(order[0], (0, CycleTask::Pop { unit: 0 }));
    assert_eq!(order[1], (10, CycleTask::Pop { unit: 1 }));
    assert_eq!(order[2], (75, CycleTask::Pop { unit: 2 }));
    assert_eq!(order[3], (195, CycleTask::FallSync));
    assert_eq!(order[4].1, CycleTask::Rise);
    assert_eq!(order[5].1, CycleTask::Restore);
}
