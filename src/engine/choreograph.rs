use crate::{
    document::tree::{Document, NodeId},
    engine::{
        scheduler::TimerQueue,
        state::{AnimatableUnit, CycleSchedule, Phase, ROTATION_VAR, RunContext},
    },
    foundation::{core::Millis, rng::UnitRandom},
    timing::reader::{POP_DELAY_VAR, TimingConfig, TimingReader},
};

/// Smallest rotation magnitude (degrees) assigned at the fall.
pub const MIN_ROTATION_DEG: f64 = 5.0;
/// Width of the rotation magnitude range (degrees).
pub const ROTATION_SPREAD_DEG: f64 = 30.0;

/// Scheduled callback of a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleTask {
    /// Pop the unit at this index.
    Pop {
        /// Index into the run's unit list.
        unit: usize,
    },
    /// Every unit starts falling.
    FallSync,
    /// Every unit starts rising.
    Rise,
    /// Apply snapshots and end the cycle.
    Restore,
}

/// Instant at which every unit starts falling:
/// `max(delays) + pop_duration + margin`.
///
/// Using the maximum guarantees that no unit falls before its own pop has finished.
pub fn fall_sync_point(
    delays: impl IntoIterator<Item = Millis>,
    pop_duration: Millis,
    margin: Millis,
) -> Millis {
    let last = delays.into_iter().max().unwrap_or(Millis::ZERO);
    last.saturating_add(pop_duration).saturating_add(margin)
}

impl CycleSchedule {
    /// Phase boundaries for the given per-unit pop delays.
    ///
    /// Rise starts when the fall animation completes (`fall_at + fall_duration`); restore
    /// follows `rise_duration + margin` later.
    pub fn compute(
        delays: impl IntoIterator<Item = Millis>,
        timing: &TimingConfig,
        margin: Millis,
    ) -> Self {
        let last_pop = delays.into_iter().max().unwrap_or(Millis::ZERO);
        let fall_at = fall_sync_point([last_pop], timing.pop_duration, margin);
        let rise_at = fall_at.saturating_add(timing.fall_duration);
        let restore_at = rise_at
            .saturating_add(timing.rise_duration)
            .saturating_add(margin);
        Self {
            last_pop,
            fall_at,
            rise_at,
            restore_at,
        }
    }
}

/// Register every callback of the cycle and record each handle in `run`.
///
/// Each unit's pop is scheduled at the delay read back from its own `--pop-delay` property, and
/// the synchronization points are computed from those same values.
pub(crate) fn schedule_cycle(
    doc: &Document,
    run: &mut RunContext,
    timers: &mut TimerQueue<CycleTask>,
    reader: &TimingReader,
    timing: &TimingConfig,
    margin: Millis,
) -> CycleSchedule {
    let delays: Vec<Millis> = run
        .units
        .iter()
        .map(|u| {
            Millis(reader.unit_ms(
                doc.style(u.node, POP_DELAY_VAR),
                POP_DELAY_VAR,
                u.pop_delay.0,
            ))
        })
        .collect();

    for (unit, &delay) in delays.iter().enumerate() {
        run.track(timers.schedule(delay, CycleTask::Pop { unit }));
    }

    let schedule = CycleSchedule::compute(delays.iter().copied(), timing, margin);
    run.track(timers.schedule(schedule.fall_at, CycleTask::FallSync));
    run.track(timers.schedule(schedule.rise_at, CycleTask::Rise));
    run.track(timers.schedule(schedule.restore_at, CycleTask::Restore));
    run.schedule = Some(schedule);

    tracing::debug!(
        units = run.units.len(),
        fall_at = schedule.fall_at.0,
        rise_at = schedule.rise_at.0,
        restore_at = schedule.restore_at.0,
        "cycle scheduled"
    );
    schedule
}

/// Move one unit into `to`: drop the previous phase class, force a reflow, apply the new class.
///
/// The reflow between removal and application restarts the CSS animation instead of letting
/// the host coalesce the two class changes.
pub(crate) fn enter_phase(doc: &mut Document, unit: &mut AnimatableUnit, to: Phase) {
    swap_phase_class(doc, unit.node, unit.phase, to);
    unit.phase = to;
}

fn swap_phase_class(doc: &mut Document, node: NodeId, from: Phase, to: Phase) {
    if let Some(class) = from.class() {
        doc.remove_class(node, class);
    }
    doc.force_reflow(node);
    if let Some(class) = to.class() {
        doc.add_class(node, class);
    }
}

/// Pop a single unit.
pub(crate) fn apply_pop(doc: &mut Document, unit: &mut AnimatableUnit) {
    if unit.phase == Phase::Idle {
        enter_phase(doc, unit, Phase::Pop);
    }
}

/// Every unit starts falling with a random rotation.
pub(crate) fn apply_fall(doc: &mut Document, units: &mut [AnimatableUnit], rng: &mut dyn UnitRandom) {
    for unit in units {
        let magnitude = rng.next_f64_01() * ROTATION_SPREAD_DEG + MIN_ROTATION_DEG;
        let rotation = if rng.coin() { -magnitude } else { magnitude };
        unit.rotation_deg = Some(rotation);
        doc.set_style(unit.node, ROTATION_VAR, format!("{rotation:.2}deg"));
        enter_phase(doc, unit, Phase::Fall);
    }
}

/// Every unit starts rising at once.
pub(crate) fn apply_rise(doc: &mut Document, units: &mut [AnimatableUnit]) {
    for unit in units {
        enter_phase(doc, unit, Phase::Rise);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/choreograph.rs"]
mod tests;
