use crate::{
    config::engine::EngineConfig,
    document::{selector::SelectorList, tree::Document},
    engine::{
        choreograph::{self, CycleTask},
        decompose::{self, DecomposeOptions},
        restore::{self, RestoreReport},
        scheduler::{Fired, TimerQueue},
        state::{
            AnimatableUnit, CycleSchedule, CycleStats, FALLING_MODE_CLASS, Phase, PhaseEvent,
            RunContext, SnapshotStore,
        },
    },
    foundation::{
        core::Millis,
        error::FallResult,
        rng::{Rng64, UnitRandom},
    },
    timing::reader::{TimingConfig, TimingReader},
};

/// External signal delivered by the host page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// A control was activated (clicked).
    Click {
        /// `id` of the activated control.
        target_id: String,
    },
    /// A key was pressed.
    Key(char),
    /// The initial load phase ended.
    LoadComplete,
    /// The page is about to unload.
    Unload,
}

/// Result of [`FallController::activate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Activation {
    /// A cycle was prepared and choreographed.
    Started {
        /// Units produced by preparation.
        units: usize,
        /// Phase boundaries relative to cycle start.
        schedule: CycleSchedule,
    },
    /// A cycle is already running; nothing changed.
    AlreadyRunning,
    /// Preparation produced no units; the cycle was a no-op.
    Empty,
    /// Preparation exceeded the unit cap and was rolled back.
    CapacityExceeded,
    /// The initial load phase has not ended yet.
    Gated,
    /// The controller was torn down.
    Closed,
}

/// Drives fall cycles over an owned document.
///
/// At most one cycle runs at a time: the run context exists exactly while a cycle is running,
/// and [`FallController::activate`] checks for it before doing anything else.
pub struct FallController {
    doc: Document,
    config: EngineConfig,
    selectors: SelectorList,
    reader: TimingReader,
    timing: TimingConfig,
    rng: Box<dyn UnitRandom>,
    snapshots: SnapshotStore,
    timers: TimerQueue<CycleTask>,
    run: Option<RunContext>,
    load_complete: bool,
    closed: bool,
    stats: CycleStats,
    events: Vec<PhaseEvent>,
    last_restore: Option<RestoreReport>,
}

impl FallController {
    /// Controller using a [`Rng64`] seeded from `config.seed`.
    pub fn new(doc: Document, config: EngineConfig) -> FallResult<Self> {
        let rng = Box::new(Rng64::new(config.seed));
        Self::with_random(doc, config, rng)
    }

    /// Controller with an explicit random source.
    pub fn with_random(
        doc: Document,
        config: EngineConfig,
        rng: Box<dyn UnitRandom>,
    ) -> FallResult<Self> {
        config.validate()?;
        let selectors = config.selectors()?;
        let reader = config.timing_reader();
        let timing = TimingConfig::resolve(&reader);
        let load_complete = !config.require_load_complete;
        Ok(Self {
            doc,
            config,
            selectors,
            reader,
            timing,
            rng,
            snapshots: SnapshotStore::default(),
            timers: TimerQueue::new(),
            run: None,
            load_complete,
            closed: false,
            stats: CycleStats::default(),
            events: Vec::new(),
            last_restore: None,
        })
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access to the document, refused while a cycle owns it.
    pub fn document_mut(&mut self) -> Option<&mut Document> {
        if self.run.is_some() {
            return None;
        }
        Some(&mut self.doc)
    }

    /// Give the document back.
    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Phase timing resolved at construction.
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Whether a cycle is running.
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Whether [`FallController::teardown`] has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Active cycle, if any.
    pub fn run_context(&self) -> Option<&RunContext> {
        self.run.as_ref()
    }

    /// Units of the active cycle (empty when idle).
    pub fn units(&self) -> &[AnimatableUnit] {
        self.run.as_ref().map(|r| r.units.as_slice()).unwrap_or(&[])
    }

    /// Saved snapshots.
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Counters.
    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Phase transitions of the current or most recent cycle.
    pub fn events(&self) -> &[PhaseEvent] {
        &self.events
    }

    /// Report of the most recent restoration.
    pub fn last_restore(&self) -> Option<RestoreReport> {
        self.last_restore
    }

    /// Current virtual instant.
    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    /// Pending callbacks in the timer queue.
    pub fn pending_timers(&self) -> usize {
        self.timers.pending_len()
    }

    /// Route a host signal. Returns the activation outcome for trigger signals.
    pub fn handle(&mut self, signal: Signal) -> Option<Activation> {
        match signal {
            Signal::Click { target_id } => {
                let bound = self.config.triggers.control_id.as_deref() == Some(target_id.as_str());
                bound.then(|| self.activate())
            }
            Signal::Key(key) => (self.config.triggers.key == Some(key)).then(|| self.activate()),
            Signal::LoadComplete => {
                self.load_complete = true;
                None
            }
            Signal::Unload => {
                self.teardown();
                None
            }
        }
    }

    /// Start a cycle unless one is running.
    #[tracing::instrument(skip(self), fields(now = self.timers.now().0))]
    pub fn activate(&mut self) -> Activation {
        if self.closed {
            return Activation::Closed;
        }
        if self.run.is_some() {
            self.stats.rejected_reentrant += 1;
            tracing::debug!("cycle already running");
            return Activation::AlreadyRunning;
        }
        if !self.load_complete {
            tracing::debug!("load phase not finished");
            return Activation::Gated;
        }

        let stray = self.timers.cancel_all();
        if stray > 0 {
            tracing::debug!(stray, "cancelled stray timers");
        }
        let mut run = RunContext::new(self.timers.now());

        let opts = DecomposeOptions {
            selectors: &self.selectors,
            excluded_ancestors: &self.config.excluded_ancestors,
            ignored_subtrees: &self.config.ignored_subtrees,
            max_units: self.config.max_units,
            pop_max_delay: self.timing.pop_max_delay,
        };
        let report = decompose::prepare(
            &mut self.doc,
            &mut self.snapshots,
            opts,
            self.rng.as_mut(),
        );
        if !report.success {
            self.stats.capacity_aborts += 1;
            return Activation::CapacityExceeded;
        }
        if report.units.is_empty() {
            tracing::debug!("nothing to decompose");
            return Activation::Empty;
        }

        run.units = report.units;
        let root = self.doc.root();
        self.doc.add_class(root, FALLING_MODE_CLASS);
        let schedule = choreograph::schedule_cycle(
            &self.doc,
            &mut run,
            &mut self.timers,
            &self.reader,
            &self.timing,
            Millis(self.config.safety_margin_ms),
        );
        let units = run.units.len();
        self.events.clear();
        self.run = Some(run);
        self.stats.cycles_started += 1;
        tracing::info!(units, restore_at = schedule.restore_at.0, "cycle started");
        Activation::Started { units, schedule }
    }

    /// Cancel every pending callback of the active cycle without restoring, and refuse further
    /// activations. Meant for page exit, where the document state no longer matters.
    #[tracing::instrument(skip(self))]
    pub fn teardown(&mut self) {
        if let Some(mut run) = self.run.take() {
            for id in run.take_pending() {
                if self.timers.cancel(id) {
                    self.stats.timers_cancelled += 1;
                }
            }
        }
        self.closed = true;
        tracing::debug!(cancelled = self.stats.timers_cancelled, "torn down");
    }

    /// Let `by` milliseconds of virtual time pass, firing every callback that comes due.
    pub fn advance(&mut self, by: Millis) {
        let target = self.timers.now().saturating_add(by);
        while let Some(fired) = self.timers.pop_due(target) {
            self.dispatch(fired);
        }
        self.timers.set_now(target);
    }

    /// Fire callbacks until the queue is empty.
    pub fn run_until_idle(&mut self) {
        while let Some(due) = self.timers.next_due() {
            let by = due.saturating_sub(self.timers.now());
            self.advance(by);
        }
    }

    fn dispatch(&mut self, fired: Fired<CycleTask>) {
        let Some(run) = self.run.as_mut() else {
            tracing::trace!(task = ?fired.task, "callback outside a cycle dropped");
            return;
        };
        let at = fired.due;
        match fired.task {
            CycleTask::Pop { unit } => {
                if let Some(u) = run.units.get_mut(unit) {
                    choreograph::apply_pop(&mut self.doc, u);
                    self.events.push(PhaseEvent {
                        at,
                        phase: Phase::Pop,
                        units: 1,
                    });
                }
            }
            CycleTask::FallSync => {
                choreograph::apply_fall(&mut self.doc, &mut run.units, self.rng.as_mut());
                tracing::debug!(at = at.0, units = run.units.len(), "fall");
                self.events.push(PhaseEvent {
                    at,
                    phase: Phase::Fall,
                    units: run.units.len(),
                });
            }
            CycleTask::Rise => {
                choreograph::apply_rise(&mut self.doc, &mut run.units);
                let root = self.doc.root();
                self.doc.remove_class(root, FALLING_MODE_CLASS);
                tracing::debug!(at = at.0, units = run.units.len(), "rise");
                self.events.push(PhaseEvent {
                    at,
                    phase: Phase::Rise,
                    units: run.units.len(),
                });
            }
            CycleTask::Restore => {
                let units = run.units.len();
                let report = restore::restore_all(&mut self.doc, &mut self.snapshots);
                self.last_restore = Some(report);
                self.stats.restorations += 1;
                self.stats.cycles_completed += 1;
                self.events.push(PhaseEvent {
                    at,
                    phase: Phase::Restore,
                    units,
                });
                self.run = None;
                tracing::info!(at = at.0, restored = report.restored, "cycle finished");
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/controller.rs"]
mod tests;
