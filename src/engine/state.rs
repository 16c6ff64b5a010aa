use std::collections::BTreeMap;

use crate::{
    document::{fragment::FragmentNode, tree::NodeId},
    engine::scheduler::TimerId,
    foundation::core::Millis,
};

/// Class carried by every unit marker.
pub const UNIT_CLASS: &str = "fall-char";
/// Class on the root element while units are popping or falling.
pub const FALLING_MODE_CLASS: &str = "falling-mode";
/// Per-unit rotation style property set when the unit starts falling.
pub const ROTATION_VAR: &str = "--r";

/// Visual phase of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Decomposed, not yet popped.
    Idle,
    /// Popping in at its own delay.
    Pop,
    /// Falling, synchronized across all units.
    Fall,
    /// Rising back, synchronized across all units.
    Rise,
    /// Restored from the snapshot; the unit no longer exists.
    Restore,
}

impl Phase {
    /// Visual class applied to units in this phase.
    pub fn class(self) -> Option<&'static str> {
        match self {
            Self::Pop => Some("char-pop-active"),
            Self::Fall => Some("char-fall-active"),
            Self::Rise => Some("char-rise-active"),
            Self::Idle | Self::Restore => None,
        }
    }

    /// Every class a unit can carry for some phase.
    pub fn all_classes() -> [&'static str; 3] {
        ["char-pop-active", "char-fall-active", "char-rise-active"]
    }
}

/// One atomic animatable piece of decomposed text.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatableUnit {
    /// Marker element.
    pub node: NodeId,
    /// Decomposed container that owns the marker.
    pub container: NodeId,
    /// Display glyph (a literal space is stored as U+00A0).
    pub glyph: char,
    /// Assigned pop delay.
    pub pop_delay: Millis,
    /// Rotation assigned at the fall synchronization point.
    pub rotation_deg: Option<f64>,
    /// Current phase.
    pub phase: Phase,
}

/// Saved original content of one container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerSnapshot {
    /// Container element.
    pub container: NodeId,
    /// Serialized original markup (`inner_html` at snapshot time).
    pub markup: String,
    /// Original children, used to rebuild the container.
    pub content: Vec<FragmentNode>,
}

/// Container to snapshot mapping.
///
/// Snapshots are inserted by the decomposer and consumed by the restoration manager; nothing
/// else can remove them.
#[derive(Clone, Debug, Default)]
pub struct SnapshotStore {
    entries: BTreeMap<NodeId, ContainerSnapshot>,
}

impl SnapshotStore {
    /// Number of saved snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no snapshot is saved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `container` has a saved snapshot.
    pub fn contains(&self, container: NodeId) -> bool {
        self.entries.contains_key(&container)
    }

    /// Snapshot for `container`.
    pub fn get(&self, container: NodeId) -> Option<&ContainerSnapshot> {
        self.entries.get(&container)
    }

    /// Saved snapshots in container order.
    pub fn iter(&self) -> impl Iterator<Item = &ContainerSnapshot> {
        self.entries.values()
    }

    /// Insert unless a snapshot for the same container exists. Returns whether it was inserted.
    pub(crate) fn insert_if_absent(&mut self, snapshot: ContainerSnapshot) -> bool {
        if self.entries.contains_key(&snapshot.container) {
            return false;
        }
        self.entries.insert(snapshot.container, snapshot);
        true
    }

    pub(crate) fn remove(&mut self, container: NodeId) -> Option<ContainerSnapshot> {
        self.entries.remove(&container)
    }

    pub(crate) fn drain(&mut self) -> Vec<ContainerSnapshot> {
        std::mem::take(&mut self.entries).into_values().collect()
    }
}

/// Instants (relative to cycle start) at which the synchronized phases begin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CycleSchedule {
    /// Latest per-unit pop delay.
    pub last_pop: Millis,
    /// Every unit starts falling here.
    pub fall_at: Millis,
    /// Every unit starts rising here.
    pub rise_at: Millis,
    /// Snapshots are applied here.
    pub restore_at: Millis,
}

/// State of the active cycle. Its existence is the running flag.
#[derive(Debug)]
pub struct RunContext {
    /// Virtual-clock instant the cycle started.
    pub started_at: Millis,
    /// Units in document order.
    pub units: Vec<AnimatableUnit>,
    /// Phase boundaries, once choreographed.
    pub schedule: Option<CycleSchedule>,
    pending: Vec<TimerId>,
}

impl RunContext {
    pub(crate) fn new(started_at: Millis) -> Self {
        Self {
            started_at,
            units: Vec::new(),
            schedule: None,
            pending: Vec::new(),
        }
    }

    pub(crate) fn track(&mut self, id: TimerId) {
        self.pending.push(id);
    }

    /// Every timer handle registered for this cycle, in registration order.
    pub fn pending(&self) -> &[TimerId] {
        &self.pending
    }

    pub(crate) fn take_pending(&mut self) -> Vec<TimerId> {
        std::mem::take(&mut self.pending)
    }
}

/// One recorded phase transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PhaseEvent {
    /// Virtual-clock instant.
    pub at: Millis,
    /// Phase entered.
    pub phase: Phase,
    /// Units affected by this transition.
    pub units: usize,
}

/// Controller counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CycleStats {
    /// Cycles that reached choreography.
    pub cycles_started: u64,
    /// Cycles that ran through restoration.
    pub cycles_completed: u64,
    /// Restoration manager invocations.
    pub restorations: u64,
    /// Activations rejected because a cycle was running.
    pub rejected_reentrant: u64,
    /// Preparations aborted by the unit cap.
    pub capacity_aborts: u64,
    /// Timer handles cancelled by teardown.
    pub timers_cancelled: u64,
}
