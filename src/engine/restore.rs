use crate::{
    document::tree::Document,
    engine::state::{FALLING_MODE_CLASS, Phase, ROTATION_VAR, SnapshotStore, UNIT_CLASS},
    timing::reader::POP_DELAY_VAR,
};

/// Outcome of [`restore_all`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RestoreReport {
    /// Containers rebuilt from their snapshot.
    pub restored: usize,
    /// Snapshots whose container no longer exists.
    pub missing: usize,
    /// Surviving unit markers stripped of transient state.
    pub stripped: usize,
}

/// Rebuild every snapshotted container verbatim, clear the snapshot map, then strip transient
/// unit state from any marker still present anywhere in the document.
#[tracing::instrument(skip_all, fields(snapshots = snapshots.len()))]
pub fn restore_all(doc: &mut Document, snapshots: &mut SnapshotStore) -> RestoreReport {
    let mut report = RestoreReport::default();

    for snapshot in snapshots.drain() {
        match doc.set_children_from_fragment(snapshot.container, &snapshot.content) {
            Ok(()) => report.restored += 1,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    container = snapshot.container.index(),
                    "snapshot container vanished"
                );
                report.missing += 1;
            }
        }
    }

    let root = doc.root();
    doc.remove_class(root, FALLING_MODE_CLASS);
    for node in doc.descendants(root) {
        if !doc.has_class(node, UNIT_CLASS) {
            continue;
        }
        for class in Phase::all_classes() {
            doc.remove_class(node, class);
        }
        doc.remove_style(node, ROTATION_VAR);
        doc.remove_style(node, POP_DELAY_VAR);
        report.stripped += 1;
    }

    tracing::debug!(
        restored = report.restored,
        missing = report.missing,
        stripped = report.stripped,
        "restored"
    );
    report
}

#[cfg(test)]
#[path = "../../tests/unit/engine/restore.rs"]
mod tests;
