use std::collections::BTreeSet;

use crate::{
    document::{
        fragment::FragmentNode,
        markup::inner_html,
        selector::SelectorList,
        tree::{Document, NodeId, NodeKind},
    },
    engine::state::{AnimatableUnit, ContainerSnapshot, Phase, SnapshotStore, UNIT_CLASS},
    foundation::{core::Millis, error::FallResult, rng::UnitRandom},
    timing::reader::POP_DELAY_VAR,
};

/// Inputs for one preparation pass.
#[derive(Clone, Copy, Debug)]
pub struct DecomposeOptions<'a> {
    /// Target containers.
    pub selectors: &'a SelectorList,
    /// Containers with an ancestor (or self) of these tags are skipped.
    pub excluded_ancestors: &'a [String],
    /// Subtrees whose text is left alone.
    pub ignored_subtrees: &'a [String],
    /// Cap on units produced by the pass.
    pub max_units: usize,
    /// Exclusive upper bound for per-unit pop delays.
    pub pop_max_delay: Millis,
}

/// Outcome of [`prepare`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrepareReport {
    /// `false` when the cap was exceeded (the document is then unchanged).
    pub success: bool,
    /// Units produced; zero on failure.
    pub total_units: usize,
    /// Containers that were decomposed, in document order.
    pub processed_containers: Vec<NodeId>,
    /// The produced units, in document order.
    pub units: Vec<AnimatableUnit>,
}

impl PrepareReport {
    fn failed() -> Self {
        Self::default()
    }
}

/// Container mutated by the current pass, with what rollback needs to undo it.
enum Touched {
    /// Snapshot inserted by this pass; rollback restores from it and removes it.
    Created(NodeId),
    /// Snapshot predates this pass; rollback restores the children seen at the start of the pass.
    Existing(NodeId, Vec<FragmentNode>),
}

/// Node classification for the decomposition walk.
enum Visit {
    /// Element whose children are walked.
    Container(NodeId),
    /// Text to split.
    Text(NodeId),
    /// Left untouched: ignored subtrees, existing unit markers, empty text.
    Ignorable,
}

/// Split every eligible container matching `opts.selectors` into per-character units.
///
/// All or nothing: when the running character total exceeds `opts.max_units`, every container
/// mutated by this call gets back the children it had before the call, snapshots inserted by
/// this call are removed, and the report is a failure.
#[tracing::instrument(skip_all, fields(max_units = opts.max_units))]
pub fn prepare(
    doc: &mut Document,
    snapshots: &mut SnapshotStore,
    opts: DecomposeOptions<'_>,
    rng: &mut dyn UnitRandom,
) -> PrepareReport {
    let containers = eligible_containers(doc, &opts);

    let mut total = 0usize;
    let mut touched: Vec<Touched> = Vec::new();
    let mut report = PrepareReport::default();

    for container in containers {
        let texts = collect_text(doc, container, opts.ignored_subtrees);
        let count: usize = texts
            .iter()
            .filter_map(|&t| doc.text(t))
            .map(|t| t.chars().count())
            .sum();
        if count == 0 {
            tracing::trace!(container = container.index(), "no text to decompose");
            continue;
        }

        total += count;
        if total > opts.max_units {
            tracing::warn!(
                total,
                max_units = opts.max_units,
                "unit cap exceeded, rolling back preparation"
            );
            rollback(doc, snapshots, &touched);
            return PrepareReport::failed();
        }

        let content = doc.children_fragment(container);
        let snapshot = ContainerSnapshot {
            container,
            markup: inner_html(doc, container),
            content: content.clone(),
        };
        if snapshots.insert_if_absent(snapshot) {
            touched.push(Touched::Created(container));
        } else {
            touched.push(Touched::Existing(container, content));
        }

        match split_container(doc, container, &texts, opts.pop_max_delay, rng) {
            Ok(units) => report.units.extend(units),
            Err(e) => {
                tracing::warn!(error = %e, "decomposition failed, rolling back preparation");
                rollback(doc, snapshots, &touched);
                return PrepareReport::failed();
            }
        }
        report.processed_containers.push(container);
    }

    report.success = true;
    report.total_units = report.units.len();
    tracing::debug!(
        units = report.total_units,
        containers = report.processed_containers.len(),
        "prepared"
    );
    report
}

fn eligible_containers(doc: &Document, opts: &DecomposeOptions<'_>) -> Vec<NodeId> {
    let excluded = |n: NodeId| {
        doc.element(n).is_some_and(|el| {
            opts.excluded_ancestors
                .iter()
                .chain(opts.ignored_subtrees)
                .any(|t| t.eq_ignore_ascii_case(&el.tag))
        })
    };

    let candidates: Vec<NodeId> = doc
        .select(opts.selectors)
        .into_iter()
        .filter(|&c| {
            let skip = excluded(c) || doc.ancestors(c).any(excluded);
            if skip {
                tracing::trace!(container = c.index(), "inside chrome or ignored subtree, skipped");
            }
            !skip
        })
        .collect();

    // A container nested in another candidate is covered by the outer one.
    let set: BTreeSet<NodeId> = candidates.iter().copied().collect();
    candidates
        .into_iter()
        .filter(|&c| !doc.ancestors(c).any(|a| set.contains(&a)))
        .collect()
}

fn classify(doc: &Document, id: NodeId, ignored: &[String]) -> Visit {
    match doc.kind(id) {
        Some(NodeKind::Text(t)) if !t.is_empty() => Visit::Text(id),
        Some(NodeKind::Element(el))
            if !el.has_class(UNIT_CLASS)
                && !ignored.iter().any(|t| t.eq_ignore_ascii_case(&el.tag)) =>
        {
            Visit::Container(id)
        }
        _ => Visit::Ignorable,
    }
}

fn collect_text(doc: &Document, container: NodeId, ignored: &[String]) -> Vec<NodeId> {
    fn walk(doc: &Document, id: NodeId, ignored: &[String], out: &mut Vec<NodeId>) {
        for &child in doc.children(id) {
            match classify(doc, child, ignored) {
                Visit::Container(c) => walk(doc, c, ignored, out),
                Visit::Text(t) => out.push(t),
                Visit::Ignorable => {}
            }
        }
    }

    let mut out = Vec::new();
    walk(doc, container, ignored, &mut out);
    out
}

fn split_container(
    doc: &mut Document,
    container: NodeId,
    texts: &[NodeId],
    pop_max_delay: Millis,
    rng: &mut dyn UnitRandom,
) -> FallResult<Vec<AnimatableUnit>> {
    let mut units = Vec::new();
    for &text_node in texts {
        let text = doc.text(text_node).unwrap_or_default().to_owned();
        let mut markers = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let glyph = if ch == ' ' { '\u{a0}' } else { ch };
            let delay = Millis(rng.below(pop_max_delay.0));

            let marker = doc.create_element("span");
            doc.add_class(marker, UNIT_CLASS);
            doc.set_style(marker, POP_DELAY_VAR, delay.to_string());
            let glyph_node = doc.create_text(glyph.to_string());
            doc.append_child(marker, glyph_node)?;

            markers.push(marker);
            units.push(AnimatableUnit {
                node: marker,
                container,
                glyph,
                pop_delay: delay,
                rotation_deg: None,
                phase: Phase::Idle,
            });
        }
        doc.replace_with_many(text_node, &markers)?;
    }
    Ok(units)
}

fn rollback(doc: &mut Document, snapshots: &mut SnapshotStore, touched: &[Touched]) {
    for entry in touched.iter().rev() {
        let (container, result) = match entry {
            Touched::Created(container) => {
                let Some(snapshot) = snapshots.remove(*container) else {
                    continue;
                };
                (
                    *container,
                    doc.set_children_from_fragment(*container, &snapshot.content),
                )
            }
            Touched::Existing(container, children) => {
                (*container, doc.set_children_from_fragment(*container, children))
            }
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, container = container.index(), "rollback failed");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/decompose.rs"]
mod tests;
