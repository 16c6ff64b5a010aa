//! Host document abstraction: an arena tree of elements and text, JSON fragments,
//! markup serialization and simple selectors.

/// Owned subtrees used for loading documents and holding snapshots.
pub mod fragment;
/// Deterministic markup serialization.
pub mod markup;
/// Compound selector lists.
pub mod selector;
/// Arena-backed document tree.
pub mod tree;
