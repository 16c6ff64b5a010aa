//! # textfall guide (v0.1.0)
//!
//! This module walks through one fall cycle end to end: what gets decomposed, when each phase
//! fires, and how the original document comes back.
//!
//! If you are looking for commands, run `textfall --help`.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`Document`](crate::Document): arena tree of elements and text standing in for the host page
//! - [`EngineConfig`](crate::EngineConfig): target selector, unit cap, trigger bindings, style variables
//! - [`TimingReader`](crate::TimingReader): style-variable lookups that always fall back, never fail
//! - [`AnimatableUnit`](crate::AnimatableUnit): one `span.fall-char` marker holding one glyph
//! - [`SnapshotStore`](crate::SnapshotStore): original content of every decomposed container
//! - [`TimerQueue`](crate::TimerQueue): virtual-clock delayed callbacks
//! - [`FallController`](crate::FallController): owns all of the above and runs cycles
//!
//! ---
//!
//! ## A cycle
//!
//! ```text
//! t = 0                     activate: snapshot + split, schedule everything
//! t = delay_i               unit i pops            (independent, delay_i < pop_max_delay)
//! t = F = max(delay) + pop + margin
//!                           every unit falls       (one callback, random rotation each)
//! t = R = F + fall          every unit rises       (one callback)
//! t = R + rise + margin     restore_all, run context dropped
//! ```
//!
//! The fall instant uses the largest scheduled delay, so no unit falls before its own pop ends.
//! The delays used for that maximum are read back from each marker's `--pop-delay` property, the
//! same values the pop callbacks were scheduled with.
//!
//! Every phase change on a unit is: remove the previous class, force a reflow, add the next
//! class. Hosts rely on the reflow to restart the CSS animation.
//!
//! ---
//!
//! ## Failure paths
//!
//! - Malformed timing variables resolve to their defaults.
//! - Too many characters: [`prepare`](crate::prepare) restores every container it touched and
//!   reports failure; [`Activation::CapacityExceeded`](crate::Activation::CapacityExceeded).
//! - Nothing to split: [`Activation::Empty`](crate::Activation::Empty), nothing scheduled.
//! - Activation while running: [`Activation::AlreadyRunning`](crate::Activation::AlreadyRunning).
//! - Page exit: [`FallController::teardown`](crate::FallController::teardown) cancels every
//!   pending callback and leaves the document decomposed.
//!
//! ---
//!
//! ## Driving a cycle
//!
//! ```
//! use textfall::{Document, EngineConfig, FallController, FragmentElement, FragmentNode, Signal};
//!
//! let page = FragmentNode::Element(FragmentElement::new(
//!     "body",
//!     vec![FragmentElement::new("p", vec!["Hello".into()]).into()],
//! ));
//! let doc = Document::from_fragment(&page).unwrap();
//! let before = textfall::inner_html(&doc, doc.root());
//!
//! let mut ctl = FallController::new(doc, EngineConfig::default()).unwrap();
//! ctl.handle(Signal::LoadComplete);
//! ctl.handle(Signal::Key('f'));
//! assert!(ctl.is_running());
//!
//! ctl.run_until_idle();
//! assert!(!ctl.is_running());
//! assert_eq!(textfall::inner_html(ctl.document(), ctl.document().root()), before);
//! ```
