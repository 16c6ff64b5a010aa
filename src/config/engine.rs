use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{
    document::selector::SelectorList,
    foundation::error::{FallError, FallResult},
    timing::reader::TimingReader,
};

/// Default target selector: block-level text containers.
pub const DEFAULT_TARGET_SELECTOR: &str = "h1,h2,h3,h4,h5,h6,p,li";
/// Default cap on decomposed units per cycle.
pub const DEFAULT_MAX_UNITS: usize = 4000;
/// Default padding added after pop and rise before the next phase begins.
pub const DEFAULT_SAFETY_MARGIN_MS: u64 = 50;

/// Engine configuration, loadable from JSON.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Selector for the containers to decompose. Fixed for the controller's lifetime.
    pub target_selector: String,
    /// Containers with an ancestor (or self) of these tags are skipped.
    pub excluded_ancestors: Vec<String>,
    /// Subtrees whose text is never decomposed.
    pub ignored_subtrees: Vec<String>,
    /// Maximum number of units per cycle; exceeding it aborts preparation.
    pub max_units: usize,
    /// Fixed margin (ms) added after the pop and rise phases.
    pub safety_margin_ms: u64,
    /// Seed for the default random source.
    pub seed: u64,
    /// External timing variables (`--pop-duration`, ...).
    pub style_vars: BTreeMap<String, String>,
    /// Trigger bindings.
    pub triggers: TriggerBindings,
    /// Ignore activation signals until the host reports that the initial load ended.
    pub require_load_complete: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_selector: DEFAULT_TARGET_SELECTOR.to_owned(),
            excluded_ancestors: vec!["header".to_owned(), "nav".to_owned(), "footer".to_owned()],
            ignored_subtrees: vec!["script".to_owned(), "style".to_owned(), "noscript".to_owned()],
            max_units: DEFAULT_MAX_UNITS,
            safety_margin_ms: DEFAULT_SAFETY_MARGIN_MS,
            seed: 0,
            style_vars: BTreeMap::new(),
            triggers: TriggerBindings::default(),
            require_load_complete: true,
        }
    }
}

/// Which user signals start a cycle.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriggerBindings {
    /// `id` of the control whose activation starts a cycle.
    pub control_id: Option<String>,
    /// Key whose press starts a cycle.
    pub key: Option<char>,
}

impl Default for TriggerBindings {
    fn default() -> Self {
        Self {
            control_id: Some("trigger-fall".to_owned()),
            key: Some('f'),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FallResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FallError::config(format!("parse engine config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FallResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FallError::config(format!("open engine config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> FallResult<()> {
        self.selectors()?;
        if self.max_units == 0 {
            return Err(FallError::validation("max_units must be > 0"));
        }
        Ok(())
    }

    /// Parsed target selector.
    pub fn selectors(&self) -> FallResult<SelectorList> {
        SelectorList::parse(&self.target_selector)
    }

    /// Timing reader over `style_vars`.
    pub fn timing_reader(&self) -> TimingReader {
        TimingReader::new(self.style_vars.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/engine.rs"]
mod tests;
