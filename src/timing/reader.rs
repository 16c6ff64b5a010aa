use std::collections::BTreeMap;

use crate::foundation::core::Millis;

/// Style variable holding the upper bound (exclusive) of per-unit pop delays.
pub const POP_MAX_DELAY_VAR: &str = "--pop-max-delay";
/// Style variable holding the pop animation duration.
pub const POP_DURATION_VAR: &str = "--pop-duration";
/// Style variable holding the fall animation duration.
pub const FALL_DURATION_VAR: &str = "--fall-duration";
/// Style variable holding the rise animation duration.
pub const RISE_DURATION_VAR: &str = "--rise-duration";
/// Per-unit style property carrying the unit's own pop delay.
pub const POP_DELAY_VAR: &str = "--pop-delay";

/// Fallback for [`POP_MAX_DELAY_VAR`].
pub const DEFAULT_POP_MAX_DELAY_MS: u64 = 600;
/// Fallback for [`POP_DURATION_VAR`].
pub const DEFAULT_POP_DURATION_MS: u64 = 450;
/// Fallback for [`FALL_DURATION_VAR`].
pub const DEFAULT_FALL_DURATION_MS: u64 = 1400;
/// Fallback for [`RISE_DURATION_VAR`].
pub const DEFAULT_RISE_DURATION_MS: u64 = 900;

/// Read-only view over externally supplied timing variables (style-variable-like).
///
/// Every lookup degrades to the caller's fallback; nothing here fails.
#[derive(Clone, Debug, Default)]
pub struct TimingReader {
    vars: BTreeMap<String, String>,
}

impl TimingReader {
    /// Reader over the given variables.
    pub fn new(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Raw value of `name`, if present.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Resolve `name` to milliseconds, or `fallback` when absent or malformed.
    pub fn read_ms(&self, name: &str, fallback: u64) -> u64 {
        self.raw(name).and_then(parse_time_ms).unwrap_or(fallback)
    }

    /// Resolve a per-unit value: the unit's embedded value wins over the global variable,
    /// which wins over `fallback`.
    pub fn unit_ms(&self, unit_value: Option<&str>, name: &str, fallback: u64) -> u64 {
        unit_value
            .and_then(parse_time_ms)
            .unwrap_or_else(|| self.read_ms(name, fallback))
    }
}

/// Parse a CSS-like time value to whole milliseconds.
///
/// Accepts `"18"`, `"18ms"`, `"0.7s"` and comma lists (the largest entry wins). Returns `None`
/// for empty, negative, non-finite or otherwise malformed input.
pub fn parse_time_ms(raw: &str) -> Option<u64> {
    let mut best: Option<f64> = None;
    for part in raw.split(',') {
        let part = part.trim();
        let ms = if let Some(n) = part.strip_suffix("ms") {
            n.trim().parse::<f64>().ok()?
        } else if let Some(n) = part.strip_suffix('s') {
            n.trim().parse::<f64>().ok()? * 1000.0
        } else {
            part.parse::<f64>().ok()?
        };
        if !ms.is_finite() || ms < 0.0 {
            return None;
        }
        best = Some(best.map_or(ms, |b| b.max(ms)));
    }
    best.map(|ms| ms.round() as u64)
}

/// Phase timing resolved once per cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TimingConfig {
    /// Exclusive upper bound for randomized per-unit pop delays.
    pub pop_max_delay: Millis,
    /// Pop animation duration.
    pub pop_duration: Millis,
    /// Fall animation duration.
    pub fall_duration: Millis,
    /// Rise animation duration.
    pub rise_duration: Millis,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pop_max_delay: Millis(DEFAULT_POP_MAX_DELAY_MS),
            pop_duration: Millis(DEFAULT_POP_DURATION_MS),
            fall_duration: Millis(DEFAULT_FALL_DURATION_MS),
            rise_duration: Millis(DEFAULT_RISE_DURATION_MS),
        }
    }
}

impl TimingConfig {
    /// Resolve every phase parameter from `reader`, falling back to the defaults.
    pub fn resolve(reader: &TimingReader) -> Self {
        Self {
            pop_max_delay: Millis(reader.read_ms(POP_MAX_DELAY_VAR, DEFAULT_POP_MAX_DELAY_MS)),
            pop_duration: Millis(reader.read_ms(POP_DURATION_VAR, DEFAULT_POP_DURATION_MS)),
            fall_duration: Millis(reader.read_ms(FALL_DURATION_VAR, DEFAULT_FALL_DURATION_MS)),
            rise_duration: Millis(reader.read_ms(RISE_DURATION_VAR, DEFAULT_RISE_DURATION_MS)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/reader.rs"]
mod tests;
