//! Call-scoped conversion state.
//!
//! One [`CoerceState`] or [`DumpState`] is created per API call, threaded
//! through the full recursive descent, and discarded once the call
//! produces its result. Converters themselves hold no per-call state and
//! are safe to share across concurrent calls.

use std::fmt::Write as _;

/// One step into a nested document.
#[derive(Debug, Clone)]
enum Segment {
    Key(String),
    Index(usize),
}

/// The path from the document root to the value under conversion.
#[derive(Debug, Default)]
struct Path(Vec<Segment>);

impl Path {
    fn render(&self) -> String {
        let mut out = String::from("$");
        for segment in &self.0 {
            match segment {
                Segment::Key(key) => {
                    // Errors from write! into a String cannot occur.
                    let _ = write!(out, ".{key}");
                }
                Segment::Index(index) => {
                    let _ = write!(out, "[{index}]");
                }
            }
        }
        out
    }
}

/// Context threaded through a single coerce pass.
#[derive(Debug, Default)]
pub struct CoerceState {
    path: Path,
}

impl CoerceState {
    /// Creates the state for a fresh coerce pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the path of the value currently being coerced.
    ///
    /// `$` is the document root; keys and list indices are appended as the
    /// descent recurses, e.g. `$.defaultProperties.utm_source` or
    /// `$.items[3]`.
    pub fn path(&self) -> String {
        self.path.render()
    }

    pub(crate) fn push_key(&mut self, key: &str) {
        self.path.0.push(Segment::Key(key.to_string()));
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        self.path.0.push(Segment::Index(index));
    }

    pub(crate) fn pop(&mut self) {
        self.path.0.pop();
    }
}

/// Context threaded through a single dump pass.
///
/// Carries the retry latch: `can_retry` starts `true` and is forced
/// `false` the moment any nested dump encounters a value that cannot be
/// safely re-sent. The latch is one-way for the lifetime of the pass; no
/// later successful dump can set it back.
#[derive(Debug)]
pub struct DumpState {
    can_retry: bool,
    path: Path,
}

impl DumpState {
    /// Creates the state for a fresh dump pass, with the latch set.
    pub fn new() -> Self {
        Self {
            can_retry: true,
            path: Path::default(),
        }
    }

    /// Whether the request body produced by this pass may be re-sent.
    pub fn can_retry(&self) -> bool {
        self.can_retry
    }

    /// Clears the retry latch. There is no way to set it back.
    pub fn forbid_retry(&mut self) {
        self.can_retry = false;
    }

    /// Folds another state's latch into this one. The latch only ever
    /// moves towards `false`.
    pub(crate) fn merge_latch(&mut self, other: &DumpState) {
        if !other.can_retry {
            self.can_retry = false;
        }
    }

    /// Renders the path of the value currently being dumped.
    pub fn path(&self) -> String {
        self.path.render()
    }

    pub(crate) fn push_key(&mut self, key: &str) {
        self.path.0.push(Segment::Key(key.to_string()));
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        self.path.0.push(Segment::Index(index));
    }

    pub(crate) fn pop(&mut self) {
        self.path.0.pop();
    }
}

impl Default for DumpState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path() {
        let state = CoerceState::new();
        assert_eq!(state.path(), "$");
    }

    #[test]
    fn test_nested_path_rendering() {
        let mut state = CoerceState::new();
        state.push_key("defaultProperties");
        state.push_key("items");
        state.push_index(3);
        assert_eq!(state.path(), "$.defaultProperties.items[3]");
        state.pop();
        state.pop();
        assert_eq!(state.path(), "$.defaultProperties");
    }

    #[test]
    fn test_latch_starts_set() {
        let state = DumpState::new();
        assert!(state.can_retry());
    }

    #[test]
    fn test_latch_is_one_way() {
        let mut state = DumpState::new();
        state.forbid_retry();
        assert!(!state.can_retry());

        // Merging a clean state must not reset the latch.
        let clean = DumpState::new();
        state.merge_latch(&clean);
        assert!(!state.can_retry());
    }

    #[test]
    fn test_merge_propagates_cleared_latch() {
        let mut state = DumpState::new();
        let mut scratch = DumpState::new();
        scratch.forbid_retry();
        state.merge_latch(&scratch);
        assert!(!state.can_retry());
    }
}
