//! Status resolution: which response schema governs a live status code.
//!
//! Resolution is a small state machine, first match wins:
//! `Exact -> Category -> Default -> Fail`.

use crate::bundle::StatusKey;
use indexmap::IndexMap;

/// One step of status resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Look for the exact code, e.g. `404`.
    Exact,
    /// Look for the category, e.g. `4XX`.
    Category,
    /// Look for `default`.
    Default,
    /// Nothing matched.
    Fail,
}

impl Step {
    /// The key this step looks up, `None` for [`Step::Fail`].
    pub fn candidate(self, status: u16) -> Option<StatusKey> {
        match self {
            Step::Exact => Some(StatusKey::Exact(status)),
            Step::Category => Some(StatusKey::category_of(status)),
            Step::Default => Some(StatusKey::Default),
            Step::Fail => None,
        }
    }

    /// The step tried when this one does not match.
    pub fn next(self) -> Step {
        match self {
            Step::Exact => Step::Category,
            Step::Category => Step::Default,
            Step::Default | Step::Fail => Step::Fail,
        }
    }
}

/// Resolves `status` against a response map, returning the governing key.
pub fn resolve_status<V>(responses: &IndexMap<StatusKey, V>, status: u16) -> Option<StatusKey> {
    let mut step = Step::Exact;
    while let Some(key) = step.candidate(status) {
        if responses.contains_key(&key) {
            return Some(key);
        }
        step = step.next();
    }
    None
}
