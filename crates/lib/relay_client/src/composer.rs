//! Composition input state: character counter and send affordance.

/// What the input area should show for the current draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerView {
    /// Characters in the trimmed draft.
    pub char_count: usize,
    pub max: usize,
    pub over_limit: bool,
    /// Non-empty, within bound, and nothing in flight.
    pub can_send: bool,
}

/// Evaluates a draft against the limit and the in-flight flag.
pub fn evaluate(draft: &str, max: usize, sending: bool) -> ComposerView {
    let char_count = draft.trim().chars().count();
    let over_limit = char_count > max;
    ComposerView {
        char_count,
        max,
        over_limit,
        can_send: char_count > 0 && !over_limit && !sending,
    }
}
