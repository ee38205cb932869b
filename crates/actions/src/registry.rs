use aihotkeys_core::ActionId;

use crate::attempt::Attempt;

/// Ordered attempt lists for every action
///
/// An action with no attempts is valid and simply never succeeds.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    attempts: [Vec<Attempt>; ActionId::ALL.len()],
}

impl ActionRegistry {
    /// Creates a registry with no attempts for any action
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the attempts for `id`
    pub fn with(mut self, id: ActionId, attempts: Vec<Attempt>) -> Self {
        self.attempts[id.index()] = attempts;
        self
    }

    /// Append one attempt after the existing ones for `id`
    pub fn push(&mut self, id: ActionId, attempt: Attempt) {
        self.attempts[id.index()].push(attempt);
    }

    /// Attempts for `id`, in the order they run
    pub fn attempts(&self, id: ActionId) -> &[Attempt] {
        &self.attempts[id.index()]
    }

    /// Total number of attempts across all actions
    pub fn count(&self) -> usize {
        self.attempts.iter().map(Vec::len).sum()
    }
}
