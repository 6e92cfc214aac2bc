//! "Are you sure?" gate in front of irreversible operations.
//!
//! # Design
//! - One slot per gate. A new request replaces whatever was pending; nothing
//!   is queued.
//! - The continuation is handed back on confirmation exactly once, and
//!   dropped unseen on dismissal.
//! - Gates are owned by views, so each view's continuation type is its own
//!   deferred mutation rather than an erased callback.

/// Warning text plus the action to run once the user agrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation<C> {
    message: String,
    continuation: C,
}

impl<C> PendingConfirmation<C> {
    /// Text shown to the user.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Single-slot holder for a deferred continuation awaiting acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmGate<C> {
    pending: Option<PendingConfirmation<C>>,
}

impl<C> Default for ConfirmGate<C> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<C> ConfirmGate<C> {
    /// Empty gate.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Store a continuation behind `message`, replacing any pending one.
    pub fn request(&mut self, message: impl Into<String>, continuation: C) {
        let message = message.into();
        if self.pending.is_some() {
            tracing::debug!(%message, "replacing pending confirmation");
        }
        self.pending = Some(PendingConfirmation {
            message,
            continuation,
        });
    }

    /// Warning text of the pending confirmation.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.pending.as_ref().map(PendingConfirmation::message)
    }

    /// Whether a continuation is waiting.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the continuation for execution, clearing the slot.
    pub fn confirm(&mut self) -> Option<C> {
        self.pending.take().map(|pending| pending.continuation)
    }

    /// Drop the pending continuation without running it. Returns whether one was pending.
    pub fn dismiss(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Mutation {
        Delete(Vec<String>),
        Disable(String),
    }

    #[test]
    fn second_request_replaces_first() {
        let mut gate = ConfirmGate::new();

        gate.request("delete 1", Mutation::Delete(vec!["a".into()]));
        gate.request("disable b", Mutation::Disable("b".into()));
        assert_eq!(gate.message(), Some("disable b"));

        assert_eq!(gate.confirm(), Some(Mutation::Disable("b".into())));
        assert_eq!(gate.confirm(), None);
    }

    #[test]
    fn confirm_hands_back_exactly_once() {
        let mut gate = ConfirmGate::new();
        gate.request("sure?", Mutation::Delete(vec!["a".into()]));

        assert!(gate.confirm().is_some());
        assert!(gate.confirm().is_none());
        assert!(!gate.is_pending());
    }

    #[test]
    fn dismiss_discards_the_continuation() {
        let mut gate = ConfirmGate::new();
        gate.request("sure?", Mutation::Delete(vec!["a".into()]));

        assert!(gate.dismiss());
        assert!(!gate.dismiss());
        assert_eq!(gate.confirm(), None);
    }

    #[test]
    fn empty_gate_has_no_message() {
        let gate: ConfirmGate<Mutation> = ConfirmGate::default();
        assert_eq!(gate.message(), None);
        assert!(!gate.is_pending());
    }
}
