use tracing::warn;

use super::types::TaskId;

/// State of a single-request interaction mailbox
#[derive(Debug, Clone, PartialEq)]
pub enum SlotState<T> {
    Idle,
    /// Surfaced by the host, not yet taken by any task
    Pending(T),
    /// Handed to exactly one waiting task, awaiting that task's answer
    Claimed { request: T, owner: TaskId },
}

/// Why a task could not answer a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AnswerError {
    #[error("no request is outstanding")]
    Idle,
    #[error("request is claimed by {0}")]
    ClaimedBy(TaskId),
}

/// Holds at most one outstanding request of a kind; the latest arrival wins
#[derive(Debug, Clone)]
pub struct InteractionSlot<T> {
    kind: &'static str,
    state: SlotState<T>,
}

impl<T> InteractionSlot<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            state: SlotState::Idle,
        }
    }

    pub fn state(&self) -> &SlotState<T> {
        &self.state
    }

    /// Host-driven arrival. Returns true when an outstanding request was replaced.
    pub fn offer(&mut self, request: T) -> bool {
        let replaced = !self.is_idle();
        if let SlotState::Claimed { owner, .. } = &self.state {
            warn!(target: "scripting", "{} request claimed by {} replaced by a newer one", self.kind, owner);
        } else if replaced {
            warn!(target: "scripting", "Pending {} request replaced by a newer one", self.kind);
        }
        self.state = SlotState::Pending(request);
        replaced
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SlotState::Idle)
    }

    pub fn is_claimable(&self) -> bool {
        matches!(self.state, SlotState::Pending(_))
    }

    pub fn request(&self) -> Option<&T> {
        match &self.state {
            SlotState::Idle => None,
            SlotState::Pending(request) | SlotState::Claimed { request, .. } => Some(request),
        }
    }

    pub fn owner(&self) -> Option<TaskId> {
        match &self.state {
            SlotState::Claimed { owner, .. } => Some(*owner),
            _ => None,
        }
    }

    /// Hand a pending request to `owner`. Fails unless the slot is pending.
    pub fn claim(&mut self, owner: TaskId) -> bool {
        match std::mem::replace(&mut self.state, SlotState::Idle) {
            SlotState::Pending(request) => {
                self.state = SlotState::Claimed { request, owner };
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Give a claimed request back so another task can take it
    pub fn release(&mut self, owner: TaskId) -> bool {
        if self.owner() != Some(owner) {
            return false;
        }
        if let SlotState::Claimed { request, .. } = std::mem::replace(&mut self.state, SlotState::Idle) {
            self.state = SlotState::Pending(request);
        }
        true
    }

    /// Consume the request for an answer from `task`: its own claim, or an unclaimed one
    pub fn answer(&mut self, task: TaskId) -> Result<T, AnswerError> {
        match std::mem::replace(&mut self.state, SlotState::Idle) {
            SlotState::Idle => Err(AnswerError::Idle),
            SlotState::Pending(request) => Ok(request),
            SlotState::Claimed { request, owner } if owner == task => Ok(request),
            SlotState::Claimed { request, owner } => {
                self.state = SlotState::Claimed { request, owner };
                Err(AnswerError::ClaimedBy(owner))
            }
        }
    }

    /// Force the slot back to idle, returning whatever was outstanding
    pub fn clear(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, SlotState::Idle) {
            SlotState::Idle => None,
            SlotState::Pending(request) | SlotState::Claimed { request, .. } => Some(request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_request_wins() {
        let mut slot = InteractionSlot::new("prompt");
        assert!(!slot.offer(1));
        assert!(slot.offer(2));
        assert_eq!(slot.request(), Some(&2));
    }

    #[test]
    fn test_claim_is_exclusive() {
        let mut slot = InteractionSlot::new("target");
        slot.offer("cursor");
        assert!(slot.claim(TaskId(1)));
        assert!(!slot.claim(TaskId(2)));
        assert_eq!(slot.owner(), Some(TaskId(1)));
    }

    #[test]
    fn test_answer_respects_claims() {
        let mut slot = InteractionSlot::new("target");
        slot.offer("cursor");
        slot.claim(TaskId(1));

        assert_eq!(slot.answer(TaskId(2)), Err(AnswerError::ClaimedBy(TaskId(1))));
        assert_eq!(slot.answer(TaskId(1)), Ok("cursor"));
        assert!(slot.is_idle());
        assert_eq!(slot.answer(TaskId(1)), Err(AnswerError::Idle));
    }

    #[test]
    fn test_release_returns_to_pending() {
        let mut slot = InteractionSlot::new("menu");
        slot.offer(5);
        slot.claim(TaskId(3));
        assert!(!slot.release(TaskId(4)));
        assert!(slot.release(TaskId(3)));
        assert!(slot.is_claimable());
    }

    #[test]
    fn test_clear_on_idle_is_noop() {
        let mut slot: InteractionSlot<u32> = InteractionSlot::new("target");
        assert_eq!(slot.clear(), None);
        assert!(slot.is_idle());
    }
}
