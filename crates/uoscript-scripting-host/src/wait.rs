use tracing::debug;

use uoscript_client::client::journal::TextQuery;
use uoscript_client::client::query::TypeQuery;
use uoscript_client::client::target::TargetChoice;
use uoscript_client::client::{ClientAction, GameState, Position, Serial, SlotRef, TaskId};

/// What a target wait does once it holds the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetWait {
    /// Claim the cursor and let the script answer it
    Any,
    SelfTarget,
    Object(Serial),
    /// First item of this graphic in the backpack, then anywhere in range
    Type(u16),
    Tile { graphic: u16, position: Position },
}

/// Resumption predicate of a suspended task
#[derive(Debug, Clone, PartialEq)]
pub enum WaitCondition {
    /// Only the deadline wakes the task
    Sleep,
    Target(TargetWait),
    Gump { gump_id: Option<u32> },
    Prompt,
    Menu,
    /// A journal entry newer than `after` matching the query
    Text { query: TextQuery, after: u64 },
}

/// Result of checking a predicate against the current state
#[derive(Debug, PartialEq)]
pub enum Evaluation {
    NotYet,
    /// Satisfied; any commands are sent to the host
    Satisfied(Vec<ClientAction>),
    /// The wait can never succeed and resolves false now
    Failed(Vec<ClientAction>),
}

impl WaitCondition {
    /// Whether this wait would take a response from `slot`
    pub fn waits_on(&self, slot: SlotRef) -> bool {
        match (self, slot) {
            (WaitCondition::Target(_), SlotRef::Target) => true,
            (WaitCondition::Gump { gump_id }, SlotRef::Gump(id)) => gump_id.is_none_or(|g| g == id),
            (WaitCondition::Prompt, SlotRef::Prompt) => true,
            (WaitCondition::Menu, SlotRef::Menu) => true,
            _ => false,
        }
    }

    /// Check the predicate. A satisfied slot wait claims its response for `task` in the same step.
    pub fn evaluate(&self, task: TaskId, state: &mut GameState) -> Evaluation {
        match self {
            WaitCondition::Sleep => Evaluation::NotYet,
            WaitCondition::Text { query, after } => {
                if state.journal.find_after(query, *after).is_some() {
                    Evaluation::Satisfied(Vec::new())
                } else {
                    Evaluation::NotYet
                }
            }
            WaitCondition::Gump { gump_id } => match state.gumps.claim(*gump_id, task) {
                Some(id) => {
                    debug!(target: "scripting", "{} claimed gump {}", task, id);
                    Evaluation::Satisfied(Vec::new())
                }
                None => Evaluation::NotYet,
            },
            WaitCondition::Prompt => claim_slot(state.prompt.claim(task)),
            WaitCondition::Menu => claim_slot(state.menu.claim(task)),
            WaitCondition::Target(wait) => {
                if !state.target.slot.claim(task) {
                    return Evaluation::NotYet;
                }
                evaluate_target(*wait, task, state)
            }
        }
    }
}

fn claim_slot(claimed: bool) -> Evaluation {
    if claimed {
        Evaluation::Satisfied(Vec::new())
    } else {
        Evaluation::NotYet
    }
}

fn evaluate_target(wait: TargetWait, task: TaskId, state: &mut GameState) -> Evaluation {
    let choice = match wait {
        TargetWait::Any => return Evaluation::Satisfied(Vec::new()),
        TargetWait::SelfTarget => TargetChoice::Player,
        TargetWait::Object(serial) if state.world.contains(serial) => TargetChoice::Object(serial),
        TargetWait::Object(serial) => {
            debug!(target: "scripting", "{} cannot target missing object 0x{:08X}", task, serial);
            return Evaluation::Failed(state.cancel_target().into_iter().collect());
        }
        TargetWait::Tile { graphic, position } => TargetChoice::Tile { graphic, position },
        TargetWait::Type(graphic) => match resolve_type(graphic, state) {
            Some(serial) => TargetChoice::Object(serial),
            None => {
                debug!(target: "scripting", "{} found nothing of type 0x{:04X} to target", task, graphic);
                return Evaluation::Failed(state.cancel_target().into_iter().collect());
            }
        },
    };
    match state.answer_target(task, choice) {
        Ok(action) => Evaluation::Satisfied(vec![action]),
        Err(_) => Evaluation::NotYet,
    }
}

fn resolve_type(graphic: u16, state: &GameState) -> Option<Serial> {
    let query = state.query();
    let in_backpack = state
        .find_alias("backpack")
        .and_then(|backpack| query.find_type(&TypeQuery::new(graphic).container(Some(backpack))));
    in_backpack
        .or_else(|| {
            query.find_type(&TypeQuery::new(graphic).range(state.effective_range(None)))
        })
        .map(|entity| entity.serial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uoscript_client::client::HostEvent;
    use uoscript_client::client::target::CursorKind;
    use uoscript_client::client::world::{Entity, Item};
    use uoscript_client::config::EngineConfig;

    fn with_cursor() -> GameState {
        let mut state = GameState::new(&EngineConfig::default());
        state.apply(HostEvent::TargetCursorOpened {
            cursor_id: 1,
            kind: CursorKind::Harmful,
        });
        state
    }

    #[test]
    fn test_target_wait_claims_once() {
        let mut state = with_cursor();
        let wait = WaitCondition::Target(TargetWait::Any);

        assert_eq!(wait.evaluate(TaskId(1), &mut state), Evaluation::Satisfied(Vec::new()));
        assert_eq!(wait.evaluate(TaskId(2), &mut state), Evaluation::NotYet);
        assert_eq!(state.target.slot.owner(), Some(TaskId(1)));
    }

    #[test]
    fn test_target_object_answers_in_one_step() {
        let mut state = with_cursor();
        state.apply(HostEvent::EntityUpserted {
            entity: Entity::item(0x77, 0x0E21, Position::default(), Item::default()),
        });
        let wait = WaitCondition::Target(TargetWait::Object(0x77));

        assert_eq!(
            wait.evaluate(TaskId(1), &mut state),
            Evaluation::Satisfied(vec![ClientAction::TargetObject {
                cursor_id: 1,
                serial: 0x77
            }])
        );
        assert!(state.target.slot.is_idle());
    }

    #[test]
    fn test_target_missing_object_cancels() {
        let mut state = with_cursor();
        let wait = WaitCondition::Target(TargetWait::Object(0xDEAD));

        assert_eq!(
            wait.evaluate(TaskId(1), &mut state),
            Evaluation::Failed(vec![ClientAction::CancelTarget { cursor_id: 1 }])
        );
        assert!(state.target.slot.is_idle());
    }

    #[test]
    fn test_target_type_without_match_cancels() {
        let mut state = with_cursor();
        let wait = WaitCondition::Target(TargetWait::Type(0x0E21));

        assert_eq!(
            wait.evaluate(TaskId(1), &mut state),
            Evaluation::Failed(vec![ClientAction::CancelTarget { cursor_id: 1 }])
        );
        assert!(state.target.slot.is_idle());
    }

    #[test]
    fn test_waits_on() {
        assert!(WaitCondition::Gump { gump_id: None }.waits_on(SlotRef::Gump(4)));
        assert!(WaitCondition::Gump { gump_id: Some(4) }.waits_on(SlotRef::Gump(4)));
        assert!(!WaitCondition::Gump { gump_id: Some(5) }.waits_on(SlotRef::Gump(4)));
        assert!(!WaitCondition::Sleep.waits_on(SlotRef::Target));
    }
}
