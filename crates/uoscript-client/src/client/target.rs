use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, FromRepr};

use super::slots::InteractionSlot;
use super::types::{Position, Serial};

/// Longest target queue kept before the oldest queued target is dropped
const MAX_QUEUED_TARGETS: usize = 8;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, FromRepr, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum CursorKind {
    #[default]
    Neutral = 0,
    Harmful = 1,
    Beneficial = 2,
}

/// A target cursor opened by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRequest {
    pub cursor_id: u32,
    #[serde(default)]
    pub kind: CursorKind,
}

/// What a script wants the cursor to hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetChoice {
    Object(Serial),
    Player,
    Location(Position),
    Tile { graphic: u16, position: Position },
}

/// The last target sent to the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastTarget {
    /// 0 for ground targets
    pub serial: Serial,
    pub graphic: u16,
    pub position: Position,
}

/// Target cursor slot plus the queue of targets waiting for a cursor
#[derive(Debug, Clone)]
pub struct TargetState {
    pub slot: InteractionSlot<TargetRequest>,
    queue: VecDeque<TargetChoice>,
    last: Option<LastTarget>,
}

impl TargetState {
    pub fn new() -> Self {
        Self {
            slot: InteractionSlot::new("target"),
            queue: VecDeque::new(),
            last: None,
        }
    }

    pub fn has_target(&self) -> bool {
        !self.slot.is_idle()
    }

    pub fn enqueue(&mut self, choice: TargetChoice) {
        if self.queue.len() == MAX_QUEUED_TARGETS {
            self.queue.pop_front();
        }
        self.queue.push_back(choice);
    }

    pub fn dequeue(&mut self) -> Option<TargetChoice> {
        self.queue.pop_front()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    pub fn last(&self) -> Option<LastTarget> {
        self.last
    }

    pub fn record(&mut self, last: LastTarget) {
        self.last = Some(last);
    }
}

impl Default for TargetState {
    fn default() -> Self {
        Self::new()
    }
}
