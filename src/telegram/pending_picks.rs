use std::collections::{HashMap, VecDeque};
use std::ops::Range;

use teloxide::types::ChatId;

use crate::chat_gpt::NameSuggestion;

/// Abandoned pickers beyond this many are forgotten, oldest first.
pub const MAX_PENDING_PICKS: usize = 1000;

type PickKey = (ChatId, i32);

/// A suggestion list waiting for the user to press one of its buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPick {
    pub document: Option<(String, Range<usize>)>,
    pub suggestions: Vec<NameSuggestion>,
}

/// Pickers keyed by chat and message id, bounded to `capacity` entries.
#[derive(Debug)]
pub struct PendingPicks {
    capacity: usize,
    entries: HashMap<PickKey, PendingPick>,
    order: VecDeque<PickKey>,
}

impl Default for PendingPicks {
    fn default() -> Self {
        Self::with_capacity(MAX_PENDING_PICKS)
    }
}

impl PendingPicks {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn insert(&mut self, chat_id: ChatId, message_id: i32, pick: PendingPick) {
        let key = (chat_id, message_id);
        if self.entries.insert(key, pick).is_some() {
            self.order.retain(|k| *k != key);
        }
        self.order.push_back(key);

        while self.entries.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Take the picker out; each one can be used once.
    pub fn remove(&mut self, chat_id: ChatId, message_id: i32) -> Option<PendingPick> {
        let key = (chat_id, message_id);
        let pick = self.entries.remove(&key)?;
        self.order.retain(|k| *k != key);
        Some(pick)
    }
}
