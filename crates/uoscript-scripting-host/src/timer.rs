use std::collections::HashMap;
use std::time::Instant;

use uoscript_client::client::TaskId;

/// Unique identifier for a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer {
    owner: TaskId,
    fire_at: Instant,
}

/// One-shot deadlines for suspended tasks
pub struct TimerManager {
    timers: HashMap<TimerId, Timer>,
    next_id: u64,
}

impl TimerManager {
    pub fn new() -> Self {
        Self {
            timers: HashMap::new(),
            next_id: 0,
        }
    }

    /// Schedule a deadline for `owner` at an absolute tick time
    pub fn schedule_at(&mut self, fire_at: Instant, owner: TaskId) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(id, Timer { owner, fire_at });
        id
    }

    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Drop every timer owned by `owner`
    pub fn cancel_owner(&mut self, owner: TaskId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, timer| timer.owner != owner);
        before - self.timers.len()
    }

    /// Remove and return the timers due at `now`
    pub fn tick(&mut self, now: Instant) -> Vec<(TimerId, TaskId)> {
        let mut fired: Vec<(TimerId, TaskId)> = self
            .timers
            .iter()
            .filter(|(_, timer)| now >= timer.fire_at)
            .map(|(id, timer)| (*id, timer.owner))
            .collect();
        fired.sort_by_key(|(id, _)| id.0);

        for (id, _) in &fired {
            self.timers.remove(id);
        }
        fired
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().map(|timer| timer.fire_at).min()
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_one_shot_timer() {
        let start = Instant::now();
        let mut manager = TimerManager::new();
        let id = manager.schedule_at(start + Duration::from_millis(50), TaskId(1));

        assert!(manager.tick(start).is_empty());
        assert!(manager.tick(start + Duration::from_millis(49)).is_empty());

        let fired = manager.tick(start + Duration::from_millis(50));
        assert_eq!(fired, vec![(id, TaskId(1))]);
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_cancel_timer() {
        let start = Instant::now();
        let mut manager = TimerManager::new();
        let id = manager.schedule_at(start + Duration::from_secs(10), TaskId(1));

        assert!(manager.cancel_timer(id));
        assert_eq!(manager.active_count(), 0);
        assert!(!manager.cancel_timer(id));
    }

    #[test]
    fn test_cancel_owner() {
        let start = Instant::now();
        let mut manager = TimerManager::new();
        manager.schedule_at(start, TaskId(1));
        manager.schedule_at(start, TaskId(2));
        manager.schedule_at(start, TaskId(1));

        assert_eq!(manager.cancel_owner(TaskId(1)), 2);
        let fired = manager.tick(start);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].1, TaskId(2));
    }

    #[test]
    fn test_next_deadline() {
        let start = Instant::now();
        let mut manager = TimerManager::new();
        assert_eq!(manager.next_deadline(), None);
        manager.schedule_at(start + Duration::from_millis(300), TaskId(1));
        manager.schedule_at(start + Duration::from_millis(100), TaskId(2));
        assert_eq!(manager.next_deadline(), Some(start + Duration::from_millis(100)));
    }
}
