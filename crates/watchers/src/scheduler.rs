use crate::page::Page;
use std::collections::VecDeque;

/// Deferred unit of work; runs on a later turn with the page borrowed
/// mutably.
pub type Task = Box<dyn FnOnce(&mut Page)>;

/// FIFO continuation queue drained a few tasks per turn, so a large dispatch
/// pass never runs in one go.
pub struct Scheduler {
    queue: VecDeque<Task>,
    per_turn: usize,
    turns: u64,
}

impl Scheduler {
    pub fn new(per_turn: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            per_turn: per_turn.max(1),
            turns: 0,
        }
    }

    pub fn push(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn per_turn(&self) -> usize {
        self.per_turn
    }

    /// Turns that ran at least one task.
    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Take the tasks for this turn. Tasks queued while they run wait for the
    /// next turn.
    pub(crate) fn take_turn(&mut self) -> Vec<Task> {
        let n = self.per_turn.min(self.queue.len());
        if n > 0 {
            self.turns += 1;
        }
        self.queue.drain(..n).collect()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_takes_at_most_per_turn_tasks_in_order() {
        let mut scheduler = Scheduler::new(2);
        for _ in 0..3 {
            scheduler.push(Box::new(|_: &mut Page| {}));
        }
        assert_eq!(scheduler.take_turn().len(), 2);
        assert_eq!(scheduler.take_turn().len(), 1);
        assert!(scheduler.take_turn().is_empty());
        assert_eq!(scheduler.turns(), 2);
    }

    #[test]
    fn zero_per_turn_still_makes_progress() {
        let scheduler = Scheduler::new(0);
        assert_eq!(scheduler.per_turn(), 1);
    }
}
