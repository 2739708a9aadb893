//! Task Scheduler
//!
//! Virtual-time timer queue standing in for timeouts, transition-end
//! fallbacks and animation frames. Timers fire in deadline order (FIFO on
//! ties) when the host advances the clock. Each timer may carry a
//! [`CancellationToken`]; a cancelled token makes the timer a no-op.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use solo_dom::NodeId;

use crate::animation::SlideDirection;

/// Milliseconds on the page clock
pub type Millis = u64;

/// Work scheduled for later
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerTask {
    /// Free an operation slot after the grace window
    ReleaseOperation { key: NodeId, op_id: u64 },
    /// Coalesced resize notification
    ResizeFlush,
    /// Slide animation fallback timer
    AnimationComplete { element: NodeId, direction: SlideDirection },
    /// Recurring validation sweep
    ValidateState,
}

/// Scheduled timer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every timer holding a clone of this token
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug)]
struct Timer {
    task: TimerTask,
    token: Option<CancellationToken>,
}

/// Timer queue with a manually advanced clock
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Millis,
    queue: BTreeMap<(Millis, TimerId), Timer>,
    deadlines: HashMap<TimerId, Millis>,
    next_id: u64,
    fired: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Schedule a task `delay` ms from now
    pub fn schedule(&mut self, delay: Millis, task: TimerTask, token: Option<CancellationToken>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let deadline = self.now.saturating_add(delay);
        tracing::trace!("Scheduling {:?} at {}ms", task, deadline);
        self.queue.insert((deadline, id), Timer { task, token });
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a pending timer
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    /// Whether a timer is still pending
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Pop the next task due at or before `until`, moving the clock to its
    /// deadline. Cancelled timers are discarded silently.
    pub fn pop_due(&mut self, until: Millis) -> Option<TimerTask> {
        loop {
            let (&(deadline, id), _) = self.queue.first_key_value()?;
            if deadline > until {
                return None;
            }
            let timer = self.queue.remove(&(deadline, id))?;
            self.deadlines.remove(&id);
            self.now = self.now.max(deadline);

            if timer.token.as_ref().is_some_and(CancellationToken::is_cancelled) {
                tracing::trace!("Dropping cancelled {:?}", timer.task);
                continue;
            }
            self.fired += 1;
            return Some(timer.task);
        }
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }

    /// Pending timer count
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deadline of the earliest pending timer
    pub fn next_deadline(&self) -> Option<Millis> {
        self.queue.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Timers fired so far
    pub fn fired(&self) -> u64 {
        self.fired
    }
}

/// Per-element cancellation scopes.
///
/// Renewing an element's scope cancels whatever was running under the
/// previous token, so at most one chain of timers is live per element.
#[derive(Debug, Default)]
pub struct CancellationScope {
    tokens: HashMap<NodeId, CancellationToken>,
}

impl CancellationScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the element's current token and hand out a fresh one
    pub fn renew(&mut self, element: NodeId) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(old) = self.tokens.insert(element, token.clone()) {
            old.cancel();
        }
        token
    }

    /// Cancel and forget the element's token
    pub fn cancel(&mut self, element: NodeId) -> bool {
        match self.tokens.remove(&element) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Forget the element's token without cancelling it (work finished)
    pub fn finish(&mut self, element: NodeId) {
        self.tokens.remove(&element);
    }

    pub fn is_active(&self, element: NodeId) -> bool {
        self.tokens.get(&element).is_some_and(|t| !t.is_cancelled())
    }

    /// Elements with a live scope
    pub fn elements(&self) -> Vec<NodeId> {
        self.tokens.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(100, TimerTask::ResizeFlush, None);
        scheduler.schedule(50, TimerTask::ValidateState, None);

        assert_eq!(scheduler.pop_due(40), None);
        assert_eq!(scheduler.pop_due(200), Some(TimerTask::ValidateState));
        assert_eq!(scheduler.now(), 50);
        assert_eq!(scheduler.pop_due(200), Some(TimerTask::ResizeFlush));
        assert_eq!(scheduler.now(), 100);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancel_timer() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(10, TimerTask::ResizeFlush, None);
        assert!(scheduler.is_pending(id));
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert_eq!(scheduler.pop_due(100), None);
    }

    #[test]
    fn test_cancelled_token_skips_timer() {
        let mut scheduler = Scheduler::new();
        let mut scope = CancellationScope::new();
        let element = NodeId::from_raw_parts(4, 0);

        let first = scope.renew(element);
        scheduler.schedule(
            10,
            TimerTask::AnimationComplete { element, direction: SlideDirection::Down },
            Some(first.clone()),
        );
        let second = scope.renew(element);
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        assert_eq!(scheduler.pop_due(100), None);
        assert_eq!(scheduler.fired(), 0);
    }
}
