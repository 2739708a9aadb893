//! Slide Animations
//!
//! A slide spans several callback turns: the start (synchronous class and
//! visibility changes), then completion on transition-end or the fallback
//! timer, whichever comes first. Starting a slide on an element cancels
//! the one already running there.

use std::collections::HashMap;

use serde::Serialize;
use solo_dom::{Document, NodeId};

use crate::error::log_dom_write;
use crate::scheduler::{CancellationScope, Millis, Scheduler, TimerId, TimerTask};

/// Class present while a slide is running
pub const ANIMATING_CLASS: &str = "is-animating";

/// Slide direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SlideDirection {
    /// Reveal (opening)
    Down,
    /// Hide (closing)
    Up,
}

#[derive(Debug, Clone, Copy)]
struct RunningSlide {
    direction: SlideDirection,
    timer: TimerId,
}

/// Running slide animations, one per element at most
#[derive(Debug, Default)]
pub struct Animations {
    scope: CancellationScope,
    running: HashMap<NodeId, RunningSlide>,
    completed: u64,
}

impl Animations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a slide, cancelling any slide already running on the element
    pub fn start(
        &mut self,
        doc: &mut Document,
        scheduler: &mut Scheduler,
        element: NodeId,
        direction: SlideDirection,
        duration: Millis,
    ) {
        if let Some(previous) = self.running.remove(&element) {
            scheduler.cancel(previous.timer);
            tracing::trace!("Cancelled {:?} slide on {}", previous.direction, element);
        }
        let token = self.scope.renew(element);

        log_dom_write(doc.tree.toggle_class(element, ANIMATING_CLASS, Some(true)), "mark the slide");
        if direction == SlideDirection::Down {
            log_dom_write(doc.tree.remove_attribute(element, "hidden"), "unhide the slide target");
        }

        let timer = scheduler.schedule(
            duration,
            TimerTask::AnimationComplete { element, direction },
            Some(token),
        );
        self.running.insert(element, RunningSlide { direction, timer });
    }

    /// Complete a slide: timer fired or transition ended.
    /// Returns false when nothing was running for the element.
    pub fn complete(&mut self, doc: &mut Document, scheduler: &mut Scheduler, element: NodeId) -> bool {
        let Some(slide) = self.running.remove(&element) else {
            return false;
        };
        scheduler.cancel(slide.timer);
        self.scope.finish(element);
        self.completed += 1;

        log_dom_write(doc.tree.toggle_class(element, ANIMATING_CLASS, Some(false)), "clear the slide");
        if slide.direction == SlideDirection::Up {
            log_dom_write(doc.tree.set_attribute(element, "hidden", ""), "hide the slide target");
        }
        true
    }

    /// Abort a slide without applying its end state
    pub fn cancel(&mut self, doc: &mut Document, scheduler: &mut Scheduler, element: NodeId) -> bool {
        self.scope.cancel(element);
        match self.running.remove(&element) {
            Some(slide) => {
                scheduler.cancel(slide.timer);
                log_dom_write(doc.tree.toggle_class(element, ANIMATING_CLASS, Some(false)), "clear the slide");
                true
            }
            None => false,
        }
    }

    /// Direction of the running slide
    pub fn running(&self, element: NodeId) -> Option<SlideDirection> {
        self.running.get(&element).map(|s| s.direction)
    }

    /// Elements with a running slide
    pub fn elements(&self) -> Vec<NodeId> {
        self.running.keys().copied().collect()
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Slides that reached their end state
    pub fn completed(&self) -> u64 {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Document, Scheduler, Animations, NodeId) {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let ul = doc.tree.create_element("ul");
        doc.tree.append_child(body, ul).unwrap();
        doc.tree.set_attribute(ul, "hidden", "").unwrap();
        (doc, Scheduler::new(), Animations::new(), ul)
    }

    #[test]
    fn test_slide_down_then_timer() {
        let (mut doc, mut scheduler, mut animations, ul) = setup();
        animations.start(&mut doc, &mut scheduler, ul, SlideDirection::Down, 300);

        assert!(!doc.tree.element(ul).unwrap().has_attr("hidden"));
        assert!(doc.tree.has_class(ul, ANIMATING_CLASS));

        let task = scheduler.pop_due(300).unwrap();
        assert_eq!(task, TimerTask::AnimationComplete { element: ul, direction: SlideDirection::Down });
        assert!(animations.complete(&mut doc, &mut scheduler, ul));
        assert!(!doc.tree.has_class(ul, ANIMATING_CLASS));
    }

    #[test]
    fn test_new_slide_cancels_previous() {
        let (mut doc, mut scheduler, mut animations, ul) = setup();
        animations.start(&mut doc, &mut scheduler, ul, SlideDirection::Down, 300);
        animations.start(&mut doc, &mut scheduler, ul, SlideDirection::Up, 300);

        assert_eq!(scheduler.pending(), 1);
        assert_eq!(animations.running(ul), Some(SlideDirection::Up));

        scheduler.pop_due(1_000);
        animations.complete(&mut doc, &mut scheduler, ul);
        assert!(doc.tree.element(ul).unwrap().has_attr("hidden"));
    }

    #[test]
    fn test_transition_end_beats_timer() {
        let (mut doc, mut scheduler, mut animations, ul) = setup();
        animations.start(&mut doc, &mut scheduler, ul, SlideDirection::Up, 300);
        assert!(animations.complete(&mut doc, &mut scheduler, ul));
        assert_eq!(scheduler.pending(), 0);
        assert!(!animations.complete(&mut doc, &mut scheduler, ul));
    }
}
