//! Viewport/Resize Coordinator
//!
//! Single writer of the [`ScreenSizeSnapshot`]. Any number of components
//! share one underlying size subscription; a burst of raw resize signals
//! turns into one flush after the longest requested debounce, and every
//! handler receives the same snapshot.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use solo_dom::Document;

use crate::component::ComponentId;
use crate::config::Breakpoints;
use crate::scheduler::{Scheduler, TimerId, TimerTask};

/// Coarse viewport class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Small,
    Medium,
    Large,
}

impl Breakpoint {
    pub fn for_width(width: u32, breakpoints: &Breakpoints) -> Self {
        if width >= breakpoints.large {
            Self::Large
        } else if width >= breakpoints.medium {
            Self::Medium
        } else {
            Self::Small
        }
    }
}

/// Cached viewport measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenSizeSnapshot {
    pub width: u32,
    pub breakpoint: Breakpoint,
    pub is_small_screen: bool,
}

/// Mechanism backing the shared subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObservationMode {
    /// Native size-change observer on the document element
    SizeObserver,
    /// Plain window resize listener with manual debouncing
    WindowListener,
}

/// Callback receiving the shared snapshot
pub type ResizeCallback = Box<dyn FnMut(&Rc<ScreenSizeSnapshot>)>;

/// What to run when a flush reaches a component
pub enum ResizeHandler {
    Callback(ResizeCallback),
    /// Dispatch to the component's `Lifecycle::on_resize`
    Lifecycle,
}

struct Registration {
    handler: ResizeHandler,
    debounce_ms: u64,
}

/// Result of a flush: the snapshot and the lifecycle components to notify
#[derive(Debug, Clone)]
pub struct ResizeFlush {
    pub snapshot: Rc<ScreenSizeSnapshot>,
    pub lifecycle: Vec<ComponentId>,
}

/// Viewport coordinator
pub struct ViewportCoordinator {
    handlers: BTreeMap<ComponentId, Registration>,
    snapshot: Rc<ScreenSizeSnapshot>,
    breakpoints: Breakpoints,
    mobile_breakpoint: u32,
    observation: Option<ObservationMode>,
    subscriptions: usize,
    pending_flush: Option<TimerId>,
    raw_signals: u64,
    flushes: u64,
}

impl ViewportCoordinator {
    pub fn new(doc: &Document, breakpoints: Breakpoints, mobile_breakpoint: u32) -> Self {
        let snapshot = compute_snapshot(doc, &breakpoints, mobile_breakpoint);
        Self {
            handlers: BTreeMap::new(),
            snapshot: Rc::new(snapshot),
            breakpoints,
            mobile_breakpoint,
            observation: None,
            subscriptions: 0,
            pending_flush: None,
            raw_signals: 0,
            flushes: 0,
        }
    }

    /// Live viewport width: window inner width, then document element
    /// client width, then body client width, then 0
    pub fn current_width(doc: &Document) -> u32 {
        let client_width = |id| doc.tree().element(id).and_then(|e| e.client_width);
        doc.window
            .inner_width
            .filter(|&w| w > 0)
            .or_else(|| doc.document_element().and_then(client_width))
            .or_else(|| doc.body().and_then(client_width))
            .unwrap_or(0)
    }

    /// Register (or replace) the component's handler
    pub fn add_resize_handler(&mut self, doc: &Document, component: ComponentId, handler: ResizeHandler, debounce_ms: u64) {
        self.ensure_subscription(doc);
        if self.handlers.insert(component.clone(), Registration { handler, debounce_ms }).is_some() {
            tracing::debug!("Replaced resize handler for {}", component);
        }
    }

    /// Drop the component's handler
    pub fn remove_resize_handler(&mut self, component: &ComponentId) -> bool {
        self.handlers.remove(component).is_some()
    }

    pub fn has_handler(&self, component: &ComponentId) -> bool {
        self.handlers.contains_key(component)
    }

    /// Components with a handler, in stable order
    pub fn handler_ids(&self) -> Vec<ComponentId> {
        self.handlers.keys().cloned().collect()
    }

    fn ensure_subscription(&mut self, doc: &Document) {
        if self.observation.is_some() {
            return;
        }
        let mode = if doc.window.supports_resize_observer {
            ObservationMode::SizeObserver
        } else {
            ObservationMode::WindowListener
        };
        tracing::debug!("Subscribing to viewport changes via {:?}", mode);
        self.observation = Some(mode);
        self.subscriptions += 1;
    }

    /// Longest debounce among current handlers
    pub fn coalesced_delay(&self) -> u64 {
        self.handlers.values().map(|r| r.debounce_ms).max().unwrap_or(0)
    }

    /// A raw size-change signal arrived: restart the coalescing window
    pub fn on_raw_resize(&mut self, doc: &Document, scheduler: &mut Scheduler) {
        self.raw_signals += 1;
        if let Some(pending) = self.pending_flush.take() {
            scheduler.cancel(pending);
        }
        if self.handlers.is_empty() {
            self.refresh(doc);
            return;
        }
        let delay = self.coalesced_delay();
        self.pending_flush = Some(scheduler.schedule(delay, TimerTask::ResizeFlush, None));
    }

    /// Recompute the snapshot and run every handler with it
    pub fn flush(&mut self, doc: &Document) -> ResizeFlush {
        self.pending_flush = None;
        self.flushes += 1;
        let snapshot = self.refresh(doc);

        let mut lifecycle = Vec::new();
        for (component, registration) in self.handlers.iter_mut() {
            match &mut registration.handler {
                ResizeHandler::Callback(callback) => callback(&snapshot),
                ResizeHandler::Lifecycle => lifecycle.push(component.clone()),
            }
        }
        ResizeFlush { snapshot, lifecycle }
    }

    /// Recompute the snapshot without notifying anyone
    pub fn refresh(&mut self, doc: &Document) -> Rc<ScreenSizeSnapshot> {
        let next = compute_snapshot(doc, &self.breakpoints, self.mobile_breakpoint);
        if *self.snapshot != next {
            self.snapshot = Rc::new(next);
        }
        Rc::clone(&self.snapshot)
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Rc<ScreenSizeSnapshot> {
        Rc::clone(&self.snapshot)
    }

    pub fn observation_mode(&self) -> Option<ObservationMode> {
        self.observation
    }

    /// Underlying subscriptions made (never more than one)
    pub fn subscription_count(&self) -> usize {
        self.subscriptions
    }

    pub fn has_pending_flush(&self) -> bool {
        self.pending_flush.is_some()
    }

    pub fn raw_signal_count(&self) -> u64 {
        self.raw_signals
    }

    pub fn flush_count(&self) -> u64 {
        self.flushes
    }
}

impl std::fmt::Debug for ViewportCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportCoordinator")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("snapshot", &self.snapshot)
            .field("observation", &self.observation)
            .field("pending_flush", &self.pending_flush)
            .finish()
    }
}

fn compute_snapshot(doc: &Document, breakpoints: &Breakpoints, mobile_breakpoint: u32) -> ScreenSizeSnapshot {
    let width = ViewportCoordinator::current_width(doc);
    ScreenSizeSnapshot {
        width,
        breakpoint: Breakpoint::for_width(width, breakpoints),
        is_small_screen: width < mobile_breakpoint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn coordinator(doc: &Document) -> ViewportCoordinator {
        ViewportCoordinator::new(doc, Breakpoints::default(), 1200)
    }

    #[test]
    fn test_width_fallback_chain() {
        let mut doc = Document::new();
        doc.window.inner_width = None;
        assert_eq!(ViewportCoordinator::current_width(&doc), 0);

        let body = doc.body().unwrap();
        doc.tree.element_mut(body).unwrap().client_width = Some(640);
        assert_eq!(ViewportCoordinator::current_width(&doc), 640);

        let html = doc.document_element().unwrap();
        doc.tree.element_mut(html).unwrap().client_width = Some(800);
        assert_eq!(ViewportCoordinator::current_width(&doc), 800);

        doc.window.inner_width = Some(1024);
        assert_eq!(ViewportCoordinator::current_width(&doc), 1024);
    }

    #[test]
    fn test_breakpoints() {
        let bp = Breakpoints::default();
        assert_eq!(Breakpoint::for_width(320, &bp), Breakpoint::Small);
        assert_eq!(Breakpoint::for_width(768, &bp), Breakpoint::Medium);
        assert_eq!(Breakpoint::for_width(1200, &bp), Breakpoint::Large);
    }

    #[test]
    fn test_single_subscription_and_fallback() {
        let mut doc = Document::new();
        doc.window.supports_resize_observer = false;
        let mut viewport = coordinator(&doc);

        for name in ["a", "b", "c"] {
            viewport.add_resize_handler(&doc, ComponentId::from_name(name), ResizeHandler::Lifecycle, 100);
        }
        assert_eq!(viewport.subscription_count(), 1);
        assert_eq!(viewport.observation_mode(), Some(ObservationMode::WindowListener));
    }

    #[test]
    fn test_reregistering_replaces() {
        let doc = Document::new();
        let mut viewport = coordinator(&doc);
        let calls = Rc::new(RefCell::new(Vec::new()));

        let c = Rc::clone(&calls);
        viewport.add_resize_handler(&doc, ComponentId::Main, ResizeHandler::Callback(Box::new(move |_: &Rc<ScreenSizeSnapshot>| c.borrow_mut().push("old"))), 100);
        let c = Rc::clone(&calls);
        viewport.add_resize_handler(&doc, ComponentId::Main, ResizeHandler::Callback(Box::new(move |_: &Rc<ScreenSizeSnapshot>| c.borrow_mut().push("new"))), 200);

        assert_eq!(viewport.coalesced_delay(), 200);
        viewport.flush(&doc);
        assert_eq!(*calls.borrow(), vec!["new"]);
    }

    #[test]
    fn test_burst_reschedules_flush() {
        let mut doc = Document::new();
        let mut scheduler = Scheduler::new();
        let mut viewport = coordinator(&doc);
        viewport.add_resize_handler(&doc, ComponentId::Main, ResizeHandler::Lifecycle, 100);

        doc.window.inner_width = Some(900);
        viewport.on_raw_resize(&doc, &mut scheduler);
        scheduler.set_now(60);
        viewport.on_raw_resize(&doc, &mut scheduler);

        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.next_deadline(), Some(160));

        assert_eq!(scheduler.pop_due(1_000), Some(TimerTask::ResizeFlush));
        let flush = viewport.flush(&doc);
        assert_eq!(flush.snapshot.width, 900);
        assert!(flush.snapshot.is_small_screen);
        assert_eq!(flush.lifecycle, vec![ComponentId::Main]);
    }
}
