//! Menu Context
//!
//! Everything the components share, passed explicitly: the document, the
//! ownership ledger, the viewport coordinator, operation slots, the
//! component registry, the scheduler and running animations.

use std::rc::Rc;

use solo_dom::{Document, NodeId};

use crate::animation::{Animations, SlideDirection};
use crate::component::{ComponentId, ComponentMetadata};
use crate::config::{InteractionMode, MenuConfig};
use crate::coordinator::{OperationCoordinator, OperationKind, OperationOutcome};
use crate::error::{check_element, log_dom_write};
use crate::keyboard;
use crate::ledger::{AttributeLedger, WriteOutcome};
use crate::registry::ComponentRegistry;
use crate::scheduler::{Millis, Scheduler, TimerTask};
use crate::topology;
use crate::validator::{self, ValidationReport};
use crate::viewport::{ResizeCallback, ResizeHandler, ScreenSizeSnapshot, ViewportCoordinator};

/// Shared state handed to every component
#[derive(Debug)]
pub struct MenuContext {
    pub doc: Document,
    pub(crate) config: MenuConfig,
    pub(crate) ledger: AttributeLedger,
    pub(crate) viewport: ViewportCoordinator,
    pub(crate) coordinator: OperationCoordinator,
    pub(crate) registry: ComponentRegistry,
    pub(crate) scheduler: Scheduler,
    pub(crate) animations: Animations,
    pub(crate) last_validation: Option<ValidationReport>,
}

impl MenuContext {
    pub fn new(doc: Document, config: MenuConfig) -> Self {
        let viewport = ViewportCoordinator::new(&doc, config.breakpoints, config.mobile_breakpoint);
        Self {
            ledger: AttributeLedger::new(config.debug, config.conflict_log_capacity),
            viewport,
            coordinator: OperationCoordinator::new(),
            registry: ComponentRegistry::new(),
            scheduler: Scheduler::new(),
            animations: Animations::new(),
            last_validation: None,
            config,
            doc,
        }
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn ledger(&self) -> &AttributeLedger {
        &self.ledger
    }

    pub fn viewport(&self) -> &ViewportCoordinator {
        &self.viewport
    }

    pub fn coordinator(&self) -> &OperationCoordinator {
        &self.coordinator
    }

    /// Mutable slot access, for hosts that manage operations by hand
    pub fn coordinator_mut(&mut self) -> &mut OperationCoordinator {
        &mut self.coordinator
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn animations(&self) -> &Animations {
        &self.animations
    }

    pub fn last_validation(&self) -> Option<&ValidationReport> {
        self.last_validation.as_ref()
    }

    /// Current page clock
    pub fn now(&self) -> Millis {
        self.scheduler.now()
    }

    pub fn is_verbose(&self) -> bool {
        self.config.debug
    }

    // Ledger

    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str, component: &ComponentId) -> WriteOutcome {
        let now = self.now();
        self.ledger.set_attribute(&mut self.doc, element, name, value, component, now)
    }

    pub fn remove_attribute(&mut self, element: NodeId, name: &str, component: &ComponentId) -> WriteOutcome {
        let now = self.now();
        self.ledger.remove_attribute(&mut self.doc, element, name, component, now)
    }

    pub fn set_tab_index(&mut self, element: NodeId, value: i32, component: &ComponentId) -> WriteOutcome {
        let now = self.now();
        self.ledger.set_tab_index(&mut self.doc, element, value, component, now)
    }

    // Operations

    /// Derived open state: `toggled` class or `aria-expanded="true"`
    pub fn is_open(&self, element: NodeId) -> bool {
        let tree = self.doc.tree();
        tree.has_class(element, topology::OPEN_CLASS) || tree.get_attribute(element, "aria-expanded") == Some("true")
    }

    /// Run an open/close/toggle through the element's operation slot
    pub fn coordinate_menu_operation(
        &mut self,
        kind: OperationKind,
        menu: NodeId,
        component: &ComponentId,
    ) -> OperationOutcome {
        if let Err(err) = check_element(&self.doc, menu) {
            tracing::warn!("Ignoring {} from {}: {}", kind, component, err);
            return OperationOutcome::Invalid;
        }
        if let Err(holder) = self.coordinator.should_proceed(menu, component) {
            let verbose = self.is_verbose();
            self.coordinator.record_drop(menu, component, &holder, verbose);
            return OperationOutcome::Blocked { holder };
        }

        let now = self.now();
        let op_id = self.coordinator.begin(menu, component, kind, now);
        let open = kind.resolve(self.is_open(menu)) == OperationKind::Open;
        self.apply_transition(menu, open, component);

        let grace = self.config.operation_grace_ms;
        self.scheduler.schedule(grace, TimerTask::ReleaseOperation { key: menu, op_id }, None);

        if open {
            OperationOutcome::Opened
        } else {
            OperationOutcome::Closed
        }
    }

    fn apply_transition(&mut self, menu: NodeId, open: bool, component: &ComponentId) {
        let (expanded, hidden) = if open { ("true", "false") } else { ("false", "true") };
        self.set_attribute(menu, "aria-expanded", expanded, component);
        self.set_attribute(menu, "aria-hidden", hidden, component);
        log_dom_write(self.doc.tree.toggle_class(menu, topology::OPEN_CLASS, Some(open)), "toggle the open class");

        for trigger in topology::controllers_of(self.doc.tree(), menu) {
            self.set_attribute(trigger, "aria-expanded", expanded, component);
        }

        if !open && self.is_registered(&ComponentId::Keyboard) && self.doc.tree().matches(menu, topology::SUBMENU) {
            keyboard::collapse_tab_stops(self, menu);
        }
    }

    pub fn open_sub_menu(&mut self, submenu: NodeId, component: &ComponentId) -> OperationOutcome {
        self.coordinate_menu_operation(OperationKind::Open, submenu, component)
    }

    /// Close a submenu and any open submenus nested in it
    pub fn close_sub_menu(&mut self, submenu: NodeId, component: &ComponentId) -> OperationOutcome {
        let nested: Vec<NodeId> = self
            .doc
            .tree()
            .query_selector_all(submenu, topology::SUBMENU)
            .into_iter()
            .rev()
            .filter(|&n| self.is_open(n))
            .collect();
        for inner in nested {
            self.coordinate_menu_operation(OperationKind::Close, inner, component);
        }
        self.coordinate_menu_operation(OperationKind::Close, submenu, component)
    }

    /// Close every open submenu under `root`, returns how many closed
    pub fn close_all_sub_menus(&mut self, root: NodeId, component: &ComponentId) -> usize {
        let open: Vec<NodeId> = self
            .doc
            .tree()
            .query_selector_all(root, topology::SUBMENU)
            .into_iter()
            .rev()
            .filter(|&n| self.is_open(n))
            .collect();
        open.into_iter()
            .filter(|&n| self.coordinate_menu_operation(OperationKind::Close, n, component) == OperationOutcome::Closed)
            .count()
    }

    /// Open a navigation container (mobile/sidebar) with a slide
    pub fn open_menubar(&mut self, nav: NodeId, component: &ComponentId) -> OperationOutcome {
        let outcome = self.coordinate_menu_operation(OperationKind::Open, nav, component);
        if outcome == OperationOutcome::Opened {
            self.start_slide(nav, SlideDirection::Down);
        }
        outcome
    }

    /// Close a navigation container with a slide, closing its submenus first
    pub fn close_menubar(&mut self, nav: NodeId, component: &ComponentId) -> OperationOutcome {
        if self.coordinator.should_proceed(nav, component).is_ok() {
            self.close_all_sub_menus(nav, component);
        }
        let outcome = self.coordinate_menu_operation(OperationKind::Close, nav, component);
        if outcome == OperationOutcome::Closed {
            self.start_slide(nav, SlideDirection::Up);
        }
        outcome
    }

    // Registry

    pub fn register_component(&mut self, id: ComponentId, metadata: ComponentMetadata) -> bool {
        self.registry.register(id, metadata)
    }

    /// Remove a component and its resize handler
    pub fn unregister_component(&mut self, id: &ComponentId) -> bool {
        self.viewport.remove_resize_handler(id);
        self.registry.unregister(id)
    }

    pub fn is_registered(&self, id: &ComponentId) -> bool {
        self.registry.is_registered(id)
    }

    /// Drop every ledger record and operation slot held by a component
    pub fn release_component(&mut self, id: &ComponentId) -> usize {
        self.ledger.release_component(id) + self.coordinator.release_component(id)
    }

    // Viewport

    pub fn add_resize_handler(&mut self, component: ComponentId, callback: ResizeCallback, debounce_ms: u64) {
        self.viewport
            .add_resize_handler(&self.doc, component, ResizeHandler::Callback(callback), debounce_ms);
    }

    pub(crate) fn add_lifecycle_resize_handler(&mut self, component: ComponentId, debounce_ms: u64) {
        self.viewport
            .add_resize_handler(&self.doc, component, ResizeHandler::Lifecycle, debounce_ms);
    }

    pub fn remove_resize_handler(&mut self, component: &ComponentId) -> bool {
        self.viewport.remove_resize_handler(component)
    }

    /// Raw size-change signal from the host
    pub fn notify_resize(&mut self) {
        self.viewport.on_raw_resize(&self.doc, &mut self.scheduler);
    }

    pub fn current_width(&self) -> u32 {
        ViewportCoordinator::current_width(&self.doc)
    }

    pub fn snapshot(&self) -> Rc<ScreenSizeSnapshot> {
        self.viewport.snapshot()
    }

    pub fn is_small_screen(&self) -> bool {
        self.viewport.snapshot().is_small_screen
    }

    /// Interaction mode for the menu containing `node`
    pub fn interaction_mode(&self, node: NodeId) -> InteractionMode {
        topology::interaction_mode(self.doc.tree(), node, self.config.interaction_mode)
    }

    // Focus and animation

    pub fn focus(&mut self, element: NodeId) -> bool {
        self.doc.focus(element)
    }

    pub fn start_slide(&mut self, element: NodeId, direction: SlideDirection) {
        let duration = self.config.slide_duration_ms;
        self.animations
            .start(&mut self.doc, &mut self.scheduler, element, direction, duration);
    }

    /// Host transition-end for an element
    pub fn transition_end(&mut self, element: NodeId) -> bool {
        self.animations.complete(&mut self.doc, &mut self.scheduler, element)
    }

    /// Abort a running slide without applying its end state
    pub fn cancel_slide(&mut self, element: NodeId) -> bool {
        self.animations.cancel(&mut self.doc, &mut self.scheduler, element)
    }

    // Validation

    pub fn validate_state(&mut self) -> ValidationReport {
        let report = validator::validate(self);
        self.last_validation = Some(report.clone());
        report
    }
}
