//! Menu System
//!
//! Owns the [`MenuContext`] and the typed list of components, routes host
//! events to them and fires scheduled work as the clock advances.

use solo_dom::{Document, NodeId};

use crate::component::{ComponentId, ComponentMetadata};
use crate::components;
use crate::config::MenuConfig;
use crate::context::MenuContext;
use crate::diagnostics::Diagnostics;
use crate::keyboard::Key;
use crate::lifecycle::{EventResponse, Lifecycle, UiEvent};
use crate::scheduler::{Millis, TimerId, TimerTask};
use crate::validator::ValidationReport;

/// Driver for a page's menu components
pub struct MenuSystem {
    ctx: MenuContext,
    components: Vec<Box<dyn Lifecycle>>,
    attached: bool,
    validation_timer: Option<TimerId>,
}

impl MenuSystem {
    /// System with no components
    pub fn new(doc: Document, config: MenuConfig) -> Self {
        Self {
            ctx: MenuContext::new(doc, config),
            components: Vec::new(),
            attached: false,
            validation_timer: None,
        }
    }

    /// System with the five standard components
    pub fn with_default_components(doc: Document, config: MenuConfig) -> Self {
        let mut system = Self::new(doc, config);
        for component in components::default_components() {
            system.add_component(component);
        }
        system
    }

    /// Add a component; it is initialized on the next attach (or now, if
    /// already attached)
    pub fn add_component(&mut self, mut component: Box<dyn Lifecycle>) {
        if self.attached {
            Self::start_component(&mut self.ctx, component.as_mut());
        }
        self.components.push(component);
    }

    fn start_component(ctx: &mut MenuContext, component: &mut dyn Lifecycle) {
        let id = component.id();
        ctx.register_component(id.clone(), component.metadata());
        component.init(ctx);
        if let Some(debounce) = component.resize_debounce_ms() {
            ctx.add_lifecycle_resize_handler(id, debounce);
        }
    }

    /// Register and initialize every component, then validate once
    pub fn attach(&mut self) {
        if self.attached {
            return;
        }
        self.attached = true;
        self.ctx
            .register_component(ComponentId::Scripts, ComponentMetadata::new("Menu state manager"));
        for component in self.components.iter_mut() {
            Self::start_component(&mut self.ctx, component.as_mut());
        }
        tracing::info!("Attached {} menu component(s)", self.components.len());

        self.ctx.validate_state();
        if self.ctx.config.diagnostics {
            self.schedule_validation();
        }
    }

    fn schedule_validation(&mut self) {
        let interval = self.ctx.config.validation_interval_ms;
        self.validation_timer = Some(self.ctx.scheduler.schedule(interval, TimerTask::ValidateState, None));
    }

    /// Destroy and unregister every component
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        if let Some(timer) = self.validation_timer.take() {
            self.ctx.scheduler.cancel(timer);
        }
        for component in self.components.iter_mut().rev() {
            component.destroy(&mut self.ctx);
            self.ctx.unregister_component(&component.id());
        }
        self.ctx.unregister_component(&ComponentId::Scripts);
        tracing::info!("Detached menu components");
    }

    /// Page unload: detach, then one last validation sweep
    pub fn teardown(&mut self) -> ValidationReport {
        self.detach();
        self.ctx.validate_state()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Route an event to every component; the first non-ignored response wins
    pub fn dispatch(&mut self, event: UiEvent) -> EventResponse {
        if !self.attached {
            return EventResponse::Ignored;
        }
        let mut response = EventResponse::Ignored;
        for component in self.components.iter_mut() {
            let r = component.handle_event(&mut self.ctx, &event);
            if response.is_ignored() {
                response = r;
            }
        }
        for component in self.components.iter_mut() {
            component.after_event(&mut self.ctx, &event);
        }
        response
    }

    pub fn click(&mut self, target: NodeId) -> EventResponse {
        self.dispatch(UiEvent::Click { target })
    }

    /// Key press on the focused element (or `target` when nothing has focus)
    pub fn key_down(&mut self, target: NodeId, key: Key) -> EventResponse {
        self.dispatch(UiEvent::KeyDown { target, key })
    }

    /// Key press on whatever currently has focus
    pub fn key_down_focused(&mut self, key: Key) -> EventResponse {
        match self.ctx.doc.active_element() {
            Some(target) => self.key_down(target, key),
            None => EventResponse::Ignored,
        }
    }

    pub fn pointer_enter(&mut self, target: NodeId) -> EventResponse {
        self.dispatch(UiEvent::PointerEnter { target })
    }

    pub fn pointer_leave(&mut self, target: NodeId) -> EventResponse {
        self.dispatch(UiEvent::PointerLeave { target })
    }

    /// Viewport changed size
    pub fn resize(&mut self, width: u32) {
        self.ctx.doc.window.inner_width = Some(width);
        self.ctx.notify_resize();
    }

    /// A CSS transition finished on an element
    pub fn transition_end(&mut self, element: NodeId) -> bool {
        self.ctx.transition_end(element)
    }

    /// Advance the clock, firing due work in deadline order
    pub fn advance(&mut self, ms: Millis) {
        let until = self.ctx.now().saturating_add(ms);
        while let Some(task) = self.ctx.scheduler.pop_due(until) {
            self.run_task(task);
        }
        self.ctx.scheduler.set_now(until);
    }

    fn run_task(&mut self, task: TimerTask) {
        match task {
            TimerTask::ReleaseOperation { key, op_id } => {
                self.ctx.coordinator.release(key, op_id);
            }
            TimerTask::ResizeFlush => {
                let flush = self.ctx.viewport.flush(&self.ctx.doc);
                for component in self.components.iter_mut() {
                    if flush.lifecycle.contains(&component.id()) {
                        component.on_resize(&mut self.ctx, &flush.snapshot);
                    }
                }
            }
            TimerTask::AnimationComplete { element, .. } => {
                self.ctx
                    .animations
                    .complete(&mut self.ctx.doc, &mut self.ctx.scheduler, element);
            }
            TimerTask::ValidateState => {
                self.validation_timer = None;
                self.ctx.validate_state();
                if self.attached && self.ctx.config.diagnostics {
                    self.schedule_validation();
                }
            }
        }
    }

    pub fn context(&self) -> &MenuContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut MenuContext {
        &mut self.ctx
    }

    pub fn document(&self) -> &Document {
        &self.ctx.doc
    }

    /// Diagnostic entry point
    pub fn diagnostics(&mut self) -> Diagnostics<'_> {
        Diagnostics::new(&mut self.ctx)
    }

    /// Ids of the components this system drives
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.components.iter().map(|c| c.id()).collect()
    }
}

impl std::fmt::Debug for MenuSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuSystem")
            .field("components", &self.component_ids())
            .field("attached", &self.attached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_registers_components() {
        let mut system = MenuSystem::with_default_components(Document::new(), MenuConfig::default());
        system.attach();
        let registry = system.context().registry();
        assert_eq!(registry.len(), 6);
        assert!(registry.is_registered(&ComponentId::Scripts));
        assert!(system.context().last_validation().is_some_and(|r| r.all_clear));
        // No recurring validation without diagnostics
        assert_eq!(system.context().scheduler().pending(), 0);
    }

    #[test]
    fn test_diagnostics_schedule_recurring_validation() {
        let mut system = MenuSystem::new(Document::new(), MenuConfig::debug());
        system.attach();
        assert_eq!(system.context().scheduler().next_deadline(), Some(10_000));
        system.advance(25_000);
        assert_eq!(system.context().last_validation().map(|r| r.checked_at), Some(20_000));
        assert_eq!(system.context().scheduler().pending(), 1);
    }

    #[test]
    fn test_teardown_unregisters_everything() {
        let mut system = MenuSystem::with_default_components(Document::new(), MenuConfig::debug());
        system.attach();
        let report = system.teardown();
        assert!(report.all_clear);
        assert!(system.context().registry().is_empty());
        assert_eq!(system.context().scheduler().pending(), 0);
    }
}
