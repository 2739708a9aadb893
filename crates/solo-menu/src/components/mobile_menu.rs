//! Mobile hamburger menu
//!
//! `button.menu-toggle` opens and closes the navigation it controls. On
//! small screens a closed navigation is hidden from assistive technology;
//! on large screens the mobile state is dropped.

use std::rc::Rc;

use solo_dom::NodeId;

use crate::component::{ComponentId, ComponentMetadata};
use crate::context::MenuContext;
use crate::error::log_dom_write;
use crate::lifecycle::{EventResponse, Lifecycle, UiEvent};
use crate::topology;
use crate::viewport::ScreenSizeSnapshot;

#[derive(Debug, Default)]
pub struct MobileMenu {
    /// (toggle, navigation) pairs
    toggles: Vec<(NodeId, NodeId)>,
    debounce_ms: u64,
}

impl MobileMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggles(&self) -> &[(NodeId, NodeId)] {
        &self.toggles
    }

    fn sync_screen(&self, ctx: &mut MenuContext, small: bool) {
        let id = self.id();
        for &(_, nav) in &self.toggles {
            if small {
                if !ctx.is_open(nav) {
                    ctx.set_attribute(nav, "aria-hidden", "true", &id);
                }
            } else {
                if ctx.is_open(nav) {
                    ctx.close_menubar(nav, &id);
                }
                // The desktop menubar is always shown
                ctx.cancel_slide(nav);
                log_dom_write(ctx.doc.tree.remove_attribute(nav, "hidden"), "show the menubar");
                ctx.remove_attribute(nav, "aria-hidden", &id);
            }
        }
    }
}

impl Lifecycle for MobileMenu {
    fn id(&self) -> ComponentId {
        ComponentId::Mobile
    }

    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata::new("Mobile hamburger menu").with_root(topology::MOBILE_TOGGLE)
    }

    fn init(&mut self, ctx: &mut MenuContext) {
        let tree = ctx.doc.tree();
        self.toggles = tree
            .query_selector_all(tree.root(), topology::MOBILE_TOGGLE)
            .into_iter()
            .filter_map(|toggle| topology::controlled_element(tree, toggle).map(|nav| (toggle, nav)))
            .collect();
        self.debounce_ms = ctx.config().default_debounce_ms;

        let id = self.id();
        for &(toggle, nav) in &self.toggles {
            let expanded = if ctx.is_open(nav) { "true" } else { "false" };
            ctx.set_attribute(toggle, "aria-expanded", expanded, &id);
        }
        if ctx.is_small_screen() {
            self.sync_screen(ctx, true);
        }
    }

    fn destroy(&mut self, _ctx: &mut MenuContext) {
        self.toggles.clear();
    }

    fn resize_debounce_ms(&self) -> Option<u64> {
        Some(self.debounce_ms)
    }

    fn on_resize(&mut self, ctx: &mut MenuContext, snapshot: &Rc<ScreenSizeSnapshot>) {
        self.sync_screen(ctx, snapshot.is_small_screen);
    }

    fn handle_event(&mut self, ctx: &mut MenuContext, event: &UiEvent) -> EventResponse {
        let UiEvent::Click { target } = event else {
            return EventResponse::Ignored;
        };
        let tree = ctx.doc.tree();
        let Some(toggle) = tree.closest(*target, topology::MOBILE_TOGGLE) else {
            return EventResponse::Ignored;
        };
        let Some(&(_, nav)) = self.toggles.iter().find(|(t, _)| *t == toggle) else {
            return EventResponse::Ignored;
        };

        let id = self.id();
        if ctx.is_open(nav) {
            ctx.close_menubar(nav, &id);
        } else {
            ctx.open_menubar(nav, &id);
        }
        EventResponse::Handled { prevent_default: true }
    }
}
