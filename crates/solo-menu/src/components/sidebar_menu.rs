//! Sidebar menu
//!
//! Collapsible submenus inside `nav.sidebar-menu`, revealed with a slide.

use solo_dom::NodeId;

use crate::animation::SlideDirection;
use crate::component::{ComponentId, ComponentMetadata};
use crate::context::MenuContext;
use crate::coordinator::{OperationKind, OperationOutcome};
use crate::error::log_dom_write;
use crate::lifecycle::{EventResponse, Lifecycle, UiEvent};
use crate::topology;

#[derive(Debug, Default)]
pub struct SidebarMenu {
    navs: Vec<NodeId>,
}

impl SidebarMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navs(&self) -> &[NodeId] {
        &self.navs
    }

    /// Toggle a sidebar submenu and slide it
    pub fn toggle(&self, ctx: &mut MenuContext, submenu: NodeId) -> OperationOutcome {
        let outcome = ctx.coordinate_menu_operation(OperationKind::Toggle, submenu, &self.id());
        match outcome {
            OperationOutcome::Opened => ctx.start_slide(submenu, SlideDirection::Down),
            OperationOutcome::Closed => ctx.start_slide(submenu, SlideDirection::Up),
            _ => {}
        }
        outcome
    }
}

impl Lifecycle for SidebarMenu {
    fn id(&self) -> ComponentId {
        ComponentId::Sidebar
    }

    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata::new("Sidebar menu").with_root(topology::SIDEBAR_NAV)
    }

    fn init(&mut self, ctx: &mut MenuContext) {
        let tree = ctx.doc.tree();
        self.navs = tree.query_selector_all(tree.root(), topology::SIDEBAR_NAV);
        let id = self.id();
        for (index, nav) in self.navs.clone().into_iter().enumerate() {
            super::link_submenus(ctx, nav, &format!("sidebar-{}", index + 1), &id);

            let closed: Vec<NodeId> = ctx
                .doc
                .tree()
                .query_selector_all(nav, topology::SUBMENU)
                .into_iter()
                .filter(|&s| !ctx.is_open(s))
                .collect();
            for submenu in closed {
                log_dom_write(ctx.doc.tree.set_attribute(submenu, "hidden", ""), "hide a closed submenu");
            }
        }
    }

    fn destroy(&mut self, _ctx: &mut MenuContext) {
        self.navs.clear();
    }

    fn handle_event(&mut self, ctx: &mut MenuContext, event: &UiEvent) -> EventResponse {
        let UiEvent::Click { target } = event else {
            return EventResponse::Ignored;
        };
        let tree = ctx.doc.tree();
        if !self.navs.iter().any(|&nav| tree.contains(nav, *target)) {
            return EventResponse::Ignored;
        }
        let Some(toggle) = tree.closest(*target, topology::DROPDOWN_TOGGLE) else {
            return EventResponse::Ignored;
        };
        let submenu = topology::controlled_element(tree, toggle)
            .or_else(|| topology::item_of(tree, toggle).and_then(|item| topology::submenu_of(tree, item)));
        let Some(submenu) = submenu else {
            return EventResponse::Ignored;
        };

        self.toggle(ctx, submenu);
        EventResponse::Handled { prevent_default: true }
    }
}
