//! Main menubar
//!
//! Dropdown toggles open their submenu and close sibling submenus. In
//! hover mode on large screens, pointer enter/leave drives the submenus
//! instead. Clicks outside the menu close everything in click mode, and
//! shrinking to a small screen closes everything.

use std::rc::Rc;

use solo_dom::NodeId;

use crate::component::{ComponentId, ComponentMetadata};
use crate::config::InteractionMode;
use crate::context::MenuContext;
use crate::lifecycle::{EventResponse, Lifecycle, UiEvent};
use crate::topology;
use crate::viewport::{Breakpoint, ScreenSizeSnapshot};

#[derive(Debug, Default)]
pub struct MainMenu {
    navs: Vec<NodeId>,
    was_small: Option<bool>,
}

impl MainMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigation containers this component manages
    pub fn navs(&self) -> &[NodeId] {
        &self.navs
    }

    fn nav_of(&self, ctx: &MenuContext, node: NodeId) -> Option<NodeId> {
        let tree = ctx.doc.tree();
        self.navs.iter().copied().find(|&nav| tree.contains(nav, node))
    }

    fn hover_active(ctx: &MenuContext, nav: NodeId) -> bool {
        let snapshot = ctx.snapshot();
        ctx.interaction_mode(nav) == InteractionMode::Hover && snapshot.breakpoint == Breakpoint::Large
    }

    fn toggle(&self, ctx: &mut MenuContext, toggle: NodeId) -> EventResponse {
        let tree = ctx.doc.tree();
        let submenu = topology::controlled_element(tree, toggle)
            .or_else(|| topology::item_of(tree, toggle).and_then(|item| topology::submenu_of(tree, item)));
        let Some(submenu) = submenu else {
            return EventResponse::Ignored;
        };

        let id = self.id();
        if ctx.is_open(submenu) {
            ctx.close_sub_menu(submenu, &id);
        } else {
            close_siblings(ctx, submenu, &id);
            ctx.open_sub_menu(submenu, &id);
        }
        EventResponse::Handled { prevent_default: true }
    }
}

/// Close open submenus of the other items in the same list
fn close_siblings(ctx: &mut MenuContext, submenu: NodeId, component: &ComponentId) {
    let tree = ctx.doc.tree();
    let Some(item) = tree.parent(submenu) else {
        return;
    };
    let Some(list) = tree.parent(item) else {
        return;
    };
    let siblings: Vec<NodeId> = topology::items_of_list(tree, list)
        .into_iter()
        .filter(|&i| i != item)
        .filter_map(|i| topology::submenu_of(tree, i))
        .filter(|&s| ctx.is_open(s))
        .collect();
    for sibling in siblings {
        ctx.close_sub_menu(sibling, component);
    }
}

impl Lifecycle for MainMenu {
    fn id(&self) -> ComponentId {
        ComponentId::Main
    }

    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata::new("Main menubar").with_root(topology::MAIN_NAV)
    }

    fn init(&mut self, ctx: &mut MenuContext) {
        let tree = ctx.doc.tree();
        self.navs = tree.query_selector_all(tree.root(), topology::MAIN_NAV);
        let id = self.id();
        for (index, nav) in self.navs.clone().into_iter().enumerate() {
            let prefix = format!("main-{}", index + 1);
            let linked = super::link_submenus(ctx, nav, &prefix, &id);
            tracing::debug!("Main menu {} linked {} submenu(s)", nav, linked);
        }
        self.was_small = Some(ctx.is_small_screen());
    }

    fn destroy(&mut self, _ctx: &mut MenuContext) {
        self.navs.clear();
        self.was_small = None;
    }

    fn resize_debounce_ms(&self) -> Option<u64> {
        Some(100)
    }

    fn on_resize(&mut self, ctx: &mut MenuContext, snapshot: &Rc<ScreenSizeSnapshot>) {
        let became_small = snapshot.is_small_screen && self.was_small == Some(false);
        self.was_small = Some(snapshot.is_small_screen);
        if became_small {
            let id = self.id();
            for nav in self.navs.clone() {
                ctx.close_all_sub_menus(nav, &id);
            }
        }
    }

    fn handle_event(&mut self, ctx: &mut MenuContext, event: &UiEvent) -> EventResponse {
        let target = event.target();
        let Some(nav) = self.nav_of(ctx, target) else {
            if let UiEvent::Click { .. } = event {
                let id = self.id();
                for nav in self.navs.clone() {
                    if ctx.interaction_mode(nav) == InteractionMode::Click {
                        ctx.close_all_sub_menus(nav, &id);
                    }
                }
            }
            return EventResponse::Ignored;
        };

        match event {
            UiEvent::Click { .. } => match ctx.doc.tree().closest(target, topology::DROPDOWN_TOGGLE) {
                Some(toggle) => self.toggle(ctx, toggle),
                None => EventResponse::Ignored,
            },
            UiEvent::PointerEnter { .. } if Self::hover_active(ctx, nav) => {
                let tree = ctx.doc.tree();
                let Some(submenu) = topology::item_of(tree, target).and_then(|i| topology::submenu_of(tree, i)) else {
                    return EventResponse::Ignored;
                };
                if !ctx.is_open(submenu) {
                    ctx.open_sub_menu(submenu, &self.id());
                }
                EventResponse::Handled { prevent_default: false }
            }
            UiEvent::PointerLeave { .. } if Self::hover_active(ctx, nav) => {
                let tree = ctx.doc.tree();
                let Some(submenu) = topology::item_of(tree, target).and_then(|i| topology::submenu_of(tree, i)) else {
                    return EventResponse::Ignored;
                };
                if ctx.is_open(submenu) {
                    ctx.close_sub_menu(submenu, &self.id());
                }
                EventResponse::Handled { prevent_default: false }
            }
            _ => EventResponse::Ignored,
        }
    }
}
