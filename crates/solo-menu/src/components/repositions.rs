//! Submenu repositioning
//!
//! Open submenus that would overflow the viewport edge get flipped to the
//! other side with `reposition-left`. Small screens stack menus, so the
//! flip is cleared there.

use std::rc::Rc;

use solo_dom::{NodeId, TextDirection};

use crate::component::{ComponentId, ComponentMetadata};
use crate::context::MenuContext;
use crate::error::log_dom_write;
use crate::lifecycle::{Lifecycle, UiEvent};
use crate::topology;
use crate::viewport::ScreenSizeSnapshot;

#[derive(Debug, Default)]
pub struct SubmenuRepositioner {
    flipped: u64,
}

impl SubmenuRepositioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submenus flipped so far
    pub fn flipped(&self) -> u64 {
        self.flipped
    }

    fn submenus(ctx: &MenuContext) -> Vec<NodeId> {
        let tree = ctx.doc.tree();
        tree.query_selector_all(tree.root(), topology::MAIN_NAV)
            .into_iter()
            .flat_map(|nav| tree.query_selector_all(nav, topology::SUBMENU))
            .collect()
    }

    fn reposition(&mut self, ctx: &mut MenuContext, snapshot: &ScreenSizeSnapshot) {
        let rtl = ctx.doc.direction() == TextDirection::Rtl;
        for submenu in Self::submenus(ctx) {
            let overflows = !snapshot.is_small_screen
                && ctx.is_open(submenu)
                && ctx.doc.tree().element(submenu).and_then(|e| e.rect).is_some_and(|rect| {
                    if rtl {
                        rect.left() < 0.0
                    } else {
                        rect.right() > f64::from(snapshot.width)
                    }
                });
            let was = ctx.doc.tree().has_class(submenu, topology::REPOSITION_CLASS);
            if overflows != was {
                log_dom_write(
                    ctx.doc.tree.toggle_class(submenu, topology::REPOSITION_CLASS, Some(overflows)),
                    "toggle the reposition class",
                );
                if overflows {
                    self.flipped += 1;
                }
            }
        }
    }
}

impl Lifecycle for SubmenuRepositioner {
    fn id(&self) -> ComponentId {
        ComponentId::Repositions
    }

    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata::new("Submenu repositioning")
    }

    fn init(&mut self, ctx: &mut MenuContext) {
        let snapshot = ctx.snapshot();
        self.reposition(ctx, &snapshot);
    }

    fn resize_debounce_ms(&self) -> Option<u64> {
        Some(250)
    }

    fn on_resize(&mut self, ctx: &mut MenuContext, snapshot: &Rc<ScreenSizeSnapshot>) {
        self.reposition(ctx, snapshot);
    }

    fn after_event(&mut self, ctx: &mut MenuContext, _event: &UiEvent) {
        let snapshot = ctx.snapshot();
        self.reposition(ctx, &snapshot);
    }
}
