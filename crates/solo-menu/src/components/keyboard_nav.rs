//! Keyboard navigation component

use solo_dom::NodeId;

use crate::component::{ComponentId, ComponentMetadata};
use crate::context::MenuContext;
use crate::keyboard::{self, KeyOutcome};
use crate::lifecycle::{EventResponse, Lifecycle, UiEvent};
use crate::topology;

/// Roving tabindex for every main and sidebar menu
#[derive(Debug, Default)]
pub struct KeyboardNavigation {
    roots: Vec<NodeId>,
}

impl KeyboardNavigation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level lists under keyboard control
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }
}

impl Lifecycle for KeyboardNavigation {
    fn id(&self) -> ComponentId {
        ComponentId::Keyboard
    }

    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata::new("Keyboard navigation")
    }

    fn init(&mut self, ctx: &mut MenuContext) {
        let tree = ctx.doc.tree();
        self.roots = [topology::MAIN_NAV, topology::SIDEBAR_NAV]
            .into_iter()
            .flat_map(|nav| tree.query_selector_all(tree.root(), nav))
            .flat_map(|nav| tree.query_selector_all(nav, topology::MENU_ROOT))
            .collect();
        for root in self.roots.clone() {
            keyboard::init_roving(ctx, root);
        }
        tracing::debug!("Keyboard navigation on {} menu(s)", self.roots.len());
    }

    fn destroy(&mut self, ctx: &mut MenuContext) {
        let released = ctx.release_component(&self.id());
        tracing::debug!("Keyboard navigation released {} claim(s)", released);
        self.roots.clear();
    }

    fn handle_event(&mut self, ctx: &mut MenuContext, event: &UiEvent) -> EventResponse {
        let UiEvent::KeyDown { target, key } = event else {
            return EventResponse::Ignored;
        };
        match keyboard::handle_key(ctx, *target, key) {
            KeyOutcome::Ignored => EventResponse::Ignored,
            KeyOutcome::Activated(link) => EventResponse::Activated(link),
            outcome => EventResponse::Handled {
                prevent_default: outcome.prevents_default(),
            },
        }
    }
}
