//! Component lifecycle trait

use std::rc::Rc;

use solo_dom::NodeId;

use crate::component::{ComponentId, ComponentMetadata};
use crate::context::MenuContext;
use crate::keyboard::Key;
use crate::viewport::ScreenSizeSnapshot;

/// Host event routed to components
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Click { target: NodeId },
    PointerEnter { target: NodeId },
    PointerLeave { target: NodeId },
    KeyDown { target: NodeId, key: Key },
}

impl UiEvent {
    pub fn target(&self) -> NodeId {
        match self {
            Self::Click { target }
            | Self::PointerEnter { target }
            | Self::PointerLeave { target }
            | Self::KeyDown { target, .. } => *target,
        }
    }
}

/// What a component did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Ignored,
    Handled { prevent_default: bool },
    /// A link was activated; the host should follow it
    Activated(NodeId),
}

impl EventResponse {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

/// A menu component driven by [`MenuSystem`](crate::MenuSystem)
pub trait Lifecycle {
    fn id(&self) -> ComponentId;

    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata::default()
    }

    /// Called once on attach, after registration
    fn init(&mut self, ctx: &mut MenuContext);

    /// Called once on detach, before unregistration
    fn destroy(&mut self, _ctx: &mut MenuContext) {}

    /// Debounce for resize notifications; None means no interest
    fn resize_debounce_ms(&self) -> Option<u64> {
        None
    }

    fn on_resize(&mut self, _ctx: &mut MenuContext, _snapshot: &Rc<ScreenSizeSnapshot>) {}

    fn handle_event(&mut self, _ctx: &mut MenuContext, _event: &UiEvent) -> EventResponse {
        EventResponse::Ignored
    }

    /// Runs after every component has seen the event
    fn after_event(&mut self, _ctx: &mut MenuContext, _event: &UiEvent) {}
}
