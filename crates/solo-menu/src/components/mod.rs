//! Menu components
//!
//! Concrete [`Lifecycle`](crate::Lifecycle) implementations for the Solo
//! theme's menus.

mod keyboard_nav;
mod main_menu;
mod mobile_menu;
mod repositions;
mod sidebar_menu;

pub use keyboard_nav::KeyboardNavigation;
pub use main_menu::MainMenu;
pub use mobile_menu::MobileMenu;
pub use repositions::SubmenuRepositioner;
pub use sidebar_menu::SidebarMenu;

use solo_dom::NodeId;

use crate::component::ComponentId;
use crate::context::MenuContext;
use crate::error::log_dom_write;
use crate::lifecycle::Lifecycle;
use crate::topology;

/// The five standard components, in attach order
pub fn default_components() -> Vec<Box<dyn Lifecycle>> {
    vec![
        Box::new(MainMenu::new()),
        Box::new(MobileMenu::new()),
        Box::new(SidebarMenu::new()),
        Box::new(KeyboardNavigation::new()),
        Box::new(SubmenuRepositioner::new()),
    ]
}

/// Wire ARIA relationships between every submenu under `nav` and its
/// trigger, generating submenu ids where missing
pub(crate) fn link_submenus(ctx: &mut MenuContext, nav: NodeId, prefix: &str, component: &ComponentId) -> usize {
    let submenus = ctx.doc.tree().query_selector_all(nav, topology::SUBMENU);
    for (index, submenu) in submenus.iter().copied().enumerate() {
        let existing = ctx.doc.tree().element(submenu).and_then(|e| e.id()).map(str::to_string);
        let id = match existing {
            Some(id) => id,
            None => {
                let generated = format!("{}-submenu-{}", prefix, index + 1);
                log_dom_write(ctx.doc.tree.set_attribute(submenu, "id", &generated), "assign a submenu id");
                generated
            }
        };

        let open = ctx.is_open(submenu);
        let expanded = if open { "true" } else { "false" };
        if let Some(trigger) = topology::trigger_of_submenu(ctx.doc.tree(), submenu) {
            ctx.set_attribute(trigger, "aria-haspopup", "true", component);
            if ctx.doc.tree().tag_name(trigger) == Some("button") {
                ctx.set_attribute(trigger, "aria-controls", &id, component);
            }
            ctx.set_attribute(trigger, "aria-expanded", expanded, component);
        }
        ctx.set_attribute(submenu, "aria-hidden", if open { "false" } else { "true" }, component);
    }
    submenus.len()
}
