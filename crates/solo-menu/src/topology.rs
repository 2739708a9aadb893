//! Menu Topology
//!
//! Where things are in Solo menu markup:
//!
//! ```text
//! nav.main-menu[data-interaction]
//!   ul.menu                       top-level list (menubar)
//!     li.menu-item
//!       a                         link
//!       button.dropdown-toggle    trigger, aria-controls = submenu id
//!       ul.sub-menu               submenu (nests)
//!       div.mega-menu             or a mega menu
//!         ul.mega-column          columns of li.menu-item
//! ```

use solo_dom::{DomTree, NodeId};

use crate::config::InteractionMode;

pub const MAIN_NAV: &str = "nav.main-menu";
pub const SIDEBAR_NAV: &str = "nav.sidebar-menu";
pub const MENU_ROOT: &str = "ul.menu";
pub const MENU_ITEM: &str = "li.menu-item";
pub const SUBMENU: &str = "ul.sub-menu,div.mega-menu";
pub const MEGA_MENU: &str = "div.mega-menu";
pub const MEGA_COLUMN: &str = "ul.mega-column";
pub const DROPDOWN_TOGGLE: &str = "button.dropdown-toggle";
pub const MOBILE_TOGGLE: &str = "button.menu-toggle";
pub const FOCUSABLE: &str = "a,button";

/// Class marking an open menu container
pub const OPEN_CLASS: &str = "toggled";
/// Class flipping an overflowing submenu to the other side
pub const REPOSITION_CLASS: &str = "reposition-left";

/// Focusable controls of one item; a split item has two
pub fn focusables_of_item(tree: &DomTree, item: NodeId) -> Vec<NodeId> {
    tree.children_matching(item, FOCUSABLE)
}

/// Menu item containing a node
pub fn item_of(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.closest(node, MENU_ITEM)
}

/// Items of a list, in order
pub fn items_of_list(tree: &DomTree, list: NodeId) -> Vec<NodeId> {
    tree.children_matching(list, MENU_ITEM)
}

/// Top-level list enclosing a node
pub fn menu_root(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.closest(node, MENU_ROOT)
}

/// Container that keeps one roving tab stop: the item's list, or the whole
/// mega menu for items in a mega column
pub fn roving_container(tree: &DomTree, item: NodeId) -> Option<NodeId> {
    let list = tree.parent(item)?;
    if tree.matches(list, MEGA_COLUMN) {
        if let Some(mega) = tree.parent(list).filter(|&m| tree.matches(m, MEGA_MENU)) {
            return Some(mega);
        }
    }
    Some(list)
}

/// Columns of a mega menu
pub fn mega_columns(tree: &DomTree, mega: NodeId) -> Vec<NodeId> {
    tree.children_matching(mega, MEGA_COLUMN)
}

/// Every focusable in a roving container, in document order
pub fn roving_items(tree: &DomTree, container: NodeId) -> Vec<NodeId> {
    let lists = if tree.matches(container, MEGA_MENU) {
        mega_columns(tree, container)
    } else {
        vec![container]
    };
    lists
        .into_iter()
        .flat_map(|list| items_of_list(tree, list))
        .flat_map(|item| focusables_of_item(tree, item))
        .collect()
}

/// Submenu (or mega menu) owned by an item
pub fn submenu_of(tree: &DomTree, item: NodeId) -> Option<NodeId> {
    tree.children_matching(item, SUBMENU).into_iter().next()
}

/// Nearest submenu enclosing a node, if any
pub fn enclosing_submenu(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    let root = menu_root(tree, node);
    tree.ancestors(node)
        .take_while(|&a| Some(a) != root)
        .find(|&a| tree.matches(a, SUBMENU))
}

/// Number of submenus between a node and its top-level list
pub fn depth(tree: &DomTree, node: NodeId) -> usize {
    let root = menu_root(tree, node);
    tree.ancestors(node)
        .take_while(|&a| Some(a) != root)
        .filter(|&a| tree.matches(a, SUBMENU))
        .count()
}

/// Buttons whose `aria-controls` names the element's id
pub fn controllers_of(tree: &DomTree, element: NodeId) -> Vec<NodeId> {
    let Some(id) = tree.element(element).and_then(|e| e.id()) else {
        return Vec::new();
    };
    tree.query_selector_all(tree.root(), "button[aria-controls]")
        .into_iter()
        .filter(|&b| tree.get_attribute(b, "aria-controls") == Some(id))
        .collect()
}

/// Control that opens a submenu: its `aria-controls` button, else the
/// owning item's button, else the owning item's link
pub fn trigger_of_submenu(tree: &DomTree, submenu: NodeId) -> Option<NodeId> {
    if let Some(button) = controllers_of(tree, submenu).into_iter().next() {
        return Some(button);
    }
    let item = tree.parent(submenu).filter(|&p| tree.matches(p, MENU_ITEM))?;
    let focusables = focusables_of_item(tree, item);
    focusables
        .iter()
        .copied()
        .find(|&f| tree.tag_name(f) == Some("button"))
        .or_else(|| focusables.first().copied())
}

/// Element an `aria-controls` attribute points at
pub fn controlled_element(tree: &DomTree, control: NodeId) -> Option<NodeId> {
    let target = tree.get_attribute(control, "aria-controls")?;
    tree.find_by_id(tree.root(), target)
}

/// Interaction mode from the nearest `data-interaction`, else the fallback
pub fn interaction_mode(tree: &DomTree, node: NodeId, fallback: InteractionMode) -> InteractionMode {
    tree.closest(node, "[data-interaction]")
        .and_then(|n| tree.get_attribute(n, "data-interaction"))
        .and_then(InteractionMode::parse)
        .unwrap_or(fallback)
}
