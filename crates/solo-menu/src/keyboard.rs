//! Keyboard Navigation
//!
//! Roving-tabindex state machine over the menu topology. The focused
//! control's position decides what each key does:
//!
//! - `TopLevel`: arrows move between items, ArrowDown/ArrowUp open the
//!   item's submenu
//! - `InsideSubmenu`: vertical movement wraps; ArrowLeft returns to the
//!   trigger, ArrowRight descends into a nested submenu
//! - `InsideMegaColumn`: rows wrap inside a column; columns clamp
//!
//! Every tabindex write goes through the ledger as the keyboard component.

use serde::Serialize;
use solo_dom::{NodeId, TextDirection};

use crate::component::ComponentId;
use crate::config::InteractionMode;
use crate::context::MenuContext;
use crate::coordinator::OperationOutcome;
use crate::topology;
use crate::viewport::Breakpoint;

/// Keys the state machine understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Tab { shift: bool },
    Escape,
    Enter,
    Space,
    Other(String),
}

impl Key {
    /// Parse a `KeyboardEvent.key` value
    pub fn parse(name: &str, shift: bool) -> Self {
        match name {
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "Home" => Self::Home,
            "End" => Self::End,
            "Tab" => Self::Tab { shift },
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            " " | "Space" | "Spacebar" => Self::Space,
            other => Self::Other(other.to_string()),
        }
    }

    /// Swap left and right for right-to-left text
    pub fn mirrored(&self) -> Self {
        match self {
            Self::ArrowLeft => Self::ArrowRight,
            Self::ArrowRight => Self::ArrowLeft,
            other => other.clone(),
        }
    }
}

/// What handling a key did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not ours; the browser default applies
    Ignored,
    /// Consumed without moving focus
    Handled,
    /// Focus moved to this control
    Moved(NodeId),
    /// A link was activated; navigation proceeds
    Activated(NodeId),
}

impl KeyOutcome {
    pub fn prevents_default(&self) -> bool {
        matches!(self, Self::Handled | Self::Moved(_))
    }
}

/// Position of the focused control in the menu tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavPosition {
    TopLevel,
    InsideSubmenu { depth: usize },
    InsideMegaColumn { column: usize, row: usize },
}

/// Resolved focus: control, its item, its list and its position
#[derive(Debug, Clone, Copy)]
struct Focus {
    control: NodeId,
    item: NodeId,
    list: NodeId,
    position: NavPosition,
}

fn resolve(ctx: &MenuContext, control: NodeId) -> Option<Focus> {
    let tree = ctx.doc.tree();
    if !tree.matches(control, topology::FOCUSABLE) {
        return None;
    }
    let item = topology::item_of(tree, control)?;
    let list = tree.parent(item)?;
    topology::menu_root(tree, item)?;

    let position = if tree.matches(list, topology::MENU_ROOT) {
        NavPosition::TopLevel
    } else if tree.matches(list, topology::MEGA_COLUMN) {
        let mega = tree.parent(list)?;
        let column = topology::mega_columns(tree, mega).iter().position(|&c| c == list)?;
        let row = topology::items_of_list(tree, list).iter().position(|&i| i == item)?;
        NavPosition::InsideMegaColumn { column, row }
    } else {
        NavPosition::InsideSubmenu {
            depth: topology::depth(tree, item),
        }
    };
    Some(Focus { control, item, list, position })
}

/// Position of a focused control, if it is a menu control
pub fn position(ctx: &MenuContext, control: NodeId) -> Option<NavPosition> {
    resolve(ctx, control).map(|f| f.position)
}

/// Handle a key pressed while `focused` has focus
pub fn handle_key(ctx: &mut MenuContext, focused: NodeId, key: &Key) -> KeyOutcome {
    let key = match ctx.doc.direction() {
        TextDirection::Rtl => key.mirrored(),
        TextDirection::Ltr => key.clone(),
    };

    if ctx.doc.tree().matches(focused, topology::MOBILE_TOGGLE) {
        return handle_mobile_toggle(ctx, focused, &key);
    }
    let Some(focus) = resolve(ctx, focused) else {
        return KeyOutcome::Ignored;
    };

    let outcome = match key {
        Key::ArrowRight => horizontal(ctx, &focus, true),
        Key::ArrowLeft => horizontal(ctx, &focus, false),
        Key::ArrowDown => vertical(ctx, &focus, true),
        Key::ArrowUp => vertical(ctx, &focus, false),
        Key::Home => home_end(ctx, &focus, true),
        Key::End => home_end(ctx, &focus, false),
        Key::Tab { shift } => tab(ctx, &focus, shift),
        Key::Escape => escape(ctx, &focus),
        Key::Enter | Key::Space => activate(ctx, &focus),
        Key::Other(_) => KeyOutcome::Ignored,
    };

    if let KeyOutcome::Moved(target) = outcome {
        ctx.focus(target);
        apply_roving(ctx, target);
    }
    outcome
}

fn keyboard() -> ComponentId {
    ComponentId::Keyboard
}

fn handle_mobile_toggle(ctx: &mut MenuContext, toggle: NodeId, key: &Key) -> KeyOutcome {
    let Some(nav) = topology::controlled_element(ctx.doc.tree(), toggle) else {
        return KeyOutcome::Ignored;
    };
    match key {
        Key::Enter | Key::Space => {
            if ctx.is_open(nav) {
                ctx.close_menubar(nav, &keyboard());
            } else {
                ctx.open_menubar(nav, &keyboard());
            }
            KeyOutcome::Handled
        }
        Key::Escape if ctx.is_open(nav) => {
            ctx.close_menubar(nav, &keyboard());
            KeyOutcome::Handled
        }
        _ => KeyOutcome::Ignored,
    }
}

fn step(len: usize, index: usize, forward: bool) -> usize {
    if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}

fn first_focusable(ctx: &MenuContext, item: NodeId) -> Option<NodeId> {
    topology::focusables_of_item(ctx.doc.tree(), item).into_iter().next()
}

/// Move along a list of items, wrapping, landing on each item's first control
fn move_item(ctx: &MenuContext, focus: &Focus, forward: bool) -> KeyOutcome {
    let items = topology::items_of_list(ctx.doc.tree(), focus.list);
    let Some(index) = items.iter().position(|&i| i == focus.item) else {
        return KeyOutcome::Ignored;
    };
    let target = items[step(items.len(), index, forward)];
    first_focusable(ctx, target).map_or(KeyOutcome::Handled, KeyOutcome::Moved)
}

/// Open the item's submenu and focus its first or last control
fn enter_submenu(ctx: &mut MenuContext, submenu: NodeId, first: bool) -> KeyOutcome {
    let outcome = ctx.open_sub_menu(submenu, &keyboard());
    if !outcome.took_effect() {
        return KeyOutcome::Handled;
    }
    let items = topology::roving_items(ctx.doc.tree(), submenu);
    let target = if first { items.first() } else { items.last() };
    target.copied().map_or(KeyOutcome::Handled, KeyOutcome::Moved)
}

/// Close a submenu and put focus back on its trigger
fn leave_submenu(ctx: &mut MenuContext, submenu: NodeId) -> KeyOutcome {
    if let OperationOutcome::Blocked { .. } = ctx.close_sub_menu(submenu, &keyboard()) {
        return KeyOutcome::Handled;
    }
    topology::trigger_of_submenu(ctx.doc.tree(), submenu).map_or(KeyOutcome::Handled, KeyOutcome::Moved)
}

fn horizontal(ctx: &mut MenuContext, focus: &Focus, forward: bool) -> KeyOutcome {
    let tree = ctx.doc.tree();

    if focus.position == NavPosition::TopLevel {
        // Flat order covers split items: link, then its button, then the next item
        let items = topology::roving_items(tree, focus.list);
        let Some(index) = items.iter().position(|&c| c == focus.control) else {
            return KeyOutcome::Ignored;
        };
        return KeyOutcome::Moved(items[step(items.len(), index, forward)]);
    }

    let controls = topology::focusables_of_item(tree, focus.item);
    let index = controls.iter().position(|&c| c == focus.control).unwrap_or(0);
    if forward && index + 1 < controls.len() {
        return KeyOutcome::Moved(controls[index + 1]);
    }
    if !forward && index > 0 {
        return KeyOutcome::Moved(controls[index - 1]);
    }

    match focus.position {
        NavPosition::InsideMegaColumn { column, row } => {
            let Some(mega) = tree.parent(focus.list) else {
                return KeyOutcome::Ignored;
            };
            let columns = topology::mega_columns(tree, mega);
            let target_column = if forward {
                (column + 1 < columns.len()).then(|| column + 1)
            } else {
                column.checked_sub(1)
            };
            match target_column {
                Some(c) => {
                    let rows = topology::items_of_list(tree, columns[c]);
                    match rows.len() {
                        0 => KeyOutcome::Handled,
                        len => first_focusable(ctx, rows[row.min(len - 1)]).map_or(KeyOutcome::Handled, KeyOutcome::Moved),
                    }
                }
                None if forward => KeyOutcome::Handled,
                None => leave_submenu(ctx, mega),
            }
        }
        _ => {
            if forward {
                match topology::submenu_of(tree, focus.item) {
                    Some(submenu) => enter_submenu(ctx, submenu, true),
                    None => KeyOutcome::Handled,
                }
            } else {
                match topology::enclosing_submenu(tree, focus.item) {
                    Some(submenu) => leave_submenu(ctx, submenu),
                    None => KeyOutcome::Handled,
                }
            }
        }
    }
}

fn vertical(ctx: &mut MenuContext, focus: &Focus, forward: bool) -> KeyOutcome {
    if focus.position == NavPosition::TopLevel {
        if let Some(submenu) = topology::submenu_of(ctx.doc.tree(), focus.item) {
            return enter_submenu(ctx, submenu, forward);
        }
    }
    move_item(ctx, focus, forward)
}

fn home_end(ctx: &MenuContext, focus: &Focus, first: bool) -> KeyOutcome {
    let tree = ctx.doc.tree();
    let Some(container) = topology::roving_container(tree, focus.item) else {
        return KeyOutcome::Ignored;
    };
    let items = topology::roving_items(tree, container);
    let target = if first { items.first() } else { items.last() };
    target.copied().map_or(KeyOutcome::Handled, KeyOutcome::Moved)
}

fn tab(ctx: &mut MenuContext, focus: &Focus, shift: bool) -> KeyOutcome {
    let Some(root) = topology::menu_root(ctx.doc.tree(), focus.item) else {
        return KeyOutcome::Ignored;
    };
    let snapshot = ctx.snapshot();

    match ctx.interaction_mode(focus.control) {
        InteractionMode::Click => {
            let tree = ctx.doc.tree();
            let top_item = std::iter::once(focus.item)
                .chain(tree.ancestors(focus.item))
                .find(|&n| tree.parent(n) == Some(root));
            let controls = topology::roving_items(tree, root);
            let index = if focus.position == NavPosition::TopLevel {
                controls.iter().position(|&c| c == focus.control)
            } else {
                top_item
                    .and_then(|item| first_focusable(ctx, item))
                    .and_then(|first| controls.iter().position(|&c| c == first))
            };

            ctx.close_all_sub_menus(root, &keyboard());

            let target = index.and_then(|i| if shift { i.checked_sub(1) } else { Some(i + 1) });
            match target.and_then(|i| controls.get(i)) {
                Some(&control) => KeyOutcome::Moved(control),
                None => KeyOutcome::Ignored,
            }
        }
        InteractionMode::Hover => {
            if snapshot.breakpoint == Breakpoint::Large && !snapshot.is_small_screen {
                reveal_open_submenus(ctx, root);
            }
            KeyOutcome::Ignored
        }
    }
}

/// Give every control of every open submenu tabindex 0
fn reveal_open_submenus(ctx: &mut MenuContext, root: NodeId) {
    let open: Vec<NodeId> = ctx
        .doc
        .tree()
        .query_selector_all(root, topology::SUBMENU)
        .into_iter()
        .filter(|&s| ctx.is_open(s))
        .collect();
    for submenu in open {
        for control in topology::roving_items(ctx.doc.tree(), submenu) {
            ctx.set_tab_index(control, 0, &keyboard());
        }
    }
}

fn escape(ctx: &mut MenuContext, focus: &Focus) -> KeyOutcome {
    let open_enclosing = {
        let tree = ctx.doc.tree();
        let root = topology::menu_root(tree, focus.item);
        tree.ancestors(focus.item)
            .take_while(|&a| Some(a) != root)
            .find(|&a| tree.matches(a, topology::SUBMENU) && ctx.is_open(a))
    };
    if let Some(submenu) = open_enclosing {
        return leave_submenu(ctx, submenu);
    }

    if let Some(submenu) = topology::submenu_of(ctx.doc.tree(), focus.item).filter(|&s| ctx.is_open(s)) {
        ctx.close_sub_menu(submenu, &keyboard());
        return KeyOutcome::Handled;
    }

    if ctx.is_small_screen() && ctx.is_registered(&ComponentId::Mobile) {
        if let Some((toggle, nav)) = mobile_toggle_for(ctx, focus.item) {
            ctx.close_menubar(nav, &keyboard());
            return KeyOutcome::Moved(toggle);
        }
    }
    KeyOutcome::Ignored
}

/// Mobile toggle whose navigation contains `node`
fn mobile_toggle_for(ctx: &MenuContext, node: NodeId) -> Option<(NodeId, NodeId)> {
    let tree = ctx.doc.tree();
    tree.query_selector_all(tree.root(), topology::MOBILE_TOGGLE)
        .into_iter()
        .filter_map(|toggle| topology::controlled_element(tree, toggle).map(|nav| (toggle, nav)))
        .find(|&(_, nav)| tree.contains(nav, node) && ctx.is_open(nav))
}

fn activate(ctx: &mut MenuContext, focus: &Focus) -> KeyOutcome {
    let tree = ctx.doc.tree();
    let is_button = tree.tag_name(focus.control) == Some("button");
    let has_button = topology::focusables_of_item(tree, focus.item)
        .iter()
        .any(|&c| tree.tag_name(c) == Some("button"));
    let submenu = topology::controlled_element(tree, focus.control)
        .filter(|&s| tree.matches(s, topology::SUBMENU))
        .or_else(|| topology::submenu_of(tree, focus.item));

    // Links navigate unless they are the only control of a parent item
    if !is_button && (has_button || submenu.is_none()) {
        return KeyOutcome::Activated(focus.control);
    }
    let Some(submenu) = submenu else {
        return KeyOutcome::Handled;
    };

    if ctx.is_open(submenu) {
        ctx.close_sub_menu(submenu, &keyboard());
        KeyOutcome::Handled
    } else {
        enter_submenu(ctx, submenu, true)
    }
}

/// Make `target` the container's tab stop
pub fn apply_roving(ctx: &mut MenuContext, target: NodeId) {
    let tree = ctx.doc.tree();
    let Some(item) = topology::item_of(tree, target) else {
        return;
    };
    let Some(container) = topology::roving_container(tree, item) else {
        return;
    };
    let controls = topology::roving_items(tree, container);
    let keep_all = !tree.matches(container, topology::MENU_ROOT)
        && ctx.is_open(container)
        && hover_on_large_screen(ctx, container);

    for control in controls {
        let value = if keep_all || control == target { 0 } else { -1 };
        ctx.set_tab_index(control, value, &keyboard());
    }
}

/// Bring a closed submenu back to a single tab stop after a hover reveal
pub fn collapse_tab_stops(ctx: &mut MenuContext, submenu: NodeId) {
    let tree = ctx.doc.tree();
    let controls = topology::roving_items(tree, submenu);
    let stops: Vec<NodeId> = controls
        .iter()
        .copied()
        .filter(|&c| tree.get_attribute(c, "tabindex") == Some("0"))
        .collect();
    if stops.len() <= 1 {
        return;
    }
    let keep = ctx
        .doc
        .active_element()
        .filter(|focused| stops.contains(focused))
        .unwrap_or(stops[0]);
    for control in controls {
        ctx.set_tab_index(control, if control == keep { 0 } else { -1 }, &keyboard());
    }
}

fn hover_on_large_screen(ctx: &MenuContext, node: NodeId) -> bool {
    let snapshot = ctx.snapshot();
    ctx.interaction_mode(node) == InteractionMode::Hover
        && snapshot.breakpoint == Breakpoint::Large
        && !snapshot.is_small_screen
}

/// Initial tab stops: first control of each container is 0, the rest -1
pub fn init_roving(ctx: &mut MenuContext, root: NodeId) {
    let tree = ctx.doc.tree();
    let containers: Vec<NodeId> = std::iter::once(root)
        .chain(tree.query_selector_all(root, topology::SUBMENU))
        .collect();
    for container in containers {
        let controls = topology::roving_items(ctx.doc.tree(), container);
        for (i, control) in controls.into_iter().enumerate() {
            ctx.set_tab_index(control, if i == 0 { 0 } else { -1 }, &keyboard());
        }
    }
}
