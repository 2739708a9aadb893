//! Comprehensive tests for solo-dom
//!
//! Tree surgery, stale handles, selectors and event bubbling.

use std::cell::RefCell;
use std::rc::Rc;

use solo_dom::{Document, DomError, DomEvent, DomTree, EventDetail, NodeId, TextDirection};

fn element(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let id = tree.create_element(tag);
    for (name, value) in attrs {
        tree.set_attribute(id, name, value).unwrap();
    }
    tree.append_child(parent, id).unwrap();
    id
}

// ============================================================================
// TREE STRUCTURE
// ============================================================================

#[test]
fn test_append_moves_between_parents() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let first = element(&mut doc.tree, body, "ul", &[]);
    let second = element(&mut doc.tree, body, "ul", &[]);
    let item = element(&mut doc.tree, first, "li", &[]);

    doc.tree.append_child(second, item).unwrap();
    assert!(doc.tree.children(first).is_empty());
    assert_eq!(doc.tree.parent(item), Some(second));
}

#[test]
fn test_cycles_are_rejected() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let nav = element(&mut doc.tree, body, "nav", &[]);
    let list = element(&mut doc.tree, nav, "ul", &[]);

    assert_eq!(
        doc.tree.append_child(list, nav),
        Err(DomError::HierarchyRequest { parent: list, child: nav })
    );
    assert_eq!(doc.tree.parent(nav), Some(body));
}

#[test]
fn test_remove_child_checks_parentage() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let head = doc.tree.children(doc.document_element().unwrap())[0];
    let nav = element(&mut doc.tree, body, "nav", &[]);

    assert_eq!(doc.tree.remove_child(head, nav), Err(DomError::NotAChild { parent: head, child: nav }));
    assert_eq!(doc.tree.remove_child(body, nav), Ok(nav));
    assert!(!doc.tree.is_connected(nav));
    assert!(doc.tree.is_element(nav));
}

#[test]
fn test_destroyed_handles_never_alias() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let old = tree.create_element("li");
    tree.append_child(root, old).unwrap();

    tree.destroy(old);
    let new = tree.create_element("li");

    assert_eq!(old.index(), new.index());
    assert_ne!(old, new);
    assert!(tree.get(old).is_none());
    assert_eq!(tree.set_attribute(old, "tabindex", "0"), Err(DomError::NotFound(old)));
}

#[test]
fn test_text_nodes_are_not_elements() {
    let mut tree = DomTree::new();
    let text = tree.create_text("Menu");
    assert!(!tree.is_element(text));
    assert_eq!(tree.set_attribute(text, "id", "x"), Err(DomError::NotAnElement(text)));
    assert_eq!(tree.tag_name(text), None);
}

// ============================================================================
// SELECTORS
// ============================================================================

#[test]
fn test_menu_selectors() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let nav = element(&mut doc.tree, body, "nav", &[("class", "main-menu"), ("id", "primary")]);
    let list = element(&mut doc.tree, nav, "ul", &[("class", "menu")]);
    let item = element(&mut doc.tree, list, "li", &[("class", "menu-item has-children")]);
    let link = element(&mut doc.tree, item, "a", &[("href", "/")]);
    let button = element(&mut doc.tree, item, "button", &[("class", "dropdown-toggle"), ("aria-controls", "sub")]);
    let mega = element(&mut doc.tree, item, "div", &[("class", "mega-menu"), ("id", "sub")]);

    let tree = doc.tree();
    assert_eq!(tree.query_selector_all(nav, "a,button"), vec![link, button]);
    assert_eq!(tree.query_selector_all(nav, "ul.sub-menu,div.mega-menu"), vec![mega]);
    assert_eq!(tree.closest(link, "li.menu-item"), Some(item));
    assert_eq!(tree.closest(link, "nav#primary"), Some(nav));
    assert_eq!(tree.query_selector(body, "button[aria-controls=sub]"), Some(button));
    assert_eq!(tree.children_matching(item, "a,button"), vec![link, button]);
    assert!(tree.matches(item, ".has-children"));
    assert_eq!(doc.get_element_by_id("sub"), Some(mega));
}

// ============================================================================
// DOCUMENT
// ============================================================================

#[test]
fn test_direction_from_html_attribute() {
    let mut doc = Document::new();
    assert_eq!(doc.direction(), TextDirection::Ltr);
    let html = doc.document_element().unwrap();
    doc.tree.set_attribute(html, "dir", "rtl").unwrap();
    assert_eq!(doc.direction(), TextDirection::Rtl);
}

#[test]
fn test_focus_requires_connected_element() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let link = element(&mut doc.tree, body, "a", &[]);
    let loose = doc.tree.create_element("a");

    assert!(doc.focus(link));
    assert!(!doc.focus(loose));
    assert_eq!(doc.active_element(), Some(link));
    doc.blur();
    assert_eq!(doc.active_element(), None);
}

#[test]
fn test_custom_events_bubble_to_listeners() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let nav = element(&mut doc.tree, body, "nav", &[]);
    let link = element(&mut doc.tree, nav, "a", &[]);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    doc.add_event_listener(
        nav,
        "solo:state-change",
        Rc::new(move |event: &DomEvent| {
            let detail = event.detail.as_ref().unwrap();
            log.borrow_mut().push((event.target, event.current_target, detail.name.clone()));
        }),
    );

    let detail = EventDetail {
        name: "aria-expanded".to_string(),
        old_value: None,
        new_value: Some("true".to_string()),
        source: "main".to_string(),
    };
    assert_eq!(doc.dispatch_event(DomEvent::custom("solo:state-change", link, detail, 0.0)), 1);
    assert_eq!(doc.dispatch_event(DomEvent::simple("solo:state-change", link, 0.0)), 0);

    let seen = seen.borrow();
    assert_eq!(seen.as_slice(), &[(link, Some(nav), "aria-expanded".to_string())]);
}

#[test]
fn test_removed_subtree_forgets_listeners() {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let nav = element(&mut doc.tree, body, "nav", &[]);
    let link = element(&mut doc.tree, nav, "a", &[]);
    doc.add_event_listener(link, "ping", Rc::new(|_: &DomEvent| {}));

    doc.remove_element(nav);
    assert!(!doc.tree.is_connected(link));
    assert_eq!(doc.dispatch_event(DomEvent::simple("ping", link, 0.0)), 0);
}
