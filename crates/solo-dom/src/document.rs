//! Document - High-level document API

use crate::{DomEvent, DomTree, EventListener, EventListeners, ListenerId, NodeId};

/// Text direction of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Window metrics as seen by scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// `window.innerWidth`, when the host reports one
    pub inner_width: Option<u32>,
    /// Whether a native size-change observer is available
    pub supports_resize_observer: bool,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            inner_width: Some(1280),
            supports_resize_observer: true,
        }
    }
}

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Window metrics
    pub window: Window,
    html_element: Option<NodeId>,
    body_element: Option<NodeId>,
    active_element: Option<NodeId>,
    listeners: EventListeners,
}

impl Document {
    /// Create a document with `<html><head/><body/></html>`
    pub fn new() -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        let root = tree.root();
        // Freshly created nodes cannot violate hierarchy rules
        let _ = tree.append_child(root, html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            window: Window::default(),
            html_element: Some(html),
            body_element: Some(body),
            active_element: None,
            listeners: EventListeners::new(),
        }
    }

    /// Create an empty document (no structure)
    pub fn empty() -> Self {
        Self {
            tree: DomTree::new(),
            window: Window::default(),
            html_element: None,
            body_element: None,
            active_element: None,
            listeners: EventListeners::new(),
        }
    }

    /// Locate `<html>` and `<body>` after the tree was built externally
    pub fn finalize(&mut self) {
        let root = self.tree.root();
        self.html_element = self
            .tree
            .element_children(root)
            .into_iter()
            .find(|&n| self.tree.tag_name(n) == Some("html"));
        self.body_element = self
            .html_element
            .and_then(|html| self.tree.children_matching(html, "body").into_iter().next());
    }

    /// `<html>` element
    pub fn document_element(&self) -> Option<NodeId> {
        self.html_element
    }

    /// `<body>` element
    pub fn body(&self) -> Option<NodeId> {
        self.body_element
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.find_by_id(self.tree.root(), id)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Direction from the `dir` attribute of `<html>`
    pub fn direction(&self) -> TextDirection {
        let dir = self
            .html_element
            .and_then(|html| self.tree.get_attribute(html, "dir"));
        match dir {
            Some(d) if d.eq_ignore_ascii_case("rtl") => TextDirection::Rtl,
            _ => TextDirection::Ltr,
        }
    }

    /// Move focus to a connected element
    pub fn focus(&mut self, id: NodeId) -> bool {
        if self.tree.is_element(id) && self.tree.is_connected(id) {
            self.active_element = Some(id);
            true
        } else {
            false
        }
    }

    /// Drop focus
    pub fn blur(&mut self) {
        self.active_element = None;
    }

    /// Focused element, if it is still connected
    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element.filter(|&id| self.tree.is_connected(id))
    }

    /// Register an event listener
    pub fn add_event_listener(&mut self, node: NodeId, event_type: &str, callback: EventListener) -> ListenerId {
        self.listeners.add(node, event_type, callback)
    }

    /// Remove an event listener
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Dispatch an event at its target, bubbling to ancestors if requested.
    /// Returns the number of listeners invoked.
    pub fn dispatch_event(&self, mut event: DomEvent) -> usize {
        let mut path = vec![event.target];
        if event.bubbles {
            path.extend(self.tree.ancestors(event.target));
        }

        let mut invoked = 0;
        for node in path {
            event.current_target = Some(node);
            for callback in self.listeners.matching(node, &event.event_type) {
                callback(&event);
                invoked += 1;
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        invoked
    }

    /// Remove a subtree from the tree, forgetting its listeners
    pub fn remove_element(&mut self, id: NodeId) {
        for node in std::iter::once(id).chain(self.tree.descendants(id)) {
            self.listeners.clear_node(node);
        }
        self.tree.detach(id);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventDetail;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_new_document_structure() {
        let doc = Document::new();
        let html = doc.document_element().unwrap();
        let body = doc.body().unwrap();
        assert_eq!(doc.tree().parent(body), Some(html));
        assert_eq!(doc.direction(), TextDirection::Ltr);
    }

    #[test]
    fn test_focus_requires_connection() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let a = doc.tree.create_element("a");
        assert!(!doc.focus(a));

        doc.tree.append_child(body, a).unwrap();
        assert!(doc.focus(a));
        assert_eq!(doc.active_element(), Some(a));

        doc.remove_element(a);
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn test_dispatch_bubbles() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let ul = doc.tree.create_element("ul");
        doc.tree.append_child(body, ul).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        doc.add_event_listener(body, "solo:state-change", Rc::new(move |e: &DomEvent| {
            s.borrow_mut().push((e.target, e.current_target));
        }));

        let detail = EventDetail {
            name: "aria-expanded".into(),
            old_value: None,
            new_value: Some("true".into()),
            source: "main".into(),
        };
        let invoked = doc.dispatch_event(DomEvent::custom("solo:state-change", ul, detail, 0.0));
        assert_eq!(invoked, 1);
        assert_eq!(seen.borrow()[0], (ul, Some(body)));
    }

    #[test]
    fn test_rtl_direction() {
        let mut doc = Document::new();
        let html = doc.document_element().unwrap();
        doc.tree.set_attribute(html, "dir", "RTL").unwrap();
        assert_eq!(doc.direction(), TextDirection::Rtl);
    }
}
