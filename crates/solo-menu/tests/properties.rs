//! Coordination guarantees of the menu state engine
//!
//! Ledger, operation slots, registry, viewport coalescing and validation,
//! exercised against real theme markup.

use std::cell::RefCell;
use std::rc::Rc;

use solo_menu::{
    ComponentId, ComponentMetadata, MenuConfig, MenuSystem, NodeId, OperationKind, OperationOutcome,
    ScreenSizeSnapshot, WriteOutcome, STATE_CHANGE_EVENT,
};

const MENU: &str = include_str!("fixtures/menu.html");

fn system(config: MenuConfig) -> MenuSystem {
    let doc = solo_html::parse(MENU).expect("fixture parses");
    MenuSystem::new(doc, config)
}

fn el(system: &MenuSystem, id: &str) -> NodeId {
    system
        .document()
        .get_element_by_id(id)
        .unwrap_or_else(|| panic!("missing #{id}"))
}

fn attr<'a>(system: &'a MenuSystem, id: NodeId, name: &str) -> Option<&'a str> {
    system.document().tree().get_attribute(id, name)
}

// ============================================================================
// OPERATION SLOTS
// ============================================================================

#[test]
fn test_equal_priority_second_request_dropped() {
    let mut system = system(MenuConfig::debug());
    let sub = el(&system, "about-sub");

    let ctx = system.context_mut();
    assert_eq!(
        ctx.coordinate_menu_operation(OperationKind::Open, sub, &ComponentId::Mobile),
        OperationOutcome::Opened
    );
    assert_eq!(
        ctx.coordinate_menu_operation(OperationKind::Close, sub, &ComponentId::Sidebar),
        OperationOutcome::Blocked { holder: ComponentId::Mobile }
    );
    assert!(ctx.is_open(sub));
    assert_eq!(ctx.coordinator().dropped(), 1);

    // Once the grace window passes the slot is free again
    system.advance(50);
    let ctx = system.context_mut();
    assert_eq!(
        ctx.coordinate_menu_operation(OperationKind::Close, sub, &ComponentId::Sidebar),
        OperationOutcome::Closed
    );
}

#[test]
fn test_higher_priority_preempts_slot() {
    let mut system = system(MenuConfig::default());
    let sub = el(&system, "about-sub");

    let ctx = system.context_mut();
    ctx.open_sub_menu(sub, &ComponentId::Main);
    assert_eq!(ctx.close_sub_menu(sub, &ComponentId::Keyboard), OperationOutcome::Closed);
    assert_eq!(ctx.coordinator().get(sub).map(|op| op.component.clone()), Some(ComponentId::Keyboard));
}

#[test]
fn test_toggle_round_trip() {
    let mut system = system(MenuConfig::default());
    let sub = el(&system, "about-sub");
    let toggle = el(&system, "about-toggle");

    system.context_mut().coordinate_menu_operation(OperationKind::Open, sub, &ComponentId::Main);
    assert_eq!(attr(&system, toggle, "aria-expanded"), Some("true"));

    system.advance(50);
    let outcome = system
        .context_mut()
        .coordinate_menu_operation(OperationKind::Close, sub, &ComponentId::Main);
    assert_eq!(outcome, OperationOutcome::Closed);

    assert_eq!(attr(&system, sub, "aria-expanded"), Some("false"));
    assert_eq!(attr(&system, sub, "aria-hidden"), Some("true"));
    assert_eq!(attr(&system, toggle, "aria-expanded"), Some("false"));
    assert!(!system.document().tree().has_class(sub, "toggled"));
}

#[test]
fn test_conflicting_opens_mobile_and_sidebar() {
    let mut system = system(MenuConfig::debug());
    let nav = el(&system, "primary-nav");

    let expanded_writes = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&expanded_writes);
    system.context_mut().doc.add_event_listener(
        nav,
        STATE_CHANGE_EVENT,
        Rc::new(move |event: &solo_dom::DomEvent| {
            let detail = event.detail.as_ref().expect("state change carries detail");
            if event.target == event.current_target.unwrap_or(event.target)
                && detail.name == "aria-expanded"
                && detail.new_value.as_deref() == Some("true")
            {
                *counter.borrow_mut() += 1;
            }
        }),
    );

    let ctx = system.context_mut();
    let first = ctx.open_menubar(nav, &ComponentId::Mobile);
    let second = ctx.open_menubar(nav, &ComponentId::Sidebar);

    assert_eq!(first, OperationOutcome::Opened);
    assert_eq!(second, OperationOutcome::Blocked { holder: ComponentId::Mobile });
    assert_eq!(attr(&system, nav, "aria-expanded"), Some("true"));
    assert_eq!(*expanded_writes.borrow(), 1);
}

#[test]
fn test_invalid_target_is_a_no_op() {
    let mut system = system(MenuConfig::default());
    let careers = el(&system, "careers");
    let text_node = system.document().tree().children(careers)[0];

    let ctx = system.context_mut();
    assert_eq!(
        ctx.coordinate_menu_operation(OperationKind::Toggle, text_node, &ComponentId::Main),
        OperationOutcome::Invalid
    );
    assert_eq!(ctx.set_attribute(text_node, "aria-hidden", "true", &ComponentId::Main), WriteOutcome::Invalid);
}

// ============================================================================
// LEDGER
// ============================================================================

#[test]
fn test_priority_override_for_tab_index() {
    let mut system = system(MenuConfig::debug());
    let home = el(&system, "home");
    let ctx = system.context_mut();

    assert!(ctx.set_tab_index(home, -1, &ComponentId::Main).is_applied());
    assert!(ctx.set_tab_index(home, 0, &ComponentId::Keyboard).is_applied());
    assert_eq!(
        ctx.set_tab_index(home, -1, &ComponentId::Mobile),
        WriteOutcome::Blocked { holder: ComponentId::Keyboard }
    );
    assert_eq!(ctx.doc.tree().get_attribute(home, "tabindex"), Some("0"));
    assert_eq!(ctx.ledger().blocked_claims().count(), 1);
}

#[test]
fn test_ledger_stays_advisory() {
    let mut system = system(MenuConfig::default());
    let home = el(&system, "home");
    let ctx = system.context_mut();

    ctx.set_attribute(home, "aria-current", "page", &ComponentId::Main);
    ctx.doc.tree.set_attribute(home, "aria-current", "false").expect("element");

    // Direct writes are not detected
    let record = ctx.ledger().owner_of(home, "aria-current").expect("record");
    assert_eq!(record.value.as_deref(), Some("page"));
    assert!(ctx.validate_state().all_clear);
}

// ============================================================================
// REGISTRY
// ============================================================================

#[test]
fn test_idempotent_registration() {
    let mut system = system(MenuConfig::default());
    let fired = Rc::new(RefCell::new(0));

    let ctx = system.context_mut();
    ctx.register_component(ComponentId::Sidebar, ComponentMetadata::new("sidebar"));
    ctx.register_component(ComponentId::Sidebar, ComponentMetadata::new("sidebar"));
    let counter = Rc::clone(&fired);
    ctx.add_resize_handler(ComponentId::Sidebar, Box::new(move |_: &Rc<ScreenSizeSnapshot>| *counter.borrow_mut() += 1), 100);

    ctx.unregister_component(&ComponentId::Sidebar);
    assert!(!ctx.is_registered(&ComponentId::Sidebar));

    system.resize(600);
    system.advance(1_000);
    assert_eq!(*fired.borrow(), 0);
    assert!(!system.context().viewport().has_handler(&ComponentId::Sidebar));
}

// ============================================================================
// VIEWPORT
// ============================================================================

#[test]
fn test_resize_burst_coalesces_to_longest_debounce() {
    let mut system = system(MenuConfig::default());
    let seen: Rc<RefCell<Vec<(&'static str, Rc<ScreenSizeSnapshot>)>>> = Rc::new(RefCell::new(Vec::new()));

    for (name, debounce) in [("a", 100), ("b", 150), ("c", 250)] {
        let seen = Rc::clone(&seen);
        system.context_mut().add_resize_handler(
            ComponentId::from_name(name),
            Box::new(move |snapshot: &Rc<ScreenSizeSnapshot>| seen.borrow_mut().push((name, Rc::clone(snapshot)))),
            debounce,
        );
    }
    assert_eq!(system.context().viewport().subscription_count(), 1);

    system.resize(900);
    system.advance(120);
    system.resize(800);
    system.advance(249);
    assert!(seen.borrow().is_empty());

    system.advance(1);
    let seen = seen.borrow();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|(_, s)| Rc::ptr_eq(s, &seen[0].1)));
    assert_eq!(seen[0].1.width, 800);
    assert!(seen[0].1.is_small_screen);
}

#[test]
fn test_missing_size_observer_falls_back_silently() {
    let mut doc = solo_html::parse(MENU).expect("fixture parses");
    doc.window.supports_resize_observer = false;
    let mut system = MenuSystem::new(doc, MenuConfig::default());

    let fired = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&fired);
    system
        .context_mut()
        .add_resize_handler(ComponentId::Main, Box::new(move |_: &Rc<ScreenSizeSnapshot>| *counter.borrow_mut() += 1), 150);

    system.resize(1000);
    system.advance(150);
    assert_eq!(*fired.borrow(), 1);
    assert_eq!(
        system.context().viewport().observation_mode(),
        Some(solo_menu::ObservationMode::WindowListener)
    );
}

// ============================================================================
// VALIDATOR
// ============================================================================

#[test]
fn test_orphan_reclamation() {
    let mut system = system(MenuConfig::debug());
    let careers = el(&system, "careers");
    let item = system.document().tree().parent(careers).expect("li");

    let ctx = system.context_mut();
    ctx.set_attribute(careers, "aria-current", "page", &ComponentId::Main);
    ctx.set_tab_index(careers, -1, &ComponentId::Keyboard);
    assert_eq!(ctx.ledger().record_count_for(careers), 2);

    ctx.doc.remove_element(item);
    let report = ctx.validate_state();

    assert!(!report.all_clear);
    assert!(report.messages()[0].starts_with("Orphaned state"));
    assert_eq!(ctx.ledger().record_count_for(careers), 0);
}

#[test]
fn test_stale_operation_purge() {
    let mut system = system(MenuConfig::default());
    let nav = el(&system, "primary-nav");

    system
        .context_mut()
        .coordinator_mut()
        .begin(nav, &ComponentId::Mobile, OperationKind::Toggle, 0);
    system.advance(5_001);

    let report = system.context_mut().validate_state();
    assert!(!report.all_clear);
    assert!(report.messages().iter().any(|m| m.contains("Stale operation")));
    assert_eq!(system.context().coordinator().active_count(), 0);
}

#[test]
fn test_recent_operation_is_not_stale() {
    let mut system = system(MenuConfig::default());
    let nav = el(&system, "primary-nav");

    system
        .context_mut()
        .coordinator_mut()
        .begin(nav, &ComponentId::Mobile, OperationKind::Open, 0);
    system.advance(5_000);

    assert!(system.context_mut().validate_state().all_clear);
    assert_eq!(system.context().coordinator().active_count(), 1);
}
