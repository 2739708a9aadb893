//! Component behaviour through the full menu system

use solo_dom::DOMRect;
use solo_menu::animation::ANIMATING_CLASS;
use solo_menu::{EventResponse, MenuConfig, MenuSystem, NodeId, SlideDirection};

const MENU: &str = include_str!("fixtures/menu.html");

fn attached(markup: &str, config: MenuConfig) -> MenuSystem {
    let doc = solo_html::parse(markup).expect("fixture parses");
    let mut system = MenuSystem::with_default_components(doc, config);
    system.attach();
    system
}

fn el(system: &MenuSystem, id: &str) -> NodeId {
    system
        .document()
        .get_element_by_id(id)
        .unwrap_or_else(|| panic!("missing #{id}"))
}

fn attr<'a>(system: &'a MenuSystem, id: &str, name: &str) -> Option<&'a str> {
    system.document().tree().get_attribute(el(system, id), name)
}

fn is_open(system: &MenuSystem, id: &str) -> bool {
    system.context().is_open(el(system, id))
}

fn click(system: &mut MenuSystem, id: &str) -> EventResponse {
    let target = el(system, id);
    system.click(target)
}

#[test]
fn test_attach_wires_aria_relationships() {
    let system = attached(MENU, MenuConfig::default());

    assert_eq!(attr(&system, "about-toggle", "aria-haspopup"), Some("true"));
    assert_eq!(attr(&system, "about-toggle", "aria-controls"), Some("about-sub"));
    assert_eq!(attr(&system, "about-toggle", "aria-expanded"), Some("false"));
    assert_eq!(attr(&system, "about-sub", "aria-hidden"), Some("true"));
    assert_eq!(attr(&system, "history-toggle", "aria-expanded"), Some("false"));
    assert_eq!(attr(&system, "menu-toggle", "aria-expanded"), Some("false"));

    // Sidebar submenus start collapsed
    assert_eq!(attr(&system, "docs-sub", "hidden"), Some(""));
    assert_eq!(attr(&system, "docs-toggle", "aria-controls"), Some("docs-sub"));

    // Large screen: the menubar is visible
    assert_eq!(attr(&system, "primary-nav", "aria-hidden"), None);
}

#[test]
fn test_missing_submenu_ids_are_generated() {
    let markup = MENU.replace(r#" id="history-sub""#, "");
    let markup = markup.replace(r#" aria-controls="history-sub""#, "");
    let system = attached(&markup, MenuConfig::default());

    let toggle = el(&system, "history-toggle");
    let generated = system
        .document()
        .tree()
        .get_attribute(toggle, "aria-controls")
        .expect("aria-controls");
    assert!(generated.starts_with("main-1-submenu-"));
    assert!(system.document().get_element_by_id(generated).is_some());
}

#[test]
fn test_toggle_click_opens_and_closes_siblings() {
    let mut system = attached(MENU, MenuConfig::default());

    assert_eq!(click(&mut system, "about-toggle"), EventResponse::Handled { prevent_default: true });
    assert!(is_open(&system, "about-sub"));
    assert_eq!(attr(&system, "about-toggle", "aria-expanded"), Some("true"));
    assert!(system.document().tree().has_class(el(&system, "about-sub"), "toggled"));

    click(&mut system, "products-toggle");
    assert!(is_open(&system, "products-mega"));
    assert!(!is_open(&system, "about-sub"));
    assert_eq!(attr(&system, "about-toggle", "aria-expanded"), Some("false"));

    system.advance(50);
    click(&mut system, "products-toggle");
    assert!(!is_open(&system, "products-mega"));
}

#[test]
fn test_outside_click_closes_everything() {
    let mut system = attached(MENU, MenuConfig::default());
    click(&mut system, "about-toggle");
    system.advance(50);
    click(&mut system, "history-toggle");
    assert!(is_open(&system, "history-sub"));

    let body = system.document().body().expect("body");
    assert_eq!(system.click(body), EventResponse::Ignored);
    assert!(!is_open(&system, "about-sub"));
    assert!(!is_open(&system, "history-sub"));
}

#[test]
fn test_link_click_is_not_consumed() {
    let mut system = attached(MENU, MenuConfig::default());
    assert_eq!(click(&mut system, "home"), EventResponse::Ignored);
}

#[test]
fn test_hover_mode_follows_pointer() {
    let markup = MENU.replace(r#"data-interaction="click""#, r#"data-interaction="hover""#);
    let mut system = attached(&markup, MenuConfig::default());
    let about = el(&system, "about");

    system.pointer_enter(about);
    assert!(is_open(&system, "about-sub"));
    system.pointer_leave(about);
    assert!(!is_open(&system, "about-sub"));

    // Outside clicks only close in click mode
    system.advance(50);
    system.pointer_enter(about);
    let body = system.document().body().expect("body");
    system.click(body);
    assert!(is_open(&system, "about-sub"));
}

#[test]
fn test_hover_is_inert_on_small_screens() {
    let markup = MENU.replace(r#"data-interaction="click""#, r#"data-interaction="hover""#);
    let mut system = attached(&markup, MenuConfig::default());
    system.resize(600);
    system.advance(250);

    let about = el(&system, "about");
    assert_eq!(system.pointer_enter(about), EventResponse::Ignored);
    assert!(!is_open(&system, "about-sub"));
}

#[test]
fn test_shrinking_closes_open_submenus() {
    let mut system = attached(MENU, MenuConfig::default());
    click(&mut system, "about-toggle");
    system.advance(50);

    system.resize(700);
    system.advance(99);
    assert!(is_open(&system, "about-sub"));
    system.advance(151);
    assert!(!is_open(&system, "about-sub"));
}

#[test]
fn test_mobile_menu_flow() {
    let mut system = attached(MENU, MenuConfig::default());
    let nav = el(&system, "primary-nav");

    system.resize(600);
    system.advance(250);
    assert!(system.context().is_small_screen());
    assert_eq!(attr(&system, "primary-nav", "aria-hidden"), Some("true"));

    assert_eq!(click(&mut system, "menu-toggle"), EventResponse::Handled { prevent_default: true });
    assert!(is_open(&system, "primary-nav"));
    assert_eq!(attr(&system, "primary-nav", "aria-hidden"), Some("false"));
    assert_eq!(attr(&system, "menu-toggle", "aria-expanded"), Some("true"));
    assert_eq!(system.context().animations().running(nav), Some(SlideDirection::Down));
    assert!(system.document().tree().has_class(nav, ANIMATING_CLASS));

    system.advance(300);
    assert_eq!(system.context().animations().running(nav), None);
    assert!(!system.document().tree().has_class(nav, ANIMATING_CLASS));

    click(&mut system, "menu-toggle");
    assert!(!is_open(&system, "primary-nav"));
    assert!(system.transition_end(nav));
    assert_eq!(attr(&system, "primary-nav", "hidden"), Some(""));
    assert_eq!(attr(&system, "menu-toggle", "aria-expanded"), Some("false"));

    // Back on a large screen the menubar is shown again
    system.resize(1400);
    system.advance(250);
    assert_eq!(attr(&system, "primary-nav", "hidden"), None);
    assert_eq!(attr(&system, "primary-nav", "aria-hidden"), None);
}

#[test]
fn test_growing_closes_open_mobile_menu() {
    let mut system = attached(MENU, MenuConfig::default());
    system.resize(600);
    system.advance(250);
    click(&mut system, "menu-toggle");
    system.advance(100);

    system.resize(1300);
    system.advance(250);
    assert!(!is_open(&system, "primary-nav"));
    assert_eq!(attr(&system, "primary-nav", "hidden"), None);
    assert_eq!(system.context().animations().running_count(), 0);
}

#[test]
fn test_sidebar_slides() {
    let mut system = attached(MENU, MenuConfig::default());
    let sub = el(&system, "docs-sub");

    assert_eq!(click(&mut system, "docs-toggle"), EventResponse::Handled { prevent_default: true });
    assert!(is_open(&system, "docs-sub"));
    assert_eq!(attr(&system, "docs-sub", "hidden"), None);
    assert_eq!(attr(&system, "docs-toggle", "aria-expanded"), Some("true"));

    assert!(system.transition_end(sub));
    assert!(!system.transition_end(sub));
    assert_eq!(system.context().animations().completed(), 1);

    system.advance(50);
    click(&mut system, "docs-toggle");
    assert_eq!(system.context().animations().running(sub), Some(SlideDirection::Up));
    system.advance(300);
    assert_eq!(attr(&system, "docs-sub", "hidden"), Some(""));
}

#[test]
fn test_restarted_slide_cancels_previous() {
    let mut system = attached(MENU, MenuConfig::default());
    let sub = el(&system, "docs-sub");

    click(&mut system, "docs-toggle");
    system.advance(100);
    click(&mut system, "docs-toggle");
    assert_eq!(system.context().animations().running_count(), 1);

    // The first slide's timer is gone; only the closing one completes
    system.advance(250);
    assert_eq!(system.context().animations().running(sub), Some(SlideDirection::Up));
    system.advance(50);
    assert_eq!(system.context().animations().completed(), 1);
    assert_eq!(attr(&system, "docs-sub", "hidden"), Some(""));
}

#[test]
fn test_overflowing_submenu_is_flipped() {
    let mut system = attached(MENU, MenuConfig::default());
    let sub = el(&system, "about-sub");
    system
        .context_mut()
        .doc
        .tree
        .element_mut(sub)
        .expect("element")
        .rect = Some(DOMRect::from_xywh(1150.0, 40.0, 240.0, 300.0));

    click(&mut system, "about-toggle");
    assert!(system.document().tree().has_class(sub, "reposition-left"));

    system.advance(50);
    click(&mut system, "about-toggle");
    assert!(!system.document().tree().has_class(sub, "reposition-left"));
}

#[test]
fn test_wide_viewport_keeps_submenu_in_place() {
    let mut system = attached(MENU, MenuConfig::default());
    let sub = el(&system, "about-sub");
    system
        .context_mut()
        .doc
        .tree
        .element_mut(sub)
        .expect("element")
        .rect = Some(DOMRect::from_xywh(1150.0, 40.0, 240.0, 300.0));

    system.resize(1600);
    system.advance(250);
    click(&mut system, "about-toggle");
    assert!(!system.document().tree().has_class(sub, "reposition-left"));
}

#[test]
fn test_teardown_releases_everything() {
    let mut system = attached(MENU, MenuConfig::debug());
    click(&mut system, "about-toggle");

    let report = system.teardown();
    assert!(report.all_clear);
    assert!(!system.is_attached());
    assert!(system.context().registry().is_empty());
    assert_eq!(system.context().ledger().claim_count(), 0);
    assert_eq!(click(&mut system, "about-toggle"), EventResponse::Ignored);
}

#[test]
fn test_diagnostics_report_reflects_activity() {
    let mut system = attached(MENU, MenuConfig::debug());
    click(&mut system, "about-toggle");

    let report = system.diagnostics().report();
    assert_eq!(report.components.len(), 6);
    assert_eq!(report.active_operations.len(), 1);
    assert!(report.ownership_records > 0);
    assert!(report.tab_index_claims > 0);

    let json = system.diagnostics().to_json().expect("serializes");
    assert!(json.contains("\"active_operations\""));
}
