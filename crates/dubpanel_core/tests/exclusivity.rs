use std::sync::Once;

use dubpanel_core::dom::{Document, Element};
use dubpanel_core::select::{MENU_CLASS, OPEN_CLASS, TRIGGER_CLASS};
use dubpanel_core::{close_open_menus, OptionEntry, Page};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(panel_logging::initialize_for_tests);
}

fn two_widget_page() -> Page {
    let mut page = Page::new(["tts", "voice"]);
    for id in ["tts", "voice"] {
        page.populate(
            id,
            vec![OptionEntry::new("0", "First"), OptionEntry::new("1", "Second")],
            "0",
        )
        .unwrap();
    }
    page
}

fn is_open(page: &Page, element_id: &str) -> bool {
    page.document()
        .find(element_id)
        .is_some_and(|el| el.has_class(OPEN_CLASS))
}

#[test]
fn opening_second_widget_closes_first() {
    init_logging();
    let mut page = two_widget_page();

    page.click("tts");
    assert_eq!(page.open_widgets(), vec!["tts"]);
    assert!(is_open(&page, "tts__menu"));
    assert!(is_open(&page, "tts"));

    page.click("voice");
    assert_eq!(page.open_widgets(), vec!["voice"]);
    assert!(is_open(&page, "voice__menu"));
    assert!(!is_open(&page, "tts__menu"));
    assert!(!is_open(&page, "tts"));
}

#[test]
fn clicking_open_trigger_toggles_it_closed() {
    init_logging();
    let mut page = two_widget_page();

    page.click("voice");
    page.click("voice");

    assert!(page.open_widgets().is_empty());
    assert!(!is_open(&page, "voice__menu"));
}

#[test]
fn outside_click_closes_open_menu() {
    init_logging();
    let mut page = two_widget_page();

    page.click("tts");
    assert_eq!(page.click("btn-start"), None);

    assert!(page.open_widgets().is_empty());
    assert!(!is_open(&page, "tts__menu"));
}

#[test]
fn repopulated_widget_still_takes_part_in_exclusivity() {
    init_logging();
    let mut page = two_widget_page();

    page.click("tts");
    page.populate("voice", vec![OptionEntry::new("x", "Only")], "x")
        .unwrap();
    page.click("voice");

    assert_eq!(page.open_widgets(), vec!["voice"]);
    assert!(!is_open(&page, "tts__menu"));
}

fn raw_widget(doc: &mut Document, id: &str) {
    let container = doc.container_mut(&format!("{id}-container")).unwrap();
    container.push_child(
        Element::new("div")
            .with_id(id)
            .with_class(TRIGGER_CLASS)
            .with_class(OPEN_CLASS),
    );
    container.push_child(
        Element::new("div")
            .with_id(format!("{id}__menu"))
            .with_class(MENU_CLASS)
            .with_class(OPEN_CLASS),
    );
}

#[test]
fn sweep_closes_every_open_menu_but_the_excepted_one() {
    init_logging();
    let mut doc = Document::with_containers(["x-container", "y-container", "z-container"]);
    raw_widget(&mut doc, "x");
    raw_widget(&mut doc, "y");
    raw_widget(&mut doc, "z");

    let closed = close_open_menus(&mut doc, Some("y__menu"));

    assert_eq!(closed, vec!["x".to_string(), "z".to_string()]);
    for id in ["x", "z"] {
        assert!(!doc.find(id).unwrap().has_class(OPEN_CLASS));
        assert!(!doc.find(&format!("{id}__menu")).unwrap().has_class(OPEN_CLASS));
    }
    assert!(doc.find("y").unwrap().has_class(OPEN_CLASS));
    assert!(doc.find("y__menu").unwrap().has_class(OPEN_CLASS));
}
