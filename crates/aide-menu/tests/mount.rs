//! Integration tests: mounting, the menu and button presses.

use aide_core::radial::{CONTAINER_CLASS, MENU_OPEN_CLASS};
use aide_core::{Document, NodeIndex, Selector, parse_markup};
use aide_menu::assistant::{CORE_STYLE_ID, MENU_BOX_CLASS, POSITION_STYLE_ID};
use aide_menu::button::MENU_BUTTON_CLASS;
use aide_menu::buttons::GENERIC_HIGHLIGHT;
use aide_menu::buttons::INSIGHTS_HIGHLIGHT;
use aide_menu::highlight::HIGHLIGHT_TARGET_CLASS;
use aide_menu::{
    Assistant, AssistantConfig, AssistantEvent, ChatButton, InsightsButton, TranslateButton,
};
use pretty_assertions::assert_eq;

fn page() -> Document {
    parse_markup(include_str!("fixtures/dashboard.html")).unwrap()
}

fn select(class: &str) -> Selector {
    Selector::parse(&format!(".{class}")).unwrap()
}

/// Rendered menu buttons below `container`.
fn menu_buttons(doc: &Document, container: NodeIndex) -> Vec<NodeIndex> {
    let selector = select(MENU_BUTTON_CLASS);
    doc.query_selector_all(&selector)
        .into_iter()
        .filter(|&n| doc.contains(container, n))
        .collect()
}

fn mounted() -> (Document, Assistant) {
    let mut doc = page();
    let mut assistant = Assistant::from_config(AssistantConfig::default()).unwrap();
    let root = doc.root;
    assistant.mount(&mut doc, root);
    (doc, assistant)
}

const OWNED_STYLES: [&str; 4] = [
    CORE_STYLE_ID,
    GENERIC_HIGHLIGHT.id,
    INSIGHTS_HIGHLIGHT.id,
    POSITION_STYLE_ID,
];

// ─── Mount / unmount ─────────────────────────────────────────────────────

#[test]
fn mount_renders_container_and_buttons() {
    let (doc, assistant) = mounted();
    let container = doc.by_id(assistant.id().as_str()).unwrap();

    assert!(doc.has_class(container, CONTAINER_CLASS));
    assert!(!doc.has_class(container, MENU_OPEN_CLASS));
    assert!(doc.query_selector(container, &select(MENU_BOX_CLASS)).is_some());

    let rendered = menu_buttons(&doc, container);
    assert_eq!(rendered.len(), 3);
    let ids: Vec<String> = rendered
        .iter()
        .filter_map(|&n| doc.get(n)?.id.map(|id| id.to_string()))
        .collect();
    assert_eq!(ids, vec!["aiChatButton0", "aiTranslateButton1", "aiInsightsButton2"]);

    let chat = doc.get(rendered[0]).unwrap();
    assert_eq!(chat.attr("title"), Some("Open Chat"));
    assert_eq!(chat.attr("draggable"), None);
    assert_eq!(doc.get(rendered[1]).unwrap().attr("draggable"), Some("true"));

    let main = assistant.main_button().unwrap();
    assert!(doc.contains(container, main));
}

#[test]
fn mount_injects_styles_and_listeners() {
    let (doc, assistant) = mounted();
    for id in OWNED_STYLES {
        assert!(doc.has_style(id), "missing style `{id}`");
    }
    assert!(doc.has_listeners(assistant.id().as_str()));

    let positions = doc.style(POSITION_STYLE_ID).unwrap();
    assert!(positions.contains(".aiFloatingButtonContainer.menu-open #aiTranslateButton1"));
    assert_eq!(positions, assistant.position_css());
}

#[test]
fn unmount_removes_everything_and_is_idempotent() {
    let (mut doc, mut assistant) = mounted();
    let owner = assistant.id();

    assistant.unmount(&mut doc);
    assert!(!assistant.is_mounted());
    assert!(doc.by_id(owner.as_str()).is_none());
    assert!(!doc.has_listeners(owner.as_str()));
    for id in OWNED_STYLES {
        assert!(!doc.has_style(id), "style `{id}` left behind");
    }

    assistant.unmount(&mut doc);
    assert!(doc.by_id("page").is_some());
}

#[test]
fn styles_injected_by_someone_else_survive_unmount() {
    let mut doc = page();
    doc.inject_style(GENERIC_HIGHLIGHT.id, "/* host */");

    let mut assistant = Assistant::from_config(AssistantConfig::default()).unwrap();
    let root = doc.root;
    assistant.mount(&mut doc, root);
    assistant.unmount(&mut doc);

    assert_eq!(doc.style(GENERIC_HIGHLIGHT.id), Some("/* host */"));
}

#[test]
fn two_assistants_keep_their_own_listeners() {
    let mut doc = page();
    let root = doc.root;
    let mut first = Assistant::from_config(AssistantConfig::default()).unwrap();
    let mut second = Assistant::from_config(AssistantConfig::default()).unwrap();
    first.mount(&mut doc, root);
    second.mount(&mut doc, root);
    assert_ne!(first.id(), second.id());

    first.unmount(&mut doc);
    assert!(doc.has_listeners(second.id().as_str()));
    assert!(doc.by_id(second.id().as_str()).is_some());
}

#[test]
fn remount_replaces_the_container() {
    let (mut doc, mut assistant) = mounted();
    let root = doc.root;
    let again = assistant.mount(&mut doc, root);

    assert_eq!(doc.elements_with_class(CONTAINER_CLASS), vec![again]);
    assert_eq!(doc.query_selector_all(&select(MENU_BUTTON_CLASS)).len(), 3);

    // the new nodes reuse freed slots but keep their rendering order
    let ids: Vec<String> = menu_buttons(&doc, again)
        .iter()
        .filter_map(|&n| doc.get(n)?.id.map(|id| id.to_string()))
        .collect();
    assert_eq!(ids, vec!["aiChatButton0", "aiTranslateButton1", "aiInsightsButton2"]);
    let children = doc.children(again);
    assert!(doc.has_class(children[0], MENU_BOX_CLASS));
    assert_eq!(children.get(1).copied(), assistant.main_button());
}

// ─── Menu ────────────────────────────────────────────────────────────────

#[test]
fn toggling_the_menu() {
    let (mut doc, mut assistant) = mounted();
    let container = doc.by_id(assistant.id().as_str()).unwrap();

    assistant.toggle_menu(&mut doc);
    assert!(assistant.is_menu_open());
    assert!(doc.has_class(container, MENU_OPEN_CLASS));

    // opening an open menu changes nothing
    assistant.open_menu(&mut doc);
    assistant.toggle_menu(&mut doc);
    assert!(!doc.has_class(container, MENU_OPEN_CLASS));

    assert_eq!(
        assistant.take_events(),
        vec![
            AssistantEvent::MenuToggled { open: true },
            AssistantEvent::MenuToggled { open: false },
        ]
    );
}

#[test]
fn menu_ignores_toggles_before_mount() {
    let mut doc = page();
    let mut assistant = Assistant::from_config(AssistantConfig::default()).unwrap();
    assistant.toggle_menu(&mut doc);
    assert!(!assistant.is_menu_open());
    assert!(assistant.take_events().is_empty());
}

// ─── Presses ─────────────────────────────────────────────────────────────

#[test]
fn short_press_previews_targets() {
    let (mut doc, mut assistant) = mounted();
    let translate = assistant.find_button::<TranslateButton>().unwrap();

    assistant.pointer_down(translate, 1_000).unwrap();
    assert!(assistant.pointer_up(&mut doc, translate, 1_150).unwrap());
    assert_eq!(doc.elements_with_class(HIGHLIGHT_TARGET_CLASS).len(), 6);
    assert_eq!(
        assistant.take_events(),
        vec![AssistantEvent::ButtonPressed { button: translate }]
    );

    // a second click hides the preview
    assistant.pointer_down(translate, 2_000).unwrap();
    assistant.pointer_up(&mut doc, translate, 2_050).unwrap();
    assert!(doc.elements_with_class(HIGHLIGHT_TARGET_CLASS).is_empty());
}

#[test]
fn long_press_is_not_a_click() {
    let (mut doc, mut assistant) = mounted();
    let insights = assistant.find_button::<InsightsButton>().unwrap();

    assistant.pointer_down(insights, 1_000).unwrap();
    assert!(!assistant.pointer_up(&mut doc, insights, 1_200).unwrap());
    assert!(doc.elements_with_class(HIGHLIGHT_TARGET_CLASS).is_empty());
    assert!(assistant.take_events().is_empty());
}

#[test]
fn chat_press_opens_window_and_closes_menu() {
    let (mut doc, mut assistant) = mounted();
    let chat = assistant.find_button::<ChatButton>().unwrap();
    assistant.open_menu(&mut doc);
    assistant.take_events();

    assistant.pointer_down(chat, 0).unwrap();
    assistant.pointer_up(&mut doc, chat, 10).unwrap();

    assert!(assistant.button::<ChatButton>(chat).unwrap().is_chat_open());
    assert!(!assistant.is_menu_open());
    assert!(doc.elements_with_class(HIGHLIGHT_TARGET_CLASS).is_empty());
    assert_eq!(
        assistant.take_events(),
        vec![
            AssistantEvent::ButtonPressed { button: chat },
            AssistantEvent::MenuToggled { open: false },
        ]
    );

    assistant.unmount(&mut doc);
    assert!(!assistant.button::<ChatButton>(chat).unwrap().is_chat_open());
}

// ─── Configuration ───────────────────────────────────────────────────────

#[test]
fn configured_positions_and_gradients_reach_the_page() {
    let config = AssistantConfig::from_json(
        r##"{
            "menu_button_gradient": "linear-gradient(90deg, #111 0%, #222 100%)",
            "buttons": [
                {"kind": "chat", "id": "talk"},
                {"kind": "custom", "id": "pin", "position_x": -60, "position_y": -20,
                 "background_gradient": "#ff0000"}
            ]
        }"##,
    )
    .unwrap();
    let mut assistant = Assistant::from_config(config).unwrap();
    let mut doc = page();
    let root = doc.root;
    assistant.mount(&mut doc, root);

    let talk = doc.get(doc.by_id("talk").unwrap()).unwrap();
    assert_eq!(
        talk.attr("style"),
        Some("background: linear-gradient(90deg, #111 0%, #222 100%)")
    );
    let pin = doc.get(doc.by_id("pin").unwrap()).unwrap();
    assert_eq!(pin.attr("style"), Some("background: #ff0000"));

    let css = doc.style(POSITION_STYLE_ID).unwrap();
    assert!(css.contains(
        ".aiFloatingButtonContainer.menu-open #pin { transform: scale(1) translate(-60px, -20px); }"
    ));
}

#[test]
fn duplicate_button_ids_are_rejected() {
    let config = AssistantConfig::from_json(
        r#"{"buttons": [{"kind": "chat", "id": "x"}, {"kind": "translate", "id": "x"}]}"#,
    )
    .unwrap();
    assert!(Assistant::from_config(config).is_err());
}
