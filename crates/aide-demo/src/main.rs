//! Headless walkthrough of the assistant.
//!
//! Builds a small dashboard page, mounts the assistant on it and plays the
//! gestures a user would make: open the menu, preview targets, drag the
//! translate button onto a table row, drop the insights button on a chart
//! and chat. Requests are answered by a canned action model.
//!
//! Usage: `aide-demo [config.json]`. Set `RUST_LOG=debug` for the details.

use aide_core::{ChartControl, Document, ElementId, element_at, parse_markup};
use aide_menu::{
    ActionModel, Assistant, AssistantConfig, AssistantEvent, ChatButton, DragEvent,
    InsightsButton, PointerInfo, Result as AssistResult, TranslateButton,
};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::error::Error;
use std::sync::Arc;

const DEMO_PAGE: &str = r#"
<body id="page" bounds="0 0 1280 800">
  <ul id="feed" class="sapMList" bounds="16 16 600 120">
    <li id="post1" class="sapMFeedListItem" bounds="16 16 600 60">
      <span class="sapMFeedListItemText" bounds="24 24 400 40">Shipping was fast and the support team was lovely.</span>
    </li>
  </ul>
  <table id="orders" class="sapMListTbl" bounds="16 160 600 80">
    <tr id="order42" class="sapMListTblRow" bounds="16 160 600 40">
      <td bounds="16 160 300 40"><span class="sapMText" bounds="20 168 200 24">Lieferung verspätet</span></td>
    </tr>
  </table>
  <div id="revenueChart" class="viz-frame line-chart" bounds="640 16 600 400">
    <div class="v-title" bounds="640 16 600 30">Revenue by Quarter</div>
    <svg id="revenuePlot" bounds="640 50 600 360">
      <path id="revenueLine" bounds="660 100 560 300"/>
    </svg>
  </div>
</body>
"#;

const DEMO_CONFIG: &str = r##"{
    "theme_color": "#0A6ED1",
    "locale": "en-US",
    "buttons": [
        {"kind": "chat", "window_title": "Ask Aide"},
        {"kind": "translate", "default_language": "en"},
        {"kind": "insights"}
    ]
}"##;

/// Answers every action with a plausible canned reply.
struct CannedModel;

#[async_trait]
impl ActionModel for CannedModel {
    async fn execute(&self, action_path: &str, params: Map<String, Value>) -> AssistResult<Value> {
        let prompt = params.get("prompt").and_then(Value::as_str).unwrap_or_default();
        log::debug!("{action_path} <- {} chars", prompt.len());

        let response = if prompt.starts_with("Translate the following text") {
            "Delivery delayed".to_string()
        } else if prompt.contains("[SUMMARY]") {
            "[SUMMARY] Revenue grew every quarter, with the steepest rise in Q4. [/SUMMARY]\n\
             [INSIGHTS]\n\
             • Q4 revenue is almost double Q1.\n\
             • Growth accelerated in the second half.\n\
             [/INSIGHTS]\n\
             [CONFIDENCE] 85% - four complete quarters, clear trend. [/CONFIDENCE]"
                .to_string()
        } else {
            format!("You asked: {prompt}")
        };
        Ok(json!({ "response": response }))
    }
}

fn build_page() -> Result<Document, Box<dyn Error>> {
    let mut doc = parse_markup(DEMO_PAGE)?;
    let control: ChartControl = serde_json::from_value(json!({
        "viz_type": "line",
        "title": "Revenue by Quarter",
        "dataset": {
            "dimensions": [{"name": "quarter"}],
            "measures": [{"name": "revenue"}],
            "binding": {
                "rows": [
                    {"quarter": "Q1", "revenue": 120},
                    {"quarter": "Q2", "revenue": 150},
                    {"quarter": "Q3", "revenue": 180},
                    {"quarter": "Q4", "revenue": 235}
                ]
            }
        }
    }))?;
    doc.register_control("revenueChart", control);
    Ok(doc)
}

fn load_config() -> Result<AssistantConfig, Box<dyn Error>> {
    let json = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading configuration from {path}");
            std::fs::read_to_string(path)?
        }
        None => DEMO_CONFIG.to_string(),
    };
    Ok(AssistantConfig::from_json(&json)?)
}

/// A short press on a menu button.
fn click(assistant: &mut Assistant, doc: &mut Document, button: ElementId) -> AssistResult<()> {
    assistant.pointer_down(button, 0)?;
    assistant.pointer_up(doc, button, 120)?;
    Ok(())
}

/// Drag `button` through `path` and drop it at the last point.
fn drag_along(
    assistant: &mut Assistant,
    doc: &mut Document,
    button: ElementId,
    path: &[(f32, f32)],
) -> AssistResult<()> {
    if !assistant.start_drag(doc, button)? {
        log::warn!("{button:?} is not draggable");
        return Ok(());
    }
    for &(x, y) in path {
        let node = element_at(doc, x, y);
        assistant.handle_drag_event(doc, DragEvent::DragOver { node });
    }
    if let Some(&(x, y)) = path.last() {
        let node = element_at(doc, x, y);
        let pointer = Some(PointerInfo { x, y });
        assistant.handle_drag_event(doc, DragEvent::Drop { node, pointer });
    }
    Ok(())
}

/// Drain notifications and answer the requests among them.
async fn answer_requests(assistant: &mut Assistant) {
    for event in assistant.take_events() {
        match event {
            AssistantEvent::Translate {
                button,
                source_text,
                target_language_name,
                ..
            } => {
                if let Err(e) = assistant
                    .translate(button, &source_text, &target_language_name)
                    .await
                {
                    log::warn!("translation failed: {e}");
                }
            }
            AssistantEvent::InsightsRequest { button, prompt, .. } => {
                if let Err(e) = assistant.request_insights(button, &prompt).await {
                    log::warn!("insights failed: {e}");
                }
            }
            AssistantEvent::ActionPerformed { action, content, .. } => {
                log::info!("{action} dropped on \"{content}\"");
            }
            other => log::debug!("{other:?}"),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut doc = build_page()?;
    let mut assistant = Assistant::from_config(load_config()?)?;
    assistant.set_action_model(Arc::new(CannedModel))?;

    let root = doc.root;
    assistant.mount(&mut doc, root);
    assistant.toggle_menu(&mut doc);
    log::info!(
        "assistant {} mounted, menu open: {}",
        assistant.id(),
        assistant.is_menu_open()
    );

    if let Some(translate) = assistant.find_button::<TranslateButton>() {
        click(&mut assistant, &mut doc, translate)?;
        log::info!(
            "preview marks {} element(s)",
            doc.elements_with_class(aide_menu::highlight::HIGHLIGHT_TARGET_CLASS).len()
        );
        click(&mut assistant, &mut doc, translate)?;

        drag_along(
            &mut assistant,
            &mut doc,
            translate,
            &[(100.0, 40.0), (700.0, 500.0), (60.0, 178.0)],
        )?;
        answer_requests(&mut assistant).await;
        log::info!(
            "translation: {}",
            assistant.button::<TranslateButton>(translate)?.translation()
        );
    }

    if let Some(insights) = assistant.find_button::<InsightsButton>() {
        drag_along(&mut assistant, &mut doc, insights, &[(700.0, 200.0)])?;
        answer_requests(&mut assistant).await;
        if let Some(popover) = assistant.button::<InsightsButton>(insights)?.popover() {
            log::info!("summary: {}", popover.summary);
            for insight in &popover.insights {
                log::info!("  • {insight}");
            }
            log::info!("confidence: {} ({})", popover.confidence, popover.confidence_color());
        }
    }

    if let Some(chat) = assistant.find_button::<ChatButton>() {
        assistant.open_menu(&mut doc);
        click(&mut assistant, &mut doc, chat)?;
        assistant
            .button_mut::<ChatButton>(chat)?
            .set_draft("What changed in Q4?");
        if let Some(prompt) = assistant.submit_chat(chat)? {
            match assistant.chat_send(chat, &prompt).await {
                Ok(answer) => log::info!("chat: {answer}"),
                Err(e) => log::warn!("chat failed: {e}"),
            }
        }
        answer_requests(&mut assistant).await;
    }

    assistant.unmount(&mut doc);
    log::info!("unmounted; page is clean: {}", doc.style_ids().next().is_none());
    Ok(())
}
