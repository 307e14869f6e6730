//! Notifications the assistant produces and the drag events it consumes.
//!
//! Notifications are queued on the assistant and drained by the host with
//! [`crate::Assistant::take_events`], in the order they happened.

use aide_core::{ChartData, ElementId, NodeIndex};

/// Pointer details of the event that caused an action.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerInfo {
    pub x: f32,
    pub y: f32,
}

/// What happened, as reported to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantEvent {
    // ─── Container ───────────────────────────────────────────────────────
    /// A dragged button was dropped on a valid target.
    ActionPerformed {
        button: ElementId,
        action: String,
        target: NodeIndex,
        content: String,
        pointer: Option<PointerInfo>,
    },
    RequestStarted {
        button: Option<ElementId>,
        prompt: String,
    },
    RequestCompleted {
        button: Option<ElementId>,
        response: String,
    },
    RequestFailed {
        button: Option<ElementId>,
        error: String,
    },
    MenuToggled {
        open: bool,
    },

    // ─── Buttons ─────────────────────────────────────────────────────────
    /// A short click (not a drag) on a menu button.
    ButtonPressed {
        button: ElementId,
    },
    DragStarted {
        button: ElementId,
    },
    ChatSend {
        button: ElementId,
        prompt: String,
    },
    Translate {
        button: ElementId,
        source_text: String,
        target_language: String,
        target_language_name: String,
    },
    InsightsRequest {
        button: ElementId,
        chart_id: String,
        chart_type: String,
        chart_title: String,
        prompt: String,
        payload: Box<ChartData>,
        target: NodeIndex,
    },
}

/// Document-level drag events, each carrying the element under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    DragOver {
        node: Option<NodeIndex>,
    },
    DragEnter {
        node: Option<NodeIndex>,
    },
    Drop {
        node: Option<NodeIndex>,
        pointer: Option<PointerInfo>,
    },
    DragEnd,
}

/// What the host should do with the platform event after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Not ours; let it propagate.
    Ignored,
    /// Call `preventDefault` / `stopPropagation` and set `dropEffect = copy`.
    PreventDefault,
}
