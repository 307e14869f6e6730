//! Plain drag source with generic text targeting. The host reacts to its
//! `ActionPerformed` notifications.

use crate::button::{ActionContext, ButtonBehavior, ButtonKind, HighlightStyle};
use crate::buttons::GENERIC_HIGHLIGHT;
use crate::target::Targeting;
use aide_core::NodeIndex;
use std::any::Any;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedContent {
    pub target: NodeIndex,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct CustomButton {
    targeting: Targeting,
    last: Option<DroppedContent>,
}

impl CustomButton {
    pub fn new(targeting: Targeting) -> Self {
        Self {
            targeting,
            last: None,
        }
    }

    /// Content of the most recent drop.
    pub fn last_drop(&self) -> Option<&DroppedContent> {
        self.last.as_ref()
    }
}

impl ButtonBehavior for CustomButton {
    fn kind(&self) -> ButtonKind {
        ButtonKind::Custom
    }

    fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    fn handle_action(&mut self, ctx: &mut ActionContext<'_>, content: &str, target: NodeIndex) {
        log::info!("`{}` dropped on {target:?}: {} chars", ctx.button, content.len());
        self.last = Some(DroppedContent {
            target,
            content: content.to_string(),
        });
    }

    fn highlight_style(&self) -> HighlightStyle {
        GENERIC_HIGHLIGHT
    }

    fn teardown(&mut self) {
        self.last = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
