//! Built-in button variants.

mod chat;
mod custom;
mod insights;
mod translate;

pub use chat::*;
pub use custom::*;
pub use insights::*;
pub use translate::*;

use crate::button::HighlightStyle;

/// Highlight sheet shared by the text-targeting variants.
pub const GENERIC_HIGHLIGHT: HighlightStyle = HighlightStyle {
    id: "aiMenuButtonHighlightStyles",
    css: r#"
.ai-highlight-target {
  outline: 2px dashed #00B9F2 !important;
  outline-offset: -2px;
  background-color: rgba(0, 185, 242, 0.1) !important;
  cursor: help !important;
  transition: all 0.2s ease;
}
.ai-highlight-target:hover {
  background-color: rgba(0, 185, 242, 0.2) !important;
  box-shadow: 0 0 10px rgba(0, 185, 242, 0.3);
}
.ai-highlight-active {
  background-color: rgba(0, 185, 242, 0.3) !important;
  outline-style: solid !important;
  box-shadow: 0 0 15px rgba(0, 185, 242, 0.5);
}
"#,
};
