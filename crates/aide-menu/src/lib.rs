pub mod assistant;
pub mod button;
pub mod buttons;
pub mod config;
pub mod error;
pub mod event;
pub mod extract;
pub mod highlight;
pub mod provider;
pub mod request;
pub mod session;
pub mod target;

pub use assistant::Assistant;
pub use button::{ButtonBehavior, ButtonKind, ButtonSettings, MenuButton, PressEffect};
pub use buttons::{ChatButton, CustomButton, InsightsButton, TranslateButton};
pub use config::{AssistantConfig, ButtonConfig};
pub use error::{AssistError, Result};
pub use event::{AssistantEvent, DragEvent, EventDisposition, PointerInfo};
pub use provider::{ActionModel, ActionProvider, AiProvider, ProviderRegistry};
pub use request::{PendingRequest, RequestKind, RequestOutcome};
pub use session::DragSession;
pub use target::{DropTarget, TargetClasses, Targeting};
