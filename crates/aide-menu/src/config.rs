//! Assistant configuration, deserialised from JSON.
//!
//! Every field has a default, so `{}` is a complete configuration: the
//! theme-colored default gradients, the action-backed provider and the
//! chat, translate and insights buttons.

use crate::button::{ButtonSettings, MenuButton};
use crate::buttons::{
    CHAT_ACTION, CHAT_ICON, CHAT_TOOLTIP, ChatButton, ChatOptions, CustomButton, INSIGHTS_ACTION,
    INSIGHTS_ICON, INSIGHTS_TOOLTIP, InsightsButton, TRANSLATE_ACTION, TRANSLATE_ICON,
    TRANSLATE_TOOLTIP, TranslateButton,
};
use crate::error::{AssistError, Result};
use crate::provider::{DEFAULT_ACTION_PATH, DEFAULT_PROVIDER_ID};
use crate::target::{ChartTargeting, DEFAULT_CHART_SELECTOR, TargetClasses, Targeting};
use aide_core::color::{DEFAULT_GRADIENT, DEFAULT_THEME_COLOR, computed_gradient};
use aide_core::radial::Offset;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Derive gradients from the theme color.
    pub use_theme_colors: bool,
    pub theme_color: Option<String>,
    pub main_button_gradient: Option<String>,
    pub menu_button_gradient: Option<String>,
    pub active_provider: String,
    /// Host action invoked by the default provider.
    pub action_path: String,
    pub locale: String,
    pub target_classes: TargetClasses,
    pub buttons: Vec<ButtonConfig>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            use_theme_colors: true,
            theme_color: None,
            main_button_gradient: None,
            menu_button_gradient: None,
            active_provider: DEFAULT_PROVIDER_ID.to_string(),
            action_path: DEFAULT_ACTION_PATH.to_string(),
            locale: "en".to_string(),
            target_classes: TargetClasses::default(),
            buttons: vec![
                ButtonConfig::Chat(ChatConfig::default()),
                ButtonConfig::Translate(TranslateConfig::default()),
                ButtonConfig::Insights(InsightsConfig::default()),
            ],
        }
    }
}

impl AssistantConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Gradient derived from the theme color, when theme colors are on.
    fn theme_gradient(&self) -> Option<String> {
        self.use_theme_colors.then(|| {
            computed_gradient(Some(
                self.theme_color.as_deref().unwrap_or(DEFAULT_THEME_COLOR),
            ))
        })
    }

    pub fn main_gradient(&self) -> String {
        self.main_button_gradient
            .clone()
            .or_else(|| self.theme_gradient())
            .unwrap_or_else(|| DEFAULT_GRADIENT.to_string())
    }

    pub fn menu_gradient(&self) -> String {
        self.menu_button_gradient
            .clone()
            .or_else(|| self.theme_gradient())
            .unwrap_or_else(|| DEFAULT_GRADIENT.to_string())
    }

    /// Build the configured buttons, in order.
    pub fn build_buttons(&self) -> Result<Vec<MenuButton>> {
        let mut buttons: Vec<MenuButton> = Vec::with_capacity(self.buttons.len());
        for (index, config) in self.buttons.iter().enumerate() {
            let button = config.build(index, &self.target_classes)?;
            if buttons.iter().any(|b| b.id() == button.id()) {
                return Err(AssistError::Config(format!(
                    "duplicate button id `{}`",
                    button.id()
                )));
            }
            buttons.push(button);
        }
        Ok(buttons)
    }
}

// ─── Buttons ─────────────────────────────────────────────────────────────

/// Fields every button accepts. Unset fields take the variant's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonConfig {
    pub id: Option<String>,
    pub icon: Option<String>,
    pub tooltip: Option<String>,
    pub action: Option<String>,
    pub draggable: Option<bool>,
    pub highlight_on_click: Option<bool>,
    pub position_x: f64,
    pub position_y: f64,
    pub background_gradient: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub window_title: String,
    pub placeholder: String,
    pub window_width: String,
    pub window_height: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        let options = ChatOptions::default();
        Self {
            common: CommonConfig::default(),
            window_title: options.title,
            placeholder: options.placeholder,
            window_width: options.width,
            window_height: options.height,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub default_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub chart_selector: String,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            common: CommonConfig::default(),
            chart_selector: DEFAULT_CHART_SELECTOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ButtonConfig {
    Chat(ChatConfig),
    Translate(TranslateConfig),
    Insights(InsightsConfig),
    Custom(CommonConfig),
}

/// Variant defaults applied under [`CommonConfig`].
struct Defaults {
    prefix: &'static str,
    icon: &'static str,
    tooltip: &'static str,
    action: &'static str,
    draggable: bool,
    highlight_on_click: bool,
}

impl ButtonConfig {
    pub fn common(&self) -> &CommonConfig {
        match self {
            Self::Chat(c) => &c.common,
            Self::Translate(c) => &c.common,
            Self::Insights(c) => &c.common,
            Self::Custom(c) => c,
        }
    }

    fn defaults(&self) -> Defaults {
        match self {
            Self::Chat(_) => Defaults {
                prefix: "aiChatButton",
                icon: CHAT_ICON,
                tooltip: CHAT_TOOLTIP,
                action: CHAT_ACTION,
                draggable: false,
                highlight_on_click: true,
            },
            Self::Translate(_) => Defaults {
                prefix: "aiTranslateButton",
                icon: TRANSLATE_ICON,
                tooltip: TRANSLATE_TOOLTIP,
                action: TRANSLATE_ACTION,
                draggable: true,
                highlight_on_click: true,
            },
            Self::Insights(_) => Defaults {
                prefix: "aiInsightsButton",
                icon: INSIGHTS_ICON,
                tooltip: INSIGHTS_TOOLTIP,
                action: INSIGHTS_ACTION,
                draggable: true,
                highlight_on_click: true,
            },
            Self::Custom(_) => Defaults {
                prefix: "aiMenuButton",
                icon: "e024",
                tooltip: "",
                action: "",
                draggable: true,
                highlight_on_click: true,
            },
        }
    }

    fn settings(&self, index: usize) -> Result<ButtonSettings> {
        let common = self.common();
        let defaults = self.defaults();

        let id = match common.id.as_deref() {
            Some(id) if id.trim().is_empty() => {
                return Err(AssistError::Config("button id is blank".into()));
            }
            Some(id) => id.to_string(),
            None => format!("{}{index}", defaults.prefix),
        };

        let mut settings = ButtonSettings::new(&id);
        settings.icon = common.icon.clone().unwrap_or_else(|| defaults.icon.to_string());
        settings.tooltip = common
            .tooltip
            .clone()
            .unwrap_or_else(|| defaults.tooltip.to_string());
        settings.action = common
            .action
            .clone()
            .unwrap_or_else(|| defaults.action.to_string());
        settings.draggable = common.draggable.unwrap_or(defaults.draggable);
        settings.highlight_on_click = common
            .highlight_on_click
            .unwrap_or(defaults.highlight_on_click);
        settings.position = Offset::new(common.position_x, common.position_y);
        settings.background_gradient = common.background_gradient.clone();
        Ok(settings)
    }

    /// Build the button at `index` of the menu.
    pub fn build(&self, index: usize, classes: &TargetClasses) -> Result<MenuButton> {
        let settings = self.settings(index)?;
        let button = match self {
            Self::Chat(c) => MenuButton::new(
                settings,
                ChatButton::new(ChatOptions {
                    title: c.window_title.clone(),
                    placeholder: c.placeholder.clone(),
                    width: c.window_width.clone(),
                    height: c.window_height.clone(),
                }),
            ),
            Self::Translate(c) => MenuButton::new(
                settings,
                TranslateButton::new(c.default_language.clone(), Targeting::generic(classes.clone())),
            ),
            Self::Insights(c) => {
                let targeting =
                    ChartTargeting::with_selector(&c.chart_selector).map_err(AssistError::Config)?;
                MenuButton::new(settings, InsightsButton::new(targeting))
            }
            Self::Custom(_) => MenuButton::new(
                settings,
                CustomButton::new(Targeting::generic(classes.clone())),
            ),
        };
        Ok(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::ButtonKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_the_default() {
        let config = AssistantConfig::from_json("{}").unwrap();
        assert_eq!(config, AssistantConfig::default());

        let buttons = config.build_buttons().unwrap();
        let kinds: Vec<ButtonKind> = buttons.iter().map(MenuButton::kind).collect();
        assert_eq!(kinds, vec![ButtonKind::Chat, ButtonKind::Translate, ButtonKind::Insights]);
        assert!(!buttons[0].settings.draggable);
        assert_eq!(buttons[1].settings.icon, "e28b");
        assert_eq!(buttons[2].settings.tooltip, INSIGHTS_TOOLTIP);
    }

    #[test]
    fn gradients_follow_theme_settings() {
        let config = AssistantConfig::default();
        assert_eq!(
            config.menu_gradient(),
            "linear-gradient(135deg, #1661BE 0%, rgb(17, 77, 152) 70%)"
        );

        let config = AssistantConfig {
            use_theme_colors: false,
            main_button_gradient: Some("red".into()),
            ..AssistantConfig::default()
        };
        assert_eq!(config.main_gradient(), "red");
        assert_eq!(config.menu_gradient(), DEFAULT_GRADIENT);
    }

    #[test]
    fn button_overrides_and_variant_options() {
        let config = AssistantConfig::from_json(
            r#"{
                "locale": "de-DE",
                "buttons": [
                    {"kind": "custom", "id": "summarize", "action": "summarize", "tooltip": "Summarize", "position_x": 10},
                    {"kind": "translate", "id": "tr", "default_language": "fr", "highlight_on_click": false}
                ]
            }"#,
        )
        .unwrap();
        let buttons = config.build_buttons().unwrap();

        assert_eq!(buttons[0].id().as_str(), "summarize");
        assert_eq!(buttons[0].settings.action, "summarize");
        assert_eq!(buttons[0].settings.icon, "e024");
        assert_eq!(buttons[0].settings.position, Offset::new(10.0, 0.0));
        assert!(!buttons[1].settings.highlight_on_click);
        assert_eq!(buttons[1].settings.action, "translate");
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let dup = r#"{"buttons": [{"kind": "custom", "id": "a"}, {"kind": "chat", "id": "a"}]}"#;
        assert!(matches!(
            AssistantConfig::from_json(dup).unwrap().build_buttons(),
            Err(AssistError::Config(_))
        ));

        let selector = r#"{"buttons": [{"kind": "insights", "chart_selector": "div > svg"}]}"#;
        assert!(AssistantConfig::from_json(selector).unwrap().build_buttons().is_err());

        assert!(matches!(
            AssistantConfig::from_json(r#"{"buttons": [{"kind": "radio"}]}"#),
            Err(AssistError::Config(_))
        ));
    }
}
