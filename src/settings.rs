//! Chat configuration (static YAML served next to the app) and the user's
//! display preferences layered on top of it.

use crate::constants::{
    CHAT_OPENERS_FILE, CONFIG_FILES, DEFAULT_APP_NAME, DEFAULT_CHAT_OPENERS, DEFAULT_DESCRIPTION,
    DEFAULT_FULL_DESCRIPTION_PATH, DEFAULT_INPUT_PLACEHOLDER, DEFAULT_LOGO_PATH, DEFAULT_LOGO_SIZE,
};
use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

// ---------------------------------------------------------------------------
// Display enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Mono,
    Pretendard,
}

impl FontFamily {
    pub fn css_stack(self) -> &'static str {
        match self {
            FontFamily::Sans => "ui-sans-serif, system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif",
            FontFamily::Serif => "ui-serif, Georgia, Cambria, 'Times New Roman', Times, serif",
            FontFamily::Mono => "ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, 'Liberation Mono', 'Courier New', monospace",
            FontFamily::Pretendard => "'Pretendard Variable', Pretendard, -apple-system, BlinkMacSystemFont, system-ui, Roboto, 'Helvetica Neue', 'Segoe UI', 'Apple SD Gothic Neo', 'Noto Sans KR', sans-serif",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub fn css_px(self) -> &'static str {
        match self {
            FontSize::Small => "14px",
            FontSize::Medium => "16px",
            FontSize::Large => "18px",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
    Auto,
}

impl ColorScheme {
    /// `auto` follows the platform preference.
    pub fn is_dark(self, prefers_dark: bool) -> bool {
        match self {
            ColorScheme::Light => false,
            ColorScheme::Dark => true,
            ColorScheme::Auto => prefers_dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatWidth {
    Default,
    #[default]
    Wide,
}

// ---------------------------------------------------------------------------
// Chat configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandingConfig {
    pub app_name: String,
    pub logo_path: String,
    pub logo_width: u32,
    pub logo_height: u32,
    pub description: Option<String>,
    pub chat_openers: Vec<String>,
    pub full_description: Option<String>,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            logo_path: DEFAULT_LOGO_PATH.to_string(),
            logo_width: DEFAULT_LOGO_SIZE,
            logo_height: DEFAULT_LOGO_SIZE,
            description: Some(DEFAULT_DESCRIPTION.to_string()),
            chat_openers: DEFAULT_CHAT_OPENERS.iter().map(|s| s.to_string()).collect(),
            full_description: Some(DEFAULT_FULL_DESCRIPTION_PATH.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonsConfig {
    pub enable_file_upload: bool,
    pub chat_input_placeholder: String,
}

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self {
            enable_file_upload: true,
            chat_input_placeholder: DEFAULT_INPUT_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThreadsConfig {
    pub show_history: bool,
    pub enable_deletion: bool,
    pub enable_title_edit: bool,
    pub auto_generate_titles: bool,
    pub sidebar_open_by_default: bool,
}

impl Default for ThreadsConfig {
    fn default() -> Self {
        Self {
            show_history: false,
            enable_deletion: true,
            enable_title_edit: true,
            auto_generate_titles: true,
            sidebar_open_by_default: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeConfig {
    pub font_family: FontFamily,
    pub font_size: FontSize,
    pub color_scheme: ColorScheme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiConfig {
    pub auto_collapse_tool_calls: bool,
    pub chat_width: ChatWidth,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            auto_collapse_tool_calls: true,
            chat_width: ChatWidth::Wide,
        }
    }
}

/// Each section merges field by field with the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub branding: BrandingConfig,
    pub buttons: ButtonsConfig,
    pub threads: ThreadsConfig,
    pub theme: ThemeConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ChatOpenersFile {
    chat_openers: Option<Vec<String>>,
}

impl ChatConfig {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Apply a `chat-openers.yaml` document.  Returns `false` when it carried
    /// no usable list.
    pub fn apply_openers_yaml(&mut self, text: &str) -> bool {
        match serde_yaml::from_str::<ChatOpenersFile>(text) {
            Ok(ChatOpenersFile { chat_openers: Some(openers) }) => {
                self.branding.chat_openers = openers;
                true
            }
            Ok(_) => false,
            Err(e) => {
                crate::warn_log!("Ignoring malformed {}: {}", CHAT_OPENERS_FILE, e);
                false
            }
        }
    }
}

/// Fetch the chat configuration: the first configuration file that exists,
/// then the optional openers override.  Any failure falls back to defaults.
pub async fn load_chat_config() -> ChatConfig {
    let mut config = None;
    for path in CONFIG_FILES {
        match fetch_static(path).await {
            Ok(Some(text)) => {
                config = match ChatConfig::from_yaml(&text) {
                    Ok(parsed) => Some(parsed),
                    Err(e) => {
                        crate::error_log!("Error parsing {}: {}", path, e);
                        None
                    }
                };
                break;
            }
            Ok(None) => continue,
            Err(e) => {
                crate::warn_log!("Failed to fetch {}: {}", path, e);
            }
        }
    }

    let mut config = match config {
        Some(c) => c,
        None => {
            crate::debug_log!("No chat configuration found, using defaults");
            return ChatConfig::default();
        }
    };

    if let Ok(Some(text)) = fetch_static(CHAT_OPENERS_FILE).await {
        if config.apply_openers_yaml(&text) {
            crate::debug_log!("Loaded {} chat openers", config.branding.chat_openers.len());
        }
    }
    config
}

/// Same-origin GET.  `Ok(None)` for non-2xx responses.
async fn fetch_static(path: &str) -> ClientResult<Option<String>> {
    let window = web_sys::window().ok_or_else(|| ClientError::Js("no global window".into()))?;
    let resp: web_sys::Response = JsFuture::from(window.fetch_with_str(path)).await?.dyn_into()?;
    if !resp.ok() {
        return Ok(None);
    }
    let text = JsFuture::from(resp.text()?).await?;
    Ok(text.as_string())
}

// ---------------------------------------------------------------------------
// User settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub font_family: FontFamily,
    pub font_size: FontSize,
    pub color_scheme: ColorScheme,
    pub auto_collapse_tool_calls: bool,
    pub chat_width: ChatWidth,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettingsPatch {
    pub font_family: Option<FontFamily>,
    pub font_size: Option<FontSize>,
    pub color_scheme: Option<ColorScheme>,
    pub auto_collapse_tool_calls: Option<bool>,
    pub chat_width: Option<ChatWidth>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self::defaults_from(&ChatConfig::default())
    }
}

impl UserSettings {
    pub fn defaults_from(config: &ChatConfig) -> Self {
        Self {
            font_family: config.theme.font_family,
            font_size: config.theme.font_size,
            color_scheme: config.theme.color_scheme,
            auto_collapse_tool_calls: config.ui.auto_collapse_tool_calls,
            chat_width: config.ui.chat_width,
        }
    }

    /// Stored blob layered over the config defaults.  Every field is read
    /// on its own, so one bad value does not discard the others.
    pub fn from_stored(stored: Option<&str>, config: &ChatConfig) -> Self {
        let mut settings = Self::defaults_from(config);
        let obj = match stored.and_then(|s| serde_json::from_str::<Value>(s).ok()) {
            Some(Value::Object(obj)) => obj,
            _ => return settings,
        };
        let field = |key: &str| obj.get(key).cloned().unwrap_or(Value::Null);
        settings.apply(UserSettingsPatch {
            font_family: serde_json::from_value(field("fontFamily")).ok(),
            font_size: serde_json::from_value(field("fontSize")).ok(),
            color_scheme: serde_json::from_value(field("colorScheme")).ok(),
            auto_collapse_tool_calls: field("autoCollapseToolCalls").as_bool(),
            chat_width: serde_json::from_value(field("chatWidth")).ok(),
        });
        settings
    }

    pub fn apply(&mut self, patch: UserSettingsPatch) {
        if let Some(v) = patch.font_family {
            self.font_family = v;
        }
        if let Some(v) = patch.font_size {
            self.font_size = v;
        }
        if let Some(v) = patch.color_scheme {
            self.color_scheme = v;
        }
        if let Some(v) = patch.auto_collapse_tool_calls {
            self.auto_collapse_tool_calls = v;
        }
        if let Some(v) = patch.chat_width {
            self.chat_width = v;
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Write the settings onto `<html>`: font CSS variables and the `dark`
/// class.
pub fn apply_to_document(settings: &UserSettings) {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return,
    };
    let root = match window.document().and_then(|d| d.document_element()) {
        Some(el) => el,
        None => return,
    };

    if let Some(html) = root.dyn_ref::<web_sys::HtmlElement>() {
        let style = html.style();
        let _ = style.set_property("--font-family", settings.font_family.css_stack());
        let _ = style.set_property("--base-font-size", settings.font_size.css_px());
    }

    let prefers_dark = window
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
        .map(|mq| mq.matches())
        .unwrap_or(false);
    let _ = root
        .class_list()
        .toggle_with_force("dark", settings.color_scheme.is_dark(prefers_dark));
}
