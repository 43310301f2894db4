use tracing::debug;

use crate::state::Effect;
use crate::targets;

pub const DEFAULT_CONTENT_URL: &str = "https://www.myminifactory.com/";
pub const PLUGIN_TAB_ID: &str = "#tab_plugin_myminifactory";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Url(String),
    Blank,
}

/// Points the embedded content pane at the live site only while the plugin
/// tab is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabVisibility {
    tab_id: String,
    content_url: String,
}

impl TabVisibility {
    pub fn new(tab_id: impl Into<String>, content_url: impl Into<String>) -> Self {
        Self {
            tab_id: tab_id.into(),
            content_url: content_url.into(),
        }
    }

    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    pub fn on_tab_change(&self, current: &str, previous: Option<&str>) -> Option<Effect> {
        let source = if current == self.tab_id {
            ContentSource::Url(self.content_url.clone())
        } else if previous == Some(self.tab_id.as_str()) {
            ContentSource::Blank
        } else {
            return None;
        };
        debug!(target: targets::UI, current, ?source, "Content pane source changed");
        Some(Effect::SetContentSource(source))
    }
}

impl Default for TabVisibility {
    fn default() -> Self {
        Self::new(PLUGIN_TAB_ID, DEFAULT_CONTENT_URL)
    }
}
