use std::time::Instant;

use mmflink_core::{
    AppConfig, CommandAck, Error, HttpCommandClient, Notice, PluginCommand, PluginMessage,
    PluginSettings, SettingsUpdate, PLUGIN_TAB_ID,
};

use crate::logging::{LogLevel, LogStore, ReloadHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Library,
    Settings,
    Debug,
}

impl Tab {
    /// Identifier the tab is known by on the host page.
    pub fn host_id(self) -> &'static str {
        match self {
            Tab::Library => PLUGIN_TAB_ID,
            Tab::Settings => "#settings_plugin_myminifactory",
            Tab::Debug => "#tab_debug",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    LogTick,
    LogLevelChanged(LogLevel),
    ToggleTarget(String, bool),
    CopyDiagnostics,
    SelectTab(Tab),
    SettingsLoaded {
        refresh: SettingsRefresh,
        result: Result<PluginSettings, CommandErrorInfo>,
    },
    ReloadSettings,
    SaveSettings,
    SettingsSaved(Result<SettingsUpdate, CommandErrorInfo>),
    ManufacturerSelected(String),
    ModelSelected(String),
    Register,
    ConfirmForget,
    CancelForget,
    Forget,
    ConfirmBedCleared,
    DismissPrintPrompt,
    ReopenPrintPrompt,
    CommandFinished {
        command: PluginCommand,
        result: Result<CommandAck, CommandErrorInfo>,
    },
    Push(PushUpdate),
    CloseNotice(u64),
    OpenUrl(String),
}

/// Why settings are being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRefresh {
    /// Binds the view; persisted print flags are replayed.
    Initial,
    /// The push socket came back; flags set while it was down are replayed.
    Reconnected,
    Updated,
}

/// What the push socket subscription reports back to `update`.
#[derive(Debug, Clone)]
pub enum PushUpdate {
    Connected,
    Disconnected(String),
    Plugin(PluginMessage),
    SettingsUpdated,
}

#[derive(Debug, Clone)]
pub struct CommandErrorInfo {
    pub summary: String,
    pub detail: String,
}

impl From<Error> for CommandErrorInfo {
    fn from(error: Error) -> Self {
        Self {
            summary: error.user_summary(),
            detail: error.technical_detail(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PushStatus {
    Connecting,
    Connected,
    Disconnected(String),
}

#[derive(Debug, Clone)]
pub(crate) struct ShownNotice {
    pub(crate) id: u64,
    pub(crate) notice: Notice,
    pub(crate) shown_at: Instant,
}

pub struct Flags {
    pub log_store: LogStore,
    pub reload_handle: ReloadHandle,
    pub log_level: LogLevel,
    pub config: AppConfig,
    pub client: HttpCommandClient,
}
