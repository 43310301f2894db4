pub mod actions;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod model;
pub mod print_job;
pub mod registration;
pub mod settings;
pub mod state;
pub mod tab;
pub mod targets;

pub use command::{
    plugin_settings_from_tree, CommandAck, CommandClient, CommandFuture, HttpCommandClient,
    MockCommandClient, PluginCommand,
};
pub use config::{AppConfig, CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH};
pub use dispatcher::EventDispatcher;
pub use error::{Error, StorageAction};
pub use event::{PluginMessage, PushEvent, SocketFrame};
pub use model::{
    distinct_brands, normalize_catalog, printers_for_brand, PrinterIdentity, SupportedPrinter,
    PLUGIN_IDENTIFIER,
};
pub use print_job::{PrintJob, PrintOutcome, PrintPrompt, PrintWorkflowState, PromptChange};
pub use registration::{Registration, RegistrationPhase};
pub use settings::{PluginSettings, PrintFlags, SettingsUpdate};
pub use state::{Effect, Notice, NoticeKind, SessionState};
pub use tab::{ContentSource, TabVisibility, DEFAULT_CONTENT_URL, PLUGIN_TAB_ID};
