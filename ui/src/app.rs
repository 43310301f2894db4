use std::collections::HashSet;
use std::time::Duration;

use iced::{Application, Command, Element, Subscription, Theme};

use mmflink_core::{
    targets, ContentSource, EventDispatcher, HttpCommandClient, PluginSettings, SessionState,
    TabVisibility,
};

use crate::logging::{apply_log_level, LogEntry, LogLevel, LogStore, ReloadHandle};

mod actions;
mod helpers;
mod push;
mod styles;
mod types;
mod views;

pub use types::{CommandErrorInfo, Flags, Message, PushUpdate, SettingsRefresh, Tab};
use types::{PushStatus, ShownNotice};

const LOG_TICK: Duration = Duration::from_millis(250);

pub struct MmfLinkApp {
    log_store: LogStore,
    reload_handle: ReloadHandle,
    log_entries: Vec<LogEntry>,
    log_level: LogLevel,
    known_targets: HashSet<String>,
    enabled_targets: HashSet<String>,
    copy_status: Option<String>,
    active_tab: Tab,
    state: SessionState,
    dispatcher: EventDispatcher,
    tabs: TabVisibility,
    client: HttpCommandClient,
    push_url: String,
    push_status: PushStatus,
    settings: PluginSettings,
    settings_loaded: bool,
    settings_status: Option<String>,
    content_source: ContentSource,
    notices: Vec<ShownNotice>,
    next_notice_id: u64,
}

impl Application for MmfLinkApp {
    type Executor = crate::executor::TokioExecutor;
    type Message = Message;
    type Theme = Theme;
    type Flags = Flags;

    fn new(flags: Flags) -> (Self, Command<Message>) {
        let known_targets: HashSet<String> =
            targets::ALL.iter().map(|value| value.to_string()).collect();
        let enabled_targets = known_targets.clone();
        let dispatcher = EventDispatcher::new(flags.config.plugin_identifier.clone());
        let tabs = TabVisibility::new(Tab::Library.host_id(), flags.config.content_url.clone());

        let mut app = Self {
            log_store: flags.log_store,
            reload_handle: flags.reload_handle,
            log_entries: Vec::new(),
            log_level: flags.log_level,
            known_targets,
            enabled_targets,
            copy_status: None,
            active_tab: Tab::Library,
            state: SessionState::new(),
            dispatcher,
            tabs,
            client: flags.client,
            push_url: flags.config.push_socket_url(),
            push_status: PushStatus::Connecting,
            settings: PluginSettings::default(),
            settings_loaded: false,
            settings_status: None,
            content_source: ContentSource::Blank,
            notices: Vec::new(),
            next_notice_id: 0,
        };

        let opened = app
            .tabs
            .on_tab_change(Tab::Library.host_id(), None)
            .into_iter()
            .collect();
        let commands = Command::batch(vec![
            app.apply_effects(opened),
            app.fetch_settings(SettingsRefresh::Initial),
        ]);
        (app, commands)
    }

    fn title(&self) -> String {
        "MyMiniFactory Link".to_string()
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::LogTick => {
                self.refresh_logs();
                self.expire_notices();
                Command::none()
            }
            Message::LogLevelChanged(level) => {
                self.log_level = level;
                apply_log_level(&self.reload_handle, level);
                tracing::info!(target: targets::UI, "Log level set to {}", level);
                Command::none()
            }
            Message::ToggleTarget(target, enabled) => {
                if enabled {
                    self.enabled_targets.insert(target);
                } else {
                    self.enabled_targets.remove(&target);
                }
                Command::none()
            }
            Message::CopyDiagnostics => {
                self.copy_status = Some(self.copy_diagnostics());
                Command::none()
            }
            Message::SelectTab(tab) => self.select_tab(tab),
            Message::SettingsLoaded { refresh, result } => self.settings_loaded(refresh, result),
            Message::ReloadSettings => self.fetch_settings(SettingsRefresh::Updated),
            Message::SaveSettings => self.save_settings(),
            Message::SettingsSaved(result) => self.settings_saved(result),
            Message::ManufacturerSelected(manufacturer) => {
                self.state.select_manufacturer(manufacturer);
                Command::none()
            }
            Message::ModelSelected(model) => {
                self.state.select_model(model);
                Command::none()
            }
            Message::Register => self.register(),
            Message::ConfirmForget => {
                if !self.state.confirm_forget() {
                    tracing::debug!(target: targets::UI, "Forget prompt needs a registered printer");
                }
                Command::none()
            }
            Message::CancelForget => {
                self.state.cancel_forget();
                Command::none()
            }
            Message::Forget => {
                let effects = self.state.forget_registration();
                self.apply_effects(effects)
            }
            Message::ConfirmBedCleared => {
                let effects = self.state.confirm_bed_cleared();
                self.apply_effects(effects)
            }
            Message::DismissPrintPrompt => {
                self.state.dismiss_print_prompt();
                Command::none()
            }
            Message::ReopenPrintPrompt => {
                self.state.reopen_print_prompt();
                Command::none()
            }
            Message::CommandFinished { command, result } => {
                self.command_finished(command, result)
            }
            Message::Push(update) => self.push_update(update),
            Message::CloseNotice(id) => {
                self.notices.retain(|shown| shown.id != id);
                Command::none()
            }
            Message::OpenUrl(url) => {
                if let Err(error) = open::that(&url) {
                    tracing::warn!(target: targets::UI, url = %url, "Failed to open browser: {}", error);
                }
                Command::none()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let log_tick = iced::time::every(LOG_TICK).map(|_| Message::LogTick);
        let push = push::connect(self.push_url.clone(), self.client.clone());
        Subscription::batch(vec![log_tick, push])
    }

    fn view(&self) -> Element<'_, Message> {
        self.root_view()
    }
}
