use std::time::{Duration, Instant};

use iced::Command;

use mmflink_core::{
    targets, CommandAck, Effect, Notice, PluginCommand, PluginSettings, SettingsUpdate,
};

use super::helpers::{phase_label, workflow_label};
use super::types::{
    CommandErrorInfo, Message, PushStatus, PushUpdate, SettingsRefresh, ShownNotice, Tab,
};
use super::MmfLinkApp;
use crate::logging::LogEntry;

const NOTICE_TIMEOUT: Duration = Duration::from_secs(8);
const DIAGNOSTIC_LOG_LINES: usize = 50;

impl MmfLinkApp {
    pub(super) fn apply_effects(&mut self, effects: Vec<Effect>) -> Command<Message> {
        let mut commands = Vec::new();
        for effect in effects {
            match effect {
                Effect::Send(command) => commands.push(self.send_command(command)),
                Effect::Notify(notice) => self.push_notice(notice),
                Effect::SetContentSource(source) => self.content_source = source,
            }
        }
        Command::batch(commands)
    }

    fn send_command(&self, command: PluginCommand) -> Command<Message> {
        let client = self.client.clone();
        let request = command.clone();
        Command::perform(
            async move {
                client
                    .send(request)
                    .await
                    .map_err(CommandErrorInfo::from)
            },
            move |result| Message::CommandFinished { command, result },
        )
    }

    pub(super) fn command_finished(
        &mut self,
        command: PluginCommand,
        result: Result<CommandAck, CommandErrorInfo>,
    ) -> Command<Message> {
        match result {
            Ok(ack) => {
                match command {
                    PluginCommand::MmfPrintComplete => {
                        if !self.state.bed_clear_acknowledged(&ack) {
                            tracing::info!(
                                target: targets::PRINT_JOB,
                                "Server did not confirm the bed as cleared"
                            );
                        }
                    }
                    PluginCommand::RegisterPrinter { .. } => {
                        tracing::info!(target: targets::REGISTRATION, "Waiting for QR code");
                    }
                    PluginCommand::ForgetPrinter => {
                        tracing::info!(target: targets::REGISTRATION, "Waiting for printer removal");
                    }
                }
                Command::none()
            }
            Err(error) => {
                let effects = self
                    .state
                    .command_failed(&command, &error.summary, &error.detail);
                self.apply_effects(effects)
            }
        }
    }

    pub(super) fn register(&mut self) -> Command<Message> {
        match self.state.begin_registration() {
            Ok(effects) => self.apply_effects(effects),
            Err(error) => {
                self.push_notice(Notice::command_error(
                    &error.user_summary(),
                    &error.technical_detail(),
                ));
                Command::none()
            }
        }
    }

    pub(super) fn select_tab(&mut self, tab: Tab) -> Command<Message> {
        let previous = self.active_tab;
        if previous == tab {
            return Command::none();
        }
        self.active_tab = tab;
        if previous == Tab::Settings {
            self.state.settings_hidden();
        }
        let effects = self
            .tabs
            .on_tab_change(tab.host_id(), Some(previous.host_id()))
            .into_iter()
            .collect();
        self.apply_effects(effects)
    }

    pub(super) fn fetch_settings(&self, refresh: SettingsRefresh) -> Command<Message> {
        let client = self.client.clone();
        Command::perform(
            async move {
                client
                    .fetch_settings()
                    .await
                    .map_err(CommandErrorInfo::from)
            },
            move |result| Message::SettingsLoaded { refresh, result },
        )
    }

    pub(super) fn settings_loaded(
        &mut self,
        refresh: SettingsRefresh,
        result: Result<PluginSettings, CommandErrorInfo>,
    ) -> Command<Message> {
        let settings = match result {
            Ok(settings) => settings,
            Err(error) => {
                self.settings_status = Some(format!("Load failed: {}", error.summary));
                self.push_notice(Notice::command_error(&error.summary, &error.detail));
                return Command::none();
            }
        };

        // Whichever load lands first binds the view.
        let binding = refresh == SettingsRefresh::Initial || !self.settings_loaded;
        self.settings_loaded = true;
        self.settings_status = Some("Loaded".to_string());
        if binding {
            self.state.load_settings(&settings);
        } else {
            self.state.settings_updated(&settings);
        }
        self.settings = settings;

        if binding || refresh == SettingsRefresh::Reconnected {
            let effects = self.dispatcher.replay_persisted_flags(&mut self.state);
            return self.apply_effects(effects);
        }
        Command::none()
    }

    pub(super) fn save_settings(&mut self) -> Command<Message> {
        let pending = self.state.settings_before_save();
        self.settings_status = Some("Saving".to_string());
        let client = self.client.clone();
        Command::perform(
            async move {
                client
                    .save_settings(&pending)
                    .await
                    .map(|()| pending)
                    .map_err(CommandErrorInfo::from)
            },
            Message::SettingsSaved,
        )
    }

    pub(super) fn settings_saved(
        &mut self,
        result: Result<SettingsUpdate, CommandErrorInfo>,
    ) -> Command<Message> {
        match result {
            Ok(update) => {
                update.apply_to(&mut self.settings);
                self.settings_status = Some("Saved".to_string());
                self.push_notice(Notice::info("Settings saved", "Printer selection stored."));
            }
            Err(error) => {
                self.settings_status = Some(format!("Save failed: {}", error.summary));
                self.push_notice(Notice::command_error(&error.summary, &error.detail));
            }
        }
        Command::none()
    }

    pub(super) fn push_update(&mut self, update: PushUpdate) -> Command<Message> {
        match update {
            PushUpdate::Connected => {
                self.push_status = PushStatus::Connected;
                // Anything pushed while the socket was down is only visible through settings.
                self.fetch_settings(SettingsRefresh::Reconnected)
            }
            PushUpdate::Disconnected(reason) => {
                self.push_status = PushStatus::Disconnected(reason);
                Command::none()
            }
            PushUpdate::Plugin(message) => {
                let effects = self.dispatcher.handle_message(&mut self.state, &message);
                self.apply_effects(effects)
            }
            PushUpdate::SettingsUpdated => self.fetch_settings(SettingsRefresh::Updated),
        }
    }

    pub(super) fn push_notice(&mut self, notice: Notice) {
        tracing::debug!(
            target: targets::UI,
            title = %notice.title,
            sticky = notice.sticky,
            "Notice shown"
        );
        let id = self.next_notice_id;
        self.next_notice_id = self.next_notice_id.wrapping_add(1);
        self.notices.push(ShownNotice {
            id,
            notice,
            shown_at: Instant::now(),
        });
    }

    pub(super) fn expire_notices(&mut self) {
        let now = Instant::now();
        self.notices.retain(|shown| {
            shown.notice.sticky || now.duration_since(shown.shown_at) < NOTICE_TIMEOUT
        });
    }

    pub(super) fn refresh_logs(&mut self) {
        let entries = self.log_store.snapshot();
        for entry in &entries {
            if self.known_targets.insert(entry.target.clone()) {
                self.enabled_targets.insert(entry.target.clone());
            }
        }
        self.log_entries = entries;
    }

    pub(super) fn sorted_targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.known_targets.iter().cloned().collect();
        targets.sort();
        targets
    }

    pub(super) fn visible_entries(&self) -> Vec<&LogEntry> {
        self.log_entries
            .iter()
            .filter(|entry| self.enabled_targets.contains(&entry.target))
            .collect()
    }

    pub(super) fn copy_diagnostics(&self) -> String {
        let text = self.diagnostics_text();
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => {
                tracing::info!(target: targets::UI, "Diagnostics copied to clipboard");
                "Copied".to_string()
            }
            Err(error) => {
                tracing::warn!(target: targets::UI, "Clipboard copy failed: {}", error);
                format!("Failed: {error}")
            }
        }
    }

    pub(super) fn push_status_label(&self) -> String {
        match &self.push_status {
            PushStatus::Connecting => "connecting".to_string(),
            PushStatus::Connected => "connected".to_string(),
            PushStatus::Disconnected(reason) => format!("disconnected ({reason})"),
        }
    }

    fn diagnostics_text(&self) -> String {
        let identity = &self.state.identity;
        let mut output = String::new();
        output.push_str("MyMiniFactory Link diagnostics\n");
        output.push_str(&format!("Log level: {}\n", self.log_level));
        output.push_str(&format!("Push socket: {} ({})\n", self.push_url, self.push_status_label()));
        output.push_str(&format!(
            "Printer: {} / {}\n",
            identity.manufacturer, identity.model
        ));
        output.push_str(&format!(
            "Registration: {}\n",
            phase_label(self.state.registration.phase())
        ));
        output.push_str(&format!(
            "Serial number: {}\n",
            if identity.serial_number.is_empty() { "-" } else { &identity.serial_number }
        ));
        output.push_str(&format!(
            "Print workflow: {}\n",
            workflow_label(self.state.print_job.state())
        ));
        output.push_str(&format!(
            "Persisted flags: complete={} cancelled={}\n",
            self.state.print_flags.complete, self.state.print_flags.cancelled
        ));
        output.push_str(&format!("Catalog entries: {}\n", self.state.catalog.len()));
        output.push_str(&format!(
            "Targets enabled: {}\n",
            self.sorted_targets()
                .into_iter()
                .filter(|target| self.enabled_targets.contains(target))
                .collect::<Vec<String>>()
                .join(", ")
        ));
        output.push_str("Recent logs:\n");

        let entries = self.visible_entries();
        let start = entries.len().saturating_sub(DIAGNOSTIC_LOG_LINES);
        for entry in entries.into_iter().skip(start) {
            output.push_str(&entry.format_line());
            output.push('\n');
        }

        output
    }
}
