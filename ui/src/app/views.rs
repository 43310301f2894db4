use iced::alignment::Horizontal;
use iced::theme;
use iced::widget::{
    button, checkbox, column, container, horizontal_space, pick_list, row, scrollable, text,
};
use iced::{Alignment, Color, Element, Length};

use mmflink_core::{ContentSource, RegistrationPhase};

use super::helpers::{level_color, notice_color, phase_label, workflow_label};
use super::styles::{HostTabStyle, LinkButtonStyle, NoticeStyle, PromptStyle};
use super::types::{Message, ShownNotice, Tab};
use super::MmfLinkApp;
use crate::logging::LogLevel;

const HEADING: Color = Color::from_rgb(0x12 as f32 / 255.0, 0x12 as f32 / 255.0, 0x12 as f32 / 255.0);
const LABEL: Color = Color::from_rgb(0x3a as f32 / 255.0, 0x4a as f32 / 255.0, 0x5a as f32 / 255.0);
const MUTED: Color = Color::from_rgb(0x6a as f32 / 255.0, 0x6a as f32 / 255.0, 0x6a as f32 / 255.0);

impl MmfLinkApp {
    pub(super) fn root_view(&self) -> Element<'_, Message> {
        let header = row![
            text("MyMiniFactory")
                .size(28)
                .style(theme::Text::Color(Color::from_rgb8(0x10, 0x1a, 0x24))),
            text(format!("push: {}", self.push_status_label()))
                .size(14)
                .style(theme::Text::Color(Color::from_rgb8(0x5f, 0x6b, 0x7a))),
        ]
        .spacing(12)
        .align_items(Alignment::Center);

        let body = match self.active_tab {
            Tab::Library => self.library_tab_view(),
            Tab::Settings => self.settings_tab_view(),
            Tab::Debug => self.debug_tab_view(),
        };

        let mut content = column![header].spacing(16).padding(16);
        if !self.notices.is_empty() {
            content = content.push(self.notices_view());
        }
        if let Some(prompt) = self.print_prompt_view() {
            content = content.push(prompt);
        }
        content = content.push(self.tab_bar()).push(body);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn tab_bar(&self) -> Element<'_, Message> {
        row![
            self.tab_button(Tab::Library, "MyMiniFactory"),
            self.tab_button(Tab::Settings, "Settings"),
            self.tab_button(Tab::Debug, "Debug")
        ]
        .spacing(4)
        .align_items(Alignment::End)
        .into()
    }

    fn tab_button(&self, tab: Tab, label: &str) -> Element<'_, Message> {
        button(text(label))
            .style(theme::Button::custom(HostTabStyle {
                active: self.active_tab == tab,
            }))
            .on_press(Message::SelectTab(tab))
            .into()
    }

    fn notices_view(&self) -> Element<'_, Message> {
        let mut list = column![].spacing(6);
        for shown in &self.notices {
            list = list.push(self.notice_view(shown));
        }
        list.into()
    }

    fn notice_view(&self, shown: &ShownNotice) -> Element<'_, Message> {
        let notice = &shown.notice;
        let title = row![
            text(notice.title.clone())
                .size(15)
                .style(theme::Text::Color(notice_color(notice.kind))),
            horizontal_space(),
            button(text("x").size(14))
                .style(theme::Button::custom(LinkButtonStyle { color: MUTED }))
                .on_press(Message::CloseNotice(shown.id)),
        ]
        .align_items(Alignment::Center);

        container(column![title, text(notice.body.clone()).size(13)].spacing(4))
            .padding(8)
            .width(Length::Fill)
            .style(theme::Container::Custom(Box::new(NoticeStyle {
                kind: notice.kind,
            })))
            .into()
    }

    fn print_prompt_view(&self) -> Option<Element<'_, Message>> {
        let prompt = self.state.print_job.prompt()?;

        if !prompt.is_visible() {
            let banner = row![
                text("A Click and Print job is waiting for the bed to be cleared.")
                    .size(13)
                    .style(theme::Text::Color(LABEL)),
                button("Show").on_press(Message::ReopenPrintPrompt),
            ]
            .spacing(12)
            .align_items(Alignment::Center);
            return Some(banner.into());
        }

        let clearing = prompt.is_clearing();
        let status = if clearing {
            "Waiting for the printer to be released..."
        } else {
            ""
        };
        let panel = column![
            text("Click and Print").size(18),
            text(prompt.message()).size(14),
            row![
                button("Ok").on_press_maybe((!clearing).then_some(Message::ConfirmBedCleared)),
                button("Later")
                    .style(theme::Button::Secondary)
                    .on_press(Message::DismissPrintPrompt),
                text(status).size(12).style(theme::Text::Color(MUTED)),
            ]
            .spacing(8)
            .align_items(Alignment::Center),
        ]
        .spacing(8);

        Some(
            container(panel)
                .padding(12)
                .width(Length::Fill)
                .style(theme::Container::Custom(Box::new(PromptStyle)))
                .into(),
        )
    }

    fn library_tab_view(&self) -> Element<'_, Message> {
        let content: Element<'_, Message> = match &self.content_source {
            ContentSource::Url(url) => column![
                text("MyMiniFactory library")
                    .size(20)
                    .style(theme::Text::Color(HEADING)),
                text(url.clone()).size(14).style(theme::Text::Color(LABEL)),
                button("Open in browser").on_press(Message::OpenUrl(url.clone())),
            ]
            .spacing(10)
            .into(),
            ContentSource::Blank => text("Content is unloaded while the tab is hidden.")
                .size(14)
                .style(theme::Text::Color(MUTED))
                .into(),
        };

        container(content)
            .padding(12)
            .width(Length::Fill)
            .style(theme::Container::Box)
            .into()
    }

    fn settings_tab_view(&self) -> Element<'_, Message> {
        let status = self.settings_status.as_deref().unwrap_or("Not loaded");
        let storage = row![
            button("Save").on_press(Message::SaveSettings),
            button("Reload")
                .style(theme::Button::Secondary)
                .on_press(Message::ReloadSettings),
            text(format!("Settings: {status}"))
                .size(12)
                .style(theme::Text::Color(MUTED)),
        ]
        .spacing(8)
        .align_items(Alignment::Center);

        column![
            text("Printer registration")
                .size(20)
                .style(theme::Text::Color(HEADING)),
            self.registration_view(),
            storage,
        ]
        .spacing(12)
        .into()
    }

    fn registration_view(&self) -> Element<'_, Message> {
        let registration = &self.state.registration;
        let phase = registration.phase();
        let identity = &self.state.identity;

        let mut content = column![text(format!("Status: {}", phase_label(phase)))
            .size(14)
            .style(theme::Text::Color(LABEL))]
        .spacing(8);

        match phase {
            RegistrationPhase::Idle => {
                content = content.push(self.printer_selection_view());
                content = content.push(button("Register printer").on_press(Message::Register));
            }
            RegistrationPhase::Registering => {
                content = content.push(
                    text(format!("{} {}", identity.manufacturer, identity.model)).size(14),
                );
                content = content.push(
                    text("Waiting for MyMiniFactory to issue a QR code...")
                        .size(13)
                        .style(theme::Text::Color(MUTED)),
                );
            }
            RegistrationPhase::Complete => {
                content = content.push(
                    text(format!(
                        "{} {} (serial {})",
                        identity.manufacturer, identity.model, identity.serial_number
                    ))
                    .size(14),
                );
                if let Some(qr_url) = registration.displayed_qr() {
                    content = content.push(
                        text("Scan the QR code with the MyMiniFactory app to finish.").size(13),
                    );
                    content = content.push(
                        row![
                            text(qr_url.to_string())
                                .size(12)
                                .style(theme::Text::Color(LABEL)),
                            button("Open QR code").on_press(Message::OpenUrl(qr_url.to_string())),
                        ]
                        .spacing(8)
                        .align_items(Alignment::Center),
                    );
                }
                if registration.is_forgetting() {
                    content = content.push(self.forget_prompt_view());
                } else {
                    content = content.push(
                        button("Forget printer")
                            .style(theme::Button::Destructive)
                            .on_press(Message::ConfirmForget),
                    );
                }
            }
        }

        container(content)
            .padding(12)
            .width(Length::Fill)
            .style(theme::Container::Box)
            .into()
    }

    fn printer_selection_view(&self) -> Element<'_, Message> {
        let identity = &self.state.identity;
        let brands = self.state.brands();
        let models: Vec<String> = self
            .state
            .models_for_selected_brand()
            .into_iter()
            .map(|printer| printer.model.clone())
            .collect();
        let selected_brand = Some(identity.manufacturer.clone()).filter(|value| !value.is_empty());
        let selected_model = Some(identity.model.clone()).filter(|value| !value.is_empty());

        if brands.is_empty() {
            return text("No supported printers known yet. Reload settings to fetch the list.")
                .size(13)
                .style(theme::Text::Color(MUTED))
                .into();
        }

        row![
            column![
                text("Manufacturer")
                    .size(12)
                    .style(theme::Text::Color(LABEL)),
                pick_list(brands, selected_brand, Message::ManufacturerSelected)
                    .placeholder("Choose a manufacturer"),
            ]
            .spacing(4),
            column![
                text("Model").size(12).style(theme::Text::Color(LABEL)),
                pick_list(models, selected_model, Message::ModelSelected)
                    .placeholder("Choose a model"),
            ]
            .spacing(4),
        ]
        .spacing(12)
        .into()
    }

    fn forget_prompt_view(&self) -> Element<'_, Message> {
        let content = column![
            text("Forget this printer? It will have to be registered again to receive prints.")
                .size(13),
            row![
                button("Forget")
                    .style(theme::Button::Destructive)
                    .on_press(Message::Forget),
                button("Cancel")
                    .style(theme::Button::Secondary)
                    .on_press(Message::CancelForget),
            ]
            .spacing(8),
        ]
        .spacing(8);

        container(content)
            .padding(8)
            .style(theme::Container::Custom(Box::new(PromptStyle)))
            .into()
    }

    fn debug_tab_view(&self) -> Element<'_, Message> {
        let level_picker = pick_list(
            &LogLevel::ALL[..],
            Some(self.log_level),
            Message::LogLevelChanged,
        )
        .placeholder("Log level");

        let console_header = row![
            text("Console").size(20).style(theme::Text::Color(HEADING)),
            level_picker
        ]
        .spacing(12)
        .align_items(Alignment::Center);

        let console = column![console_header, self.target_filters_view(), self.log_lines_view()]
            .spacing(12)
            .width(Length::FillPortion(2));

        row![console, self.debug_panel_view()]
            .spacing(16)
            .align_items(Alignment::Start)
            .into()
    }

    fn target_filters_view(&self) -> Element<'_, Message> {
        let mut filter_column = column![text("Targets")
            .size(14)
            .style(theme::Text::Color(LABEL))]
        .spacing(6);

        for target in self.sorted_targets() {
            let enabled = self.enabled_targets.contains(&target);
            filter_column = filter_column.push(
                checkbox(target.clone(), enabled)
                    .on_toggle(move |value| Message::ToggleTarget(target.clone(), value)),
            );
        }

        container(filter_column)
            .padding(8)
            .style(theme::Container::Box)
            .into()
    }

    fn log_lines_view(&self) -> Element<'_, Message> {
        let mut lines = column![].spacing(4);

        for entry in self.visible_entries() {
            let line = text(entry.format_line())
                .size(14)
                .horizontal_alignment(Horizontal::Left)
                .style(theme::Text::Color(level_color(entry.level)));
            lines = lines.push(line);
        }

        scrollable(lines)
            .height(Length::Fill)
            .width(Length::Fill)
            .into()
    }

    fn debug_panel_view(&self) -> Element<'_, Message> {
        let copy_status = self.copy_status.as_deref().unwrap_or("Ready");
        let state = &self.state;
        let panel = column![
            text("Session").size(20).style(theme::Text::Color(HEADING)),
            text(format!(
                "Registration: {}",
                phase_label(state.registration.phase())
            ))
            .size(14),
            text(format!(
                "Print workflow: {}",
                workflow_label(state.print_job.state())
            ))
            .size(14),
            text(format!(
                "Stored flags: complete={} cancelled={}",
                self.settings.mmf_print_complete, self.settings.mmf_print_cancelled
            ))
            .size(14),
            text(format!("Supported printers: {}", state.catalog.len())).size(14),
            text(format!("Push socket: {}", self.push_url))
                .size(12)
                .style(theme::Text::Color(MUTED)),
            button("Copy diagnostics").on_press(Message::CopyDiagnostics),
            text(format!("Clipboard: {copy_status}"))
                .size(12)
                .style(theme::Text::Color(MUTED)),
        ]
        .spacing(10);

        container(panel)
            .padding(12)
            .width(Length::FillPortion(1))
            .style(theme::Container::Box)
            .into()
    }
}
