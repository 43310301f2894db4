use crate::command::PluginCommand;
use crate::model::{PrinterIdentity, SupportedPrinter};
use crate::print_job::PrintJob;
use crate::registration::Registration;
use crate::settings::PrintFlags;
use crate::tab::ContentSource;

/// Everything the plugin view shows, owned by one writer at a time.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub identity: PrinterIdentity,
    pub catalog: Vec<SupportedPrinter>,
    pub registration: Registration,
    pub print_job: PrintJob,
    pub print_flags: PrintFlags,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brands(&self) -> Vec<String> {
        crate::model::distinct_brands(&self.catalog)
    }

    pub fn models_for_selected_brand(&self) -> Vec<&SupportedPrinter> {
        crate::model::printers_for_brand(&self.catalog, &self.identity.manufacturer)
    }

    pub fn select_manufacturer(&mut self, manufacturer: impl Into<String>) {
        let manufacturer = manufacturer.into();
        if manufacturer != self.identity.manufacturer {
            self.identity.manufacturer = manufacturer;
            let model_still_listed = self
                .models_for_selected_brand()
                .iter()
                .any(|printer| printer.model == self.identity.model);
            if !model_still_listed {
                self.identity.model.clear();
            }
        }
    }

    pub fn select_model(&mut self, model: impl Into<String>) {
        self.identity.model = model.into();
    }
}

/// Work the host performs on behalf of a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(PluginCommand),
    Notify(Notice),
    SetContentSource(ContentSource),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
    /// Sticky notices stay until the user closes them.
    pub sticky: bool,
}

impl Notice {
    pub fn remote_error(details: &str) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "MyMiniFactory Error".to_string(),
            body: format!(
                "There was an error with the MyMiniFactory plugin, error details follow.\n{details}"
            ),
            sticky: true,
        }
    }

    pub fn command_error(summary: &str, detail: &str) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "MyMiniFactory Error".to_string(),
            body: format!("{summary}\n{detail}"),
            sticky: true,
        }
    }

    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            body: body.into(),
            sticky: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_brand_drops_model_from_other_brand() {
        let mut state = SessionState::new();
        state.catalog = vec![
            SupportedPrinter::new("Anet", "anet-a8"),
            SupportedPrinter::new("Prusa", "mk3s"),
        ];
        state.identity = PrinterIdentity::new("Anet", "anet-a8");

        state.select_manufacturer("Prusa");
        assert_eq!(state.identity.manufacturer, "Prusa");
        assert!(state.identity.model.is_empty());

        state.select_model("mk3s");
        state.select_manufacturer("Prusa");
        assert_eq!(state.identity.model, "mk3s");
    }

    #[test]
    fn remote_error_notice_is_sticky() {
        let notice = Notice::remote_error("token expired");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.sticky);
        assert!(notice.body.ends_with("token expired"));
    }
}
