use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{normalize_catalog, SupportedPrinter};
use crate::registration::Registration;
use crate::state::SessionState;
use crate::targets;

/// The plugin's slice of the server-side settings tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
    #[serde(alias = "printerModel")]
    pub printer_model: String,
    #[serde(alias = "printerManufacturer")]
    pub printer_manufacturer: String,
    #[serde(alias = "printerSerialNumber")]
    pub printer_serial_number: String,
    #[serde(alias = "printerToken")]
    pub printer_token: String,
    #[serde(alias = "registrationComplete")]
    pub registration_complete: bool,
    #[serde(alias = "supportedPrinters")]
    pub supported_printers: Vec<SupportedPrinter>,
    #[serde(alias = "mmfPrintComplete")]
    pub mmf_print_complete: bool,
    #[serde(alias = "mmfPrintCancelled")]
    pub mmf_print_cancelled: bool,
}

/// Fields the UI writes back. The print flags and the registration status
/// belong to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingsUpdate {
    pub supported_printers: Vec<SupportedPrinter>,
    pub printer_model: String,
    pub printer_manufacturer: String,
    pub printer_serial_number: String,
    pub printer_token: String,
}

impl SettingsUpdate {
    pub fn apply_to(&self, settings: &mut PluginSettings) {
        settings.supported_printers = self.supported_printers.clone();
        settings.printer_model = self.printer_model.clone();
        settings.printer_manufacturer = self.printer_manufacturer.clone();
        settings.printer_serial_number = self.printer_serial_number.clone();
        settings.printer_token = self.printer_token.clone();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintFlags {
    pub complete: bool,
    pub cancelled: bool,
}

impl SessionState {
    /// Mirrors the store into a freshly bound view.
    pub fn load_settings(&mut self, settings: &PluginSettings) {
        self.registration = Registration::restored(settings.registration_complete);
        self.mirror_settings(settings);
    }

    /// Mirrors an external settings change without touching in-flight
    /// registration state.
    pub fn settings_updated(&mut self, settings: &PluginSettings) {
        self.registration
            .set_complete(settings.registration_complete);
        self.mirror_settings(settings);
    }

    pub fn settings_before_save(&self) -> SettingsUpdate {
        SettingsUpdate {
            supported_printers: self.catalog.clone(),
            printer_model: self.identity.model.clone(),
            printer_manufacturer: self.identity.manufacturer.clone(),
            printer_serial_number: self.identity.serial_number.clone(),
            printer_token: self.identity.token.clone(),
        }
    }

    fn mirror_settings(&mut self, settings: &PluginSettings) {
        self.catalog = normalize_catalog(&settings.supported_printers);
        self.identity.model = settings.printer_model.clone();
        self.identity.manufacturer = settings.printer_manufacturer.clone();
        if settings.registration_complete {
            self.identity.serial_number = settings.printer_serial_number.clone();
            self.identity.token = settings.printer_token.clone();
        } else {
            self.identity.clear_registration();
        }
        self.print_flags = PrintFlags {
            complete: settings.mmf_print_complete,
            cancelled: settings.mmf_print_cancelled,
        };

        debug!(
            target: targets::SETTINGS,
            manufacturer = %self.identity.manufacturer,
            model = %self.identity.model,
            registered = settings.registration_complete,
            catalog = self.catalog.len(),
            "Settings mirrored"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrinterIdentity;
    use crate::registration::RegistrationPhase;

    fn registered_settings() -> PluginSettings {
        PluginSettings {
            printer_model: "anet-a8".to_string(),
            printer_manufacturer: "Anet".to_string(),
            printer_serial_number: "SN123".to_string(),
            printer_token: "tok".to_string(),
            registration_complete: true,
            supported_printers: vec![SupportedPrinter::new("Anet", "anet-a8")],
            mmf_print_complete: false,
            mmf_print_cancelled: true,
        }
    }

    #[test]
    fn load_reflects_completed_registration_with_qr_hidden() {
        let mut state = SessionState::new();
        state.load_settings(&registered_settings());

        assert_eq!(state.registration.phase(), RegistrationPhase::Complete);
        assert_eq!(state.identity.serial_number, "SN123");
        assert!(state.registration.qr_image_url().is_empty());
        assert!(state.print_flags.cancelled);
    }

    #[test]
    fn unregistered_load_keeps_credentials_empty() {
        let mut settings = registered_settings();
        settings.registration_complete = false;

        let mut state = SessionState::new();
        state.load_settings(&settings);

        assert_eq!(state.registration.phase(), RegistrationPhase::Idle);
        assert!(state.identity.serial_number.is_empty());
        assert!(state.identity.token.is_empty());
    }

    #[test]
    fn missing_fields_decode_to_defaults() {
        let settings: PluginSettings =
            serde_json::from_str(r#"{"printer_model":"mini","client_key":"x"}"#)
                .expect("decode settings");
        assert_eq!(settings.printer_model, "mini");
        assert!(!settings.registration_complete);
        assert!(settings.supported_printers.is_empty());
    }

    #[test]
    fn save_writes_back_only_writable_fields() {
        let mut state = SessionState::new();
        state.load_settings(&registered_settings());
        state.select_model("anet-a6");

        let mut stored = registered_settings();
        stored.registration_complete = false;
        stored.mmf_print_cancelled = false;

        let update = state.settings_before_save();
        update.apply_to(&mut stored);

        assert_eq!(stored.printer_model, "anet-a6");
        assert!(!stored.registration_complete);
        assert!(!stored.mmf_print_cancelled);

        let json = serde_json::to_value(&update).expect("encode update");
        assert!(json.get("registration_complete").is_none());
        assert!(json.get("mmf_print_complete").is_none());
        assert_eq!(json["printer_serial_number"], "SN123");
    }

    #[test]
    fn external_update_keeps_attempt_in_flight() {
        let mut state = SessionState::new();
        state.identity = PrinterIdentity::new("Anet", "anet-a8");
        state.identity.serial_number = "SN-stale".to_string();
        state.begin_registration().expect("begin registration");

        let mut settings = registered_settings();
        settings.registration_complete = false;
        settings.printer_model = "anet-a6".to_string();
        settings.supported_printers = vec![
            SupportedPrinter::new("Anet", "anet-a6"),
            SupportedPrinter::new("Prusa", "mini"),
        ];
        state.settings_updated(&settings);

        assert!(state.registration.is_registering());
        assert_eq!(state.registration.phase(), RegistrationPhase::Registering);
        assert_eq!(state.identity.model, "anet-a6");
        assert_eq!(state.catalog.len(), 2);
        assert!(state.print_flags.cancelled);
        assert!(state.identity.serial_number.is_empty());
        assert!(state.identity.token.is_empty());
    }

    #[test]
    fn external_update_keeps_displayed_qr_and_forget_prompt() {
        let mut state = SessionState::new();
        state.load_settings(&registered_settings());
        state
            .registration
            .apply_qr_code(&mut state.identity, "https://x/qr.png", None);
        assert!(state.confirm_forget());

        let mut settings = registered_settings();
        settings.printer_serial_number = "SN456".to_string();
        state.settings_updated(&settings);

        assert_eq!(state.registration.displayed_qr(), Some("https://x/qr.png"));
        assert!(state.registration.is_forgetting());
        assert!(state.registration.is_complete());
        assert_eq!(state.identity.serial_number, "SN456");
    }

    #[test]
    fn external_update_can_drop_registration() {
        let mut state = SessionState::new();
        state.load_settings(&registered_settings());

        let mut settings = registered_settings();
        settings.registration_complete = false;
        state.settings_updated(&settings);

        assert_eq!(state.registration.phase(), RegistrationPhase::Idle);
        assert!(state.identity.serial_number.is_empty());
    }
}
