use tracing::{debug, info};

use crate::command::PluginCommand;
use crate::model::PrinterIdentity;
use crate::targets;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationPhase {
    Idle,
    Registering,
    Complete,
}

/// Printer registration lifecycle plus the transient QR and forget-prompt
/// state that goes with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    registering: bool,
    complete: bool,
    qr_image_url: String,
    forgetting: bool,
}

impl Registration {
    pub fn restored(complete: bool) -> Self {
        Self {
            complete,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> RegistrationPhase {
        if self.registering {
            RegistrationPhase::Registering
        } else if self.complete {
            RegistrationPhase::Complete
        } else {
            RegistrationPhase::Idle
        }
    }

    pub fn is_registering(&self) -> bool {
        self.registering
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn qr_image_url(&self) -> &str {
        &self.qr_image_url
    }

    /// The QR code to show, if one was delivered and not yet dismissed.
    pub fn displayed_qr(&self) -> Option<&str> {
        Some(self.qr_image_url.as_str()).filter(|url| !url.is_empty())
    }

    pub fn is_forgetting(&self) -> bool {
        self.forgetting
    }

    pub(crate) fn set_complete(&mut self, complete: bool) {
        self.complete = complete;
    }

    pub fn begin(&mut self, identity: &PrinterIdentity) -> Result<PluginCommand, Error> {
        if identity.manufacturer.trim().is_empty() {
            return Err(Error::InvalidRegistration {
                field: "manufacturer",
            });
        }
        if identity.model.trim().is_empty() {
            return Err(Error::InvalidRegistration { field: "model" });
        }

        self.registering = true;
        info!(
            target: targets::REGISTRATION,
            manufacturer = %identity.manufacturer,
            model = %identity.model,
            "Registering printer with MyMiniFactory"
        );
        Ok(PluginCommand::RegisterPrinter {
            manufacturer: identity.manufacturer.clone(),
            model: identity.model.clone(),
        })
    }

    /// Returns false when the code is empty or already displayed, so a
    /// duplicated push leaves the state untouched.
    pub fn apply_qr_code(
        &mut self,
        identity: &mut PrinterIdentity,
        qr_image_url: &str,
        serial_number: Option<&str>,
    ) -> bool {
        if qr_image_url.is_empty() || qr_image_url == self.qr_image_url {
            debug!(
                target: targets::REGISTRATION,
                qr_image_url,
                "QR code already displayed"
            );
            return false;
        }

        self.registering = false;
        self.qr_image_url = qr_image_url.to_string();
        if let Some(serial) = serial_number.filter(|serial| !serial.is_empty()) {
            identity.serial_number = serial.to_string();
        }
        self.complete = true;
        info!(
            target: targets::REGISTRATION,
            qr_image_url,
            serial = %identity.serial_number,
            "Registration complete"
        );
        true
    }

    /// Returns whether an attempt was in flight.
    pub fn abort(&mut self) -> bool {
        std::mem::replace(&mut self.registering, false)
    }

    pub fn open_forget_prompt(&mut self) -> bool {
        if !self.complete {
            return false;
        }
        self.forgetting = true;
        true
    }

    pub fn cancel_forget(&mut self) {
        self.forgetting = false;
    }

    /// The destructive command is only issued from an open prompt.
    pub fn forget(&self) -> Option<PluginCommand> {
        if !self.forgetting {
            return None;
        }
        info!(target: targets::REGISTRATION, "Removing configured printer");
        Some(PluginCommand::ForgetPrinter)
    }

    pub fn apply_removed(&mut self, identity: &mut PrinterIdentity) {
        self.qr_image_url.clear();
        self.complete = false;
        self.registering = false;
        self.forgetting = false;
        identity.clear_registration();
        info!(target: targets::REGISTRATION, "Printer registration removed");
    }

    pub fn settings_hidden(&mut self) {
        if self.complete {
            self.qr_image_url.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_requires_manufacturer_and_model() {
        let mut registration = Registration::default();

        let error = registration
            .begin(&PrinterIdentity::new("", "x1"))
            .expect_err("missing manufacturer");
        assert!(matches!(
            error,
            Error::InvalidRegistration {
                field: "manufacturer"
            }
        ));

        let error = registration
            .begin(&PrinterIdentity::new("Acme", " "))
            .expect_err("missing model");
        assert!(matches!(error, Error::InvalidRegistration { field: "model" }));
        assert_eq!(registration.phase(), RegistrationPhase::Idle);
    }

    #[test]
    fn qr_code_completes_registration() {
        let mut registration = Registration::default();
        let mut identity = PrinterIdentity::new("Acme", "X1");

        let command = registration.begin(&identity).expect("begin");
        assert_eq!(
            command,
            PluginCommand::RegisterPrinter {
                manufacturer: "Acme".to_string(),
                model: "X1".to_string(),
            }
        );
        assert_eq!(registration.phase(), RegistrationPhase::Registering);

        assert!(registration.apply_qr_code(&mut identity, "https://x/qr.png", Some("SN999")));
        assert_eq!(registration.phase(), RegistrationPhase::Complete);
        assert_eq!(identity.serial_number, "SN999");
        assert!(!registration.apply_qr_code(&mut identity, "https://x/qr.png", Some("SN000")));
        assert_eq!(identity.serial_number, "SN999");
    }

    #[test]
    fn qr_code_without_serial_keeps_existing_serial() {
        let mut registration = Registration::default();
        let mut identity = PrinterIdentity::new("Acme", "X1");
        identity.serial_number = "SN1".to_string();

        assert!(registration.apply_qr_code(&mut identity, "https://x/qr.png", None));
        assert_eq!(identity.serial_number, "SN1");
    }

    #[test]
    fn forget_needs_open_prompt() {
        let mut registration = Registration::restored(true);
        assert_eq!(registration.forget(), None);

        assert!(registration.open_forget_prompt());
        assert_eq!(registration.forget(), Some(PluginCommand::ForgetPrinter));

        registration.cancel_forget();
        assert_eq!(registration.forget(), None);
    }

    #[test]
    fn forget_prompt_requires_registration() {
        let mut registration = Registration::default();
        assert!(!registration.open_forget_prompt());
        assert!(!registration.is_forgetting());
    }

    #[test]
    fn hiding_settings_clears_qr_but_keeps_registration() {
        let mut registration = Registration::default();
        let mut identity = PrinterIdentity::new("Acme", "X1");
        registration.apply_qr_code(&mut identity, "https://x/qr.png", Some("SN1"));

        registration.settings_hidden();
        assert!(registration.qr_image_url().is_empty());
        assert!(registration.is_complete());
    }

    #[test]
    fn qr_code_is_displayed_once_registration_completes() {
        let mut registration = Registration::default();
        let mut identity = PrinterIdentity::new("Acme", "X1");

        registration.begin(&identity).expect("begin");
        assert_eq!(registration.phase(), RegistrationPhase::Registering);
        assert_eq!(registration.displayed_qr(), None);

        registration.apply_qr_code(&mut identity, "https://x/qr.png", None);
        assert_eq!(registration.phase(), RegistrationPhase::Complete);
        assert_eq!(registration.displayed_qr(), Some("https://x/qr.png"));

        registration.settings_hidden();
        assert_eq!(registration.displayed_qr(), None);
    }
}
