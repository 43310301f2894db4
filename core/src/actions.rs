use tracing::{debug, warn};

use crate::command::{CommandAck, PluginCommand};
use crate::state::{Effect, Notice, SessionState};
use crate::targets;
use crate::Error;

impl SessionState {
    pub fn begin_registration(&mut self) -> Result<Vec<Effect>, Error> {
        let command = self.registration.begin(&self.identity)?;
        Ok(vec![Effect::Send(command)])
    }

    /// Opens the destructive forget prompt.
    pub fn confirm_forget(&mut self) -> bool {
        self.registration.open_forget_prompt()
    }

    pub fn cancel_forget(&mut self) {
        self.registration.cancel_forget();
    }

    /// The registration is only dropped once the server reports the printer
    /// as removed.
    pub fn forget_registration(&mut self) -> Vec<Effect> {
        self.registration
            .forget()
            .map(Effect::Send)
            .into_iter()
            .collect()
    }

    pub fn settings_hidden(&mut self) {
        self.registration.settings_hidden();
    }

    pub fn confirm_bed_cleared(&mut self) -> Vec<Effect> {
        self.print_job.confirm().map(Effect::Send).into_iter().collect()
    }

    pub fn dismiss_print_prompt(&mut self) -> bool {
        self.print_job.dismiss()
    }

    pub fn reopen_print_prompt(&mut self) -> bool {
        self.print_job.reopen()
    }

    pub fn bed_clear_acknowledged(&mut self, ack: &CommandAck) -> bool {
        let cleared = self.print_job.acknowledge(ack);
        if cleared {
            self.print_flags.complete = false;
            self.print_flags.cancelled = false;
        }
        cleared
    }

    /// A command that never reached the server is reported like a remote
    /// error and unblocks whatever was waiting on it.
    pub fn command_failed(&mut self, command: &PluginCommand, summary: &str, detail: &str) -> Vec<Effect> {
        warn!(
            target: targets::COMMAND,
            command = %command,
            detail,
            "Command failed"
        );
        match command {
            PluginCommand::RegisterPrinter { .. } => {
                self.registration.abort();
            }
            PluginCommand::MmfPrintComplete => self.print_job.clear_failed(),
            PluginCommand::ForgetPrinter => {
                debug!(target: targets::REGISTRATION, "Forget prompt left open for retry");
            }
        }
        vec![Effect::Notify(Notice::command_error(summary, detail))]
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;

    use serde_json::json;

    use super::*;
    use crate::command::{CommandClient, MockCommandClient};
    use crate::dispatcher::EventDispatcher;
    use crate::model::PrinterIdentity;
    use crate::print_job::PrintWorkflowState;
    use crate::registration::RegistrationPhase;

    fn run_future<T>(future: impl Future<Output = T>) -> T {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("tokio runtime");
        runtime.block_on(future)
    }

    fn sent_command(effects: &[Effect]) -> PluginCommand {
        match effects {
            [Effect::Send(command)] => command.clone(),
            other => panic!("expected one command, got {other:?}"),
        }
    }

    #[test]
    fn registration_flow_reaches_complete() {
        let dispatcher = EventDispatcher::default();
        let mut state = SessionState::new();
        state.identity = PrinterIdentity::new("Acme", "X1");

        let effects = state.begin_registration().expect("begin");
        assert_eq!(
            sent_command(&effects),
            PluginCommand::RegisterPrinter {
                manufacturer: "Acme".to_string(),
                model: "X1".to_string(),
            }
        );
        assert_eq!(state.registration.phase(), RegistrationPhase::Registering);

        dispatcher.handle(
            &mut state,
            "myminifactory",
            &json!({"qrImageUrl": "https://x/qr.png", "printerSerialNumber": "SN999"}),
        );
        assert_eq!(state.registration.phase(), RegistrationPhase::Complete);
        assert_eq!(state.identity.serial_number, "SN999");
    }

    #[test]
    fn invalid_registration_sends_nothing() {
        let mut state = SessionState::new();
        assert!(state.begin_registration().is_err());
        assert_eq!(state.registration.phase(), RegistrationPhase::Idle);
    }

    #[test]
    fn forget_waits_for_removal_push() {
        let dispatcher = EventDispatcher::default();
        let mut state = SessionState::new();
        state.identity = PrinterIdentity::new("Acme", "X1");
        state.begin_registration().expect("begin");
        dispatcher.handle(&mut state, "myminifactory", &json!({"qrImageUrl": "https://x/qr.png"}));

        assert!(state.forget_registration().is_empty());
        assert!(state.confirm_forget());
        assert_eq!(sent_command(&state.forget_registration()), PluginCommand::ForgetPrinter);
        assert!(state.registration.is_complete());

        dispatcher.handle(&mut state, "myminifactory", &json!({"printerRemoved": true}));
        assert_eq!(state.registration.phase(), RegistrationPhase::Idle);
    }

    #[test]
    fn cleared_bed_returns_workflow_to_none() {
        let dispatcher = EventDispatcher::default();
        let client = MockCommandClient::new();
        client.push_ack(CommandAck { bed_cleared: true });
        let mut state = SessionState::new();

        dispatcher.handle(&mut state, "myminifactory", &json!({"mmfPrintComplete": true}));
        assert_eq!(state.print_job.state(), PrintWorkflowState::CompletedPendingClear);

        let command = sent_command(&state.confirm_bed_cleared());
        assert_eq!(command, PluginCommand::MmfPrintComplete);
        let ack = run_future(client.send(command)).expect("ack");

        assert!(state.bed_clear_acknowledged(&ack));
        assert_eq!(state.print_job.state(), PrintWorkflowState::None);
        assert_eq!(client.sent(), vec![PluginCommand::MmfPrintComplete]);
    }

    #[test]
    fn unconfirmed_clear_keeps_prompt_open() {
        let dispatcher = EventDispatcher::default();
        let client = MockCommandClient::new();
        client.push_ack(CommandAck { bed_cleared: false });
        let mut state = SessionState::new();

        dispatcher.handle(&mut state, "myminifactory", &json!({"mmfPrintComplete": true}));
        let command = sent_command(&state.confirm_bed_cleared());
        let ack = run_future(client.send(command)).expect("ack");

        assert!(!state.bed_clear_acknowledged(&ack));
        assert_eq!(state.print_job.state(), PrintWorkflowState::CompletedPendingClear);
        assert!(state.print_job.visible_prompt().is_some());
    }

    #[test]
    fn failed_clear_request_can_be_retried() {
        let dispatcher = EventDispatcher::default();
        let mut state = SessionState::new();
        dispatcher.handle(&mut state, "myminifactory", &json!({"mmfPrintCancelled": true}));

        let command = sent_command(&state.confirm_bed_cleared());
        assert!(state.confirm_bed_cleared().is_empty());

        let effects = state.command_failed(&command, "Could not reach OctoPrint.", "timeout");
        assert!(matches!(effects.as_slice(), [Effect::Notify(_)]));
        assert_eq!(state.print_job.state(), PrintWorkflowState::CancelledPendingClear);
        assert_eq!(sent_command(&state.confirm_bed_cleared()), PluginCommand::MmfPrintComplete);
    }

    #[test]
    fn failed_register_command_stops_registering() {
        let mut state = SessionState::new();
        state.identity = PrinterIdentity::new("Acme", "X1");
        let command = sent_command(&state.begin_registration().expect("begin"));

        state.command_failed(&command, "Could not reach OctoPrint.", "connection refused");
        assert!(!state.registration.is_registering());
        assert!(!state.registration.is_complete());
    }

    #[test]
    fn dismissed_prompt_keeps_pending_state() {
        let dispatcher = EventDispatcher::default();
        let mut state = SessionState::new();
        dispatcher.handle(&mut state, "myminifactory", &json!({"mmfPrintComplete": true}));

        assert!(state.dismiss_print_prompt());
        assert_eq!(state.print_job.state(), PrintWorkflowState::CompletedPendingClear);
        assert!(state.reopen_print_prompt());
        assert!(state.print_job.visible_prompt().is_some());
    }
}
