use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::event::{PluginMessage, PushEvent};
use crate::model::PLUGIN_IDENTIFIER;
use crate::print_job::PrintOutcome;
use crate::state::{Effect, Notice, SessionState};
use crate::targets;

/// Single entry point for push messages. Each message is decoded once and
/// applied to the state before the next one is looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDispatcher {
    identifier: String,
}

impl EventDispatcher {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn handle(&self, state: &mut SessionState, source: &str, payload: &Value) -> Vec<Effect> {
        if source != self.identifier {
            trace!(target: targets::DISPATCH, source, "Message for another plugin");
            return Vec::new();
        }

        match PushEvent::decode_against(payload, state.registration.qr_image_url()) {
            Ok(event) => self.dispatch(state, event),
            Err(error) => {
                warn!(
                    target: targets::DISPATCH,
                    error = %error.technical_detail(),
                    "Dropping unreadable push payload"
                );
                Vec::new()
            }
        }
    }

    pub fn handle_message(&self, state: &mut SessionState, message: &PluginMessage) -> Vec<Effect> {
        self.handle(state, &message.plugin, &message.data)
    }

    pub fn dispatch(&self, state: &mut SessionState, event: PushEvent) -> Vec<Effect> {
        debug!(target: targets::DISPATCH, ?event, "Push event");
        match event {
            PushEvent::RemoteError(details) => {
                if state.registration.abort() {
                    debug!(target: targets::DISPATCH, "Registration attempt aborted");
                }
                vec![Effect::Notify(Notice::remote_error(&details))]
            }
            PushEvent::RegistrationReady {
                qr_image_url,
                serial_number,
            } => {
                state.registration.apply_qr_code(
                    &mut state.identity,
                    &qr_image_url,
                    serial_number.as_deref(),
                );
                Vec::new()
            }
            PushEvent::PrinterRemoved => {
                state.registration.apply_removed(&mut state.identity);
                Vec::new()
            }
            PushEvent::PrintFinished(outcome) => {
                state.print_job.job_finished(outcome);
                Vec::new()
            }
            PushEvent::Ignored => Vec::new(),
        }
    }

    /// Re-raises print flags that were persisted while no view was bound, so
    /// an unanswered bed-clear prompt survives a reload.
    /// A prompt that already exists, even a dismissed one, is left alone.
    pub fn replay_persisted_flags(&self, state: &mut SessionState) -> Vec<Effect> {
        if state.print_job.prompt().is_some() {
            trace!(target: targets::DISPATCH, "Prompt pending, persisted flags not replayed");
            return Vec::new();
        }
        let flags = state.print_flags;
        let mut effects = Vec::new();
        if flags.complete {
            effects.extend(self.dispatch(state, PushEvent::PrintFinished(PrintOutcome::Completed)));
        }
        if flags.cancelled {
            effects.extend(self.dispatch(state, PushEvent::PrintFinished(PrintOutcome::Cancelled)));
        }
        effects
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(PLUGIN_IDENTIFIER)
    }
}
