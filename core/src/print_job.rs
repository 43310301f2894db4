use std::fmt;

use tracing::{debug, info, warn};

use crate::command::{CommandAck, PluginCommand};
use crate::targets;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintOutcome {
    Completed,
    Cancelled,
}

impl fmt::Display for PrintOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintOutcome::Completed => f.write_str("complete"),
            PrintOutcome::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintWorkflowState {
    None,
    CompletedPendingClear,
    CancelledPendingClear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChange {
    Opened,
    Reshown,
    Unchanged,
}

/// The single bed-clear prompt of a finished Click and Print job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintPrompt {
    outcome: PrintOutcome,
    visible: bool,
    clearing: bool,
}

impl PrintPrompt {
    pub fn outcome(&self) -> PrintOutcome {
        self.outcome
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// A bed-clear request is awaiting its acknowledgement.
    pub fn is_clearing(&self) -> bool {
        self.clearing
    }

    pub fn message(&self) -> String {
        format!(
            "MyMiniFactory Click and Print job {}. Please clear the bed and press Ok below to free up the printer again.",
            self.outcome
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintJob {
    pending: Option<PrintPrompt>,
}

impl PrintJob {
    pub fn state(&self) -> PrintWorkflowState {
        match self.pending.as_ref().map(PrintPrompt::outcome) {
            None => PrintWorkflowState::None,
            Some(PrintOutcome::Completed) => PrintWorkflowState::CompletedPendingClear,
            Some(PrintOutcome::Cancelled) => PrintWorkflowState::CancelledPendingClear,
        }
    }

    pub fn prompt(&self) -> Option<&PrintPrompt> {
        self.pending.as_ref()
    }

    pub fn visible_prompt(&self) -> Option<&PrintPrompt> {
        self.pending.as_ref().filter(|prompt| prompt.visible)
    }

    /// At most one prompt exists. A repeated event re-shows a dismissed
    /// prompt and keeps the outcome that opened it.
    pub fn job_finished(&mut self, outcome: PrintOutcome) -> PromptChange {
        match self.pending.as_mut() {
            None => {
                self.pending = Some(PrintPrompt {
                    outcome,
                    visible: true,
                    clearing: false,
                });
                info!(target: targets::PRINT_JOB, %outcome, "Click and Print job finished");
                PromptChange::Opened
            }
            Some(prompt) if !prompt.visible => {
                prompt.visible = true;
                debug!(target: targets::PRINT_JOB, %outcome, "Bed-clear prompt re-shown");
                PromptChange::Reshown
            }
            Some(prompt) => {
                debug!(
                    target: targets::PRINT_JOB,
                    pending = %prompt.outcome,
                    received = %outcome,
                    "Bed-clear prompt already open"
                );
                PromptChange::Unchanged
            }
        }
    }

    pub fn confirm(&mut self) -> Option<PluginCommand> {
        let prompt = self.pending.as_mut()?;
        if prompt.clearing {
            debug!(target: targets::PRINT_JOB, "Bed-clear request already in flight");
            return None;
        }
        prompt.clearing = true;
        prompt.visible = true;
        info!(target: targets::PRINT_JOB, "Confirming bed cleared");
        Some(PluginCommand::MmfPrintComplete)
    }

    /// Returns true when the workflow went back to `None`.
    pub fn acknowledge(&mut self, ack: &CommandAck) -> bool {
        let Some(prompt) = self.pending.as_mut() else {
            debug!(target: targets::PRINT_JOB, "Ignoring bed-clear ack without pending job");
            return false;
        };
        prompt.clearing = false;

        if ack.bed_cleared {
            self.pending = None;
            info!(target: targets::PRINT_JOB, "Bed cleared, printer free");
            true
        } else {
            prompt.visible = true;
            warn!(target: targets::PRINT_JOB, "Bed clear not confirmed, prompt stays open");
            false
        }
    }

    pub fn clear_failed(&mut self) {
        if let Some(prompt) = self.pending.as_mut() {
            prompt.clearing = false;
            prompt.visible = true;
        }
    }

    pub fn dismiss(&mut self) -> bool {
        match self.pending.as_mut() {
            Some(prompt) if prompt.visible => {
                prompt.visible = false;
                true
            }
            _ => false,
        }
    }

    pub fn reopen(&mut self) -> bool {
        match self.pending.as_mut() {
            Some(prompt) if !prompt.visible => {
                prompt.visible = true;
                true
            }
            _ => false,
        }
    }
}
