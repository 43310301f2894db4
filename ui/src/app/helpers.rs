use iced::Color;

use mmflink_core::{NoticeKind, PrintWorkflowState, RegistrationPhase};

pub(crate) fn level_color(level: tracing::Level) -> Color {
    match level {
        tracing::Level::ERROR => Color::from_rgb8(0xe0, 0x4f, 0x4f),
        tracing::Level::WARN => Color::from_rgb8(0xe0, 0xb0, 0x4f),
        tracing::Level::INFO => Color::from_rgb8(0x3b, 0x82, 0xf6),
        tracing::Level::DEBUG => Color::from_rgb8(0x22, 0x7d, 0x64),
        tracing::Level::TRACE => Color::from_rgb8(0x6b, 0x72, 0x80),
    }
}

pub(crate) fn notice_color(kind: NoticeKind) -> Color {
    match kind {
        NoticeKind::Info => Color::from_rgb8(0x3b, 0x82, 0xf6),
        NoticeKind::Error => Color::from_rgb8(0xe0, 0x4f, 0x4f),
    }
}

pub(crate) fn phase_label(phase: RegistrationPhase) -> &'static str {
    match phase {
        RegistrationPhase::Idle => "Not registered",
        RegistrationPhase::Registering => "Registering",
        RegistrationPhase::Complete => "Registered",
    }
}

pub(crate) fn workflow_label(state: PrintWorkflowState) -> &'static str {
    match state {
        PrintWorkflowState::None => "Idle",
        PrintWorkflowState::CompletedPendingClear => "Completed, waiting for bed clear",
        PrintWorkflowState::CancelledPendingClear => "Cancelled, waiting for bed clear",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_states_mention_bed_clear() {
        for state in [
            PrintWorkflowState::CompletedPendingClear,
            PrintWorkflowState::CancelledPendingClear,
        ] {
            assert!(workflow_label(state).contains("bed clear"));
        }
        assert_eq!(workflow_label(PrintWorkflowState::None), "Idle");
    }

    #[test]
    fn errors_are_red() {
        assert_eq!(notice_color(NoticeKind::Error), level_color(tracing::Level::ERROR));
    }
}
