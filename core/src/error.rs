use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Registration needs a {field}")]
    InvalidRegistration { field: &'static str },
    #[error("Command {command} could not be delivered")]
    CommandTransport {
        command: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Command {command} rejected with status {status}")]
    CommandRejected {
        command: String,
        status: u16,
        body: String,
    },
    #[error("Command {command} failed")]
    CommandFailure { command: String, details: String },
    #[error("Failed to decode {context}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("RON {action} error")]
    Ron {
        action: StorageAction,
        path: Option<String>,
        #[source]
        source: ron::Error,
    },
    #[error("Storage {action} error")]
    StorageIo {
        action: StorageAction,
        path: Option<String>,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageAction {
    Load,
    Save,
}

impl fmt::Display for StorageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageAction::Load => f.write_str("load"),
            StorageAction::Save => f.write_str("save"),
        }
    }
}

impl Error {
    pub fn user_summary(&self) -> String {
        match self {
            Error::InvalidRegistration { field } => {
                format!("Select a printer {field} before registering.")
            }
            Error::CommandTransport { command, .. } => {
                format!("Could not reach OctoPrint to send {command}.")
            }
            Error::CommandRejected { command, status, .. } => {
                format!("OctoPrint rejected {command} (HTTP {status}).")
            }
            Error::CommandFailure { command, .. } => format!("Command {command} failed."),
            Error::Decode { context, .. } => format!("Unreadable {context}."),
            Error::Ron { action, .. } => format!("Failed to {action} configuration data."),
            Error::StorageIo { action, .. } => format!("Failed to {action} configuration file."),
        }
    }

    pub fn technical_detail(&self) -> String {
        match self {
            Error::InvalidRegistration { field } => {
                format!("register_printer requires a non-empty {field}.")
            }
            Error::CommandTransport { command, source } => {
                format!("Transport error for {command}: {source}")
            }
            Error::CommandRejected {
                command,
                status,
                body,
            } => {
                let body = body.trim();
                if body.is_empty() {
                    format!("{command} returned HTTP {status}.")
                } else {
                    format!("{command} returned HTTP {status}: {body}")
                }
            }
            Error::CommandFailure { command, details } => {
                format!("{command} failed: {details}")
            }
            Error::Decode { context, source } => format!("Decoding {context}: {source}"),
            Error::Ron {
                action,
                path,
                source,
            } => {
                let path = path
                    .as_ref()
                    .map(|value| format!(" path={value}."))
                    .unwrap_or_default();
                format!("RON {action} error.{path} {source}")
            }
            Error::StorageIo {
                action,
                path,
                source,
            } => {
                let path = path
                    .as_ref()
                    .map(|value| format!(" path={value}."))
                    .unwrap_or_default();
                format!("Storage {action} error.{path} {source}")
            }
        }
    }
}
