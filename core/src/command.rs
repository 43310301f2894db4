use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::settings::{PluginSettings, SettingsUpdate};
use crate::targets;
use crate::Error;

const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PluginCommand {
    RegisterPrinter { manufacturer: String, model: String },
    ForgetPrinter,
    MmfPrintComplete,
}

impl PluginCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PluginCommand::RegisterPrinter { .. } => "register_printer",
            PluginCommand::ForgetPrinter => "forget_printer",
            PluginCommand::MmfPrintComplete => "mmf_print_complete",
        }
    }
}

impl fmt::Display for PluginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CommandAck {
    #[serde(default, rename = "bedCleared", alias = "bed_cleared")]
    pub bed_cleared: bool,
}

impl CommandAck {
    /// Commands that answer with an empty body acknowledge nothing.
    pub fn from_body(command: &PluginCommand, body: &str) -> Result<Self, Error> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(body).map_err(|source| Error::Decode {
            context: format!("{command} response"),
            source,
        })?;
        if !value.is_object() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|source| Error::Decode {
            context: format!("{command} response"),
            source,
        })
    }
}

pub type CommandFuture<'a> = Pin<Box<dyn Future<Output = Result<CommandAck, Error>> + Send + 'a>>;

pub trait CommandClient: Send + Sync {
    fn send<'a>(&'a self, command: PluginCommand) -> CommandFuture<'a>;
}

#[derive(Debug, Clone)]
pub struct HttpCommandClient {
    http: reqwest::Client,
    server_url: String,
    plugin: String,
    api_key: Option<String>,
}

impl HttpCommandClient {
    pub fn new(config: &AppConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|source| Error::CommandTransport {
                command: "client setup".to_string(),
                source,
            })?;
        Ok(Self {
            http,
            server_url: config.server_url.trim_end_matches('/').to_string(),
            plugin: config.plugin_identifier.clone(),
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
        })
    }

    pub fn plugin_endpoint(&self) -> String {
        format!("{}/api/plugin/{}", self.server_url, self.plugin)
    }

    pub fn settings_endpoint(&self) -> String {
        format!("{}/api/settings", self.server_url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    pub async fn send(&self, command: PluginCommand) -> Result<CommandAck, Error> {
        let endpoint = self.plugin_endpoint();
        debug!(
            target: targets::COMMAND,
            command = %command,
            endpoint = %endpoint,
            "Sending plugin command"
        );

        let response = self
            .authorized(self.http.post(&endpoint).json(&command))
            .send()
            .await
            .map_err(|source| Error::CommandTransport {
                command: command.to_string(),
                source,
            })?;
        let body = read_body(&command.to_string(), response).await.inspect_err(|error| {
            warn!(
                target: targets::COMMAND,
                command = %command,
                error = %error,
                "Plugin command failed"
            );
        })?;

        let ack = CommandAck::from_body(&command, &body)?;
        debug!(
            target: targets::COMMAND,
            command = %command,
            bed_cleared = ack.bed_cleared,
            "Plugin command acknowledged"
        );
        Ok(ack)
    }

    pub async fn fetch_settings(&self) -> Result<PluginSettings, Error> {
        let context = "settings fetch";
        let response = self
            .authorized(self.http.get(self.settings_endpoint()))
            .send()
            .await
            .map_err(|source| Error::CommandTransport {
                command: context.to_string(),
                source,
            })?;
        let body = read_body(context, response).await?;
        let tree: Value = serde_json::from_str(&body).map_err(|source| Error::Decode {
            context: "settings".to_string(),
            source,
        })?;
        plugin_settings_from_tree(&tree, &self.plugin)
    }

    pub async fn save_settings(&self, update: &SettingsUpdate) -> Result<(), Error> {
        let context = "settings save";
        let section = serde_json::to_value(update).map_err(|source| Error::Decode {
            context: "settings update".to_string(),
            source,
        })?;
        let mut plugins = serde_json::Map::new();
        plugins.insert(self.plugin.clone(), section);
        let payload = serde_json::json!({ "plugins": plugins });
        let response = self
            .authorized(self.http.post(self.settings_endpoint()).json(&payload))
            .send()
            .await
            .map_err(|source| Error::CommandTransport {
                command: context.to_string(),
                source,
            })?;
        read_body(context, response).await?;
        debug!(target: targets::SETTINGS, "Settings saved");
        Ok(())
    }

    /// Logs in passively with the API key and returns the `user:session`
    /// string the push socket expects in its auth frame.
    pub async fn socket_auth(&self) -> Result<String, Error> {
        let context = "socket login";
        let endpoint = format!("{}/api/login", self.server_url);
        let response = self
            .authorized(
                self.http
                    .post(&endpoint)
                    .json(&serde_json::json!({ "passive": true })),
            )
            .send()
            .await
            .map_err(|source| Error::CommandTransport {
                command: context.to_string(),
                source,
            })?;
        let body = read_body(context, response).await?;
        socket_auth_token(&body)
    }
}

impl CommandClient for HttpCommandClient {
    fn send<'a>(&'a self, command: PluginCommand) -> CommandFuture<'a> {
        Box::pin(async move { HttpCommandClient::send(self, command).await })
    }
}

async fn read_body(command: &str, response: reqwest::Response) -> Result<String, Error> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| Error::CommandTransport {
            command: command.to_string(),
            source,
        })?;
    if !status.is_success() {
        return Err(Error::CommandRejected {
            command: command.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// Picks `plugins.<plugin>` out of the full settings tree.
pub fn plugin_settings_from_tree(tree: &Value, plugin: &str) -> Result<PluginSettings, Error> {
    let Some(section) = tree.get("plugins").and_then(|plugins| plugins.get(plugin)) else {
        warn!(target: targets::SETTINGS, plugin, "Plugin settings missing, using defaults");
        return Ok(PluginSettings::default());
    };
    serde_json::from_value(section.clone()).map_err(|source| Error::Decode {
        context: format!("{plugin} settings"),
        source,
    })
}

fn socket_auth_token(body: &str) -> Result<String, Error> {
    #[derive(Deserialize)]
    struct LoginResponse {
        name: String,
        session: String,
    }

    let login: LoginResponse = serde_json::from_str(body).map_err(|source| Error::Decode {
        context: "login response".to_string(),
        source,
    })?;
    Ok(format!("{}:{}", login.name, login.session))
}

#[derive(Debug, Clone, Default)]
pub struct MockCommandClient {
    queue: Arc<Mutex<VecDeque<Result<CommandAck, Error>>>>,
    sent: Arc<Mutex<Vec<PluginCommand>>>,
}

impl MockCommandClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ack(&self, ack: CommandAck) {
        self.push_result(Ok(ack));
    }

    pub fn push_error(&self, error: Error) {
        self.push_result(Err(error));
    }

    pub fn sent(&self) -> Vec<PluginCommand> {
        if let Ok(sent) = self.sent.lock() {
            return sent.clone();
        }
        Vec::new()
    }

    fn push_result(&self, result: Result<CommandAck, Error>) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(result);
        }
    }

    fn pop_result(&self) -> Option<Result<CommandAck, Error>> {
        if let Ok(mut queue) = self.queue.lock() {
            return queue.pop_front();
        }
        None
    }

    fn record(&self, command: &PluginCommand) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(command.clone());
        }
    }
}

impl CommandClient for MockCommandClient {
    fn send<'a>(&'a self, command: PluginCommand) -> CommandFuture<'a> {
        Box::pin(async move {
            self.record(&command);
            if let Some(result) = self.pop_result() {
                return result;
            }

            Err(Error::CommandFailure {
                command: command.to_string(),
                details: "MockCommandClient queue is empty".to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_future<T>(future: impl Future<Output = T>) -> T {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("tokio runtime");
        runtime.block_on(future)
    }

    #[test]
    fn commands_serialize_with_command_tag() {
        let register = PluginCommand::RegisterPrinter {
            manufacturer: "Acme".to_string(),
            model: "X1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&register).expect("encode"),
            serde_json::json!({"command": "register_printer", "manufacturer": "Acme", "model": "X1"})
        );
        assert_eq!(
            serde_json::to_value(PluginCommand::ForgetPrinter).expect("encode"),
            serde_json::json!({"command": "forget_printer"})
        );
        assert_eq!(
            serde_json::to_value(PluginCommand::MmfPrintComplete).expect("encode"),
            serde_json::json!({"command": "mmf_print_complete"})
        );
    }

    #[test]
    fn ack_accepts_both_spellings_and_empty_body() {
        let command = PluginCommand::MmfPrintComplete;
        assert!(CommandAck::from_body(&command, r#"{"bedCleared":true}"#).expect("camel").bed_cleared);
        assert!(CommandAck::from_body(&command, r#"{"bed_cleared":true}"#).expect("snake").bed_cleared);
        assert!(!CommandAck::from_body(&command, "").expect("empty").bed_cleared);
        assert!(!CommandAck::from_body(&command, "null").expect("null").bed_cleared);
        assert!(CommandAck::from_body(&command, "{not json").is_err());
    }

    #[test]
    fn endpoints_are_built_from_config() {
        let config = AppConfig {
            server_url: "http://octopi.local/".to_string(),
            ..AppConfig::default()
        };
        let client = HttpCommandClient::new(&config).expect("client");
        assert_eq!(client.plugin_endpoint(), "http://octopi.local/api/plugin/myminifactory");
        assert_eq!(client.settings_endpoint(), "http://octopi.local/api/settings");
    }

    #[test]
    fn plugin_section_is_read_from_settings_tree() {
        let tree = serde_json::json!({
            "plugins": {
                "myminifactory": {
                    "printer_model": "mini",
                    "registration_complete": true,
                    "supported_printers": [{"brand": "Prusa", "model": "mini"}]
                }
            }
        });
        let settings = plugin_settings_from_tree(&tree, "myminifactory").expect("settings");
        assert_eq!(settings.printer_model, "mini");
        assert!(settings.registration_complete);
        assert_eq!(settings.supported_printers.len(), 1);

        let empty = plugin_settings_from_tree(&serde_json::json!({}), "myminifactory")
            .expect("defaults");
        assert_eq!(empty, PluginSettings::default());
    }

    #[test]
    fn mock_returns_queued_ack_and_records_command() {
        let mock = MockCommandClient::new();
        mock.push_ack(CommandAck { bed_cleared: true });

        let ack = run_future(mock.send(PluginCommand::MmfPrintComplete)).expect("ack");
        assert!(ack.bed_cleared);
        assert_eq!(mock.sent(), vec![PluginCommand::MmfPrintComplete]);
    }

    #[test]
    fn mock_empty_queue_returns_error() {
        let mock = MockCommandClient::new();
        let error = run_future(mock.send(PluginCommand::ForgetPrinter)).expect_err("expected error");
        match error {
            Error::CommandFailure { command, .. } => assert_eq!(command, "forget_printer"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn login_response_becomes_socket_auth() {
        let body = r#"{"name": "octo", "session": "abc123", "admin": true}"#;
        assert_eq!(socket_auth_token(body).expect("token"), "octo:abc123");
        assert!(socket_auth_token(r#"{"name": "octo"}"#).is_err());
    }
}
