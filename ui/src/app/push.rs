use std::any::TypeId;
use std::time::Duration;

use iced::futures::channel::mpsc;
use iced::futures::{SinkExt, StreamExt};
use iced::subscription;
use iced::Subscription;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use mmflink_core::{targets, HttpCommandClient, SocketFrame};

use crate::app::types::{Message, PushUpdate};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const CHANNEL_SIZE: usize = 100;
const SETTINGS_UPDATED_EVENT: &str = "SettingsUpdated";

struct PushSocket;

/// Keeps a socket to the server open and forwards plugin messages and
/// settings change events. Reconnects after a fixed delay.
pub(crate) fn connect(url: String, client: HttpCommandClient) -> Subscription<Message> {
    subscription::channel(
        TypeId::of::<PushSocket>(),
        CHANNEL_SIZE,
        move |mut output| async move {
            loop {
                let reason = match session(&url, &client, &mut output).await {
                    Ok(()) => "connection closed".to_string(),
                    Err(reason) => reason,
                };
                tracing::warn!(target: targets::PUSH, url = %url, "Push socket down: {}", reason);
                let _ = output
                    .send(Message::Push(PushUpdate::Disconnected(reason)))
                    .await;
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        },
    )
}

async fn session(
    url: &str,
    client: &HttpCommandClient,
    output: &mut mpsc::Sender<Message>,
) -> Result<(), String> {
    let auth = match client.socket_auth().await {
        Ok(auth) => Some(auth),
        Err(error) => {
            tracing::warn!(
                target: targets::PUSH,
                "Socket login failed, continuing unauthenticated: {}",
                error.technical_detail()
            );
            None
        }
    };

    tracing::debug!(target: targets::PUSH, url, "Connecting push socket");
    let (stream, _) = connect_async(url)
        .await
        .map_err(|error| format!("connect failed: {error}"))?;
    let (mut writer, mut reader) = stream.split();

    if let Some(auth) = auth {
        let frame = serde_json::json!({ "auth": auth }).to_string();
        writer
            .send(WsMessage::Text(frame))
            .await
            .map_err(|error| format!("auth frame failed: {error}"))?;
    }

    tracing::info!(target: targets::PUSH, url, "Push socket connected");
    let _ = output.send(Message::Push(PushUpdate::Connected)).await;

    while let Some(frame) = reader.next().await {
        let text = match frame.map_err(|error| error.to_string())? {
            WsMessage::Text(text) => text,
            WsMessage::Close(_) => return Ok(()),
            _ => continue,
        };
        let update = match SocketFrame::decode(&text) {
            Ok(SocketFrame::Plugin(message)) => PushUpdate::Plugin(message),
            Ok(SocketFrame::Event { kind }) if kind == SETTINGS_UPDATED_EVENT => {
                PushUpdate::SettingsUpdated
            }
            Ok(_) => continue,
            Err(error) => {
                tracing::debug!(
                    target: targets::PUSH,
                    "Skipping unreadable frame: {}",
                    error.technical_detail()
                );
                continue;
            }
        };
        if output.send(Message::Push(update)).await.is_err() {
            return Err("ui channel closed".to_string());
        }
    }

    Ok(())
}
