use std::sync::Once;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_with_config, MaybeTlsStream, WebSocketStream};
use tracing::debug;
use url::Url;

use super::message::{ClientMessage, ServerMessage};
use super::{QueueCredentials, QueueError};

static CRYPTO_PROVIDER: Once = Once::new();

/// Install the process-wide rustls provider used for `wss` connections.
/// Safe to call repeatedly; an already installed provider is kept.
pub fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("rustls crypto provider already installed");
        }
    });
}

/// One queue connection, owned by exactly one job and dropped with it.
pub struct Session {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Session {
    /// Connect to the queue-join endpoint with identity headers attached.
    pub async fn open(
        url: &Url,
        credentials: &QueueCredentials,
        max_message_size: usize,
    ) -> Result<Self, QueueError> {
        install_crypto_provider();

        let mut request = url.as_str().into_client_request()?;
        credentials.apply(request.headers_mut());

        let config = WebSocketConfig {
            max_message_size: Some(max_message_size),
            max_frame_size: Some(max_message_size),
            ..Default::default()
        };

        let (stream, response) = connect_async_with_config(request, Some(config), false).await?;
        debug!(
            url = %url,
            status = response.status().as_u16(),
            "queue connection open"
        );

        Ok(Self { stream })
    }

    /// Next decoded server message. Control and binary frames are skipped.
    pub async fn next_message(&mut self) -> Result<ServerMessage, QueueError> {
        while let Some(frame) = self.stream.next().await {
            match frame? {
                Message::Text(text) => {
                    return ServerMessage::decode(&text).map_err(QueueError::Malformed);
                }
                Message::Close(frame) => {
                    debug!(?frame, "queue server closed the connection");
                    return Err(QueueError::Closed);
                }
                Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Err(QueueError::Closed)
    }

    pub async fn send(&mut self, msg: &ClientMessage<'_>) -> Result<(), QueueError> {
        let text = serde_json::to_string(msg).map_err(QueueError::Encode)?;
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    /// Best-effort close once the job has its outcome.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "queue connection close failed");
        }
    }
}
