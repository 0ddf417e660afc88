//! In-process queue server for tests. Plays a fixed script against exactly
//! one client connection on `127.0.0.1`.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::accept_hdr_async;

/// One server-side step.
pub(crate) enum Script {
    /// Send a JSON text frame.
    Send(Value),
    /// Send a raw text frame.
    Raw(String),
    /// Wait for one client text frame and record it.
    Expect,
    Delay(Duration),
    /// Close the connection from the server side.
    Close,
    /// Stop responding without closing.
    Hang,
}

impl Script {
    pub(crate) fn send(value: Value) -> Self {
        Script::Send(value)
    }
}

/// What the fake server observed.
#[derive(Debug, Default)]
pub(crate) struct Seen {
    pub received: Vec<Value>,
    pub user_agent: Option<String>,
    pub authorization: Option<String>,
}

pub(crate) struct FakeQueue {
    /// Host string to hand to a `ws` queue client.
    pub host: String,
    task: JoinHandle<Seen>,
}

impl FakeQueue {
    pub(crate) async fn spawn(script: Vec<Script>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let task = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();

            let mut seen = Seen::default();
            let mut user_agent = None;
            let mut authorization = None;
            let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                let header = |name: &str| {
                    req.headers()
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string)
                };
                user_agent = header("user-agent");
                authorization = header("authorization");
                Ok(resp)
            };
            let mut ws = accept_hdr_async(tcp, callback).await.unwrap();
            seen.user_agent = user_agent;
            seen.authorization = authorization;

            for step in script {
                match step {
                    Script::Send(value) => {
                        ws.send(Message::Text(value.to_string())).await.unwrap();
                    }
                    Script::Raw(text) => {
                        ws.send(Message::Text(text)).await.unwrap();
                    }
                    Script::Expect => loop {
                        match ws.next().await {
                            Some(Ok(Message::Text(text))) => {
                                seen.received.push(serde_json::from_str(&text).unwrap());
                                break;
                            }
                            Some(Ok(_)) => continue,
                            _ => return seen,
                        }
                    },
                    Script::Delay(d) => tokio::time::sleep(d).await,
                    Script::Close => {
                        ws.close(None).await.ok();
                        return seen;
                    }
                    Script::Hang => std::future::pending::<()>().await,
                }
            }

            // Record anything the client sends until it hangs up.
            while let Some(Ok(msg)) = ws.next().await {
                if let Message::Text(text) = msg {
                    seen.received.push(serde_json::from_str(&text).unwrap());
                }
            }
            seen
        });

        Self {
            host: format!("{addr}/"),
            task,
        }
    }

    /// Wait for the client to disconnect and return what was observed.
    pub(crate) async fn finish(self) -> Seen {
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("fake queue did not finish")
            .unwrap()
    }
}

/// A local address with nothing listening on it.
pub(crate) async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("{addr}/")
}

/// A local plain-TCP listener that answers every connection with an HTTP
/// error and hangs up, so a TLS client handshake against it fails.
pub(crate) async fn plain_tcp_host() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut tcp, _)) = listener.accept().await {
            tcp.write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n")
                .await
                .ok();
            tcp.shutdown().await.ok();
        }
    });

    format!("{addr}/")
}
