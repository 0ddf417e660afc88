use std::fmt;
use std::str::FromStr;

use url::Url;

use super::QueueError;

/// WebSocket scheme used to reach queue backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    Ws,
    #[default]
    Wss,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Ws => f.write_str("ws"),
            Scheme::Wss => f.write_str("wss"),
        }
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ws" => Ok(Scheme::Ws),
            "wss" => Ok(Scheme::Wss),
            other => Err(format!("unsupported queue scheme {other:?} (expected ws or wss)")),
        }
    }
}

/// Build the queue-join URL for a backend host such as `name.hf.space/`.
/// Any path already on the host is kept as a prefix.
pub fn join_url(scheme: Scheme, host: &str) -> Result<Url, QueueError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(QueueError::InvalidUrl("backend host is empty".into()));
    }

    let mut parsed = Url::parse(&format!("{scheme}://{host}"))
        .map_err(|e| QueueError::InvalidUrl(format!("{host}: {e}")))?;

    let base = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&format!("{base}/queue/join"));
    parsed.set_query(None);
    parsed.set_fragment(None);

    Ok(parsed)
}
