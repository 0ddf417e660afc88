use std::time::Duration;

use clap::Parser;

use crate::queue::Scheme;

/// Queue relay: HTTP front for hosted inference backends.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Config {
    /// Listen address (e.g. ":3000" or "0.0.0.0:3000")
    #[arg(long, default_value = ":3000", env = "ADDR")]
    pub addr: String,

    /// Log format: "text" or "json"
    #[arg(long, default_value = "text", env = "LOG_FORMAT")]
    pub log_format: String,

    /// Bearer token sent to queue backends
    #[arg(long, env = "HF_AUTH")]
    pub hf_auth: Option<String>,

    /// Client version advertised as "gradio_client/<version>"
    #[arg(long, default_value = "0.2.7", env = "CLIENT_VERSION")]
    pub client_version: String,

    /// Per-job deadline in seconds, connection included
    #[arg(long, default_value_t = 120, env = "JOB_TIMEOUT_SECS")]
    pub job_timeout_secs: u64,

    /// Largest accepted queue message in MiB
    #[arg(long, default_value_t = 1024, env = "MAX_MESSAGE_MB")]
    pub max_message_mb: usize,

    /// Largest accepted request body in MiB
    #[arg(long, default_value_t = 50, env = "BODY_LIMIT_MB")]
    pub body_limit_mb: usize,

    /// Queue connection scheme: "wss" or "ws"
    #[arg(long, default_value = "wss", env = "QUEUE_SCHEME")]
    pub queue_scheme: Scheme,

    /// Override the Falcon-40B queue host
    #[arg(long, env = "FALCON_HOST")]
    pub falcon_host: Option<String>,

    /// Override the MPT-30B queue host
    #[arg(long, env = "MOSAIC_HOST")]
    pub mosaic_host: Option<String>,

    /// Speech backend queue host; the speech route is mounted only when set
    #[arg(long, env = "SPEECH_HOST")]
    pub speech_host: Option<String>,

    /// Speech backend function index
    #[arg(long, default_value_t = 0, env = "SPEECH_FN_INDEX")]
    pub speech_fn_index: u32,
}

impl Config {
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    pub fn max_message_size(&self) -> usize {
        mib(self.max_message_mb)
    }

    pub fn body_limit(&self) -> usize {
        mib(self.body_limit_mb)
    }
}

fn mib(n: usize) -> usize {
    n.saturating_mul(1024 * 1024)
}

/// Convert Go-style ":3000" to "0.0.0.0:3000".
pub fn normalize_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["queue-relay"]).unwrap();
        assert_eq!(config.queue_scheme, Scheme::Wss);
        assert_eq!(config.job_timeout(), Duration::from_secs(120));
        assert_eq!(config.max_message_size(), 1024 * 1024 * 1024);
        assert_eq!(config.body_limit(), 50 * 1024 * 1024);
        assert_eq!(config.client_version, "0.2.7");
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "queue-relay",
            "--queue-scheme",
            "ws",
            "--job-timeout-secs",
            "5",
            "--speech-host",
            "tts.example/",
        ])
        .unwrap();
        assert_eq!(config.queue_scheme, Scheme::Ws);
        assert_eq!(config.job_timeout(), Duration::from_secs(5));
        assert_eq!(config.speech_host.as_deref(), Some("tts.example/"));
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        assert!(Config::try_parse_from(["queue-relay", "--queue-scheme", "https"]).is_err());
    }

    #[test]
    fn test_normalize_addr() {
        assert_eq!(normalize_addr(":3000"), "0.0.0.0:3000");
        assert_eq!(normalize_addr("127.0.0.1:8080"), "127.0.0.1:8080");
    }
}
