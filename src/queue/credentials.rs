use http::header::{InvalidHeaderValue, AUTHORIZATION, USER_AGENT};
use http::{HeaderMap, HeaderValue};

/// Identity and credential headers sent on every queue connection.
/// Read-only once built; shared by all jobs.
#[derive(Debug, Clone)]
pub struct QueueCredentials {
    user_agent: HeaderValue,
    authorization: Option<HeaderValue>,
}

impl QueueCredentials {
    /// `client_version` becomes `gradio_client/{client_version}`; the token,
    /// when given, is sent as a bearer credential.
    pub fn new(client_version: &str, token: Option<&str>) -> Result<Self, InvalidHeaderValue> {
        let user_agent = HeaderValue::from_str(&format!("gradio_client/{client_version}"))?;

        let authorization = match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };

        Ok(Self {
            user_agent,
            authorization,
        })
    }

    pub fn has_token(&self) -> bool {
        self.authorization.is_some()
    }

    /// Add identity and authentication to an outgoing handshake request.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(USER_AGENT, self.user_agent.clone());
        if let Some(auth) = &self.authorization {
            headers.insert(AUTHORIZATION, auth.clone());
        }
    }
}
