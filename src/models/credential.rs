use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};

/// Resolved API credentials for one invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub api_key: String,
    pub api_secret: Option<String>,
    pub branch: Option<String>,
    pub base_url: Option<String>,
}

impl Credential {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: None,
            branch: None,
            base_url: None,
        }
    }

    /// Value of the `x-api-key` header: the raw key, or base64 of
    /// `key:secret` when a secret is configured.
    pub fn api_key_header(&self) -> String {
        match self.api_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => BASE64_STANDARD.encode(format!("{}:{}", self.api_key, secret)),
            None => self.api_key.clone(),
        }
    }
}

// Keeps key material out of logs and panic messages.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &"***")
            .field("api_secret", &self.api_secret.as_ref().map(|_| "***"))
            .field("branch", &self.branch)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_only_is_sent_verbatim() {
        assert_eq!(Credential::new("pk_live_1").api_key_header(), "pk_live_1");
    }

    #[test]
    fn key_and_secret_are_base64_joined() {
        let credential = Credential {
            api_secret: Some("s3cret".to_string()),
            ..Credential::new("key")
        };
        // base64("key:s3cret")
        assert_eq!(credential.api_key_header(), "a2V5OnMzY3JldA==");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let credential = Credential {
            api_secret: Some("s3cret".to_string()),
            ..Credential::new("key")
        };
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("\"key\""));
    }
}
