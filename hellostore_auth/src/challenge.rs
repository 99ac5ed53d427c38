//! Cloudflare Turnstile human-challenge verification.

use serde::Deserialize;

use crate::config::{TURNSTILE_SECRET, TURNSTILE_VERIFY_URL};

#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
}

/// Verifies a Turnstile response token with the siteverify endpoint.
///
/// When no secret is configured the check is disabled, which is only
/// acceptable in development.
#[derive(Clone)]
pub struct ChallengeVerifier {
    client: reqwest::Client,
    secret: Option<String>,
    verify_url: String,
}

impl ChallengeVerifier {
    pub fn from_env() -> Self {
        Self::new(TURNSTILE_SECRET.clone(), TURNSTILE_VERIFY_URL.clone())
    }

    pub fn new(secret: Option<String>, verify_url: String) -> Self {
        if secret.is_none() {
            tracing::warn!("TURNSTILE_SECRET not set, human-challenge check is disabled");
        }
        Self {
            client: reqwest::Client::new(),
            secret,
            verify_url,
        }
    }

    /// Validate a challenge token. Any failure to reach or parse the
    /// verification service counts as a rejection.
    pub async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> bool {
        let Some(secret) = self.secret.as_deref() else {
            return true;
        };
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            tracing::debug!("Challenge token missing from request");
            return false;
        };

        let mut form = vec![("secret", secret), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        let response = self.client.post(&self.verify_url).form(&form).send().await;

        match response {
            Ok(resp) => match resp.json::<SiteverifyResponse>().await {
                Ok(body) => body.success,
                Err(e) => {
                    tracing::error!("Challenge verification returned invalid body: {}", e);
                    false
                }
            },
            Err(e) => {
                tracing::error!("Challenge verification request failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_verifier_accepts_everything() {
        let verifier = ChallengeVerifier::new(None, "http://localhost/unused".to_string());
        assert!(verifier.verify(None, None).await);
        assert!(verifier.verify(Some("anything"), Some("1.2.3.4")).await);
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let verifier = ChallengeVerifier::new(
            Some("secret".to_string()),
            "http://localhost/unused".to_string(),
        );
        assert!(!verifier.verify(None, None).await);
        assert!(!verifier.verify(Some(""), None).await);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_rejected() {
        // Port 9 (discard) refuses connections on virtually every host.
        let verifier = ChallengeVerifier::new(
            Some("secret".to_string()),
            "http://127.0.0.1:9/siteverify".to_string(),
        );
        assert!(!verifier.verify(Some("token"), None).await);
    }
}
