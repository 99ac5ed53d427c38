//! SMTP-based mailer for production.

use lettre::{
    Message, SmtpTransport, Transport, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};

use super::{MailError, Mailer};

/// Configuration for SMTP sending.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: Option<String>,
}

impl SmtpConfig {
    /// Create config from environment variables.
    ///
    /// Required: SMTP_HOST, SMTP_USERNAME, SMTP_PASSWORD, SMTP_FROM_EMAIL.
    /// Optional: SMTP_PORT (default 465), SMTP_FROM_NAME.
    pub fn from_env() -> Option<Self> {
        fn get_env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|s| !s.is_empty())
        }

        let host = get_env("SMTP_HOST")?;
        let username = get_env("SMTP_USERNAME")?;
        let password = get_env("SMTP_PASSWORD")?;
        let from_email = get_env("SMTP_FROM_EMAIL")?;

        let port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(465);

        let from_name = std::env::var("SMTP_FROM_NAME").ok();

        Some(Self {
            host,
            port,
            username,
            password,
            from_email,
            from_name,
        })
    }
}

pub struct SmtpMailer {
    transport: SmtpTransport,
    from_email: String,
    from_name: Option<String>,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Result<Self, MailError> {
        let creds = Credentials::new(config.username, config.password);

        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| MailError::Transport(format!("Failed to create SMTP transport: {e}")))?
            .port(config.port)
            .credentials(creds)
            .build();

        tracing::info!(host = %config.host, port = config.port, "SMTP mailer configured");

        Ok(Self {
            transport,
            from_email: config.from_email,
            from_name: config.from_name,
        })
    }

    fn from_address(&self) -> String {
        match &self.from_name {
            Some(name) => format!("{} <{}>", name, self.from_email),
            None => self.from_email.clone(),
        }
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        let from = self
            .from_address()
            .parse()
            .map_err(|e| MailError::Address(format!("Invalid from address: {e}")))?;

        let to_addr = to
            .parse()
            .map_err(|e| MailError::Address(format!("Invalid to address: {e}")))?;

        let email = Message::builder()
            .from(from)
            .to(to_addr)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| MailError::Transport(format!("Failed to build message: {e}")))?;

        self.transport
            .send(&email)
            .map(|_| ())
            .map_err(|e| MailError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_address_with_name() {
        let mailer = SmtpMailer {
            transport: SmtpTransport::builder_dangerous("localhost").build(),
            from_email: "shop@example.com".to_string(),
            from_name: Some("HelloStore".to_string()),
        };
        assert_eq!(mailer.from_address(), "HelloStore <shop@example.com>");
    }

    #[test]
    fn test_from_address_without_name() {
        let mailer = SmtpMailer {
            transport: SmtpTransport::builder_dangerous("localhost").build(),
            from_email: "shop@example.com".to_string(),
            from_name: None,
        };
        assert_eq!(mailer.from_address(), "shop@example.com");
    }
}
