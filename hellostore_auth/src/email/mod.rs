//! Outbound email abstraction.
//!
//! Dispatch is fire-and-forget from the flows' perspective: a failure
//! surfaces to the caller but is never retried and never rolls back state
//! that was already persisted.

mod console;
mod smtp;

use thiserror::Error;

pub use console::ConsoleMailer;
pub use smtp::{SmtpConfig, SmtpMailer};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Invalid address: {0}")]
    Address(String),
}

/// Sends HTML mail.
pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError>;
}

/// Pick the SMTP mailer when configured, the console mailer otherwise.
pub fn mailer_from_env() -> Box<dyn Mailer> {
    match SmtpConfig::from_env() {
        Some(config) => match SmtpMailer::new(config) {
            Ok(mailer) => Box::new(mailer),
            Err(e) => {
                tracing::error!("Failed to set up SMTP mailer, falling back to console: {}", e);
                Box::new(ConsoleMailer)
            }
        },
        None => {
            tracing::info!("SMTP not configured, logging outbound mail to console");
            Box::new(ConsoleMailer)
        }
    }
}
