//! Development mailer that logs instead of sending.

use super::{MailError, Mailer};

pub struct ConsoleMailer;

impl Mailer for ConsoleMailer {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        tracing::info!(to = %to, subject = %subject, "Outbound email (console mailer)");
        tracing::debug!("Email body:\n{}", html_body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_mailer_always_succeeds() {
        let mailer = ConsoleMailer;
        assert!(
            mailer
                .send("someone@example.com", "Hello", "<p>Hi</p>")
                .is_ok()
        );
    }
}
