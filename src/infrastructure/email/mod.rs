//! Email Module
//!
//! SMTP delivery for the portal's conditional notifications: password reset
//! links, new-follower mail, and new-comment mail. Delivery can be disabled
//! via settings, in which case mail is logged instead of sent (development
//! and test default).

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpSettings;
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// SMTP mailer for notification email.
#[derive(Clone)]
pub struct Mailer {
    settings: SmtpSettings,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl Mailer {
    /// Build a mailer from settings. With `disabled = true` no transport is
    /// created and sends become log lines.
    pub fn new(settings: SmtpSettings) -> Result<Self, AppError> {
        let transport = if settings.disabled {
            None
        } else {
            let creds =
                Credentials::new(settings.username.clone(), settings.password.clone());
            let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map_err(|e| AppError::Internal(format!("SMTP transport setup failed: {}", e)))?
                .port(settings.port)
                .credentials(creds)
                .build();
            Some(transport)
        };

        Ok(Self {
            settings,
            transport,
        })
    }

    /// Send the password reset link. The caller holds the raw token; only
    /// its hash is in the database.
    pub async fn send_password_reset(&self, to: &str, token: &str) -> Result<(), AppError> {
        let reset_url = format!(
            "{}/reset-password?token={}",
            self.settings.frontend_url, token
        );
        let body = format!(
            "A password reset was requested for your account.\n\n\
             Reset your password: {}\n\n\
             If you did not request this, you can ignore this mail.",
            reset_url
        );

        self.send("password_reset", to, "Reset your KPortal password", body)
            .await
    }

    /// Notify a user that someone started following them.
    pub async fn send_new_follower(&self, to: &str, follower_username: &str) -> Result<(), AppError> {
        let body = format!(
            "{} is now following you on KPortal.",
            follower_username
        );

        self.send("follower", to, "You have a new follower", body).await
    }

    /// Notify a resource owner about a new comment.
    pub async fn send_new_comment(
        &self,
        to: &str,
        commenter_username: &str,
        resource_caption: &str,
    ) -> Result<(), AppError> {
        let body = format!(
            "{} commented on your resource \"{}\".",
            commenter_username, resource_caption
        );

        self.send("comment", to, "New comment on your resource", body)
            .await
    }

    async fn send(
        &self,
        kind: &str,
        to: &str,
        subject: &str,
        body: String,
    ) -> Result<(), AppError> {
        let Some(transport) = &self.transport else {
            tracing::info!(kind = kind, to = to, subject = subject, "Mail delivery disabled, skipping send");
            metrics::record_notification_email(kind, "skipped");
            return Ok(());
        };

        let message = Message::builder()
            .from(
                self.settings
                    .from_address
                    .parse()
                    .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::BadRequest(format!("Invalid recipient address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::Internal(format!("Mail build failed: {}", e)))?;

        match transport.send(message).await {
            Ok(_) => {
                metrics::record_notification_email(kind, "sent");
                Ok(())
            }
            Err(e) => {
                metrics::record_notification_email(kind, "failed");
                Err(AppError::Internal(format!("Mail send failed: {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_settings() -> SmtpSettings {
        SmtpSettings {
            host: "localhost".into(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from_address: "noreply@kportal.dev".into(),
            frontend_url: "http://localhost:3000".into(),
            disabled: true,
        }
    }

    #[tokio::test]
    async fn test_disabled_mailer_skips_send() {
        let mailer = Mailer::new(disabled_settings()).unwrap();
        // Must succeed without any SMTP server available
        mailer
            .send_password_reset("user@example.com", "token123")
            .await
            .unwrap();
        mailer
            .send_new_follower("user@example.com", "jdoe")
            .await
            .unwrap();
    }
}
