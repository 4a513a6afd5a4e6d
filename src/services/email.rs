/// Password-reset mail delivery over SMTP
use crate::config::EmailConfig;
use crate::error::{AppError, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::Arc;
use tracing::{info, warn};

/// Async email transport wrapper (SMTP or no-op)
///
/// When no SMTP host is configured the service operates in no-op mode and
/// only logs, which keeps development and test environments mail-free.
#[derive(Clone)]
pub struct EmailService {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
    password_reset_base_url: String,
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid SMTP_FROM address: {}", e)))?;

        let transport = if config.smtp_host.trim().is_empty() {
            warn!("SMTP host not configured; email service will operate in no-op mode");
            None
        } else {
            let builder =
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                    .map_err(|e| {
                        AppError::Internal(format!("Failed to configure SMTP transport: {}", e))
                    })?
                    .port(config.smtp_port);

            let builder = if let (Some(username), Some(password)) =
                (&config.smtp_username, &config.smtp_password)
            {
                builder.credentials(Credentials::new(username.to_string(), password.to_string()))
            } else {
                builder
            };

            Some(Arc::new(builder.build()))
        };

        Ok(Self {
            transport,
            from,
            password_reset_base_url: config.password_reset_base_url.clone(),
        })
    }

    /// Send a password reset email carrying the reset link
    pub async fn send_password_reset_email(&self, recipient: &str, token: &str) -> Result<()> {
        let link = self.build_password_reset_link(token);
        let subject = "Password Reset Requested";
        let body = format!(
            "Please follow the link to reset your password:\n\n{}\n\nThe link expires in one hour. If you did not request it, disregard this email.",
            link
        );
        self.send_mail(recipient, subject, &body).await
    }

    fn build_password_reset_link(&self, token: &str) -> String {
        format!(
            "{}/auth/reset_password/{}",
            self.password_reset_base_url.trim_end_matches('/'),
            token
        )
    }

    async fn send_mail(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        if let Some(transport) = &self.transport {
            let to = recipient
                .parse::<Mailbox>()
                .map_err(|e| AppError::Internal(format!("Invalid recipient address: {}", e)))?;

            let email = Message::builder()
                .from(self.from.clone())
                .to(to)
                .subject(subject)
                .header(header::ContentType::TEXT_PLAIN)
                .body(body.to_string())
                .map_err(|e| AppError::Internal(format!("Failed to build email message: {}", e)))?;

            transport
                .send(email)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;
            info!(subject, "email sent");
        } else {
            info!(subject, recipient, "email service in no-op mode; skipping send");
        }
        Ok(())
    }
}
