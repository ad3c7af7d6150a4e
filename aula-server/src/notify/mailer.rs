//! Mail delivery
//!
//! [`SesMailer`] sends through Amazon SES v2; [`LogMailer`] only logs and is
//! used when no sender address is configured.

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use thiserror::Error;

use super::templates::OutgoingEmail;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to build message: {0}")]
    Build(String),
    #[error("Failed to send message: {0}")]
    Send(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

pub struct SesMailer {
    client: SesClient,
    from: String,
}

impl SesMailer {
    pub fn new(client: SesClient, from: impl Into<String>) -> Self {
        Self {
            client,
            from: from.into(),
        }
    }

    /// Client configured from the standard AWS environment
    pub async fn from_env(from: impl Into<String>) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(SesClient::new(&aws_config), from)
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let content = |data: &str| {
            Content::builder()
                .data(data)
                .charset("UTF-8")
                .build()
                .map_err(|e| MailError::Build(e.to_string()))
        };

        let subject = content(&email.subject)?;
        let body = Body::builder()
            .html(content(&email.body)?)
            .text(content(&email.text)?)
            .build();

        let message = Message::builder().subject(subject).body(body).build();

        self.client
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(&email.to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Writes the message to the log instead of sending it
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(to = %email.to, subject = %email.subject, "Email delivery disabled, message logged only");
        tracing::debug!(body = %email.text, "Email body");
        Ok(())
    }
}
