//! Outbound email delivery.
//!
//! Routes depend on the [`Mailer`] trait so tests can observe deliveries;
//! production wires in [`SmtpMailer`], or [`NullMailer`] when SMTP is not
//! configured.

use std::sync::Arc;

use lettre::{
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use log::{debug, warn};
use thiserror::Error;

use crate::model::api::Email;
use crate::model::otp::Code;

/// Shared handle to the outbound mailer.
pub type SharedMailer = Arc<dyn Mailer>;

#[derive(Debug, Error)]
pub enum MailerError {
    /// SMTP settings were incomplete at startup.
    #[error("mail transport is not configured")]
    NotConfigured,
    /// The message itself could not be built.
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    /// The relay refused, or the connection failed.
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[cfg(test)]
    #[error("{0}")]
    Stub(String),
}

/// Delivers one-time passcodes to voters.
#[rocket::async_trait]
pub trait Mailer: Send + Sync {
    async fn send_code(&self, recipient: &Email, code: &Code) -> Result<(), MailerError>;
}

/// Production mailer speaking SMTP over TLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a pooled transport towards `host`. The relay is not
    /// contacted until the first send.
    pub fn new(
        host: &str,
        username: String,
        password: String,
        from: Address,
    ) -> Result<Self, MailerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .credentials(Credentials::new(username, password))
            .build();
        Ok(Self {
            transport,
            from: Mailbox::new(None, from),
        })
    }
}

#[rocket::async_trait]
impl Mailer for SmtpMailer {
    async fn send_code(&self, recipient: &Email, code: &Code) -> Result<(), MailerError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(None, Address::from(recipient.clone())))
            .subject("Your OTP Code")
            .body(format!("Your OTP code is {code}"))?;
        self.transport.send(message).await?;
        debug!("Delivered OTP to {recipient}");
        Ok(())
    }
}

/// Stand-in used when SMTP settings are absent. Every send fails, which
/// the issuance endpoint reports per recipient.
pub struct NullMailer;

#[rocket::async_trait]
impl Mailer for NullMailer {
    async fn send_code(&self, recipient: &Email, _code: &Code) -> Result<(), MailerError> {
        warn!("No mail transport configured; dropping OTP for {recipient}");
        Err(MailerError::NotConfigured)
    }
}

/// Test mailer recording an outbox.
#[cfg(test)]
pub mod stub {
    use rocket::tokio::sync::Mutex;

    use super::*;

    /// Records every delivery and can refuse chosen recipients.
    #[derive(Default)]
    pub struct StubMailer {
        outbox: Mutex<Vec<(Email, Code)>>,
        refuse: Vec<Email>,
    }

    impl StubMailer {
        pub fn refusing(refuse: Vec<Email>) -> Self {
            Self {
                outbox: Mutex::default(),
                refuse,
            }
        }

        pub async fn sent(&self) -> Vec<(Email, Code)> {
            self.outbox.lock().await.clone()
        }
    }

    #[rocket::async_trait]
    impl Mailer for StubMailer {
        async fn send_code(&self, recipient: &Email, code: &Code) -> Result<(), MailerError> {
            if self.refuse.contains(recipient) {
                return Err(MailerError::Stub(format!("relay refused {recipient}")));
            }
            self.outbox.lock().await.push((recipient.clone(), *code));
            Ok(())
        }
    }
}
