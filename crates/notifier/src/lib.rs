//! Transactional email delivery for campaign announcements.
//!
//! Delivery goes through the [`Mailer`] trait so the fan-out logic can be
//! exercised with an in-memory implementation; the production implementation
//! is [`resend::ResendMailer`], which calls the Resend HTTP API.

pub mod resend;
pub mod template;

use async_trait::async_trait;

use hemolink_common::error::AppError;

/// A rendered email ready for delivery.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// Trait for email delivery backends.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a single email.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the message or is unreachable.
    async fn send(&self, email: &OutboundEmail) -> Result<(), AppError>;
}
