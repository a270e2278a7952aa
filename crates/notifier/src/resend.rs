//! Resend HTTP API mailer.

use async_trait::async_trait;
use serde::Serialize;

use hemolink_common::error::AppError;

use crate::{Mailer, OutboundEmail};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Mailer backed by the Resend transactional email API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

/// Request body for Resend's `POST /emails`.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendMailer {
    /// Create a mailer with the given API key and sender address.
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), AppError> {
        let body = SendRequest {
            from: &self.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Email(format!("Resend request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Email(format!(
                "Resend returned {}: {}",
                status, detail
            )));
        }

        tracing::debug!(to = %email.to, "Email accepted by Resend");
        Ok(())
    }
}
