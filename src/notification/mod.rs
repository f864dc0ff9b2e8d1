//! Outbound email contract.
//!
//! Notification delivery is best-effort: the orchestrator logs failures and
//! moves on, so nothing here participates in the create-invoice contract.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::domain::types::Currency;

pub mod resend;

pub use resend::ResendSender;

/// Template data for the payment-link email.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PaymentEmail {
    pub client_email: String,
    pub client_name: String,
    pub invoice_number: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub due_date: NaiveDate,
    pub payment_url: String,
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification provider rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to render email template: {0}")]
    Template(#[from] tera::Error),
}

#[cfg_attr(any(test, feature = "test-mocks"), mockall::automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends the payment-link email. One shot, no retries.
    async fn send_payment_email(&self, email: &PaymentEmail) -> Result<(), NotificationError>;
}
