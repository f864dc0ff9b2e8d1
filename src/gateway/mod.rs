//! Payment gateway contract the orchestrator depends on.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::types::Currency;

pub mod myfatoorah;

pub use myfatoorah::MyFatoorahGateway;

/// Everything the gateway needs to issue a hosted payment link.
#[derive(Clone, Debug, PartialEq)]
pub struct PaymentLinkRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_mobile: Option<String>,
    pub amount: Decimal,
    pub currency: Currency,
    pub description: String,
    pub callback_url: String,
    pub error_url: String,
}

/// Provider-assigned identifiers for a freshly created payment link.
#[derive(Clone, Debug, PartialEq)]
pub struct PaymentLink {
    pub external_invoice_id: String,
    pub payment_url: String,
}

/// Errors from the external payment provider.
///
/// Network failures, authentication failures and business rejections all
/// surface here; the provider's own message is passed through verbatim when
/// it sent one.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("gateway returned an unusable response: {0}")]
    InvalidResponse(String),
}

#[cfg_attr(any(test, feature = "test-mocks"), mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a hosted payment link for the given customer and value.
    ///
    /// One logical call; the provider may perform its own auth round-trip
    /// internally.
    async fn create_payment_link(
        &self,
        request: PaymentLinkRequest,
    ) -> Result<PaymentLink, GatewayError>;

    /// Returns the provider's status string for an invoice it issued.
    async fn get_payment_status(&self, external_invoice_id: &str) -> Result<String, GatewayError>;
}
