//! Resend-backed implementation of the notification channel.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tera::{Context, Tera};

use crate::notification::{NotificationError, NotificationSender, PaymentEmail};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct ResendSender {
    client: reqwest::Client,
    api_key: String,
    from: String,
    tera: Tera,
}

#[derive(Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    html: String,
}

impl ResendSender {
    pub fn new(api_key: String, from: String, tera: Tera) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key,
            from,
            tera,
        })
    }

    fn render(&self, email: &PaymentEmail) -> Result<String, NotificationError> {
        let mut context = Context::new();
        context.insert("client_name", &email.client_name);
        context.insert("invoice_number", &email.invoice_number);
        context.insert("description", &email.description);
        context.insert("amount", &email.amount);
        context.insert("currency", &email.currency);
        context.insert("due_date", &email.due_date);
        context.insert("payment_url", &email.payment_url);

        Ok(self.tera.render("emails/payment_invoice.html", &context)?)
    }
}

#[async_trait]
impl NotificationSender for ResendSender {
    async fn send_payment_email(&self, email: &PaymentEmail) -> Result<(), NotificationError> {
        let html = self.render(email)?;
        let body = SendEmailBody {
            from: &self.from,
            to: [email.client_email.as_str()],
            subject: format!(
                "Payment Invoice {} - Amount: {} {}",
                email.invoice_number, email.amount, email.currency
            ),
            html,
        };

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }
}
