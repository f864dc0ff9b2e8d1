//! MyFatoorah client for the v2 invoicing endpoints.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::gateway::{GatewayError, PaymentGateway, PaymentLink, PaymentLinkRequest};

/// Country code MyFatoorah expects when the stored phone cannot be parsed.
const DEFAULT_MOBILE_COUNTRY_CODE: &str = "965";

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for a MyFatoorah account.
#[derive(Clone)]
pub struct MyFatoorahGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendPaymentBody<'a> {
    customer_name: &'a str,
    customer_email: &'a str,
    customer_mobile: String,
    mobile_country_code: String,
    #[serde(with = "rust_decimal::serde::float")]
    invoice_value: Decimal,
    currency_iso: &'a str,
    display_currency_iso: &'a str,
    call_back_url: &'a str,
    error_url: &'a str,
    language: &'a str,
    notification_option: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PaymentStatusBody<'a> {
    key: &'a str,
    key_type: &'a str,
}

/// Response envelope shared by every MyFatoorah endpoint.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    is_success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendPaymentData {
    invoice_id: i64,
    #[serde(rename = "InvoiceURL")]
    invoice_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PaymentStatusData {
    invoice_status: String,
}

impl MyFatoorahGateway {
    pub fn new(base_url: String, api_key: String) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn post_api<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // MyFatoorah wraps auth and validation failures in the same
            // envelope; surface its message when the body carries one.
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&text)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or(text);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        if !envelope.is_success {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "gateway reported failure".to_string()),
            });
        }

        envelope.data.ok_or_else(|| {
            GatewayError::InvalidResponse("success envelope without data".to_string())
        })
    }
}

#[async_trait]
impl PaymentGateway for MyFatoorahGateway {
    async fn create_payment_link(
        &self,
        request: PaymentLinkRequest,
    ) -> Result<PaymentLink, GatewayError> {
        let (mobile_country_code, customer_mobile) = split_mobile(request.customer_mobile.as_deref());
        let body = SendPaymentBody {
            customer_name: &request.customer_name,
            customer_email: &request.customer_email,
            customer_mobile,
            mobile_country_code,
            invoice_value: request.amount,
            currency_iso: request.currency.as_str(),
            display_currency_iso: request.currency.as_str(),
            call_back_url: &request.callback_url,
            error_url: &request.error_url,
            language: "en",
            notification_option: "LNK",
        };

        let data: SendPaymentData = self.post_api("/v2/SendPayment", &body).await?;
        Ok(PaymentLink {
            external_invoice_id: data.invoice_id.to_string(),
            payment_url: data.invoice_url,
        })
    }

    async fn get_payment_status(&self, external_invoice_id: &str) -> Result<String, GatewayError> {
        let body = PaymentStatusBody {
            key: external_invoice_id,
            key_type: "InvoiceId",
        };

        let data: PaymentStatusData = self.post_api("/v2/GetPaymentStatus", &body).await?;
        Ok(data.invoice_status)
    }
}

/// Splits a stored phone number into the country code and national number
/// MyFatoorah wants as separate fields. Falls back to the Kuwaiti country
/// code plus the raw digits when parsing fails.
fn split_mobile(phone: Option<&str>) -> (String, String) {
    let Some(raw) = phone.map(str::trim).filter(|s| !s.is_empty()) else {
        return (DEFAULT_MOBILE_COUNTRY_CODE.to_string(), String::new());
    };

    match phonenumber::parse(None, raw) {
        Ok(parsed) => (
            parsed.code().value().to_string(),
            parsed.national().value().to_string(),
        ),
        Err(_) => (
            DEFAULT_MOBILE_COUNTRY_CODE.to_string(),
            raw.chars().filter(|c| c.is_ascii_digit()).collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn send_payment_body_uses_provider_field_names() {
        let body = SendPaymentBody {
            customer_name: "Acme Trading",
            customer_email: "billing@acme.com",
            customer_mobile: "50000000".to_string(),
            mobile_country_code: "965".to_string(),
            invoice_value: Decimal::new(10050, 2),
            currency_iso: "USD",
            display_currency_iso: "USD",
            call_back_url: "https://portal.example.com/payment/callback",
            error_url: "https://portal.example.com/payment/error",
            language: "en",
            notification_option: "LNK",
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["CustomerName"], "Acme Trading");
        assert_eq!(json["CustomerMobile"], "50000000");
        assert_eq!(json["MobileCountryCode"], "965");
        assert_eq!(json["InvoiceValue"], 100.5);
        assert_eq!(json["CurrencyIso"], "USD");
        assert_eq!(json["CallBackUrl"], "https://portal.example.com/payment/callback");
        assert_eq!(json["NotificationOption"], "LNK");
    }

    #[test]
    fn success_envelope_parses() {
        let raw = r#"{
            "IsSuccess": true,
            "Message": null,
            "Data": {"InvoiceId": 77, "InvoiceURL": "https://pay/77"}
        }"#;
        let envelope: Envelope<SendPaymentData> = serde_json::from_str(raw).unwrap();
        assert!(envelope.is_success);
        let data = envelope.data.unwrap();
        assert_eq!(data.invoice_id, 77);
        assert_eq!(data.invoice_url, "https://pay/77");
    }

    #[test]
    fn failure_envelope_keeps_provider_message() {
        let raw = r#"{"IsSuccess": false, "Message": "Invalid currency", "Data": null}"#;
        let envelope: Envelope<SendPaymentData> = serde_json::from_str(raw).unwrap();
        assert!(!envelope.is_success);
        assert_eq!(envelope.message.as_deref(), Some("Invalid currency"));
        assert!(envelope.data.is_none());
    }

    #[test]
    fn status_envelope_parses() {
        let raw = r#"{"IsSuccess": true, "Data": {"InvoiceStatus": "Paid"}}"#;
        let envelope: Envelope<PaymentStatusData> = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.data.unwrap().invoice_status, "Paid");
    }

    #[test]
    fn split_mobile_parses_international_numbers() {
        let (code, national) = split_mobile(Some("+96550000000"));
        assert_eq!(code, "965");
        assert_eq!(national, "50000000");
    }

    #[test]
    fn split_mobile_falls_back_to_raw_digits() {
        let (code, national) = split_mobile(Some("5000-0000"));
        assert_eq!(code, "965");
        assert_eq!(national, "50000000");

        let (code, national) = split_mobile(None);
        assert_eq!(code, "965");
        assert_eq!(national, "");
    }
}
