//! Endpoints the payment gateway drives the payer's browser through.
//!
//! The callback arrives as a GET with `paymentId` and `Id` query parameters;
//! the handler reconciles against the gateway's reported state and then
//! redirects the browser to a result page. Reconciliation failures send the
//! payer to the error page rather than surfacing a 5xx mid-payment.

use actix_web::{Responder, get, web};
use serde::Deserialize;
use tera::{Context, Tera};

use crate::domain::invoice::InvoiceStatus;
use crate::gateway::MyFatoorahGateway;
use crate::repository::DieselRepository;
use crate::routes::{redirect, render_template};
use crate::services::invoice as invoice_service;

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(rename = "paymentId")]
    pub payment_id: Option<String>,
    #[serde(rename = "Id")]
    pub id: Option<String>,
}

#[derive(Deserialize)]
pub struct ResultParams {
    pub outcome: Option<String>,
    pub invoice: Option<String>,
}

#[derive(Deserialize)]
pub struct ErrorParams {
    #[serde(rename = "Id")]
    pub id: Option<String>,
    pub error: Option<String>,
}

#[get("/payment/callback")]
pub async fn payment_callback(
    params: web::Query<CallbackParams>,
    repo: web::Data<DieselRepository>,
    gateway: web::Data<MyFatoorahGateway>,
) -> impl Responder {
    let Some(external_id) = params.id.as_deref() else {
        log::error!("Payment callback without an invoice id");
        return redirect("/payment/error");
    };

    log::info!(
        "Payment callback received: invoice {external_id}, payment {:?}",
        params.payment_id
    );

    match invoice_service::reconcile_invoice(repo.get_ref(), gateway.get_ref(), external_id).await
    {
        Ok(invoice) => {
            let outcome = if invoice.status == InvoiceStatus::Paid {
                "success"
            } else {
                "failed"
            };
            redirect(&format!(
                "/payment/result?outcome={outcome}&invoice={}",
                invoice.invoice_number
            ))
        }
        Err(err) => {
            log::error!("Failed to reconcile invoice {external_id}: {err}");
            redirect(&format!("/payment/error?Id={external_id}"))
        }
    }
}

#[get("/payment/result")]
pub async fn payment_result(
    params: web::Query<ResultParams>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let success = params.outcome.as_deref() == Some("success");

    let mut context = Context::new();
    context.insert("success", &success);
    if let Some(invoice_number) = &params.invoice {
        context.insert("invoice_number", invoice_number);
    }

    render_template(&tera, "payment/result.html", &context)
}

#[get("/payment/error")]
pub async fn payment_error(
    params: web::Query<ErrorParams>,
    tera: web::Data<Tera>,
) -> impl Responder {
    log::info!(
        "Payment error page requested: invoice {:?}, error {:?}",
        params.id,
        params.error
    );

    let mut context = Context::new();
    if let Some(invoice_id) = &params.id {
        context.insert("invoice_id", invoice_id);
    }
    if let Some(error) = &params.error {
        context.insert("error", error);
    }

    render_template(&tera, "payment/error.html", &context)
}
