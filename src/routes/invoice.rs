use actix_web::{HttpResponse, Responder, post, web};
use actix_web_flash_messages::FlashMessage;

use crate::auth::{AuthenticatedUser, ROLE_ADMIN, check_role};
use crate::forms::invoice::{CreateInvoiceForm, RefreshInvoiceForm};
use crate::gateway::MyFatoorahGateway;
use crate::models::config::ServerConfig;
use crate::notification::ResendSender;
use crate::repository::{DieselRepository, InvoiceReader};
use crate::routes::redirect;
use crate::services::ServiceError;
use crate::services::invoice as invoice_service;

#[post("/invoices/create")]
pub async fn create_invoice(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    gateway: web::Data<MyFatoorahGateway>,
    notifier: web::Data<ResendSender>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<CreateInvoiceForm>,
) -> impl Responder {
    match invoice_service::create_invoice(
        repo.get_ref(),
        gateway.get_ref(),
        notifier.get_ref(),
        &user,
        &server_config.base_url,
        form,
    )
    .await
    {
        Ok((invoice, _payment_url)) => {
            FlashMessage::success(format!("Invoice {} created.", invoice.invoice_number)).send();
        }
        Err(ServiceError::Unauthorized) => {
            return HttpResponse::Unauthorized().finish();
        }
        Err(err) => {
            log::error!("Failed to create invoice: {err}");
            FlashMessage::error(format!("Failed to create invoice: {err}")).send();
        }
    }

    redirect("/")
}

#[post("/invoices/refresh")]
pub async fn refresh_invoice(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    gateway: web::Data<MyFatoorahGateway>,
    web::Form(form): web::Form<RefreshInvoiceForm>,
) -> impl Responder {
    let back = if check_role(ROLE_ADMIN, &user.roles) {
        "/"
    } else {
        "/portal"
    };

    // Clients may only poll their own invoices.
    if !check_role(ROLE_ADMIN, &user.roles) {
        let owns = repo
            .get_invoice_by_external_id(&form.myfatoorah_invoice_id)
            .ok()
            .flatten()
            .is_some_and(|invoice| Some(invoice.client_id) == user.client_id());
        if !owns {
            FlashMessage::error("Invoice not found.").send();
            return redirect(back);
        }
    }

    match invoice_service::reconcile_invoice(
        repo.get_ref(),
        gateway.get_ref(),
        &form.myfatoorah_invoice_id,
    )
    .await
    {
        Ok(invoice) => {
            FlashMessage::success(format!(
                "Invoice {} is {}.",
                invoice.invoice_number, invoice.status
            ))
            .send();
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Invoice not found.").send();
        }
        Err(err) => {
            log::error!(
                "Failed to refresh invoice {}: {err}",
                form.myfatoorah_invoice_id
            );
            FlashMessage::error("Failed to refresh payment status.").send();
        }
    }

    redirect(back)
}
