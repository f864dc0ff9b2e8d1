use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::auth::{AuthenticatedUser, ROLE_ADMIN, check_role};
use crate::dto::invoice::InvoiceRow;
use crate::repository::{DieselRepository, InvoiceListQuery};
use crate::routes::{base_context, redirect, render_template};
use crate::services::invoice as invoice_service;

#[get("/portal")]
pub async fn show_portal(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if check_role(ROLE_ADMIN, &user.roles) {
        return redirect("/");
    }

    let invoices = match invoice_service::list_invoices(repo.get_ref(), &user, InvoiceListQuery::new())
    {
        Ok((_total, rows)) => rows.into_iter().map(InvoiceRow::from).collect::<Vec<_>>(),
        Err(e) => {
            log::error!("Failed to list invoices: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(&flash_messages, &user, "portal");
    context.insert("invoices", &invoices);

    render_template(&tera, "portal/index.html", &context)
}
