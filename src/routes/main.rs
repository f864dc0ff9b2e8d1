use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::auth::{AuthenticatedUser, ROLE_ADMIN, check_role};
use crate::dto::invoice::InvoiceRow;
use crate::forms::main::AddClientForm;
use crate::pagination::Paginated;
use crate::repository::{DieselRepository, InvoiceListQuery};
use crate::routes::{DEFAULT_ITEMS_PER_PAGE, base_context, redirect, render_template};
use crate::services::client as client_service;
use crate::services::invoice as invoice_service;
use crate::services::ServiceError;

#[derive(Deserialize)]
struct IndexQueryParams {
    page: Option<usize>,
}

#[get("/")]
pub async fn show_index(
    params: web::Query<IndexQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if !check_role(ROLE_ADMIN, &user.roles) {
        return redirect("/portal");
    }

    let clients = match client_service::list_clients(repo.get_ref(), &user) {
        Ok(clients) => clients,
        Err(e) => {
            log::error!("Failed to list clients: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let page = params.page.unwrap_or(1);
    let query = InvoiceListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    let invoices = match invoice_service::list_invoices(repo.get_ref(), &user, query) {
        Ok((total, rows)) => {
            let rows: Vec<InvoiceRow> = rows.into_iter().map(Into::into).collect();
            Paginated::new(rows, page, total.div_ceil(DEFAULT_ITEMS_PER_PAGE))
        }
        Err(e) => {
            log::error!("Failed to list invoices: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(&flash_messages, &user, "index");
    context.insert("clients", &clients);
    context.insert("invoices", &invoices);

    render_template(&tera, "main/index.html", &context)
}

#[post("/clients/add")]
pub async fn add_client(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddClientForm>,
) -> impl Responder {
    match client_service::add_client(repo.get_ref(), &user, form) {
        Ok(client) => {
            FlashMessage::success(format!("Client {} added.", client.username)).send();
        }
        Err(ServiceError::Unauthorized) => {
            return HttpResponse::Unauthorized().finish();
        }
        Err(err) => {
            log::error!("Failed to add a client: {err}");
            FlashMessage::error(format!("Failed to add client: {err}")).send();
        }
    }

    redirect("/")
}
