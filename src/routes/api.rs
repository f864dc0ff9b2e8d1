use actix_web::{HttpResponse, Responder, get, web};

use crate::auth::AuthenticatedUser;
use crate::dto::invoice::InvoiceRow;
use crate::repository::{DieselRepository, InvoiceListQuery};
use crate::services::ServiceError;
use crate::services::invoice as invoice_service;

#[get("/v1/invoices")]
pub async fn api_v1_invoices(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match invoice_service::list_invoices(repo.get_ref(), &user, InvoiceListQuery::new()) {
        Ok((_total, rows)) => {
            let rows: Vec<InvoiceRow> = rows.into_iter().map(Into::into).collect();
            HttpResponse::Ok().json(rows)
        }
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(e) => {
            log::error!("Failed to list invoices: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
