use diesel::prelude::*;

use crate::domain::client::Client;
use crate::domain::invoice::{Invoice, InvoiceStatus, NewInvoice};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, InvoiceListQuery, InvoiceReader, InvoiceWriter};

impl InvoiceReader for DieselRepository {
    fn get_invoice_by_external_id(&self, external_id: &str) -> RepositoryResult<Option<Invoice>> {
        use crate::models::invoice::Invoice as DbInvoice;
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let invoice = invoices::table
            .filter(invoices::myfatoorah_invoice_id.eq(external_id))
            .first::<DbInvoice>(&mut conn)
            .optional()?;

        invoice
            .map(Invoice::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_invoices(
        &self,
        query: InvoiceListQuery,
    ) -> RepositoryResult<(usize, Vec<(Invoice, Client)>)> {
        use crate::models::client::Client as DbClient;
        use crate::models::invoice::Invoice as DbInvoice;
        use crate::schema::{clients, invoices};

        let mut conn = self.conn()?;

        let mut items_query = invoices::table
            .inner_join(clients::table)
            .order(invoices::created_at.desc())
            .into_boxed();

        if let Some(client_id) = query.client_id {
            items_query = items_query.filter(invoices::client_id.eq(client_id));
        }

        if let Some(pagination) = &query.pagination {
            let page = pagination.page.max(1) as i64;
            let per_page = pagination.per_page as i64;
            items_query = items_query
                .limit(per_page)
                .offset((page - 1) * per_page);
        }

        let total: i64 = match query.client_id {
            Some(client_id) => invoices::table
                .filter(invoices::client_id.eq(client_id))
                .count()
                .get_result(&mut conn)?,
            None => invoices::table.count().get_result(&mut conn)?,
        };

        let rows = items_query.load::<(DbInvoice, DbClient)>(&mut conn)?;
        let items = rows
            .into_iter()
            .map(|(invoice, client)| {
                Invoice::try_from(invoice)
                    .map(|invoice| (invoice, client.into()))
                    .map_err(RepositoryError::from)
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, items))
    }
}

impl InvoiceWriter for DieselRepository {
    fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice> {
        use crate::models::invoice::{Invoice as DbInvoice, NewInvoice as DbNewInvoice};
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let insertable: DbNewInvoice = new_invoice.into();
        let created = diesel::insert_into(invoices::table)
            .values(&insertable)
            .get_result::<DbInvoice>(&mut conn)?;

        Invoice::try_from(created).map_err(RepositoryError::from)
    }

    fn transition_invoice_status(
        &self,
        external_id: &str,
        to: InvoiceStatus,
    ) -> RepositoryResult<Option<Invoice>> {
        use crate::models::invoice::Invoice as DbInvoice;
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let updated = diesel::update(
            invoices::table
                .filter(invoices::myfatoorah_invoice_id.eq(external_id))
                .filter(invoices::status.eq(InvoiceStatus::Pending.as_str())),
        )
        .set(invoices::status.eq(to.as_str()))
        .get_result::<DbInvoice>(&mut conn)
        .optional()?;

        updated
            .map(Invoice::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }
}
