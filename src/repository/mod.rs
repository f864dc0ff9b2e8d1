use crate::db::{DbConnection, DbPool};
use crate::domain::client::{Client, ClientAccount, NewClient};
use crate::domain::invoice::{Invoice, InvoiceStatus, NewInvoice};
use crate::repository::errors::RepositoryResult;

pub mod client;
pub mod errors;
pub mod invoice;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceListQuery {
    pub client_id: Option<i32>,
    pub pagination: Option<Pagination>,
}

impl InvoiceListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(mut self, client_id: i32) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait ClientReader {
    fn get_client_by_id(&self, id: i32) -> RepositoryResult<Option<Client>>;
    fn get_client_by_username(&self, username: &str) -> RepositoryResult<Option<ClientAccount>>;
    fn list_clients(&self) -> RepositoryResult<Vec<Client>>;
}

pub trait ClientWriter {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
}

pub trait InvoiceReader {
    fn get_invoice_by_external_id(&self, external_id: &str) -> RepositoryResult<Option<Invoice>>;
    fn list_invoices(
        &self,
        query: InvoiceListQuery,
    ) -> RepositoryResult<(usize, Vec<(Invoice, Client)>)>;
}

pub trait InvoiceWriter {
    fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;

    /// Atomically moves the invoice carrying `external_id` out of `pending`
    /// into `to`. Returns `None` when no pending invoice matched, either
    /// because the id is unknown or because a concurrent writer already
    /// performed a transition.
    fn transition_invoice_status(
        &self,
        external_id: &str,
        to: InvoiceStatus,
    ) -> RepositoryResult<Option<Invoice>>;
}

/// Diesel/SQLite implementation of the repository traits.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(crate) fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}
