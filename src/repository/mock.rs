//! Mock repository implementation for isolating services in tests.

use mockall::mock;

use crate::domain::client::{Client, ClientAccount, NewClient};
use crate::domain::invoice::{Invoice, InvoiceStatus, NewInvoice};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ClientReader, ClientWriter, InvoiceListQuery, InvoiceReader, InvoiceWriter,
};

mock! {
    pub Repository {}

    impl ClientReader for Repository {
        fn get_client_by_id(&self, id: i32) -> RepositoryResult<Option<Client>>;
        fn get_client_by_username(&self, username: &str) -> RepositoryResult<Option<ClientAccount>>;
        fn list_clients(&self) -> RepositoryResult<Vec<Client>>;
    }

    impl ClientWriter for Repository {
        fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
    }

    impl InvoiceReader for Repository {
        fn get_invoice_by_external_id(&self, external_id: &str) -> RepositoryResult<Option<Invoice>>;
        fn list_invoices(
            &self,
            query: InvoiceListQuery,
        ) -> RepositoryResult<(usize, Vec<(Invoice, Client)>)>;
    }

    impl InvoiceWriter for Repository {
        fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
        fn transition_invoice_status(
            &self,
            external_id: &str,
            to: InvoiceStatus,
        ) -> RepositoryResult<Option<Invoice>>;
    }
}
