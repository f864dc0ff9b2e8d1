use serde::Serialize;

use crate::domain::client::Client;
use crate::domain::invoice::Invoice;

/// Invoice joined with its client's contact fields, as rendered in tables
/// and returned by the JSON API.
#[derive(Serialize)]
pub struct InvoiceRow {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub client_name: String,
    pub client_email: String,
}

impl From<(Invoice, Client)> for InvoiceRow {
    fn from((invoice, client): (Invoice, Client)) -> Self {
        Self {
            invoice,
            client_name: client.name,
            client_email: client.email,
        }
    }
}
