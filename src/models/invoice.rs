use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::domain::invoice::{Invoice as DomainInvoice, NewInvoice as DomainNewInvoice};
use crate::domain::types::TypeConstraintError;
use crate::models::client::Client;

#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(table_name = crate::schema::invoices)]
#[diesel(belongs_to(Client, foreign_key = client_id))]
/// Diesel model for [`crate::domain::invoice::Invoice`].
///
/// Amount, currency and status are stored as TEXT; parsing happens at this
/// boundary so the domain only ever sees the typed forms.
pub struct Invoice {
    pub id: i32,
    pub client_id: i32,
    pub invoice_number: String,
    pub description: String,
    pub amount: String,
    pub currency: String,
    pub status: String,
    pub due_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub payment_link: Option<String>,
    pub myfatoorah_invoice_id: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::invoices)]
/// Insertable form of [`Invoice`].
pub struct NewInvoice<'a> {
    pub client_id: i32,
    pub invoice_number: &'a str,
    pub description: &'a str,
    pub amount: String,
    pub currency: &'a str,
    pub status: &'a str,
    pub due_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub payment_link: Option<&'a str>,
    pub myfatoorah_invoice_id: Option<&'a str>,
}

impl TryFrom<Invoice> for DomainInvoice {
    type Error = TypeConstraintError;

    fn try_from(invoice: Invoice) -> Result<Self, Self::Error> {
        let amount = Decimal::from_str(&invoice.amount).map_err(|_| {
            TypeConstraintError::InvalidValue(format!("bad stored amount: {}", invoice.amount))
        })?;
        Ok(Self {
            id: invoice.id,
            client_id: invoice.client_id,
            invoice_number: invoice.invoice_number,
            description: invoice.description,
            amount,
            currency: invoice.currency.parse()?,
            status: invoice.status.parse()?,
            due_date: invoice.due_date,
            created_at: invoice.created_at,
            payment_link: invoice.payment_link,
            myfatoorah_invoice_id: invoice.myfatoorah_invoice_id,
        })
    }
}

impl<'a> From<&'a DomainNewInvoice> for NewInvoice<'a> {
    fn from(invoice: &'a DomainNewInvoice) -> Self {
        Self {
            client_id: invoice.client_id,
            invoice_number: invoice.invoice_number.as_str(),
            description: invoice.description.as_str(),
            amount: invoice.amount.to_string(),
            currency: invoice.currency.as_str(),
            status: invoice.status.as_str(),
            due_date: invoice.due_date,
            created_at: invoice.created_at,
            payment_link: invoice.payment_link.as_deref(),
            myfatoorah_invoice_id: invoice.myfatoorah_invoice_id.as_deref(),
        }
    }
}
