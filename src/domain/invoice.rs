use std::fmt::Display;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{Currency, TypeConstraintError};

/// Local invoice lifecycle states.
///
/// `Pending` is the initial persisted state; `Paid` and `Overdue` are
/// terminal and reachable only through gateway reconciliation.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Pending,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Overdue)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }

    /// Maps the gateway's status vocabulary onto the local enum.
    ///
    /// The match is case-insensitive and total: vocabulary the provider adds
    /// later degrades to `Pending` so the webhook path never fails on an
    /// unknown word.
    pub fn from_provider(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "paid" | "successful" => InvoiceStatus::Paid,
            "failed" | "cancelled" | "expired" => InvoiceStatus::Overdue,
            _ => InvoiceStatus::Pending,
        }
    }
}

impl Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown invoice status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: i32,
    pub client_id: i32,
    pub invoice_number: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub payment_link: Option<String>,
    pub myfatoorah_invoice_id: Option<String>,
}

/// Validated invoice intent, before any gateway involvement.
#[derive(Clone, Debug, PartialEq)]
pub struct InvoiceIntent {
    pub client_id: i32,
    pub description: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub due_date: NaiveDate,
}

#[derive(Clone, Debug)]
pub struct NewInvoice {
    pub client_id: i32,
    pub invoice_number: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub payment_link: Option<String>,
    pub myfatoorah_invoice_id: Option<String>,
}

/// Generates a human-scannable invoice number.
///
/// The date prefix keeps numbers sortable for admins; the UUID-derived
/// suffix makes same-instant collisions practically impossible. The UNIQUE
/// constraint on the column is the backstop.
pub fn generate_invoice_number(today: NaiveDate) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!(
        "INV-{}-{}",
        today.format("%Y%m%d"),
        token[..8].to_ascii_uppercase()
    )
}
