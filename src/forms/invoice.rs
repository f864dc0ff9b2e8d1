use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::domain::invoice::InvoiceIntent;
use crate::domain::types::{Currency, TypeConstraintError};

#[derive(Deserialize, Validate)]
/// Form data for creating an invoice with a payment link.
pub struct CreateInvoiceForm {
    /// Identifier of the client receiving the invoice.
    pub client_id: i32,
    #[validate(length(min = 1))]
    pub description: String,
    /// Decimal amount as entered, parsed on conversion.
    #[validate(length(min = 1))]
    pub amount: String,
    #[validate(length(min = 3))]
    pub currency: String,
    /// Due date in `YYYY-MM-DD` form.
    #[validate(length(min = 1))]
    pub due_date: String,
}

#[derive(Deserialize, Validate)]
/// Form data for polling one invoice's payment status.
pub struct RefreshInvoiceForm {
    #[validate(length(min = 1))]
    pub myfatoorah_invoice_id: String,
}

impl TryFrom<&CreateInvoiceForm> for InvoiceIntent {
    type Error = TypeConstraintError;

    fn try_from(form: &CreateInvoiceForm) -> Result<Self, Self::Error> {
        let amount = Decimal::from_str(form.amount.trim()).map_err(|_| {
            TypeConstraintError::InvalidValue(format!("bad amount: {}", form.amount))
        })?;
        if amount <= Decimal::ZERO {
            return Err(TypeConstraintError::InvalidValue(
                "amount must be positive".to_string(),
            ));
        }

        let due_date = NaiveDate::parse_from_str(form.due_date.trim(), "%Y-%m-%d")
            .map_err(|_| {
                TypeConstraintError::InvalidValue(format!("bad due date: {}", form.due_date))
            })?;

        Ok(InvoiceIntent {
            client_id: form.client_id,
            description: form.description.trim().to_string(),
            amount,
            currency: form.currency.parse::<Currency>()?,
            due_date,
        })
    }
}
