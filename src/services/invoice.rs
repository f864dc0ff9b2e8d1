//! Payment-link lifecycle: create, notify, reconcile.
//!
//! The orchestrator holds no state of its own; it coordinates the record
//! store, the payment gateway and the notification channel through their
//! trait seams.

use chrono::Utc;
use validator::Validate;

use crate::auth::{AuthenticatedUser, ROLE_ADMIN, check_role};
use crate::domain::client::Client;
use crate::domain::invoice::{Invoice, InvoiceIntent, InvoiceStatus, NewInvoice, generate_invoice_number};
use crate::forms::invoice::CreateInvoiceForm;
use crate::gateway::{PaymentGateway, PaymentLinkRequest};
use crate::notification::{NotificationSender, PaymentEmail};
use crate::repository::{ClientReader, InvoiceListQuery, InvoiceReader, InvoiceWriter};
use crate::services::{ServiceError, ServiceResult};

/// Turns an invoice intent into a persisted invoice with a live payment link.
///
/// The gateway call completes strictly before the row is written, so a
/// gateway failure of any kind leaves the store untouched and an invoice
/// without a payment link can never exist. The email afterwards is
/// best-effort: a delivery failure is logged and swallowed.
pub async fn create_invoice<R, G, N>(
    repo: &R,
    gateway: &G,
    notifier: &N,
    user: &AuthenticatedUser,
    base_url: &str,
    form: CreateInvoiceForm,
) -> ServiceResult<(Invoice, String)>
where
    R: ClientReader + InvoiceWriter + ?Sized,
    G: PaymentGateway + ?Sized,
    N: NotificationSender + ?Sized,
{
    if !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    if let Err(err) = form.validate() {
        log::error!("Failed to validate invoice form: {err}");
        return Err(ServiceError::Form("Invalid invoice form".to_string()));
    }

    let intent = InvoiceIntent::try_from(&form)?;

    let client = repo
        .get_client_by_id(intent.client_id)?
        .ok_or(ServiceError::NotFound)?;

    let link = gateway
        .create_payment_link(PaymentLinkRequest {
            customer_name: client.name.clone(),
            customer_email: client.email.clone(),
            customer_mobile: client.phone.clone(),
            amount: intent.amount,
            currency: intent.currency,
            description: intent.description.clone(),
            callback_url: format!("{base_url}/payment/callback"),
            error_url: format!("{base_url}/payment/error"),
        })
        .await?;

    let now = Utc::now().naive_utc();
    let new_invoice = NewInvoice {
        client_id: client.id,
        invoice_number: generate_invoice_number(now.date()),
        description: intent.description,
        amount: intent.amount,
        currency: intent.currency,
        status: InvoiceStatus::Pending,
        due_date: intent.due_date,
        created_at: now,
        payment_link: Some(link.payment_url.clone()),
        myfatoorah_invoice_id: Some(link.external_invoice_id.clone()),
    };

    let invoice = repo.create_invoice(&new_invoice)?;

    let email = PaymentEmail {
        client_email: client.email,
        client_name: client.name,
        invoice_number: invoice.invoice_number.clone(),
        description: invoice.description.clone(),
        amount: invoice.amount,
        currency: invoice.currency,
        due_date: invoice.due_date,
        payment_url: link.payment_url.clone(),
    };
    if let Err(err) = notifier.send_payment_email(&email).await {
        log::warn!(
            "Failed to send payment email for invoice {}: {err}",
            invoice.invoice_number
        );
    }

    Ok((invoice, link.payment_url))
}

/// Applies a gateway-reported status string to the stored invoice.
///
/// Idempotent: re-applying the stored status is a no-op. A report that would
/// move an invoice out of a terminal state is not written back (first
/// terminal status wins) and is logged for audit.
pub fn apply_gateway_status<R>(
    repo: &R,
    external_id: &str,
    provider_status: &str,
) -> ServiceResult<Invoice>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    let status = InvoiceStatus::from_provider(provider_status);
    let invoice = repo
        .get_invoice_by_external_id(external_id)?
        .ok_or(ServiceError::NotFound)?;

    if invoice.status == status {
        return Ok(invoice);
    }

    if invoice.status.is_terminal() {
        log::warn!(
            "Gateway reported '{provider_status}' for settled invoice {} (stored status: {})",
            invoice.invoice_number,
            invoice.status
        );
        return Ok(invoice);
    }

    match repo.transition_invoice_status(external_id, status)? {
        Some(updated) => Ok(updated),
        // A concurrent reconcile won the conditional update; report the
        // winner's state.
        None => repo
            .get_invoice_by_external_id(external_id)?
            .ok_or(ServiceError::NotFound),
    }
}

/// Reconciles one invoice against the gateway's current state.
///
/// Shared by the inbound webhook and the explicit poll so both paths produce
/// identical results for identical gateway state.
pub async fn reconcile_invoice<R, G>(
    repo: &R,
    gateway: &G,
    external_id: &str,
) -> ServiceResult<Invoice>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
    G: PaymentGateway + ?Sized,
{
    let provider_status = gateway.get_payment_status(external_id).await?;
    apply_gateway_status(repo, external_id, &provider_status)
}

/// Lists invoices with their clients; clients are always scoped to their own
/// records, admins see everything.
pub fn list_invoices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: InvoiceListQuery,
) -> ServiceResult<(usize, Vec<(Invoice, Client)>)>
where
    R: InvoiceReader + ?Sized,
{
    let query = if check_role(ROLE_ADMIN, &user.roles) {
        query
    } else {
        match user.client_id() {
            Some(client_id) => query.client(client_id),
            None => return Err(ServiceError::Unauthorized),
        }
    };

    repo.list_invoices(query).map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::auth::ROLE_CLIENT;
    use crate::domain::types::Currency;
    use crate::gateway::{GatewayError, MockPaymentGateway, PaymentLink};
    use crate::notification::{MockNotificationSender, NotificationError};
    use crate::repository::mock::MockRepository;

    const BASE_URL: &str = "https://portal.example.com";

    fn admin() -> AuthenticatedUser {
        AuthenticatedUser::new(
            "admin".to_string(),
            "admin".to_string(),
            "Administrator".to_string(),
            "admin@example.com".to_string(),
            vec![ROLE_ADMIN.to_string()],
        )
    }

    fn client_user() -> AuthenticatedUser {
        AuthenticatedUser::new(
            "1".to_string(),
            "acme".to_string(),
            "Acme Trading".to_string(),
            "a@x.com".to_string(),
            vec![ROLE_CLIENT.to_string()],
        )
    }

    fn sample_client() -> Client {
        Client {
            id: 1,
            username: "acme".to_string(),
            name: "Acme Trading".to_string(),
            email: "a@x.com".to_string(),
            phone: Some("+96550000000".to_string()),
            company: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn sample_form() -> CreateInvoiceForm {
        CreateInvoiceForm {
            client_id: 1,
            description: "July retainer".to_string(),
            amount: "100".to_string(),
            currency: "USD".to_string(),
            due_date: "2025-07-31".to_string(),
        }
    }

    fn persisted(new_invoice: &NewInvoice) -> Invoice {
        Invoice {
            id: 7,
            client_id: new_invoice.client_id,
            invoice_number: new_invoice.invoice_number.clone(),
            description: new_invoice.description.clone(),
            amount: new_invoice.amount,
            currency: new_invoice.currency,
            status: new_invoice.status,
            due_date: new_invoice.due_date,
            created_at: new_invoice.created_at,
            payment_link: new_invoice.payment_link.clone(),
            myfatoorah_invoice_id: new_invoice.myfatoorah_invoice_id.clone(),
        }
    }

    fn stored_invoice(status: InvoiceStatus) -> Invoice {
        Invoice {
            id: 7,
            client_id: 1,
            invoice_number: "INV-20250701-ABCD1234".to_string(),
            description: "July retainer".to_string(),
            amount: Decimal::new(100, 0),
            currency: Currency::Usd,
            status,
            due_date: NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
            created_at: NaiveDate::from_ymd_opt(2025, 7, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            payment_link: Some("https://pay/77".to_string()),
            myfatoorah_invoice_id: Some("77".to_string()),
        }
    }

    #[actix_web::test]
    async fn create_invoice_persists_pending_invoice_with_link() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(sample_client())));
        repo.expect_create_invoice()
            .times(1)
            .withf(|new_invoice| {
                new_invoice.status == InvoiceStatus::Pending
                    && new_invoice.amount == Decimal::new(100, 0)
                    && new_invoice.currency == Currency::Usd
                    && new_invoice.payment_link.as_deref() == Some("https://pay/77")
                    && new_invoice.myfatoorah_invoice_id.as_deref() == Some("77")
                    && new_invoice.invoice_number.starts_with("INV-")
            })
            .returning(|new_invoice| Ok(persisted(new_invoice)));

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_payment_link()
            .times(1)
            .withf(|request| {
                request.customer_name == "Acme Trading"
                    && request.customer_email == "a@x.com"
                    && request.amount == Decimal::new(100, 0)
                    && request.currency == Currency::Usd
                    && request.callback_url == format!("{BASE_URL}/payment/callback")
                    && request.error_url == format!("{BASE_URL}/payment/error")
            })
            .returning(|_| {
                Ok(PaymentLink {
                    external_invoice_id: "77".to_string(),
                    payment_url: "https://pay/77".to_string(),
                })
            });

        let mut notifier = MockNotificationSender::new();
        notifier
            .expect_send_payment_email()
            .times(1)
            .withf(|email| email.client_email == "a@x.com" && email.payment_url == "https://pay/77")
            .returning(|_| Ok(()));

        let (invoice, payment_url) =
            create_invoice(&repo, &gateway, &notifier, &admin(), BASE_URL, sample_form())
                .await
                .unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.amount, Decimal::new(100, 0));
        assert_eq!(invoice.currency, Currency::Usd);
        assert_eq!(invoice.myfatoorah_invoice_id.as_deref(), Some("77"));
        assert_eq!(invoice.payment_link.as_deref(), Some("https://pay/77"));
        assert_eq!(payment_url, "https://pay/77");
    }

    #[actix_web::test]
    async fn gateway_failure_persists_nothing() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(sample_client())));
        // No create_invoice expectation: persisting would panic the mock.

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_payment_link().returning(|_| {
            Err(GatewayError::Api {
                status: 401,
                message: "invalid api key".to_string(),
            })
        });

        let notifier = MockNotificationSender::new();

        let result =
            create_invoice(&repo, &gateway, &notifier, &admin(), BASE_URL, sample_form()).await;
        assert!(matches!(result, Err(ServiceError::Gateway(_))));
    }

    #[actix_web::test]
    async fn notification_failure_does_not_fail_creation() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(sample_client())));
        repo.expect_create_invoice()
            .returning(|new_invoice| Ok(persisted(new_invoice)));

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_payment_link().returning(|_| {
            Ok(PaymentLink {
                external_invoice_id: "77".to_string(),
                payment_url: "https://pay/77".to_string(),
            })
        });

        let mut notifier = MockNotificationSender::new();
        notifier.expect_send_payment_email().returning(|_| {
            Err(NotificationError::Api {
                status: 500,
                message: "provider down".to_string(),
            })
        });

        let result =
            create_invoice(&repo, &gateway, &notifier, &admin(), BASE_URL, sample_form()).await;
        assert!(result.is_ok());
    }

    #[actix_web::test]
    async fn create_invoice_requires_admin_role() {
        let repo = MockRepository::new();
        let gateway = MockPaymentGateway::new();
        let notifier = MockNotificationSender::new();

        let result = create_invoice(
            &repo,
            &gateway,
            &notifier,
            &client_user(),
            BASE_URL,
            sample_form(),
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[actix_web::test]
    async fn create_invoice_rejects_unknown_client_before_gateway_call() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id().returning(|_| Ok(None));
        // No gateway expectation: a call would panic the mock.
        let gateway = MockPaymentGateway::new();
        let notifier = MockNotificationSender::new();

        let result =
            create_invoice(&repo, &gateway, &notifier, &admin(), BASE_URL, sample_form()).await;
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[actix_web::test]
    async fn create_invoice_rejects_non_positive_amount() {
        let repo = MockRepository::new();
        let gateway = MockPaymentGateway::new();
        let notifier = MockNotificationSender::new();

        let mut form = sample_form();
        form.amount = "0".to_string();

        let result = create_invoice(&repo, &gateway, &notifier, &admin(), BASE_URL, form).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[actix_web::test]
    async fn create_invoice_rejects_unsupported_currency() {
        let repo = MockRepository::new();
        let gateway = MockPaymentGateway::new();
        let notifier = MockNotificationSender::new();

        let mut form = sample_form();
        form.currency = "EUR".to_string();

        let result = create_invoice(&repo, &gateway, &notifier, &admin(), BASE_URL, form).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn apply_gateway_status_moves_pending_to_paid() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_external_id()
            .returning(|_| Ok(Some(stored_invoice(InvoiceStatus::Pending))));
        repo.expect_transition_invoice_status()
            .times(1)
            .withf(|external_id, to| external_id == "77" && *to == InvoiceStatus::Paid)
            .returning(|_, to| Ok(Some(stored_invoice(to))));

        let invoice = apply_gateway_status(&repo, "77", "Paid").unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
    }

    #[test]
    fn apply_gateway_status_is_case_insensitive() {
        for provider_status in ["PAID", "paid"] {
            let mut repo = MockRepository::new();
            repo.expect_get_invoice_by_external_id()
                .returning(|_| Ok(Some(stored_invoice(InvoiceStatus::Pending))));
            repo.expect_transition_invoice_status()
                .returning(|_, to| Ok(Some(stored_invoice(to))));

            let invoice = apply_gateway_status(&repo, "77", provider_status).unwrap();
            assert_eq!(invoice.status, InvoiceStatus::Paid);
        }
    }

    #[test]
    fn apply_gateway_status_is_idempotent_for_terminal_states() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_external_id()
            .times(2)
            .returning(|_| Ok(Some(stored_invoice(InvoiceStatus::Paid))));
        // Re-applying the stored status must not touch the writer.

        let first = apply_gateway_status(&repo, "77", "Paid").unwrap();
        let second = apply_gateway_status(&repo, "77", "Paid").unwrap();
        assert_eq!(first, second);
        assert_eq!(second.status, InvoiceStatus::Paid);
    }

    #[test]
    fn unknown_provider_status_is_a_pending_no_op() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_external_id()
            .returning(|_| Ok(Some(stored_invoice(InvoiceStatus::Pending))));

        let invoice = apply_gateway_status(&repo, "77", "SomeNewState").unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Pending);
    }

    #[test]
    fn first_terminal_status_wins() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_external_id()
            .returning(|_| Ok(Some(stored_invoice(InvoiceStatus::Overdue))));
        // A late "Paid" must not rewrite the settled state.

        let invoice = apply_gateway_status(&repo, "77", "Paid").unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Overdue);
    }

    #[test]
    fn cancelled_maps_to_overdue() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_external_id()
            .returning(|_| Ok(Some(stored_invoice(InvoiceStatus::Pending))));
        repo.expect_transition_invoice_status()
            .withf(|_, to| *to == InvoiceStatus::Overdue)
            .returning(|_, to| Ok(Some(stored_invoice(to))));

        let invoice = apply_gateway_status(&repo, "77", "Cancelled").unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Overdue);
    }

    #[test]
    fn lost_transition_race_reports_the_winner() {
        let mut repo = MockRepository::new();
        let mut reads = 0;
        repo.expect_get_invoice_by_external_id()
            .times(2)
            .returning(move |_| {
                reads += 1;
                if reads == 1 {
                    Ok(Some(stored_invoice(InvoiceStatus::Pending)))
                } else {
                    Ok(Some(stored_invoice(InvoiceStatus::Paid)))
                }
            });
        repo.expect_transition_invoice_status().returning(|_, _| Ok(None));

        let invoice = apply_gateway_status(&repo, "77", "Expired").unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
    }

    #[test]
    fn apply_gateway_status_unknown_external_id_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_external_id().returning(|_| Ok(None));

        let result = apply_gateway_status(&repo, "unknown", "Paid");
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[actix_web::test]
    async fn reconcile_invoice_uses_gateway_reported_status() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_external_id()
            .returning(|_| Ok(Some(stored_invoice(InvoiceStatus::Pending))));
        repo.expect_transition_invoice_status()
            .withf(|_, to| *to == InvoiceStatus::Paid)
            .returning(|_, to| Ok(Some(stored_invoice(to))));

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_get_payment_status()
            .withf(|external_id| external_id == "77")
            .returning(|_| Ok("Paid".to_string()));

        let invoice = reconcile_invoice(&repo, &gateway, "77").await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
    }

    #[test]
    fn list_invoices_scopes_clients_to_their_own_records() {
        let mut repo = MockRepository::new();
        repo.expect_list_invoices()
            .withf(|query| query.client_id == Some(1))
            .returning(|_| Ok((0, vec![])));

        let result = list_invoices(&repo, &client_user(), InvoiceListQuery::new());
        assert!(result.is_ok());
    }

    #[test]
    fn list_invoices_leaves_admin_queries_unscoped() {
        let mut repo = MockRepository::new();
        repo.expect_list_invoices()
            .withf(|query| query.client_id.is_none())
            .returning(|_| Ok((0, vec![])));

        let result = list_invoices(&repo, &admin(), InvoiceListQuery::new());
        assert!(result.is_ok());
    }
}
