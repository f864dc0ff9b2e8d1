use validator::Validate;

use crate::auth::{AuthenticatedUser, ROLE_ADMIN, check_role};
use crate::domain::client::Client;
use crate::forms::main::AddClientForm;
use crate::repository::{ClientReader, ClientWriter};
use crate::services::auth as auth_service;
use crate::services::{ServiceError, ServiceResult};

/// Validates the add-client form and persists a new client record.
pub fn add_client<R>(repo: &R, user: &AuthenticatedUser, form: AddClientForm) -> ServiceResult<Client>
where
    R: ClientWriter + ?Sized,
{
    if !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    if let Err(err) = form.validate() {
        log::error!("Failed to validate client form: {err}");
        return Err(ServiceError::Form("Invalid client form".to_string()));
    }

    let password_hash = auth_service::hash_password(&form.password)?;
    let new_client = form.into_new_client(password_hash);

    repo.create_client(&new_client).map_err(|err| {
        log::error!("Failed to add a client: {err}");
        ServiceError::from(err)
    })
}

/// Lists every client for the admin dashboard.
pub fn list_clients<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Client>>
where
    R: ClientReader + ?Sized,
{
    if !check_role(ROLE_ADMIN, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.list_clients().map_err(ServiceError::from)
}
