//! Credential checks issuing session claims.
//!
//! All password hashes use the Argon2id variant in PHC string format so the
//! parameters and salt travel with the hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::auth::{AuthenticatedUser, ROLE_ADMIN, ROLE_CLIENT};
use crate::models::config::ServerConfig;
use crate::repository::ClientReader;
use crate::services::{ServiceError, ServiceResult};

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Validation(format!("password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored PHC hash.
///
/// A malformed stored hash counts as a mismatch rather than an error so a
/// corrupt record cannot be signed into.
fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Checks the submitted credentials against the configured admin account
/// first, then against the client records.
pub fn login<R>(
    repo: &R,
    config: &ServerConfig,
    username: &str,
    password: &str,
) -> ServiceResult<AuthenticatedUser>
where
    R: ClientReader + ?Sized,
{
    if username == config.admin_username {
        if verify_password(password, &config.admin_password_hash) {
            return Ok(AuthenticatedUser::new(
                config.admin_username.clone(),
                config.admin_username.clone(),
                "Administrator".to_string(),
                format!("{}@{}", config.admin_username, config.domain),
                vec![ROLE_ADMIN.to_string()],
            ));
        }
        return Err(ServiceError::Unauthorized);
    }

    let account = repo
        .get_client_by_username(username)?
        .ok_or(ServiceError::Unauthorized)?;

    if !verify_password(password, &account.password_hash) {
        return Err(ServiceError::Unauthorized);
    }

    let client = account.client;
    Ok(AuthenticatedUser::new(
        client.id.to_string(),
        client.username,
        client.name,
        client.email,
        vec![ROLE_CLIENT.to_string()],
    ))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::client::{Client, ClientAccount};
    use crate::repository::mock::MockRepository;

    fn test_config(admin_password_hash: String) -> ServerConfig {
        ServerConfig {
            domain: "example.com".to_string(),
            address: "127.0.0.1".to_string(),
            port: 8080,
            database_url: ":memory:".to_string(),
            templates_dir: "templates/**/*".to_string(),
            secret: "0123456789012345678901234567890123456789012345678901234567890123"
                .to_string(),
            base_url: "https://portal.example.com".to_string(),
            myfatoorah_base_url: "https://apitest.myfatoorah.com".to_string(),
            myfatoorah_api_key: "key".to_string(),
            resend_api_key: "key".to_string(),
            email_from: "Masdar Payment <noreply@example.com>".to_string(),
            admin_username: "admin".to_string(),
            admin_password_hash,
        }
    }

    fn sample_account(password: &str) -> ClientAccount {
        ClientAccount {
            client: Client {
                id: 42,
                username: "acme".to_string(),
                name: "Acme Trading".to_string(),
                email: "billing@acme.com".to_string(),
                phone: None,
                company: None,
                created_at: Utc::now().naive_utc(),
            },
            password_hash: hash_password(password).unwrap(),
        }
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("correct-horse-battery-staple").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-battery-staple", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn admin_login_issues_admin_role() {
        let config = test_config(hash_password("admin-secret").unwrap());
        let repo = MockRepository::new();

        let user = login(&repo, &config, "admin", "admin-secret").unwrap();
        assert_eq!(user.roles, vec![ROLE_ADMIN.to_string()]);
        assert_eq!(user.client_id(), None);
    }

    #[test]
    fn admin_login_with_wrong_password_is_rejected() {
        let config = test_config(hash_password("admin-secret").unwrap());
        // The client table must not be consulted for the admin username.
        let repo = MockRepository::new();

        let result = login(&repo, &config, "admin", "guess");
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn client_login_issues_client_role() {
        let config = test_config(hash_password("admin-secret").unwrap());
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_username()
            .returning(|_| Ok(Some(sample_account("client-secret"))));

        let user = login(&repo, &config, "acme", "client-secret").unwrap();
        assert_eq!(user.roles, vec![ROLE_CLIENT.to_string()]);
        assert_eq!(user.client_id(), Some(42));
        assert_eq!(user.email, "billing@acme.com");
    }

    #[test]
    fn unknown_username_is_rejected() {
        let config = test_config(hash_password("admin-secret").unwrap());
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_username().returning(|_| Ok(None));

        let result = login(&repo, &config, "ghost", "anything");
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn client_login_with_wrong_password_is_rejected() {
        let config = test_config(hash_password("admin-secret").unwrap());
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_username()
            .returning(|_| Ok(Some(sample_account("client-secret"))));

        let result = login(&repo, &config, "acme", "guess");
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }
}
