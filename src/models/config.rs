//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    /// Secret used both for session cookies and JWT signing.
    pub secret: String,
    /// Public base URL used to build gateway callback/error targets.
    pub base_url: String,
    pub myfatoorah_base_url: String,
    pub myfatoorah_api_key: String,
    pub resend_api_key: String,
    /// From-address for outbound payment emails.
    pub email_from: String,
    pub admin_username: String,
    /// Argon2id PHC hash of the admin password.
    pub admin_password_hash: String,
}
