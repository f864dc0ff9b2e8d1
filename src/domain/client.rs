use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub created_at: NaiveDateTime,
}

/// A client together with its stored credential hash.
///
/// Kept separate from [`Client`] so the hash never reaches templates or
/// JSON responses.
#[derive(Clone, Debug)]
pub struct ClientAccount {
    pub client: Client,
    pub password_hash: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewClient {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
}

impl NewClient {
    #[must_use]
    pub fn new(
        username: String,
        password_hash: String,
        name: String,
        email: String,
        phone: Option<String>,
        company: Option<String>,
    ) -> Self {
        Self {
            username: username.trim().to_string(),
            password_hash,
            name: name.trim().to_string(),
            email: email.to_lowercase().trim().to_string(),
            phone: phone
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            company: company
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}
