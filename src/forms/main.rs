use serde::Deserialize;
use validator::Validate;

use crate::domain::client::NewClient;

#[derive(Deserialize, Validate)]
/// Form data for creating a client account.
pub struct AddClientForm {
    #[validate(length(min = 3))]
    pub username: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
}

impl AddClientForm {
    /// Converts the form into a persistable client, replacing the plaintext
    /// password with the provided hash.
    pub fn into_new_client(self, password_hash: String) -> NewClient {
        NewClient::new(
            self.username,
            password_hash,
            self.name,
            self.email,
            Some(self.phone),
            Some(self.company),
        )
    }
}
