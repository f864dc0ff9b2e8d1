use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::client::{
    Client as DomainClient, ClientAccount, NewClient as DomainNewClient,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::clients)]
/// Diesel model for [`crate::domain::client::Client`].
pub struct Client {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::clients)]
/// Insertable form of [`Client`].
pub struct NewClient<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
}

impl From<Client> for DomainClient {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            username: client.username,
            name: client.name,
            email: client.email,
            phone: client.phone,
            company: client.company,
            created_at: client.created_at,
        }
    }
}

impl From<Client> for ClientAccount {
    fn from(client: Client) -> Self {
        let password_hash = client.password_hash.clone();
        Self {
            client: client.into(),
            password_hash,
        }
    }
}

impl<'a> From<&'a DomainNewClient> for NewClient<'a> {
    fn from(client: &'a DomainNewClient) -> Self {
        Self {
            username: client.username.as_str(),
            password_hash: client.password_hash.as_str(),
            name: client.name.as_str(),
            email: client.email.as_str(),
            phone: client.phone.as_deref(),
            company: client.company.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn from_domain_new_creates_newclient() {
        let domain = DomainNewClient::new(
            "acme".to_string(),
            "$argon2id$stub".to_string(),
            "Acme Trading".to_string(),
            "billing@acme.com".to_string(),
            Some("+96550000000".to_string()),
            None,
        );
        let new: NewClient = (&domain).into();
        assert_eq!(new.username, domain.username);
        assert_eq!(new.password_hash, domain.password_hash);
        assert_eq!(new.email, domain.email.as_str());
        assert_eq!(new.phone, domain.phone.as_deref());
        assert_eq!(new.company, None);
    }

    #[test]
    fn client_into_domain_drops_credentials() {
        let now = Utc::now().naive_utc();
        let db_client = Client {
            id: 1,
            username: "acme".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            name: "Acme Trading".to_string(),
            email: "billing@acme.com".to_string(),
            phone: None,
            company: Some("Acme Holdings".to_string()),
            created_at: now,
        };
        let account: ClientAccount = db_client.clone().into();
        assert_eq!(account.password_hash, "$argon2id$stub");

        let domain: DomainClient = db_client.into();
        assert_eq!(domain.id, 1);
        assert_eq!(domain.username, "acme");
        assert_eq!(domain.company, Some("Acme Holdings".to_string()));
        assert_eq!(domain.created_at, now);
    }
}
