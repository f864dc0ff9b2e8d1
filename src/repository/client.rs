use diesel::prelude::*;

use crate::domain::client::{Client, ClientAccount, NewClient};
use crate::repository::errors::RepositoryResult;
use crate::repository::{ClientReader, ClientWriter, DieselRepository};

impl ClientReader for DieselRepository {
    fn get_client_by_id(&self, id: i32) -> RepositoryResult<Option<Client>> {
        use crate::models::client::Client as DbClient;
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let client = clients::table
            .find(id)
            .first::<DbClient>(&mut conn)
            .optional()?;

        Ok(client.map(Into::into))
    }

    fn get_client_by_username(&self, username: &str) -> RepositoryResult<Option<ClientAccount>> {
        use crate::models::client::Client as DbClient;
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let client = clients::table
            .filter(clients::username.eq(username))
            .first::<DbClient>(&mut conn)
            .optional()?;

        Ok(client.map(Into::into))
    }

    fn list_clients(&self) -> RepositoryResult<Vec<Client>> {
        use crate::models::client::Client as DbClient;
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let clients = clients::table
            .order(clients::created_at.desc())
            .load::<DbClient>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(clients)
    }
}

impl ClientWriter for DieselRepository {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client> {
        use crate::models::client::{Client as DbClient, NewClient as DbNewClient};
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let insertable: DbNewClient = new_client.into();
        let created = diesel::insert_into(clients::table)
            .values(&insertable)
            .get_result::<DbClient>(&mut conn)?;

        Ok(created.into())
    }
}
