//! Session identity.
//!
//! Credentials are checked once at sign-in; the resulting claims travel as a
//! JWT inside the identity cookie and are handed to every service explicitly
//! through the [`AuthenticatedUser`] extractor. No handler or service reads
//! ambient session state.

use std::future::{Ready, ready};

use actix_identity::Identity;
use actix_web::dev::Payload;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{Error, FromRequest, HttpRequest, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::models::config::ServerConfig;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CLIENT: &str = "client";

const TOKEN_TTL_DAYS: i64 = 7;

/// Claims describing the signed-in user.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    /// Client id for client sessions, admin username for the admin session.
    pub sub: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub exp: i64,
}

impl AuthenticatedUser {
    pub fn new(
        sub: String,
        username: String,
        name: String,
        email: String,
        roles: Vec<String>,
    ) -> Self {
        Self {
            sub,
            username,
            name,
            email,
            roles,
            exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        }
    }

    pub fn to_jwt(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn from_jwt(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }

    /// Numeric client id, present only for client sessions.
    pub fn client_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Returns true when `roles` contains `role`.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let identity = Identity::from_request(req, payload).into_inner();
        let result = (|| {
            let identity = identity.map_err(|_| ErrorUnauthorized("not signed in"))?;
            let token = identity
                .id()
                .map_err(|_| ErrorUnauthorized("missing session token"))?;
            let config = req
                .app_data::<web::Data<ServerConfig>>()
                .ok_or_else(|| ErrorInternalServerError("server configuration missing"))?;
            Self::from_jwt(&token, &config.secret)
                .map_err(|_| ErrorUnauthorized("invalid session token"))
        })();
        ready(result)
    }
}
