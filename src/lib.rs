use actix_cors::Cors;
use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware as actix_middleware, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use tera::Tera;

use crate::db::establish_connection_pool;
use crate::gateway::MyFatoorahGateway;
use crate::middleware::RedirectUnauthorized;
use crate::models::config::ServerConfig;
use crate::notification::ResendSender;
use crate::repository::DieselRepository;
use crate::routes::api::api_v1_invoices;
use crate::routes::auth::{logout, show_signin, signin};
use crate::routes::invoice::{create_invoice, refresh_invoice};
use crate::routes::main::{add_client, show_index};
use crate::routes::payment::{payment_callback, payment_error, payment_result};
use crate::routes::portal::show_portal;

pub mod auth;
pub mod db;
pub mod domain;
pub mod dto;
pub mod forms;
pub mod gateway;
pub mod middleware;
pub mod models;
pub mod notification;
pub mod pagination;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish the Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;
    let repo = DieselRepository::new(pool);

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let gateway = MyFatoorahGateway::new(
        server_config.myfatoorah_base_url.clone(),
        server_config.myfatoorah_api_key.clone(),
    )
    .map_err(|e| std::io::Error::other(format!("Failed to build gateway client: {e}")))?;

    // The email sender renders through the same Tera instance as the pages.
    let notifier = ResendSender::new(
        server_config.resend_api_key.clone(),
        server_config.email_from.clone(),
        tera.clone(),
    )
    .map_err(|e| std::io::Error::other(format!("Failed to build notification client: {e}")))?;

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let bind_address = (server_config.address.clone(), server_config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(actix_middleware::Compress::default())
            .wrap(actix_middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            // Anonymous surface: the sign-in form plus the endpoints the
            // gateway drives the payer's browser through.
            .service(show_signin)
            .service(signin)
            .service(payment_callback)
            .service(payment_result)
            .service(payment_error)
            .service(web::scope("/api").service(api_v1_invoices))
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(show_index)
                    .service(add_client)
                    .service(create_invoice)
                    .service(refresh_invoice)
                    .service(show_portal)
                    .service(logout),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(notifier.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
