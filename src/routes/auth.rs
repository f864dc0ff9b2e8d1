use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::{Context, Tera};
use validator::Validate;

use crate::forms::auth::LoginForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{alert_level_to_str, redirect, render_template};
use crate::services::ServiceError;
use crate::services::auth as auth_service;

#[get("/auth/signin")]
pub async fn show_signin(
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_page", "signin");

    render_template(&tera, "auth/signin.html", &context)
}

#[post("/auth/signin")]
pub async fn signin(
    request: HttpRequest,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        log::error!("Failed to validate form: {e}");
        FlashMessage::error("Username and password are required").send();
        return redirect("/auth/signin");
    }

    match auth_service::login(
        repo.get_ref(),
        &server_config,
        &form.username,
        &form.password,
    ) {
        Ok(user) => {
            let token = match user.to_jwt(&server_config.secret) {
                Ok(token) => token,
                Err(e) => {
                    log::error!("Failed to issue session token: {e}");
                    return HttpResponse::InternalServerError().finish();
                }
            };
            if let Err(e) = Identity::login(&request.extensions(), token) {
                log::error!("Failed to attach session identity: {e}");
                return HttpResponse::InternalServerError().finish();
            }
            redirect("/")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Invalid username or password").send();
            redirect("/auth/signin")
        }
        Err(e) => {
            log::error!("Failed to sign in: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/auth/logout")]
pub async fn logout(user: Identity) -> impl Responder {
    user.logout();
    redirect("/auth/signin")
}
