use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::auth::{AuthenticatedUser, check_role};

pub mod api;
pub mod auth;
pub mod invoice;
pub mod main;
pub mod payment;
pub mod portal;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Maps flash levels onto the alert classes the templates use.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// 303 redirect to the given location.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Renders a template, degrading to a 500 on template errors.
pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("Failed to render template {template}: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Builds the context shared by every signed-in page.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", user);
    context.insert("current_page", current_page);
    context
}

/// Requires `role` on the user, or short-circuits with a redirect (when a
/// location is given) or a bare 401.
pub fn ensure_role(
    user: &AuthenticatedUser,
    role: &str,
    redirect_to: Option<&str>,
) -> Result<(), HttpResponse> {
    if check_role(role, &user.roles) {
        Ok(())
    } else {
        Err(match redirect_to {
            Some(location) => redirect(location),
            None => HttpResponse::Unauthorized().finish(),
        })
    }
}
