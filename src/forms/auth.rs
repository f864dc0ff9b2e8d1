use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate)]
/// Form data for the sign-in page, shared by admin and client logins.
pub struct LoginForm {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}
