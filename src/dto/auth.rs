use crate::domain::session::Credentials;
use crate::domain::user::NewUser;
use crate::dto::{FieldErrors, check, required};
use validator::{Validate, ValidationError};

const USERNAME_MIN_CHARS: usize = 2;

/// Usernames are sent trimmed, so their length is counted without surrounding whitespace
fn username(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Username is required".into());
        return Err(err);
    }
    if trimmed.chars().count() < USERNAME_MIN_CHARS {
        let mut err = ValidationError::new("length");
        err.message = Some("Username must be at least 2 characters".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(custom = "username")]
    pub username: String,
    #[validate(
        custom(function = "required", message = "Password is required"),
        length(min = 5, message = "Password must be at least 5 characters")
    )]
    pub password: String,
}

impl LoginForm {
    pub fn credentials(&self) -> Result<Credentials, FieldErrors> {
        check(self)?;
        Ok(Credentials {
            username: self.username.trim().to_owned(),
            password: self.password.clone(),
        })
    }
}

#[derive(Clone, Default, Validate)]
pub struct RegistrationForm {
    #[validate(custom = "username")]
    pub username: String,
    #[validate(
        custom(function = "required", message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
    #[validate(
        custom(function = "required", message = "Password is required"),
        length(min = 5, message = "Password must be at least 5 characters")
    )]
    pub password: String,
    #[validate(
        custom(function = "required", message = "Confirm Password is required"),
        must_match(other = "password", message = "Passwords must match")
    )]
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Self sign-ups never pick a role; the API assigns its default
    pub fn new_user(&self) -> Result<NewUser, FieldErrors> {
        check(self)?;
        Ok(NewUser {
            username: self.username.trim().to_owned(),
            email: self.email.trim().to_owned(),
            password: self.password.clone(),
            role: None,
        })
    }
}
