use crate::domain::user::{NewUser, Role, User, UserUpdate};
use crate::dto::{FieldErrors, check, required};
use validator::{Validate, ValidationError};

fn known_role(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Role>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("role"))
}

fn parsed_role(value: &str) -> Result<Role, FieldErrors> {
    value
        .parse()
        .map_err(|_| FieldErrors::single("role", "Role is required"))
}

/// Admin form for adding an account
#[derive(Clone, Default, Validate)]
pub struct NewUserForm {
    #[validate(custom(function = "required", message = "Username is required"))]
    pub username: String,
    #[validate(
        custom(function = "required", message = "Email is required"),
        email(message = "Invalid email")
    )]
    pub email: String,
    #[validate(
        custom(function = "required", message = "Password is required"),
        length(min = 5, message = "Password must be at least 5 characters")
    )]
    pub password: String,
    #[validate(custom(function = "known_role", message = "Role is required"))]
    pub role: String,
}

impl NewUserForm {
    pub fn new_user(&self) -> Result<NewUser, FieldErrors> {
        check(self)?;
        Ok(NewUser {
            username: self.username.trim().to_owned(),
            email: self.email.trim().to_owned(),
            password: self.password.clone(),
            role: Some(parsed_role(&self.role)?),
        })
    }
}

/// Admin form for editing an existing account. Passwords are only changed from the profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct UserUpdateForm {
    #[validate(custom(function = "required", message = "Username is required"))]
    pub username: String,
    #[validate(
        custom(function = "required", message = "Email is required"),
        email(message = "Invalid email")
    )]
    pub email: String,
    #[validate(custom(function = "known_role", message = "Role is required"))]
    pub role: String,
}

impl UserUpdateForm {
    pub fn from_user(user: &User) -> UserUpdateForm {
        UserUpdateForm {
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.variable().to_owned(),
        }
    }

    pub fn update(&self) -> Result<UserUpdate, FieldErrors> {
        check(self)?;
        Ok(UserUpdate {
            username: Some(self.username.trim().to_owned()),
            email: Some(self.email.trim().to_owned()),
            password: None,
            role: Some(parsed_role(&self.role)?),
        })
    }
}

/// Self-service edit of the signed-in account
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ProfileForm {
    #[validate(
        custom(function = "required", message = "Email is required"),
        email(message = "Invalid email")
    )]
    pub email: String,
    /// Left unchanged when absent
    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    pub new_password: Option<String>,
}

impl ProfileForm {
    /// A blank password field means "keep the current password"
    pub fn new(email: impl Into<String>, new_password: &str) -> ProfileForm {
        ProfileForm {
            email: email.into(),
            new_password: Some(new_password.to_owned()).filter(|password| !password.is_empty()),
        }
    }

    pub fn update(&self) -> Result<UserUpdate, FieldErrors> {
        check(self)?;
        Ok(UserUpdate {
            email: Some(self.email.trim().to_owned()),
            password: self.new_password.clone(),
            ..UserUpdate::default()
        })
    }
}
