use crate::domain::{DrivenPortError, EntityId, Error};
use crate::external_connections::ExternalConnectivity;
use derive_more::Display;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use tracing::{error, info};

/// Authorization level of an account. The API reports tags in upper case (`ADMIN`) and accepts
/// them in lower case (`admin`) as mutation variables.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    #[display("ADMIN")]
    Admin,
    #[display("NORMAL")]
    Normal,
}

#[derive(Debug, Error)]
#[error("{0:?} is not a known role")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Normal];

    /// Tag stored in the session and compared by role gates
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Normal => "NORMAL",
        }
    }

    /// Value the API expects in mutation variables
    pub fn variable(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Normal => "normal",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.variable())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// The slice of a user embedded in tasks and comments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: EntityId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Left out of the request when absent, so the API applies its default role
    pub role: Option<Role>,
}

/// Partial update of a user; absent fields keep their current value on the server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

pub mod driven_ports {
    use super::*;

    pub trait UserReader {
        async fn all_users(
            &self,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Vec<User>, DrivenPortError>;
        async fn user_by_id(
            &self,
            id: EntityId,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Option<User>, DrivenPortError>;
        /// The account the session's token belongs to
        async fn current_user(
            &self,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<UserRef, DrivenPortError>;
    }

    pub trait UserWriter {
        async fn create_user(
            &self,
            user: &NewUser,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
        async fn update_user(
            &self,
            id: EntityId,
            update: &UserUpdate,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
        async fn delete_user(
            &self,
            id: EntityId,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait UserPort {
        async fn get_users(
            &self,
            ext_cxn: &impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<Vec<User>, Error>;
        /// Full record of the signed-in account
        async fn current_user(
            &self,
            ext_cxn: &impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<User, Error>;
        async fn create_user(
            &self,
            new_user: &NewUser,
            ext_cxn: &impl ExternalConnectivity,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<(), Error>;
        async fn update_user(
            &self,
            id: EntityId,
            update: &UserUpdate,
            ext_cxn: &impl ExternalConnectivity,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<(), Error>;
        async fn delete_user(
            &self,
            id: EntityId,
            ext_cxn: &impl ExternalConnectivity,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<(), Error>;
    }
}

pub struct UserService {}

impl driving_ports::UserPort for UserService {
    async fn get_users(
        &self,
        ext_cxn: &impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
    ) -> Result<Vec<User>, Error> {
        let all_users_result = u_reader.all_users(ext_cxn).await;
        if let Err(ref port_err) = all_users_result {
            error!("User fetch failure: {port_err}");
        }

        all_users_result.map_err(|err| err.into_error_trying_to("fetch users"))
    }

    async fn current_user(
        &self,
        ext_cxn: &impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
    ) -> Result<User, Error> {
        let me = u_reader
            .current_user(ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("identify the signed-in user"))?;

        u_reader
            .user_by_id(me.id, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("fetch the signed-in user"))?
            .ok_or(Error::DoesNotExist)
    }

    async fn create_user(
        &self,
        new_user: &NewUser,
        ext_cxn: &impl ExternalConnectivity,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Result<(), Error> {
        info!("Creating user {}", new_user.username);
        u_writer
            .create_user(new_user, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("create a user"))
    }

    async fn update_user(
        &self,
        id: EntityId,
        update: &UserUpdate,
        ext_cxn: &impl ExternalConnectivity,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Result<(), Error> {
        info!("Updating user {id}");
        u_writer
            .update_user(id, update, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("update a user"))
    }

    async fn delete_user(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Result<(), Error> {
        info!("Deleting user {id}");
        u_writer
            .delete_user(id, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("delete a user"))
    }
}
