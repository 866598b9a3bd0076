use derive_more::Display;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;
use validator::ValidationErrors;

pub mod board;
pub mod comment;
pub mod project;
pub mod routing;
pub mod session;
pub mod stats;
pub mod task;
pub mod user;

#[cfg(test)]
pub(crate) mod test_util;

/// Identifier of any entity owned by the remote API. The API serializes `ID` fields as strings
/// but expects `Int` variables, so both forms are accepted when reading.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub i32);

impl FromStr for EntityId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(EntityId)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i32),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(id) => Ok(EntityId(id)),
            RawId::Text(text) => text
                .parse()
                .map_err(|_| D::Error::custom(format!("entity id {text:?} is not numeric"))),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("input was invalid: {0}")]
    Invalid(ValidationErrors),
    #[error("requested data does not exist")]
    DoesNotExist,
    #[error("the server refused to {action}: {message}")]
    Rejected { action: String, message: String },
    #[error("failed to {action} due to a communication failure: {cause}")]
    RetrieveFailure {
        action: String,
        #[source]
        cause: anyhow::Error,
    },
}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Self::Invalid(value)
    }
}

impl Error {
    /// Message suitable for the error notification shown to the user. Server-provided messages
    /// are passed through untouched.
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(_) => "Submitted data was invalid.".to_owned(),
            Self::DoesNotExist => "The requested entity could not be found.".to_owned(),
            Self::Rejected { message, .. } => message.clone(),
            Self::RetrieveFailure { cause, .. } => cause.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum DrivenPortError {
    #[error("a communication failure occurred: {0}")]
    CommsFailure(anyhow::Error),
    #[error("the requested data does not exist")]
    DoesNotExist,
    #[error("the server rejected the request: {0}")]
    Rejected(String),
}

impl From<anyhow::Error> for DrivenPortError {
    fn from(value: anyhow::Error) -> Self {
        Self::CommsFailure(value)
    }
}

impl DrivenPortError {
    /// Converts this DrivenPortError to a domain error with some extra info on the [action]
    /// being taken when communicating over the port
    pub(crate) fn into_error_trying_to(self, action: &str) -> Error {
        match self {
            Self::DoesNotExist => Error::DoesNotExist,
            Self::Rejected(message) => Error::Rejected {
                action: action.into(),
                message,
            },
            Self::CommsFailure(err) => Error::RetrieveFailure {
                action: action.into(),
                cause: err,
            },
        }
    }
}
