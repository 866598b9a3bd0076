use super::{Mutation, UserRefRow, run_mutation};
use crate::domain::DrivenPortError;
use crate::domain::session::{AuthGrant, AuthToken, Credentials, driven_ports};
use crate::domain::user::Role;
use crate::external_connections::ExternalConnectivity;
use serde::Deserialize;
use serde_json::{Value, json};

const TOKEN_AUTH: Mutation = Mutation {
    name: "tokenAuth",
    document: "mutation tokenAuth($username: String!, $password: String!) { \
        tokenAuth(username: $username, password: $password) { success errors token user { id username role } } }",
    writes: &[],
};

const REFUSED_FALLBACK: &str = "Please, enter valid credentials.";

#[derive(Deserialize)]
struct AuthUserRow {
    #[serde(flatten)]
    user: UserRefRow,
    role: Role,
}

#[derive(Deserialize)]
struct TokenAuthRow {
    token: Option<String>,
    /// Free-form JSON keyed by field name, e.g. `{"nonFieldErrors": [{"message": ".."}]}`
    errors: Option<Value>,
    user: Option<AuthUserRow>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAuthData {
    token_auth: TokenAuthRow,
}

/// First human readable message buried anywhere in the `errors` blob
fn first_message(errors: &Value) -> Option<String> {
    match errors {
        Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
        Value::Array(items) => items.iter().find_map(first_message),
        Value::Object(fields) => fields
            .get("message")
            .and_then(first_message)
            .or_else(|| fields.values().find_map(first_message)),
        _ => None,
    }
}

impl TokenAuthRow {
    fn into_grant(self) -> Result<AuthGrant, DrivenPortError> {
        match (self.token, self.user) {
            (Some(token), Some(user)) if !token.is_empty() => Ok(AuthGrant {
                token: AuthToken::new(token),
                user: user.user.into(),
                role: user.role,
            }),
            _ => {
                let message = self
                    .errors
                    .as_ref()
                    .and_then(first_message)
                    .unwrap_or_else(|| REFUSED_FALLBACK.to_owned());
                Err(DrivenPortError::Rejected(message))
            }
        }
    }
}

pub struct RemoteAuthenticator;

impl driven_ports::Authenticator for RemoteAuthenticator {
    async fn token_auth(
        &self,
        credentials: &Credentials,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<AuthGrant, DrivenPortError> {
        let variables = json!({
            "username": credentials.username,
            "password": credentials.password,
        });

        let data: TokenAuthData = run_mutation(ext_cxn, &TOKEN_AUTH, variables).await?;
        data.token_auth.into_grant()
    }
}
