use super::cache::EntityKind;
use super::{Mutation, MutationAck, Query, UserRefRow, run_mutation, run_query};
use crate::domain::user::{NewUser, Role, User, UserRef, UserUpdate, driven_ports};
use crate::domain::user::driven_ports::{UserReader as _, UserWriter as _};
use crate::domain::{DrivenPortError, EntityId};
use crate::external_connections::ExternalConnectivity;
use serde::Deserialize;
use serde_json::{Value, json};

const LIST_USERS: Query = Query {
    name: "getUsers",
    document: "query getUsers { users { id username email role } }",
    reads: &[EntityKind::User],
};

const USER_BY_ID: Query = Query {
    name: "getUser",
    document: "query getUser($id: Int!) { users(id: $id) { id username email role } }",
    reads: &[EntityKind::User],
};

const ME: Query = Query {
    name: "me",
    document: "query me { me { id username } }",
    reads: &[EntityKind::User],
};

const CREATE_USER: Mutation = Mutation {
    name: "createUser",
    document: "mutation createUser($username: String!, $email: String!, $password: String!, $role: String) { \
        createUser(username: $username, email: $email, password: $password, role: $role) { success error } }",
    writes: &[EntityKind::User],
};

const UPDATE_USER: Mutation = Mutation {
    name: "updateUser",
    document: "mutation updateUser($userId: Int!, $username: String, $email: String, $password: String, $role: String) { \
        updateUser(userId: $userId, username: $username, email: $email, password: $password, role: $role) { success error } }",
    writes: &[EntityKind::User, EntityKind::Task, EntityKind::Comment],
};

const DELETE_USER: Mutation = Mutation {
    name: "deleteUser",
    document: "mutation deleteUser($userId: Int!) { deleteUser(userId: $userId) { success error } }",
    writes: &[
        EntityKind::User,
        EntityKind::Task,
        EntityKind::Comment,
        EntityKind::Stats,
    ],
};

#[derive(Deserialize)]
struct UserRow {
    id: EntityId,
    username: String,
    email: String,
    role: Role,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        User {
            id: value.id,
            username: value.username,
            email: value.email,
            role: value.role,
        }
    }
}

#[derive(Deserialize)]
struct UsersData {
    users: Vec<UserRow>,
}

#[derive(Deserialize)]
struct MeData {
    me: Option<UserRefRow>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserData {
    create_user: MutationAck,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserData {
    update_user: MutationAck,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteUserData {
    delete_user: MutationAck,
}

/// Adds `value` under `key` only when present, so the API keeps its own default
fn insert_present(variables: &mut Value, key: &str, value: Option<Value>) {
    if let (Some(value), Some(map)) = (value, variables.as_object_mut()) {
        map.insert(key.to_owned(), value);
    }
}

pub struct RemoteUserReader;

impl driven_ports::UserReader for RemoteUserReader {
    async fn all_users(
        &self,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Vec<User>, DrivenPortError> {
        let data: UsersData = run_query(ext_cxn, &LIST_USERS, json!({})).await?;
        Ok(data.users.into_iter().map(User::from).collect())
    }

    async fn user_by_id(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Option<User>, DrivenPortError> {
        let data: UsersData = run_query(ext_cxn, &USER_BY_ID, json!({ "id": id })).await?;
        Ok(data.users.into_iter().next().map(User::from))
    }

    async fn current_user(
        &self,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<UserRef, DrivenPortError> {
        let data: MeData = run_query(ext_cxn, &ME, json!({})).await?;
        data.me.map(UserRef::from).ok_or(DrivenPortError::DoesNotExist)
    }
}

pub struct RemoteUserWriter;

impl driven_ports::UserWriter for RemoteUserWriter {
    async fn create_user(
        &self,
        user: &NewUser,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let mut variables = json!({
            "username": user.username,
            "email": user.email,
            "password": user.password,
        });
        insert_present(&mut variables, "role", user.role.map(|role| json!(role)));

        let data: CreateUserData = run_mutation(ext_cxn, &CREATE_USER, variables).await?;
        data.create_user.into_result()
    }

    async fn update_user(
        &self,
        id: EntityId,
        update: &UserUpdate,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let mut variables = json!({ "userId": id });
        insert_present(&mut variables, "username", update.username.as_ref().map(|u| json!(u)));
        insert_present(&mut variables, "email", update.email.as_ref().map(|e| json!(e)));
        insert_present(&mut variables, "password", update.password.as_ref().map(|p| json!(p)));
        insert_present(&mut variables, "role", update.role.map(|role| json!(role)));

        let data: UpdateUserData = run_mutation(ext_cxn, &UPDATE_USER, variables).await?;
        data.update_user.into_result()
    }

    async fn delete_user(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let data: DeleteUserData =
            run_mutation(ext_cxn, &DELETE_USER, json!({ "userId": id })).await?;
        data.delete_user.into_result()
    }
}

/// Both halves of the remote user store
pub struct RemoteUsers;

impl driven_ports::UserReader for RemoteUsers {
    async fn all_users(
        &self,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Vec<User>, DrivenPortError> {
        RemoteUserReader.all_users(ext_cxn).await
    }

    async fn user_by_id(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Option<User>, DrivenPortError> {
        RemoteUserReader.user_by_id(id, ext_cxn).await
    }

    async fn current_user(
        &self,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<UserRef, DrivenPortError> {
        RemoteUserReader.current_user(ext_cxn).await
    }
}

impl driven_ports::UserWriter for RemoteUsers {
    async fn create_user(
        &self,
        user: &NewUser,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        RemoteUserWriter.create_user(user, ext_cxn).await
    }

    async fn update_user(
        &self,
        id: EntityId,
        update: &UserUpdate,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        RemoteUserWriter.update_user(id, update, ext_cxn).await
    }

    async fn delete_user(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        RemoteUserWriter.delete_user(id, ext_cxn).await
    }
}
