use super::modal::{FormOutcome, UserModal};
use super::{Confirmation, Notification, Prompt, QuerySlot, ViewState};
use crate::domain::EntityId;
use crate::domain::user::{
    User,
    driven_ports::{UserReader, UserWriter},
    driving_ports::UserPort,
};
use crate::external_connections::ExternalConnectivity;
use tracing::info;

/// Admin table of every account
#[derive(Default)]
pub struct UsersView {
    users: QuerySlot<Vec<User>>,
    modal: Option<UserModal>,
}

impl UsersView {
    pub fn new() -> UsersView {
        UsersView::default()
    }

    pub fn users(&self) -> ViewState<&Vec<User>> {
        self.users.state()
    }

    pub fn modal(&self) -> Option<&UserModal> {
        self.modal.as_ref()
    }

    pub fn modal_mut(&mut self) -> Option<&mut UserModal> {
        self.modal.as_mut()
    }

    pub async fn load(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        user_port: &impl UserPort,
        u_reader: &impl UserReader,
    ) {
        let ticket = self.users.begin();
        let users = user_port.get_users(ext_cxn, u_reader).await;
        self.users.finish(ticket, users);
    }

    pub fn open_create(&mut self) {
        self.modal = Some(UserModal::create());
    }

    /// Opens the edit dialog for a listed user. Returns whether the user was found.
    pub fn open_edit(&mut self, id: EntityId) -> bool {
        let user = self
            .users
            .data()
            .and_then(|users| users.iter().find(|user| user.id == id));
        self.modal = user.map(UserModal::edit);
        self.modal.is_some()
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Submits the open dialog. A successful submission closes it and re-fetches the table.
    pub async fn submit_modal(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        user_port: &impl UserPort,
        u_persistence: &(impl UserReader + UserWriter),
        prompt: &impl Prompt,
    ) -> Option<FormOutcome> {
        let modal = self.modal.as_mut()?;
        let outcome = modal.submit(ext_cxn, user_port, u_persistence, prompt).await;
        if outcome.is_submitted() {
            self.modal = None;
            self.load(&ext_cxn.for_refetch(), user_port, u_persistence)
                .await;
        }
        Some(outcome)
    }

    /// Deletes a user after confirmation. Returns whether the user was deleted.
    pub async fn delete(
        &mut self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        user_port: &impl UserPort,
        u_persistence: &(impl UserReader + UserWriter),
        prompt: &impl Prompt,
    ) -> bool {
        let question = Confirmation::destructive("This action will delete the user permanently.");
        if !prompt.confirm(&question) {
            info!("Kept user {id}");
            return false;
        }

        match user_port.delete_user(id, ext_cxn, u_persistence).await {
            Ok(()) => {
                prompt.notify(&Notification::deleted("User has been deleted."));
                self.load(&ext_cxn.for_refetch(), user_port, u_persistence)
                    .await;
                true
            }
            Err(err) => {
                prompt.notify(&Notification::failure("There was an error deleting the user", &err));
                false
            }
        }
    }
}
