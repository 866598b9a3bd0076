use super::modal::{FormOutcome, settle};
use super::{Prompt, QuerySlot, ViewState};
use crate::domain::user::{
    User,
    driven_ports::{UserReader, UserWriter},
    driving_ports::UserPort,
};
use crate::dto::FieldErrors;
use crate::dto::user::ProfileForm;
use crate::external_connections::ExternalConnectivity;
use tracing::debug;

/// The signed-in user's own account. Saving changes the credentials behind the session, so a
/// successful save is followed by a log out.
#[derive(Debug, Default)]
pub struct ProfileView {
    me: QuerySlot<User>,
    editing: Option<ProfileForm>,
    errors: FieldErrors,
}

impl ProfileView {
    pub fn new() -> ProfileView {
        ProfileView::default()
    }

    pub async fn load(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        user_port: &impl UserPort,
        u_reader: &impl UserReader,
    ) {
        let ticket = self.me.begin();
        let me = user_port.current_user(ext_cxn, u_reader).await;
        self.me.finish(ticket, me);
    }

    pub fn me(&self) -> ViewState<&User> {
        self.me.state()
    }

    /// Opens the edit form on the loaded account. Does nothing until it has loaded.
    pub fn start_edit(&mut self) -> bool {
        let Some(me) = self.me.data() else {
            debug!("Profile not loaded yet, not editing");
            return false;
        };
        self.editing = Some(ProfileForm::new(me.email.clone(), ""));
        self.errors = FieldErrors::default();
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.errors = FieldErrors::default();
    }

    pub fn form(&self) -> Option<&ProfileForm> {
        self.editing.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut ProfileForm> {
        self.editing.as_mut()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Sends the edited email and optional new password. Returns `None` when no edit is open.
    pub async fn save(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        user_port: &impl UserPort,
        u_writer: &impl UserWriter,
        prompt: &impl Prompt,
    ) -> Option<FormOutcome> {
        let form = self.editing.as_ref()?;
        let me = self.me.data()?;

        let update = match form.update() {
            Ok(update) => update,
            Err(errors) => {
                self.errors = errors.clone();
                return Some(FormOutcome::Invalid(errors));
            }
        };
        self.errors = FieldErrors::default();

        let result = user_port.update_user(me.id, &update, ext_cxn, u_writer).await;
        let outcome = settle(result, "Profile updated successfully!", prompt);
        if outcome.is_submitted() {
            self.editing = None;
        }
        Some(outcome)
    }
}
