//! Create/edit dialogs. Each one is opened either empty (create) or from an existing entity
//! (update) and picks the matching mutation on submit.

use super::{Notification, Prompt, QuerySlot, ViewState};
use crate::domain::EntityId;
use crate::domain::project::{Project, driven_ports::ProjectWriter, driving_ports::ProjectPort};
use crate::domain::task::{Task, TaskStatus, driven_ports::TaskWriter, driving_ports::TaskPort};
use crate::domain::user::{User, driven_ports::UserReader, driven_ports::UserWriter, driving_ports::UserPort};
use crate::dto::FieldErrors;
use crate::dto::project::ProjectForm;
use crate::dto::task::TaskForm;
use crate::dto::user::{NewUserForm, UserUpdateForm};
use crate::external_connections::ExternalConnectivity;
use tracing::debug;

/// Result of submitting a dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Nothing was sent; the field messages are on the dialog
    Invalid(FieldErrors),
    /// The mutation succeeded. The owner closes the dialog and re-fetches.
    Submitted,
    /// The mutation failed and the dialog stays open
    Failed(String),
}

impl FormOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}

/// Reports a mutation's result through the prompt and turns it into a [FormOutcome]
pub(super) fn settle(
    result: Result<(), crate::domain::Error>,
    success: &str,
    prompt: &impl Prompt,
) -> FormOutcome {
    match result {
        Ok(()) => {
            prompt.notify(&Notification::success(success));
            FormOutcome::Submitted
        }
        Err(err) => {
            let notification = Notification::failure("There was an issue", &err);
            prompt.notify(&notification);
            FormOutcome::Failed(notification.message)
        }
    }
}

#[derive(Clone, Default)]
pub enum UserTarget {
    #[default]
    New,
    Existing(EntityId),
}

/// Admin dialog for creating or editing an account
#[derive(Clone, Default)]
pub struct UserModal {
    target: UserTarget,
    pub new_user: NewUserForm,
    pub update: UserUpdateForm,
    errors: FieldErrors,
}

impl UserModal {
    pub fn create() -> UserModal {
        UserModal {
            new_user: NewUserForm {
                role: "normal".to_owned(),
                ..NewUserForm::default()
            },
            ..UserModal::default()
        }
    }

    pub fn edit(user: &User) -> UserModal {
        UserModal {
            target: UserTarget::Existing(user.id),
            update: UserUpdateForm::from_user(user),
            ..UserModal::default()
        }
    }

    pub fn editing(&self) -> Option<EntityId> {
        match self.target {
            UserTarget::New => None,
            UserTarget::Existing(id) => Some(id),
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub async fn submit(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        user_port: &impl UserPort,
        u_writer: &impl UserWriter,
        prompt: &impl Prompt,
    ) -> FormOutcome {
        let result = match self.target {
            UserTarget::New => match self.new_user.new_user() {
                Ok(new_user) => {
                    self.errors = FieldErrors::default();
                    settle(
                        user_port.create_user(&new_user, ext_cxn, u_writer).await,
                        "User created successfully!",
                        prompt,
                    )
                }
                Err(errors) => FormOutcome::Invalid(errors),
            },
            UserTarget::Existing(id) => match self.update.update() {
                Ok(update) => {
                    self.errors = FieldErrors::default();
                    settle(
                        user_port.update_user(id, &update, ext_cxn, u_writer).await,
                        "User updated successfully!",
                        prompt,
                    )
                }
                Err(errors) => FormOutcome::Invalid(errors),
            },
        };

        if let FormOutcome::Invalid(ref errors) = result {
            debug!("User form rejected: {errors}");
            self.errors = errors.clone();
        }
        result
    }
}

/// Admin dialog for creating or editing a project
#[derive(Debug, Clone, Default)]
pub struct ProjectModal {
    editing: Option<EntityId>,
    pub form: ProjectForm,
    errors: FieldErrors,
}

impl ProjectModal {
    pub fn create() -> ProjectModal {
        ProjectModal::default()
    }

    pub fn edit(project: &Project) -> ProjectModal {
        ProjectModal {
            editing: Some(project.id),
            form: ProjectForm::from_project(project),
            errors: FieldErrors::default(),
        }
    }

    pub fn editing(&self) -> Option<EntityId> {
        self.editing
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub async fn submit(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        project_port: &impl ProjectPort,
        p_writer: &impl ProjectWriter,
        prompt: &impl Prompt,
    ) -> FormOutcome {
        let draft = match self.form.draft() {
            Ok(draft) => draft,
            Err(errors) => {
                self.errors = errors.clone();
                return FormOutcome::Invalid(errors);
            }
        };
        self.errors = FieldErrors::default();

        match self.editing {
            None => settle(
                project_port.create_project(&draft, ext_cxn, p_writer).await,
                "Project created successfully",
                prompt,
            ),
            Some(id) => settle(
                project_port.update_project(id, &draft, ext_cxn, p_writer).await,
                "Project updated successfully",
                prompt,
            ),
        }
    }
}

/// Dialog for creating a task inside a project or editing one from the board. It lists every
/// user as a possible assignee, so the user list has to load first.
#[derive(Debug, Clone)]
pub struct TaskModal {
    project: EntityId,
    /// Task being edited and the lane it sits in
    editing: Option<(EntityId, TaskStatus)>,
    pub form: TaskForm,
    assignees: QuerySlot<Vec<User>>,
    errors: FieldErrors,
}

impl TaskModal {
    pub fn create(project: EntityId) -> TaskModal {
        TaskModal {
            project,
            editing: None,
            form: TaskForm::default(),
            assignees: QuerySlot::new(),
            errors: FieldErrors::default(),
        }
    }

    pub fn edit(task: &Task) -> TaskModal {
        TaskModal {
            editing: Some((task.id, task.status)),
            form: TaskForm::from_task(task),
            ..TaskModal::create(task.project.id)
        }
    }

    pub fn project(&self) -> EntityId {
        self.project
    }

    pub fn editing(&self) -> Option<EntityId> {
        self.editing.map(|(id, _)| id)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub async fn load_assignees(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        user_port: &impl UserPort,
        u_reader: &impl UserReader,
    ) {
        let ticket = self.assignees.begin();
        let users = user_port.get_users(ext_cxn, u_reader).await;
        self.assignees.finish(ticket, users);
    }

    pub fn assignees(&self) -> ViewState<&Vec<User>> {
        self.assignees.state()
    }

    pub async fn submit(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        task_port: &impl TaskPort,
        t_writer: &impl TaskWriter,
        prompt: &impl Prompt,
    ) -> FormOutcome {
        let outcome = match self.editing {
            None => match self.form.draft(self.project) {
                Ok(draft) => settle(
                    task_port.create_task(&draft, ext_cxn, t_writer).await,
                    "Your task has been created.",
                    prompt,
                ),
                Err(errors) => FormOutcome::Invalid(errors),
            },
            Some((id, status)) => match self.form.edit(status) {
                Ok(edit) => settle(
                    task_port.update_task(id, &edit, ext_cxn, t_writer).await,
                    "Your task has been updated.",
                    prompt,
                ),
                Err(errors) => FormOutcome::Invalid(errors),
            },
        };

        self.errors = match outcome {
            FormOutcome::Invalid(ref errors) => errors.clone(),
            _ => FieldErrors::default(),
        };
        outcome
    }
}
