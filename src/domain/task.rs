use crate::domain::project::ProjectRef;
use crate::domain::user::UserRef;
use crate::domain::{DrivenPortError, EntityId, Error};
use crate::external_connections::ExternalConnectivity;
use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{error, info};

/// Lane tag of a task. The API only ever stores these three values.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[display("todo")]
    Todo,
    #[display("doing")]
    Doing,
    #[display("done")]
    Done,
}

#[derive(Debug, Error)]
#[error("{0:?} is not a task status")]
pub struct UnknownStatus(pub String);

impl TaskStatus {
    /// Lanes in board order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done];
}

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.to_string() == s)
            .ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("priority must be between {} and {}, got {0}", Priority::MIN, Priority::MAX)]
pub struct InvalidPriority(pub i64);

/// Importance of a task, 1 (lowest) through 5 (highest)
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Priority> {
        (Self::MIN..=Self::MAX)
            .contains(&value)
            .then_some(Priority(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Priority {
    type Error = InvalidPriority;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Priority::new)
            .ok_or(InvalidPriority(value))
    }
}

impl From<Priority> for i64 {
    fn from(value: Priority) -> Self {
        i64::from(value.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: EntityId,
    pub name: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub status: TaskStatus,
    pub assignee: UserRef,
    pub created_by: UserRef,
    pub project: ProjectRef,
}

impl Task {
    /// Only tasks someone assigned to themselves may be edited in place
    pub fn can_edit(&self) -> bool {
        self.created_by.id == self.assignee.id
    }
}

/// A new task for a project. New tasks always start in the `todo` lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub project: EntityId,
    pub name: String,
    pub due_date: NaiveDate,
    pub assignee: EntityId,
    pub priority: Priority,
}

/// Full replacement of a task's editable fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEdit {
    pub name: String,
    pub due_date: NaiveDate,
    pub assignee: EntityId,
    pub priority: Priority,
    pub status: TaskStatus,
}

impl TaskEdit {
    pub fn from_task(task: &Task) -> TaskEdit {
        TaskEdit {
            name: task.name.clone(),
            due_date: task.due_date,
            assignee: task.assignee.id,
            priority: task.priority,
            status: task.status,
        }
    }
}

/// Which of the viewer's tasks the board shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskScope {
    /// Tasks the viewer created
    Created,
    /// Tasks assigned to the viewer
    #[default]
    Assigned,
}

impl TaskScope {
    /// Value of the `created` filter variable of the `tasks` query
    pub fn created(&self) -> bool {
        matches!(self, Self::Created)
    }

    pub fn toggled(&self) -> TaskScope {
        match self {
            Self::Created => Self::Assigned,
            Self::Assigned => Self::Created,
        }
    }
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader {
        async fn tasks(
            &self,
            scope: TaskScope,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Vec<Task>, DrivenPortError>;
    }

    pub trait TaskWriter {
        async fn create_task(
            &self,
            draft: &TaskDraft,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
        async fn update_task(
            &self,
            id: EntityId,
            edit: &TaskEdit,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
        /// Moves a task to another lane without touching its other fields
        async fn update_status(
            &self,
            id: EntityId,
            status: TaskStatus,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
        async fn delete_task(
            &self,
            id: EntityId,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait TaskPort {
        async fn get_tasks(
            &self,
            scope: TaskScope,
            ext_cxn: &impl ExternalConnectivity,
            t_reader: &impl driven_ports::TaskReader,
        ) -> Result<Vec<Task>, Error>;
        async fn create_task(
            &self,
            draft: &TaskDraft,
            ext_cxn: &impl ExternalConnectivity,
            t_writer: &impl driven_ports::TaskWriter,
        ) -> Result<(), Error>;
        async fn update_task(
            &self,
            id: EntityId,
            edit: &TaskEdit,
            ext_cxn: &impl ExternalConnectivity,
            t_writer: &impl driven_ports::TaskWriter,
        ) -> Result<(), Error>;
        async fn move_task(
            &self,
            id: EntityId,
            status: TaskStatus,
            ext_cxn: &impl ExternalConnectivity,
            t_writer: &impl driven_ports::TaskWriter,
        ) -> Result<(), Error>;
        async fn delete_task(
            &self,
            id: EntityId,
            ext_cxn: &impl ExternalConnectivity,
            t_writer: &impl driven_ports::TaskWriter,
        ) -> Result<(), Error>;
    }
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn get_tasks(
        &self,
        scope: TaskScope,
        ext_cxn: &impl ExternalConnectivity,
        t_reader: &impl driven_ports::TaskReader,
    ) -> Result<Vec<Task>, Error> {
        let tasks_result = t_reader.tasks(scope, ext_cxn).await;
        if let Err(ref port_err) = tasks_result {
            error!("Could not fetch {scope:?} tasks: {port_err}");
        }

        tasks_result.map_err(|err| err.into_error_trying_to("fetch tasks"))
    }

    async fn create_task(
        &self,
        draft: &TaskDraft,
        ext_cxn: &impl ExternalConnectivity,
        t_writer: &impl driven_ports::TaskWriter,
    ) -> Result<(), Error> {
        info!(project = %draft.project, "Creating task {}", draft.name);
        t_writer
            .create_task(draft, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("create a task"))
    }

    async fn update_task(
        &self,
        id: EntityId,
        edit: &TaskEdit,
        ext_cxn: &impl ExternalConnectivity,
        t_writer: &impl driven_ports::TaskWriter,
    ) -> Result<(), Error> {
        info!("Updating task {id}");
        t_writer
            .update_task(id, edit, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("update a task"))
    }

    async fn move_task(
        &self,
        id: EntityId,
        status: TaskStatus,
        ext_cxn: &impl ExternalConnectivity,
        t_writer: &impl driven_ports::TaskWriter,
    ) -> Result<(), Error> {
        info!("Moving task {id} to {status}");
        t_writer
            .update_status(id, status, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("move a task"))
    }

    async fn delete_task(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        t_writer: &impl driven_ports::TaskWriter,
    ) -> Result<(), Error> {
        info!("Deleting task {id}");
        t_writer
            .delete_task(id, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("delete a task"))
    }
}
