use super::cache::EntityKind;
use super::{
    Mutation, MutationAck, ProjectRefRow, Query, UserRefRow, date_variable, deserialize_date,
    run_mutation, run_query,
};
use crate::domain::task::{Priority, Task, TaskDraft, TaskEdit, TaskScope, TaskStatus, driven_ports};
use crate::domain::task::driven_ports::{TaskReader as _, TaskWriter as _};
use crate::domain::{DrivenPortError, EntityId};
use crate::external_connections::ExternalConnectivity;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

const LIST_TASKS: Query = Query {
    name: "getTasks",
    document: "query getTasks($created: Boolean!) { tasks(created: $created) { \
        id taskName dueDate priority status \
        user { id username } createdBy { id username } project { id projectName } } }",
    reads: &[EntityKind::Task, EntityKind::User, EntityKind::Project],
};

const CREATE_TASK: Mutation = Mutation {
    name: "createTask",
    document: "mutation createTask($project: Int!, $dueDate: Date!, $taskName: String!, $user: Int!, $priority: Int!) { \
        createTask(project: $project, dueDate: $dueDate, taskName: $taskName, user: $user, priority: $priority) { success error } }",
    writes: &[EntityKind::Task, EntityKind::Stats],
};

const UPDATE_TASK: Mutation = Mutation {
    name: "updateTask",
    document: "mutation updateTask($taskId: Int!, $dueDate: Date!, $taskName: String!, $user: Int!, $priority: Int!, $status: String!) { \
        updateTask(taskId: $taskId, dueDate: $dueDate, taskName: $taskName, user: $user, priority: $priority, status: $status) { success error } }",
    writes: &[EntityKind::Task, EntityKind::Stats],
};

const UPDATE_TASK_STATUS: Mutation = Mutation {
    name: "updateTask",
    document: "mutation updateTask($taskId: Int!, $status: String!) { \
        updateTask(taskId: $taskId, status: $status) { success error } }",
    writes: &[EntityKind::Task, EntityKind::Stats],
};

const DELETE_TASK: Mutation = Mutation {
    name: "deleteTask",
    document: "mutation deleteTask($taskId: Int!) { deleteTask(taskId: $taskId) { success error } }",
    writes: &[EntityKind::Task, EntityKind::Comment, EntityKind::Stats],
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRow {
    id: EntityId,
    task_name: String,
    #[serde(deserialize_with = "deserialize_date")]
    due_date: NaiveDate,
    priority: Priority,
    status: TaskStatus,
    user: UserRefRow,
    created_by: UserRefRow,
    project: ProjectRefRow,
}

impl From<TaskRow> for Task {
    fn from(value: TaskRow) -> Self {
        Task {
            id: value.id,
            name: value.task_name,
            due_date: value.due_date,
            priority: value.priority,
            status: value.status,
            assignee: value.user.into(),
            created_by: value.created_by.into(),
            project: value.project.into(),
        }
    }
}

#[derive(Deserialize)]
struct TasksData {
    tasks: Vec<TaskRow>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskData {
    create_task: MutationAck,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTaskData {
    update_task: MutationAck,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteTaskData {
    delete_task: MutationAck,
}

pub struct RemoteTaskReader;

impl driven_ports::TaskReader for RemoteTaskReader {
    async fn tasks(
        &self,
        scope: TaskScope,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Vec<Task>, DrivenPortError> {
        let variables = json!({ "created": scope.created() });
        let data: TasksData = run_query(ext_cxn, &LIST_TASKS, variables).await?;
        Ok(data.tasks.into_iter().map(Task::from).collect())
    }
}

pub struct RemoteTaskWriter;

impl driven_ports::TaskWriter for RemoteTaskWriter {
    async fn create_task(
        &self,
        draft: &TaskDraft,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let variables = json!({
            "project": draft.project,
            "dueDate": date_variable(draft.due_date),
            "taskName": draft.name,
            "user": draft.assignee,
            "priority": draft.priority,
        });

        let data: CreateTaskData = run_mutation(ext_cxn, &CREATE_TASK, variables).await?;
        data.create_task.into_result()
    }

    async fn update_task(
        &self,
        id: EntityId,
        edit: &TaskEdit,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        // The API moves a task back to `todo` whenever an update leaves the status out
        let variables = json!({
            "taskId": id,
            "dueDate": date_variable(edit.due_date),
            "taskName": edit.name,
            "user": edit.assignee,
            "priority": edit.priority,
            "status": edit.status,
        });

        let data: UpdateTaskData = run_mutation(ext_cxn, &UPDATE_TASK, variables).await?;
        data.update_task.into_result()
    }

    async fn update_status(
        &self,
        id: EntityId,
        status: TaskStatus,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let variables = json!({ "taskId": id, "status": status });

        let data: UpdateTaskData = run_mutation(ext_cxn, &UPDATE_TASK_STATUS, variables).await?;
        data.update_task.into_result()
    }

    async fn delete_task(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let data: DeleteTaskData =
            run_mutation(ext_cxn, &DELETE_TASK, json!({ "taskId": id })).await?;
        data.delete_task.into_result()
    }
}

/// Both halves of the remote task store, for callers that read back what they write
pub struct RemoteTasks;

impl driven_ports::TaskReader for RemoteTasks {
    async fn tasks(
        &self,
        scope: TaskScope,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Vec<Task>, DrivenPortError> {
        RemoteTaskReader.tasks(scope, ext_cxn).await
    }
}

impl driven_ports::TaskWriter for RemoteTasks {
    async fn create_task(
        &self,
        draft: &TaskDraft,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        RemoteTaskWriter.create_task(draft, ext_cxn).await
    }

    async fn update_task(
        &self,
        id: EntityId,
        edit: &TaskEdit,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        RemoteTaskWriter.update_task(id, edit, ext_cxn).await
    }

    async fn update_status(
        &self,
        id: EntityId,
        status: TaskStatus,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        RemoteTaskWriter.update_status(id, status, ext_cxn).await
    }

    async fn delete_task(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        RemoteTaskWriter.delete_task(id, ext_cxn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    fn row(status: &str, priority: i64) -> serde_json::Value {
        json!({
            "tasks": [{
                "id": "8",
                "taskName": "Ship it",
                "dueDate": "2030-05-01",
                "priority": priority,
                "status": status,
                "user": { "id": "2", "username": "bo" },
                "createdBy": { "id": "1", "username": "al" },
                "project": { "id": "5", "projectName": "Launch" }
            }]
        })
    }

    #[test]
    fn task_rows_map_onto_tasks() {
        let data: TasksData = serde_json::from_value(row("doing", 4)).expect("tasks parse");
        let task = Task::from(data.tasks.into_iter().next().expect("one task"));

        assert_that!(task.status).is_equal_to(TaskStatus::Doing);
        assert_that!(task.assignee.username.as_str()).is_equal_to("bo");
        assert_that!(task.created_by.id).is_equal_to(EntityId(1));
        assert_that!(task.project.name.as_str()).is_equal_to("Launch");
        assert!(!task.can_edit());
    }

    #[test]
    fn unknown_lanes_and_priorities_are_malformed() {
        assert_that!(serde_json::from_value::<TasksData>(row("blocked", 4)).is_err()).is_true();
        assert_that!(serde_json::from_value::<TasksData>(row("todo", 0)).is_err()).is_true();
    }
}
