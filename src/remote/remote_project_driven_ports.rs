use super::cache::EntityKind;
use super::{Mutation, MutationAck, Query, date_variable, deserialize_date, run_mutation, run_query};
use crate::domain::project::{Project, ProjectDraft, driven_ports};
use crate::domain::project::driven_ports::{ProjectReader as _, ProjectWriter as _};
use crate::domain::{DrivenPortError, EntityId};
use crate::external_connections::ExternalConnectivity;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

const LIST_PROJECTS: Query = Query {
    name: "getProjects",
    document: "query getProjects { projects { id projectName dueDate } }",
    reads: &[EntityKind::Project],
};

const CREATE_PROJECT: Mutation = Mutation {
    name: "createProject",
    document: "mutation createProject($projectName: String!, $dueDate: Date!) { \
        createProject(projectName: $projectName, dueDate: $dueDate) { success error } }",
    writes: &[EntityKind::Project],
};

const UPDATE_PROJECT: Mutation = Mutation {
    name: "updateProject",
    document: "mutation updateProject($projectId: Int!, $projectName: String!, $dueDate: Date!) { \
        updateProject(projectId: $projectId, projectName: $projectName, dueDate: $dueDate) { success error } }",
    writes: &[EntityKind::Project, EntityKind::Task, EntityKind::Stats],
};

const DELETE_PROJECT: Mutation = Mutation {
    name: "deleteProject",
    document: "mutation deleteProject($projectId: Int!) { deleteProject(projectId: $projectId) { success error } }",
    writes: &[
        EntityKind::Project,
        EntityKind::Task,
        EntityKind::Comment,
        EntityKind::Stats,
    ],
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRow {
    id: EntityId,
    project_name: String,
    #[serde(deserialize_with = "deserialize_date")]
    due_date: NaiveDate,
}

impl From<ProjectRow> for Project {
    fn from(value: ProjectRow) -> Self {
        Project {
            id: value.id,
            name: value.project_name,
            due_date: value.due_date,
        }
    }
}

#[derive(Deserialize)]
struct ProjectsData {
    projects: Vec<ProjectRow>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectData {
    create_project: MutationAck,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProjectData {
    update_project: MutationAck,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteProjectData {
    delete_project: MutationAck,
}

pub struct RemoteProjectReader;

impl driven_ports::ProjectReader for RemoteProjectReader {
    async fn all_projects(
        &self,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Vec<Project>, DrivenPortError> {
        let data: ProjectsData = run_query(ext_cxn, &LIST_PROJECTS, json!({})).await?;
        Ok(data.projects.into_iter().map(Project::from).collect())
    }
}

pub struct RemoteProjectWriter;

impl driven_ports::ProjectWriter for RemoteProjectWriter {
    async fn create_project(
        &self,
        draft: &ProjectDraft,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let variables = json!({
            "projectName": draft.name,
            "dueDate": date_variable(draft.due_date),
        });

        let data: CreateProjectData = run_mutation(ext_cxn, &CREATE_PROJECT, variables).await?;
        data.create_project.into_result()
    }

    async fn update_project(
        &self,
        id: EntityId,
        draft: &ProjectDraft,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let variables = json!({
            "projectId": id,
            "projectName": draft.name,
            "dueDate": date_variable(draft.due_date),
        });

        let data: UpdateProjectData = run_mutation(ext_cxn, &UPDATE_PROJECT, variables).await?;
        data.update_project.into_result()
    }

    async fn delete_project(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let data: DeleteProjectData =
            run_mutation(ext_cxn, &DELETE_PROJECT, json!({ "projectId": id })).await?;
        data.delete_project.into_result()
    }
}

/// Both halves of the remote project store
pub struct RemoteProjects;

impl driven_ports::ProjectReader for RemoteProjects {
    async fn all_projects(
        &self,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Vec<Project>, DrivenPortError> {
        RemoteProjectReader.all_projects(ext_cxn).await
    }
}

impl driven_ports::ProjectWriter for RemoteProjects {
    async fn create_project(
        &self,
        draft: &ProjectDraft,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        RemoteProjectWriter.create_project(draft, ext_cxn).await
    }

    async fn update_project(
        &self,
        id: EntityId,
        draft: &ProjectDraft,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        RemoteProjectWriter.update_project(id, draft, ext_cxn).await
    }

    async fn delete_project(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        RemoteProjectWriter.delete_project(id, ext_cxn).await
    }
}
