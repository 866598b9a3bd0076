use crate::domain::{DrivenPortError, EntityId, Error};
use crate::external_connections::ExternalConnectivity;
use chrono::NaiveDate;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    pub due_date: NaiveDate,
}

/// The slice of a project embedded in tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: EntityId,
    pub name: String,
}

/// Content of the project form, used both to create and to update a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub due_date: NaiveDate,
}

pub mod driven_ports {
    use super::*;

    pub trait ProjectReader {
        async fn all_projects(
            &self,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Vec<Project>, DrivenPortError>;
    }

    pub trait ProjectWriter {
        async fn create_project(
            &self,
            draft: &ProjectDraft,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
        async fn update_project(
            &self,
            id: EntityId,
            draft: &ProjectDraft,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
        async fn delete_project(
            &self,
            id: EntityId,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait ProjectPort {
        async fn get_projects(
            &self,
            ext_cxn: &impl ExternalConnectivity,
            p_reader: &impl driven_ports::ProjectReader,
        ) -> Result<Vec<Project>, Error>;
        async fn create_project(
            &self,
            draft: &ProjectDraft,
            ext_cxn: &impl ExternalConnectivity,
            p_writer: &impl driven_ports::ProjectWriter,
        ) -> Result<(), Error>;
        async fn update_project(
            &self,
            id: EntityId,
            draft: &ProjectDraft,
            ext_cxn: &impl ExternalConnectivity,
            p_writer: &impl driven_ports::ProjectWriter,
        ) -> Result<(), Error>;
        async fn delete_project(
            &self,
            id: EntityId,
            ext_cxn: &impl ExternalConnectivity,
            p_writer: &impl driven_ports::ProjectWriter,
        ) -> Result<(), Error>;
    }
}

pub struct ProjectService {}

impl driving_ports::ProjectPort for ProjectService {
    async fn get_projects(
        &self,
        ext_cxn: &impl ExternalConnectivity,
        p_reader: &impl driven_ports::ProjectReader,
    ) -> Result<Vec<Project>, Error> {
        let projects_result = p_reader.all_projects(ext_cxn).await;
        if let Err(ref port_err) = projects_result {
            error!("Project fetch failure: {port_err}");
        }

        projects_result.map_err(|err| err.into_error_trying_to("fetch projects"))
    }

    async fn create_project(
        &self,
        draft: &ProjectDraft,
        ext_cxn: &impl ExternalConnectivity,
        p_writer: &impl driven_ports::ProjectWriter,
    ) -> Result<(), Error> {
        info!("Creating project {}", draft.name);
        p_writer
            .create_project(draft, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("create a project"))
    }

    async fn update_project(
        &self,
        id: EntityId,
        draft: &ProjectDraft,
        ext_cxn: &impl ExternalConnectivity,
        p_writer: &impl driven_ports::ProjectWriter,
    ) -> Result<(), Error> {
        info!("Updating project {id}");
        p_writer
            .update_project(id, draft, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("update a project"))
    }

    async fn delete_project(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        p_writer: &impl driven_ports::ProjectWriter,
    ) -> Result<(), Error> {
        info!("Deleting project {id}");
        p_writer
            .delete_project(id, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("delete a project"))
    }
}
