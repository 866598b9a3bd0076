use super::modal::{FormOutcome, ProjectModal, TaskModal};
use super::{Confirmation, Notification, Prompt, QuerySlot, ViewState};
use crate::domain::EntityId;
use crate::domain::project::{
    Project,
    driven_ports::{ProjectReader, ProjectWriter},
    driving_ports::ProjectPort,
};
use crate::domain::session::Session;
use crate::domain::task::{driven_ports::TaskWriter, driving_ports::TaskPort};
use crate::domain::user::{driven_ports::UserReader, driving_ports::UserPort};
use crate::external_connections::ExternalConnectivity;
use tracing::{info, warn};

/// Buttons on a project card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectControls {
    pub edit: bool,
    pub delete: bool,
    pub create_task: bool,
}

/// Project cards. Only admins manage projects; everyone may add tasks to one.
#[derive(Default)]
pub struct ProjectsView {
    is_admin: bool,
    projects: QuerySlot<Vec<Project>>,
    project_modal: Option<ProjectModal>,
    task_modal: Option<TaskModal>,
}

impl ProjectsView {
    pub fn new(session: &Session) -> ProjectsView {
        ProjectsView {
            is_admin: session.is_admin(),
            ..ProjectsView::default()
        }
    }

    pub fn projects(&self) -> ViewState<&Vec<Project>> {
        self.projects.state()
    }

    pub fn can_add(&self) -> bool {
        self.is_admin
    }

    pub fn controls(&self) -> ProjectControls {
        ProjectControls {
            edit: self.is_admin,
            delete: self.is_admin,
            create_task: true,
        }
    }

    pub fn project_modal(&self) -> Option<&ProjectModal> {
        self.project_modal.as_ref()
    }

    pub fn project_modal_mut(&mut self) -> Option<&mut ProjectModal> {
        self.project_modal.as_mut()
    }

    pub fn task_modal(&self) -> Option<&TaskModal> {
        self.task_modal.as_ref()
    }

    pub fn task_modal_mut(&mut self) -> Option<&mut TaskModal> {
        self.task_modal.as_mut()
    }

    pub async fn load(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        project_port: &impl ProjectPort,
        p_reader: &impl ProjectReader,
    ) {
        let ticket = self.projects.begin();
        let projects = project_port.get_projects(ext_cxn, p_reader).await;
        self.projects.finish(ticket, projects);
    }

    pub fn open_create(&mut self) -> bool {
        if self.is_admin {
            self.project_modal = Some(ProjectModal::create());
        }
        self.project_modal.is_some()
    }

    pub fn open_edit(&mut self, id: EntityId) -> bool {
        if !self.is_admin {
            return false;
        }
        let project = self
            .projects
            .data()
            .and_then(|projects| projects.iter().find(|project| project.id == id));
        self.project_modal = project.map(ProjectModal::edit);
        self.project_modal.is_some()
    }

    pub async fn submit_project_modal(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        project_port: &impl ProjectPort,
        p_persistence: &(impl ProjectReader + ProjectWriter),
        prompt: &impl Prompt,
    ) -> Option<FormOutcome> {
        let modal = self.project_modal.as_mut()?;
        let outcome = modal.submit(ext_cxn, project_port, p_persistence, prompt).await;
        if outcome.is_submitted() {
            self.project_modal = None;
            self.load(&ext_cxn.for_refetch(), project_port, p_persistence)
                .await;
        }
        Some(outcome)
    }

    /// Opens the task dialog for a project and loads its assignee choices
    pub async fn open_task_modal(
        &mut self,
        project: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        user_port: &impl UserPort,
        u_reader: &impl UserReader,
    ) {
        let mut modal = TaskModal::create(project);
        modal.load_assignees(ext_cxn, user_port, u_reader).await;
        self.task_modal = Some(modal);
    }

    pub async fn submit_task_modal(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        task_port: &impl TaskPort,
        t_writer: &impl TaskWriter,
        prompt: &impl Prompt,
    ) -> Option<FormOutcome> {
        let modal = self.task_modal.as_mut()?;
        let outcome = modal.submit(ext_cxn, task_port, t_writer, prompt).await;
        if outcome.is_submitted() {
            self.task_modal = None;
        }
        Some(outcome)
    }

    pub fn close_modals(&mut self) {
        self.project_modal = None;
        self.task_modal = None;
    }

    /// Deletes a project after confirmation. Returns whether it was deleted.
    pub async fn delete(
        &mut self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        project_port: &impl ProjectPort,
        p_persistence: &(impl ProjectReader + ProjectWriter),
        prompt: &impl Prompt,
    ) -> bool {
        if !self.is_admin {
            warn!("Only admins can delete projects");
            return false;
        }
        if !prompt.confirm(&Confirmation::destructive("This will permanently delete the project.")) {
            info!("Kept project {id}");
            return false;
        }

        match project_port.delete_project(id, ext_cxn, p_persistence).await {
            Ok(()) => {
                prompt.notify(&Notification::deleted("Your project has been deleted."));
                self.load(&ext_cxn.for_refetch(), project_port, p_persistence)
                    .await;
                true
            }
            Err(err) => {
                prompt.notify(&Notification::failure(
                    "There was an error deleting your project",
                    &err,
                ));
                false
            }
        }
    }
}
