use super::{Confirmation, Notification, Prompt, QuerySlot, ViewState};
use crate::domain::EntityId;
use crate::domain::comment::{
    Comment,
    driven_ports::{CommentReader, CommentWriter},
    driving_ports::CommentPort,
};
use crate::domain::task::Task;
use crate::dto::FieldErrors;
use crate::dto::comment::CommentForm;
use crate::external_connections::ExternalConnectivity;
use tracing::{debug, info};

pub const NO_COMMENTS: &str = "No comments yet for this task.";

/// What the panel under a task card shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelContent<'a> {
    Collapsed,
    Loading,
    Empty(&'static str),
    Comments(&'a [Comment]),
    Failed(String),
}

/// The board's single comment panel. At most one task is expanded at a time, and only that
/// task's comments are ever loaded.
#[derive(Debug, Default)]
pub struct CommentPanel {
    expanded: Option<EntityId>,
    comments: QuerySlot<Vec<Comment>>,
    pub draft: CommentForm,
    errors: FieldErrors,
}

impl CommentPanel {
    pub fn new() -> CommentPanel {
        CommentPanel::default()
    }

    pub fn expanded(&self) -> Option<EntityId> {
        self.expanded
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn content_for(&self, task_id: EntityId) -> PanelContent<'_> {
        if self.expanded != Some(task_id) {
            return PanelContent::Collapsed;
        }

        match self.comments.state() {
            ViewState::Loading => PanelContent::Loading,
            ViewState::Failed(message) => PanelContent::Failed(message),
            ViewState::Ready(comments) if comments.is_empty() => PanelContent::Empty(NO_COMMENTS),
            ViewState::Ready(comments) => PanelContent::Comments(comments),
        }
    }

    /// Expands the panel for a task, or collapses it when that task is already expanded.
    /// Expanding another task moves the panel there and starts with an empty draft.
    pub async fn toggle(
        &mut self,
        task_id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        comment_port: &impl CommentPort,
        c_reader: &impl CommentReader,
    ) {
        self.comments.reset();
        self.draft = CommentForm::default();
        self.errors = FieldErrors::default();

        if self.expanded == Some(task_id) {
            debug!("Collapsing comments of task {task_id}");
            self.expanded = None;
            return;
        }

        self.expanded = Some(task_id);
        self.load(task_id, ext_cxn, comment_port, c_reader).await;
    }

    /// Closes the panel without loading anything
    pub fn collapse(&mut self) {
        self.expanded = None;
        self.comments.reset();
    }

    async fn load(
        &mut self,
        task_id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        comment_port: &impl CommentPort,
        c_reader: &impl CommentReader,
    ) {
        let ticket = self.comments.begin();
        let comments = comment_port.get_comments(task_id, ext_cxn, c_reader).await;
        self.comments.finish(ticket, comments);
    }

    /// Posts the draft on the expanded task, from its creator to its assignee. Returns whether
    /// the comment was posted.
    pub async fn submit(
        &mut self,
        task: &Task,
        ext_cxn: &impl ExternalConnectivity,
        comment_port: &impl CommentPort,
        c_persistence: &(impl CommentReader + CommentWriter),
        prompt: &impl Prompt,
    ) -> bool {
        if self.expanded != Some(task.id) {
            debug!("Comment panel is not open on task {}", task.id);
            return false;
        }
        let comment = match self.draft.new_comment(task) {
            Ok(comment) => comment,
            Err(errors) => {
                self.errors = errors;
                return false;
            }
        };
        self.errors = FieldErrors::default();

        match comment_port.post_comment(&comment, ext_cxn, c_persistence).await {
            Ok(()) => {
                self.draft = CommentForm::default();
                self.load(task.id, &ext_cxn.for_refetch(), comment_port, c_persistence)
                    .await;
                true
            }
            Err(err) => {
                prompt.notify(&Notification::failure("There was an issue", &err));
                false
            }
        }
    }

    /// Deletes a comment of the expanded task after confirmation
    pub async fn delete(
        &mut self,
        comment_id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        comment_port: &impl CommentPort,
        c_persistence: &(impl CommentReader + CommentWriter),
        prompt: &impl Prompt,
    ) -> bool {
        let Some(task_id) = self.expanded else {
            return false;
        };
        if !prompt.confirm(&Confirmation::destructive("You won't be able to revert this!")) {
            info!("Kept comment {comment_id}");
            return false;
        }

        match comment_port
            .delete_comment(comment_id, ext_cxn, c_persistence)
            .await
        {
            Ok(()) => {
                self.load(task_id, &ext_cxn.for_refetch(), comment_port, c_persistence)
                    .await;
                true
            }
            Err(err) => {
                prompt.notify(&Notification::failure(
                    "There was an error deleting the comment",
                    &err,
                ));
                false
            }
        }
    }
}
