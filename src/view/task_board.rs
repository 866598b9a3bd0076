use super::comments::CommentPanel;
use super::modal::{FormOutcome, TaskModal};
use super::{Confirmation, Notification, Prompt, QuerySlot, QueryTicket, ViewState};
use crate::domain::{EntityId, Error};
use crate::domain::board::{Board, BoardController, CardActions, DragEnd, DragOutcome};
use crate::domain::comment::{
    driven_ports::{CommentReader, CommentWriter},
    driving_ports::CommentPort,
};
use crate::domain::task::{
    Task, TaskScope,
    driven_ports::{TaskReader, TaskWriter},
    driving_ports::TaskPort,
};
use crate::domain::user::{driven_ports::UserReader, driving_ports::UserPort};
use crate::external_connections::ExternalConnectivity;
use tracing::{info, warn};

/// The kanban board: three lanes of the viewer's tasks, the edit dialog and the comment panel
#[derive(Default)]
pub struct TaskBoardView {
    controller: BoardController,
    board: QuerySlot<Board>,
    modal: Option<TaskModal>,
    pub comments: CommentPanel,
}

impl TaskBoardView {
    pub fn new(scope: TaskScope) -> TaskBoardView {
        TaskBoardView {
            controller: BoardController::new(scope),
            ..TaskBoardView::default()
        }
    }

    pub fn scope(&self) -> TaskScope {
        self.controller.scope()
    }

    pub fn board(&self) -> ViewState<&Board> {
        self.board.state()
    }

    pub fn modal(&self) -> Option<&TaskModal> {
        self.modal.as_ref()
    }

    pub fn modal_mut(&mut self) -> Option<&mut TaskModal> {
        self.modal.as_mut()
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    fn find(&self, task_id: EntityId) -> Option<&Task> {
        self.board.data().and_then(|board| board.find(task_id))
    }

    pub fn card_actions(&self, task_id: EntityId) -> Option<CardActions> {
        self.find(task_id).map(CardActions::for_task)
    }

    pub async fn load(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        task_port: &impl TaskPort,
        t_reader: &impl TaskReader,
    ) {
        let (ticket, controller) = self.begin_load();
        let board = controller.load(ext_cxn, task_port, t_reader).await;
        self.complete_load(ticket, board);
    }

    /// Starts a board load for callers that run the fetch without holding the view, such as a
    /// UI that keeps taking input while the request is out. Fetch with the returned controller
    /// and hand the answer to [TaskBoardView::complete_load].
    pub fn begin_load(&mut self) -> (QueryTicket, BoardController) {
        (self.board.begin(), self.controller)
    }

    /// Shows a fetched board unless a later load was started after `ticket`. Returns whether
    /// the board was kept.
    pub fn complete_load(&mut self, ticket: QueryTicket, board: Result<Board, Error>) -> bool {
        self.board.finish(ticket, board)
    }

    /// Switches between "my tasks" and "assigned to me" and loads the new scope
    pub async fn set_scope(
        &mut self,
        scope: TaskScope,
        ext_cxn: &impl ExternalConnectivity,
        task_port: &impl TaskPort,
        t_reader: &impl TaskReader,
    ) {
        if scope == self.controller.scope() {
            return;
        }
        self.controller.set_scope(scope);
        self.comments.collapse();
        self.load(ext_cxn, task_port, t_reader).await;
    }

    pub async fn toggle_scope(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        task_port: &impl TaskPort,
        t_reader: &impl TaskReader,
    ) {
        let scope = self.controller.scope().toggled();
        self.set_scope(scope, ext_cxn, task_port, t_reader).await;
    }

    /// Handles a finished drag given the raw ids reported by the drag-and-drop layer
    pub async fn drag_end(
        &mut self,
        draggable_id: &str,
        source: &str,
        destination: Option<&str>,
        ext_cxn: &impl ExternalConnectivity,
        task_port: &impl TaskPort,
        t_persistence: &(impl TaskReader + TaskWriter),
        prompt: &impl Prompt,
    ) {
        let drag = match DragEnd::parse(draggable_id, source, destination) {
            Ok(drag) => drag,
            Err(err) => {
                warn!("Ignoring a drop the board cannot read: {err}");
                return;
            }
        };

        match self
            .controller
            .drag_end(&drag, ext_cxn, task_port, t_persistence)
            .await
        {
            Ok(DragOutcome::Moved(board)) => self.board.fill(board),
            Ok(DragOutcome::Ignored(_)) => {}
            Err(err) => prompt.notify(&Notification::failure(
                "There was an error updating your task",
                &err,
            )),
        }
    }

    /// Opens the edit dialog for a task the viewer may edit
    pub async fn open_edit(
        &mut self,
        task_id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        user_port: &impl UserPort,
        u_reader: &impl UserReader,
    ) -> bool {
        let Some(task) = self.find(task_id).filter(|task| task.can_edit()) else {
            info!("Task {task_id} cannot be edited from the board");
            return false;
        };

        let mut modal = TaskModal::edit(task);
        modal.load_assignees(ext_cxn, user_port, u_reader).await;
        self.modal = Some(modal);
        true
    }

    pub async fn submit_modal(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        task_port: &impl TaskPort,
        t_persistence: &(impl TaskReader + TaskWriter),
        prompt: &impl Prompt,
    ) -> Option<FormOutcome> {
        let modal = self.modal.as_mut()?;
        let outcome = modal.submit(ext_cxn, task_port, t_persistence, prompt).await;

        if outcome.is_submitted() {
            self.modal = None;
            self.load(&ext_cxn.for_refetch(), task_port, t_persistence)
                .await;
        }
        Some(outcome)
    }

    pub async fn delete_task(
        &mut self,
        task_id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        task_port: &impl TaskPort,
        t_persistence: &(impl TaskReader + TaskWriter),
        prompt: &impl Prompt,
    ) -> bool {
        if !prompt.confirm(&Confirmation::destructive("You won't be able to revert this!")) {
            info!("Kept task {task_id}");
            return false;
        }

        if let Err(err) = task_port.delete_task(task_id, ext_cxn, t_persistence).await {
            prompt.notify(&Notification::failure(
                "There was an error deleting your task",
                &err,
            ));
            return false;
        }

        prompt.notify(&Notification::deleted("Your task has been deleted."));
        if self.comments.expanded() == Some(task_id) {
            self.comments.collapse();
        }
        self.load(&ext_cxn.for_refetch(), task_port, t_persistence)
            .await;
        true
    }

    pub async fn toggle_comments(
        &mut self,
        task_id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        comment_port: &impl CommentPort,
        c_reader: &impl CommentReader,
    ) {
        self.comments
            .toggle(task_id, ext_cxn, comment_port, c_reader)
            .await;
    }

    /// Posts the comment draft on the task whose panel is open
    pub async fn submit_comment(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        comment_port: &impl CommentPort,
        c_persistence: &(impl CommentReader + CommentWriter),
        prompt: &impl Prompt,
    ) -> bool {
        let Some(task) = self
            .comments
            .expanded()
            .and_then(|task_id| self.find(task_id))
            .cloned()
        else {
            return false;
        };

        self.comments
            .submit(&task, ext_cxn, comment_port, c_persistence, prompt)
            .await
    }
}
