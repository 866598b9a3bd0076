use crate::domain::task::Task;
use crate::domain::user::UserRef;
use crate::domain::{DrivenPortError, EntityId, Error};
use crate::external_connections::ExternalConnectivity;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: EntityId,
    pub text: String,
    pub task_id: EntityId,
    pub from_user: UserRef,
    pub to_user: UserRef,
}

/// A comment about to be posted on a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub task_id: EntityId,
    pub from_user: EntityId,
    pub to_user: EntityId,
    pub text: String,
}

impl NewComment {
    /// Comments always travel from the task's creator to its assignee
    pub fn for_task(task: &Task, text: impl Into<String>) -> NewComment {
        NewComment {
            task_id: task.id,
            from_user: task.created_by.id,
            to_user: task.assignee.id,
            text: text.into(),
        }
    }
}

pub mod driven_ports {
    use super::*;

    pub trait CommentReader {
        async fn comments_for_task(
            &self,
            task_id: EntityId,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Vec<Comment>, DrivenPortError>;
    }

    pub trait CommentWriter {
        async fn create_comment(
            &self,
            comment: &NewComment,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
        async fn delete_comment(
            &self,
            id: EntityId,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait CommentPort {
        async fn get_comments(
            &self,
            task_id: EntityId,
            ext_cxn: &impl ExternalConnectivity,
            c_reader: &impl driven_ports::CommentReader,
        ) -> Result<Vec<Comment>, Error>;
        async fn post_comment(
            &self,
            comment: &NewComment,
            ext_cxn: &impl ExternalConnectivity,
            c_writer: &impl driven_ports::CommentWriter,
        ) -> Result<(), Error>;
        async fn delete_comment(
            &self,
            id: EntityId,
            ext_cxn: &impl ExternalConnectivity,
            c_writer: &impl driven_ports::CommentWriter,
        ) -> Result<(), Error>;
    }
}

pub struct CommentService {}

impl driving_ports::CommentPort for CommentService {
    async fn get_comments(
        &self,
        task_id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        c_reader: &impl driven_ports::CommentReader,
    ) -> Result<Vec<Comment>, Error> {
        let comments_result = c_reader.comments_for_task(task_id, ext_cxn).await;
        if let Err(ref port_err) = comments_result {
            error!("Could not fetch comments for task {task_id}: {port_err}");
        }

        comments_result.map_err(|err| err.into_error_trying_to("fetch comments"))
    }

    async fn post_comment(
        &self,
        comment: &NewComment,
        ext_cxn: &impl ExternalConnectivity,
        c_writer: &impl driven_ports::CommentWriter,
    ) -> Result<(), Error> {
        info!("Commenting on task {}", comment.task_id);
        c_writer
            .create_comment(comment, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("post a comment"))
    }

    async fn delete_comment(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
        c_writer: &impl driven_ports::CommentWriter,
    ) -> Result<(), Error> {
        info!("Deleting comment {id}");
        c_writer
            .delete_comment(id, ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("delete a comment"))
    }
}


#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::domain::test_util::Connectivity;
    use std::sync::RwLock;

    pub struct InMemoryCommentPersistence {
        highest_comment_id: i32,
        pub comments: Vec<Comment>,
        /// Task id of every comment query, in order
        pub fetched_tasks: Vec<EntityId>,
        pub deleted: Vec<EntityId>,
        pub connectivity: Connectivity,
    }

    impl InMemoryCommentPersistence {
        pub fn new() -> Self {
            InMemoryCommentPersistence {
                highest_comment_id: 0,
                comments: Vec::new(),
                fetched_tasks: Vec::new(),
                deleted: Vec::new(),
                connectivity: Connectivity::Connected,
            }
        }

        pub fn new_locked() -> RwLock<Self> {
            RwLock::new(Self::new())
        }
    }

    fn user_ref(id: EntityId) -> UserRef {
        UserRef {
            id,
            username: format!("user{id}"),
        }
    }

    impl driven_ports::CommentReader for RwLock<InMemoryCommentPersistence> {
        async fn comments_for_task(
            &self,
            task_id: EntityId,
            _: &impl ExternalConnectivity,
        ) -> Result<Vec<Comment>, DrivenPortError> {
            let mut persistence = self.write().expect("comment rwlock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;
            persistence.fetched_tasks.push(task_id);

            Ok(persistence
                .comments
                .iter()
                .filter(|c| c.task_id == task_id)
                .cloned()
                .collect())
        }
    }

    impl driven_ports::CommentWriter for RwLock<InMemoryCommentPersistence> {
        async fn create_comment(
            &self,
            comment: &NewComment,
            _: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError> {
            let mut persistence = self.write().expect("comment rwlock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            persistence.highest_comment_id += 1;
            let stored = Comment {
                id: EntityId(persistence.highest_comment_id),
                text: comment.text.clone(),
                task_id: comment.task_id,
                from_user: user_ref(comment.from_user),
                to_user: user_ref(comment.to_user),
            };
            persistence.comments.push(stored);
            Ok(())
        }

        async fn delete_comment(
            &self,
            id: EntityId,
            _: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError> {
            let mut persistence = self.write().expect("comment rwlock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            persistence.deleted.push(id);
            persistence.comments.retain(|c| c.id != id);
            Ok(())
        }
    }
}
