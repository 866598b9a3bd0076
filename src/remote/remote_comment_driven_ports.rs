use super::cache::EntityKind;
use super::{Mutation, MutationAck, Query, UserRefRow, run_mutation, run_query};
use crate::domain::comment::{Comment, NewComment, driven_ports};
use crate::domain::comment::driven_ports::{CommentReader as _, CommentWriter as _};
use crate::domain::{DrivenPortError, EntityId};
use crate::external_connections::ExternalConnectivity;
use serde::Deserialize;
use serde_json::json;

const COMMENTS_FOR_TASK: Query = Query {
    name: "getComments",
    document: "query getComments($taskId: Int!) { comments(taskId: $taskId) { \
        id comment fromUser { id username } toUser { id username } } }",
    reads: &[EntityKind::Comment, EntityKind::User],
};

const CREATE_COMMENT: Mutation = Mutation {
    name: "createComment",
    document: "mutation createComment($task: Int!, $fromUser: Int!, $toUser: Int!, $comment: String!) { \
        createComment(task: $task, fromUser: $fromUser, toUser: $toUser, comment: $comment) { success error } }",
    writes: &[EntityKind::Comment],
};

const DELETE_COMMENT: Mutation = Mutation {
    name: "deleteComment",
    document: "mutation deleteComment($commentId: Int!) { deleteComment(commentId: $commentId) { success error } }",
    writes: &[EntityKind::Comment],
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentRow {
    id: EntityId,
    /// The API stores blank comments as null
    comment: Option<String>,
    from_user: UserRefRow,
    to_user: UserRefRow,
}

impl CommentRow {
    fn into_comment(self, task_id: EntityId) -> Comment {
        Comment {
            id: self.id,
            text: self.comment.unwrap_or_default(),
            task_id,
            from_user: self.from_user.into(),
            to_user: self.to_user.into(),
        }
    }
}

#[derive(Deserialize)]
struct CommentsData {
    comments: Vec<CommentRow>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentData {
    create_comment: MutationAck,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteCommentData {
    delete_comment: MutationAck,
}

pub struct RemoteCommentReader;

impl driven_ports::CommentReader for RemoteCommentReader {
    async fn comments_for_task(
        &self,
        task_id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Vec<Comment>, DrivenPortError> {
        let data: CommentsData =
            run_query(ext_cxn, &COMMENTS_FOR_TASK, json!({ "taskId": task_id })).await?;

        Ok(data
            .comments
            .into_iter()
            .map(|row| row.into_comment(task_id))
            .collect())
    }
}

pub struct RemoteCommentWriter;

impl driven_ports::CommentWriter for RemoteCommentWriter {
    async fn create_comment(
        &self,
        comment: &NewComment,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let variables = json!({
            "task": comment.task_id,
            "fromUser": comment.from_user,
            "toUser": comment.to_user,
            "comment": comment.text,
        });

        let data: CreateCommentData = run_mutation(ext_cxn, &CREATE_COMMENT, variables).await?;
        data.create_comment.into_result()
    }

    async fn delete_comment(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let data: DeleteCommentData =
            run_mutation(ext_cxn, &DELETE_COMMENT, json!({ "commentId": id })).await?;
        data.delete_comment.into_result()
    }
}

/// Both halves of the remote comment store
pub struct RemoteComments;

impl driven_ports::CommentReader for RemoteComments {
    async fn comments_for_task(
        &self,
        task_id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Vec<Comment>, DrivenPortError> {
        RemoteCommentReader.comments_for_task(task_id, ext_cxn).await
    }
}

impl driven_ports::CommentWriter for RemoteComments {
    async fn create_comment(
        &self,
        comment: &NewComment,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        RemoteCommentWriter.create_comment(comment, ext_cxn).await
    }

    async fn delete_comment(
        &self,
        id: EntityId,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        RemoteCommentWriter.delete_comment(id, ext_cxn).await
    }
}
