use crate::domain::comment::NewComment;
use crate::domain::task::Task;
use crate::dto::{FieldErrors, check, required};
use validator::Validate;

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct CommentForm {
    #[validate(custom(function = "required", message = "Comment cannot be empty"))]
    pub text: String,
}

impl CommentForm {
    pub fn new_comment(&self, task: &Task) -> Result<NewComment, FieldErrors> {
        check(self)?;
        Ok(NewComment::for_task(task, self.text.trim()))
    }
}
