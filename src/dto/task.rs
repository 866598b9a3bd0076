use crate::domain::EntityId;
use crate::domain::task::{Priority, Task, TaskDraft, TaskEdit, TaskStatus};
use crate::dto::{FieldErrors, check, due_date, parse_due_date, required};
use validator::{Validate, ValidationError};

/// Priority must be one of the selectable values `1..=5`
fn priority_choice(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Priority is required".into());
        return Err(err);
    }
    if parse_priority(value).is_none() {
        let mut err = ValidationError::new("priority");
        err.message = Some("Priority must be between 1 and 5".into());
        return Err(err);
    }
    Ok(())
}

fn parse_priority(value: &str) -> Option<Priority> {
    value.trim().parse::<u8>().ok().and_then(Priority::new)
}

/// Task modal content. Every field holds what the input widget holds, so the assignee and
/// priority are the selected option values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct TaskForm {
    #[validate(custom = "due_date")]
    pub due_date: String,
    #[validate(custom(function = "required", message = "Task name is required"))]
    pub name: String,
    #[validate(custom(function = "required", message = "User is required"))]
    pub assignee: String,
    #[validate(custom = "priority_choice")]
    pub priority: String,
}

struct CheckedTask {
    name: String,
    due_date: chrono::NaiveDate,
    assignee: EntityId,
    priority: Priority,
}

impl TaskForm {
    pub fn from_task(task: &Task) -> TaskForm {
        TaskForm {
            due_date: task.due_date.format("%Y-%m-%d").to_string(),
            name: task.name.clone(),
            assignee: task.assignee.id.to_string(),
            priority: task.priority.value().to_string(),
        }
    }

    fn checked(&self) -> Result<CheckedTask, FieldErrors> {
        check(self)?;
        let due_date = parse_due_date(&self.due_date)
            .ok_or_else(|| FieldErrors::single("due_date", "Due date is required"))?;
        let assignee = self
            .assignee
            .parse()
            .map_err(|_| FieldErrors::single("assignee", "User is required"))?;
        let priority = parse_priority(&self.priority)
            .ok_or_else(|| FieldErrors::single("priority", "Priority is required"))?;

        Ok(CheckedTask {
            name: self.name.trim().to_owned(),
            due_date,
            assignee,
            priority,
        })
    }

    pub fn draft(&self, project: EntityId) -> Result<TaskDraft, FieldErrors> {
        let checked = self.checked()?;
        Ok(TaskDraft {
            project,
            name: checked.name,
            due_date: checked.due_date,
            assignee: checked.assignee,
            priority: checked.priority,
        })
    }

    /// The edit carries `status` so saving never moves the card to another lane
    pub fn edit(&self, status: TaskStatus) -> Result<TaskEdit, FieldErrors> {
        let checked = self.checked()?;
        Ok(TaskEdit {
            name: checked.name,
            due_date: checked.due_date,
            assignee: checked.assignee,
            priority: checked.priority,
            status,
        })
    }
}
