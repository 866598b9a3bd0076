use crate::domain::project::{Project, ProjectDraft};
use crate::dto::{FieldErrors, check, due_date, parse_due_date, required};
use validator::Validate;

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ProjectForm {
    #[validate(custom(function = "required", message = "Project name is required"))]
    pub name: String,
    /// `YYYY-MM-DD`
    #[validate(custom = "due_date")]
    pub due_date: String,
}

impl ProjectForm {
    pub fn from_project(project: &Project) -> ProjectForm {
        ProjectForm {
            name: project.name.clone(),
            due_date: project.due_date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn draft(&self) -> Result<ProjectDraft, FieldErrors> {
        check(self)?;
        let due_date = parse_due_date(&self.due_date)
            .ok_or_else(|| FieldErrors::single("due_date", "Due date is required"))?;

        Ok(ProjectDraft {
            name: self.name.trim().to_owned(),
            due_date,
        })
    }
}
