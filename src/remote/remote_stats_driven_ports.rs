use super::cache::EntityKind;
use super::{ProjectRefRow, Query, deserialize_date, run_query};
use crate::domain::{DrivenPortError, EntityId};
use crate::domain::stats::{TaskStats, TopTask, driven_ports};
use crate::domain::task::{Priority, TaskStatus};
use crate::external_connections::ExternalConnectivity;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

const TASK_STATS: Query = Query {
    name: "GetTaskStats",
    document: "query GetTaskStats { stats { completed incompleted \
        topImportantTasks { id taskName priority dueDate status project { id projectName } } } }",
    reads: &[EntityKind::Stats, EntityKind::Task, EntityKind::Project],
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopTaskRow {
    id: EntityId,
    task_name: String,
    priority: Priority,
    #[serde(deserialize_with = "deserialize_date")]
    due_date: NaiveDate,
    status: TaskStatus,
    project: ProjectRefRow,
}

impl From<TopTaskRow> for TopTask {
    fn from(value: TopTaskRow) -> Self {
        TopTask {
            id: value.id,
            name: value.task_name,
            priority: value.priority,
            due_date: value.due_date,
            status: value.status,
            project: value.project.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsRow {
    completed: u32,
    incompleted: u32,
    #[serde(default)]
    top_important_tasks: Vec<TopTaskRow>,
}

#[derive(Deserialize)]
struct StatsData {
    stats: Option<StatsRow>,
}

impl From<StatsData> for TaskStats {
    fn from(value: StatsData) -> Self {
        // A user with no tasks gets no stats object at all
        let Some(row) = value.stats else {
            return TaskStats::default();
        };

        TaskStats {
            completed: row.completed,
            incomplete: row.incompleted,
            top_important_tasks: row
                .top_important_tasks
                .into_iter()
                .map(TopTask::from)
                .collect(),
        }
    }
}

pub struct RemoteStatsReader;

impl driven_ports::StatsReader for RemoteStatsReader {
    async fn stats(&self, ext_cxn: &impl ExternalConnectivity) -> Result<TaskStats, DrivenPortError> {
        let data: StatsData = run_query(ext_cxn, &TASK_STATS, json!({})).await?;
        Ok(data.into())
    }
}
