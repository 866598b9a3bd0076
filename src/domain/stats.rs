use crate::domain::project::ProjectRef;
use crate::domain::task::{Priority, TaskStatus};
use crate::domain::{DrivenPortError, EntityId, Error};
use crate::external_connections::ExternalConnectivity;
use chrono::NaiveDate;
use tracing::error;

/// Headline numbers for the landing page, computed by the API for the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub completed: u32,
    pub incomplete: u32,
    /// Most important tasks first
    pub top_important_tasks: Vec<TopTask>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopTask {
    pub id: EntityId,
    pub name: String,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    pub project: ProjectRef,
}

/// Walks a list of top tasks a fixed-size page at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopTaskPager {
    start: usize,
    page_size: usize,
}

impl Default for TopTaskPager {
    fn default() -> Self {
        TopTaskPager::new(3)
    }
}

impl TopTaskPager {
    pub fn new(page_size: usize) -> TopTaskPager {
        TopTaskPager {
            start: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn visible<'a>(&self, tasks: &'a [TopTask]) -> &'a [TopTask] {
        let start = self.start.min(tasks.len());
        let end = (self.start + self.page_size).min(tasks.len());
        &tasks[start..end]
    }

    pub fn can_load_more(&self, total: usize) -> bool {
        self.start + self.page_size < total
    }

    pub fn can_go_back(&self) -> bool {
        self.start > 0
    }

    pub fn load_more(&mut self, total: usize) {
        if self.can_load_more(total) {
            self.start += self.page_size;
        }
    }

    pub fn go_back(&mut self) {
        self.start = self.start.saturating_sub(self.page_size);
    }
}

pub mod driven_ports {
    use super::*;

    pub trait StatsReader {
        async fn stats(
            &self,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<TaskStats, DrivenPortError>;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait StatsPort {
        async fn get_stats(
            &self,
            ext_cxn: &impl ExternalConnectivity,
            s_reader: &impl driven_ports::StatsReader,
        ) -> Result<TaskStats, Error>;
    }
}

pub struct StatsService {}

impl driving_ports::StatsPort for StatsService {
    async fn get_stats(
        &self,
        ext_cxn: &impl ExternalConnectivity,
        s_reader: &impl driven_ports::StatsReader,
    ) -> Result<TaskStats, Error> {
        let stats_result = s_reader.stats(ext_cxn).await;
        if let Err(ref port_err) = stats_result {
            error!("Could not fetch task statistics: {port_err}");
        }

        stats_result.map_err(|err| err.into_error_trying_to("fetch task statistics"))
    }
}


#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::domain::test_util::FakeImplementation;
    use std::sync::Mutex;

    pub struct MockStatsReader {
        pub stats_response: FakeImplementation<(), Result<TaskStats, DrivenPortError>>,
    }

    impl MockStatsReader {
        pub fn new() -> MockStatsReader {
            MockStatsReader {
                stats_response: FakeImplementation::new(),
            }
        }

        pub fn build_locked(builder: impl FnOnce(&mut Self)) -> Mutex<Self> {
            let mut new_reader = Self::new();
            builder(&mut new_reader);
            Mutex::new(new_reader)
        }
    }

    impl driven_ports::StatsReader for Mutex<MockStatsReader> {
        async fn stats(
            &self,
            _: &impl ExternalConnectivity,
        ) -> Result<TaskStats, DrivenPortError> {
            let mut locked_self = self.lock().expect("mock stats reader mutex poisoned");
            locked_self.stats_response.save_arguments(());

            locked_self.stats_response.return_value_result()
        }
    }

    /// `count` tasks with ids 1 through `count`, most important first
    pub fn top_tasks(count: i32) -> Vec<TopTask> {
        (1..=count)
            .map(|id| TopTask {
                id: EntityId(id),
                name: format!("Top task {id}"),
                priority: Priority::new(5).expect("valid priority"),
                due_date: NaiveDate::from_ymd_opt(2030, 3, 1).expect("valid date"),
                status: TaskStatus::Todo,
                project: ProjectRef {
                    id: EntityId(1),
                    name: "Launch".to_owned(),
                },
            })
            .collect()
    }
}
