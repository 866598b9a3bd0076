use super::test_util;
use crate::domain::EntityId;
use crate::domain::board::{BoardController, DragEnd, DragOutcome};
use crate::domain::project::driving_ports::ProjectPort;
use crate::domain::project::{ProjectDraft, ProjectService};
use crate::domain::stats::StatsService;
use crate::domain::stats::driving_ports::StatsPort;
use crate::domain::task::driving_ports::TaskPort;
use crate::domain::task::{Priority, TaskDraft, TaskScope, TaskService, TaskStatus};
use crate::domain::user::UserService;
use crate::domain::user::driving_ports::UserPort;
use crate::external_connections::ExternalConnectivity;
use crate::remote::remote_project_driven_ports::{RemoteProjectReader, RemoteProjectWriter};
use crate::remote::remote_stats_driven_ports::RemoteStatsReader;
use crate::remote::remote_task_driven_ports::{RemoteTaskReader, RemoteTaskWriter, RemoteTasks};
use crate::remote::remote_user_driven_ports::RemoteUserReader;
use chrono::NaiveDate;
use speculoos::prelude::*;

#[tokio::test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
async fn signed_in_user_can_read_their_data() {
    let live = test_util::log_in().await;

    assert!(live.sessions.token().is_some());
    let me = UserService {}
        .current_user(&live.ext_cxn, &RemoteUserReader)
        .await;
    assert_that!(me).is_ok();
    assert_that!(StatsService {}.get_stats(&live.ext_cxn, &RemoteStatsReader).await).is_ok();
    assert_that!(
        TaskService {}
            .get_tasks(TaskScope::Created, &live.ext_cxn, &RemoteTaskReader)
            .await
    )
    .is_ok();
}

#[tokio::test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
async fn a_task_can_be_dragged_to_doing() {
    let live = test_util::log_in().await;
    let ext_cxn = &live.ext_cxn;
    let me = UserService {}
        .current_user(ext_cxn, &RemoteUserReader)
        .await
        .expect("me should load");
    let due_date = NaiveDate::from_ymd_opt(2040, 1, 1).expect("valid date");

    let project_name = test_util::unique_name("Integration project");
    ProjectService {}
        .create_project(
            &ProjectDraft {
                name: project_name.clone(),
                due_date,
            },
            ext_cxn,
            &RemoteProjectWriter,
        )
        .await
        .expect("project should be created");
    let project = ProjectService {}
        .get_projects(&ext_cxn.for_refetch(), &RemoteProjectReader)
        .await
        .expect("projects should load")
        .into_iter()
        .find(|project| project.name == project_name)
        .expect("the new project should be listed");

    let task_name = test_util::unique_name("Integration task");
    TaskService {}
        .create_task(
            &TaskDraft {
                project: project.id,
                name: task_name.clone(),
                due_date,
                assignee: me.id,
                priority: Priority::new(3).expect("valid priority"),
            },
            ext_cxn,
            &RemoteTaskWriter,
        )
        .await
        .expect("task should be created");

    let controller = BoardController::new(TaskScope::Created);
    let persistence = RemoteTasks;
    let board = controller
        .load(ext_cxn, &TaskService {}, &persistence)
        .await
        .expect("board should load");
    let task_id: EntityId = board
        .lane(TaskStatus::Todo)
        .iter()
        .find(|task| task.name == task_name)
        .map(|task| task.id)
        .expect("new tasks start in todo");

    let drag = DragEnd::parse(&task_id.to_string(), "todo", Some("doing")).expect("drag parses");
    let outcome = controller
        .drag_end(&drag, ext_cxn, &TaskService {}, &persistence)
        .await;
    let Ok(DragOutcome::Moved(board)) = outcome else {
        panic!("the task should have moved, got {outcome:?}");
    };
    assert!(board.lane(TaskStatus::Doing).iter().any(|task| task.id == task_id));

    TaskService {}
        .delete_task(task_id, ext_cxn, &RemoteTaskWriter)
        .await
        .expect("task cleanup failed");
    ProjectService {}
        .delete_project(project.id, ext_cxn, &RemoteProjectWriter)
        .await
        .expect("project cleanup failed");
}
