use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::driving_ports::TaskPort;
use crate::domain::task::{Task, TaskScope, TaskStatus, UnknownStatus};
use crate::domain::{EntityId, Error};
use crate::external_connections::ExternalConnectivity;
use std::num::ParseIntError;
use tracing::{debug, info};

/// Tasks split into the three status lanes. Each lane keeps the order the API returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    todo: Vec<Task>,
    doing: Vec<Task>,
    done: Vec<Task>,
}

impl Board {
    pub fn partition(tasks: impl IntoIterator<Item = Task>) -> Board {
        let mut board = Board::default();
        for task in tasks {
            board.lane_mut(task.status).push(task);
        }
        board
    }

    pub fn lane(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::Doing => &self.doing,
            TaskStatus::Done => &self.done,
        }
    }

    fn lane_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::Doing => &mut self.doing,
            TaskStatus::Done => &mut self.done,
        }
    }

    /// Lanes in board order
    pub fn lanes(&self) -> impl Iterator<Item = (TaskStatus, &[Task])> + '_ {
        TaskStatus::ALL
            .into_iter()
            .map(|status| (status, self.lane(status)))
    }

    pub fn find(&self, id: EntityId) -> Option<&Task> {
        self.lanes()
            .flat_map(|(_, lane)| lane.iter())
            .find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.doing.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Error)]
pub enum DragParseError {
    #[error("dragged item id is not a task id: {0}")]
    BadTaskId(#[from] ParseIntError),
    #[error("drop target is not a lane: {0}")]
    BadLane(#[from] UnknownStatus),
}

/// Completion of a card drag. Lanes are identified by their status tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEnd {
    pub draggable_id: EntityId,
    pub source: TaskStatus,
    /// Absent when the card was dropped outside every lane
    pub destination: Option<TaskStatus>,
}

impl DragEnd {
    /// Builds a drag from the raw ids of the dragged card and its drop targets
    pub fn parse(
        draggable_id: &str,
        source: &str,
        destination: Option<&str>,
    ) -> Result<DragEnd, DragParseError> {
        Ok(DragEnd {
            draggable_id: draggable_id.parse()?,
            source: source.parse()?,
            destination: destination.map(str::parse).transpose()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragResolution {
    /// Dropped outside the board
    NoDestination,
    /// Reordering inside a lane is not persisted
    SameLane,
    Move { task: EntityId, to: TaskStatus },
}

pub fn resolve_drag(drag: &DragEnd) -> DragResolution {
    match drag.destination {
        None => DragResolution::NoDestination,
        Some(destination) if destination == drag.source => DragResolution::SameLane,
        Some(destination) => DragResolution::Move {
            task: drag.draggable_id,
            to: destination,
        },
    }
}

/// Controls offered on a task card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardActions {
    pub edit: bool,
    pub delete: bool,
    pub comment: bool,
}

impl CardActions {
    pub fn for_task(task: &Task) -> CardActions {
        CardActions {
            edit: task.can_edit(),
            delete: true,
            comment: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Nothing was sent to the API
    Ignored(DragResolution),
    /// The task was moved and the board re-fetched
    Moved(Board),
}

/// Loads the board for one scope and turns finished drags into status changes
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardController {
    scope: TaskScope,
}

impl BoardController {
    pub fn new(scope: TaskScope) -> BoardController {
        BoardController { scope }
    }

    pub fn scope(&self) -> TaskScope {
        self.scope
    }

    /// Switches between created and assigned tasks. Callers load the board again afterwards.
    pub fn set_scope(&mut self, scope: TaskScope) {
        self.scope = scope;
    }

    pub async fn load(
        &self,
        ext_cxn: &impl ExternalConnectivity,
        task_port: &impl TaskPort,
        t_reader: &impl TaskReader,
    ) -> Result<Board, Error> {
        let tasks = task_port.get_tasks(self.scope, ext_cxn, t_reader).await?;
        Ok(Board::partition(tasks))
    }

    /// Applies a finished drag. A move issues exactly one status update and, once it has
    /// succeeded, exactly one network-only re-fetch of the board.
    pub async fn drag_end(
        &self,
        drag: &DragEnd,
        ext_cxn: &impl ExternalConnectivity,
        task_port: &impl TaskPort,
        t_persistence: &(impl TaskReader + TaskWriter),
    ) -> Result<DragOutcome, Error> {
        let (task, to) = match resolve_drag(drag) {
            DragResolution::Move { task, to } => (task, to),
            ignored => {
                debug!("Ignoring drag of task {}: {ignored:?}", drag.draggable_id);
                return Ok(DragOutcome::Ignored(ignored));
            }
        };

        info!(from = %drag.source, %to, "Moving task {task}");
        task_port.move_task(task, to, ext_cxn, t_persistence).await?;

        let board = self
            .load(&ext_cxn.for_refetch(), task_port, t_persistence)
            .await?;
        Ok(DragOutcome::Moved(board))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::test_util::*;
    use crate::domain::task::TaskService;
    use crate::domain::test_util::Connectivity;
    use crate::external_connections::test_util::FakeExternalConnectivity;
    use crate::external_connections::FetchPolicy;
    use crate::domain::user::Role;
    use speculoos::prelude::*;
    use std::sync::RwLock;

    fn ids(lane: &[Task]) -> Vec<i32> {
        lane.iter().map(|t| t.id.0).collect()
    }

    fn mixed_tasks() -> Vec<Task> {
        vec![
            task_with(EntityId(1), TaskStatus::Done, EntityId(1), EntityId(1)),
            task_with(EntityId(2), TaskStatus::Todo, EntityId(1), EntityId(1)),
            task_with(EntityId(3), TaskStatus::Doing, EntityId(1), EntityId(2)),
            task_with(EntityId(4), TaskStatus::Todo, EntityId(1), EntityId(2)),
            task_with(EntityId(5), TaskStatus::Done, EntityId(1), EntityId(1)),
        ]
    }

    mod partition {
        use super::*;

        #[test]
        fn every_task_lands_in_its_own_lane_in_order() {
            let board = Board::partition(mixed_tasks());

            assert_that!(ids(board.lane(TaskStatus::Todo))).is_equal_to(vec![2, 4]);
            assert_that!(ids(board.lane(TaskStatus::Doing))).is_equal_to(vec![3]);
            assert_that!(ids(board.lane(TaskStatus::Done))).is_equal_to(vec![1, 5]);
            assert_that!(board.len()).is_equal_to(5);
            for (status, lane) in board.lanes() {
                assert!(lane.iter().all(|task| task.status == status));
            }
        }

        #[test]
        fn find_looks_through_every_lane() {
            let board = Board::partition(mixed_tasks());
            assert_that!(board.find(EntityId(3)).map(|t| t.status))
                .is_equal_to(Some(TaskStatus::Doing));
            assert_that!(board.find(EntityId(99))).is_none();
        }
    }

    mod drag_resolution {
        use super::*;

        #[test]
        fn raw_drop_ids_are_parsed() {
            let drag = DragEnd::parse("12", "todo", Some("doing")).expect("drag parses");
            assert_that!(drag).is_equal_to(DragEnd {
                draggable_id: EntityId(12),
                source: TaskStatus::Todo,
                destination: Some(TaskStatus::Doing),
            });
            assert_that!(DragEnd::parse("twelve", "todo", None)).is_err();
            assert_that!(DragEnd::parse("12", "todo", Some("trash"))).is_err();
        }

        #[test]
        fn only_cross_lane_drops_move_tasks() {
            let aborted = DragEnd::parse("1", "todo", None).expect("drag parses");
            let same_lane = DragEnd::parse("1", "todo", Some("todo")).expect("drag parses");
            let across = DragEnd::parse("1", "todo", Some("done")).expect("drag parses");

            assert_that!(resolve_drag(&aborted)).is_equal_to(DragResolution::NoDestination);
            assert_that!(resolve_drag(&same_lane)).is_equal_to(DragResolution::SameLane);
            assert_that!(resolve_drag(&across)).is_equal_to(DragResolution::Move {
                task: EntityId(1),
                to: TaskStatus::Done,
            });
        }
    }

    #[test]
    fn edit_is_offered_only_for_self_assigned_tasks() {
        let own = task_with(EntityId(1), TaskStatus::Todo, EntityId(4), EntityId(4));
        let delegated = task_with(EntityId(2), TaskStatus::Todo, EntityId(4), EntityId(5));

        assert_that!(CardActions::for_task(&own)).is_equal_to(CardActions {
            edit: true,
            delete: true,
            comment: true,
        });
        assert_that!(CardActions::for_task(&delegated)).is_equal_to(CardActions {
            edit: false,
            delete: true,
            comment: true,
        });
    }

    mod board_controller {
        use super::*;

        fn persistence() -> RwLock<InMemoryTaskPersistence> {
            RwLock::new(InMemoryTaskPersistence::new_with_tasks(
                EntityId(1),
                mixed_tasks(),
            ))
        }

        #[tokio::test]
        async fn same_lane_drops_issue_nothing() {
            let ext_cxn = FakeExternalConnectivity::signed_in(Role::Normal);
            let tasks = persistence();
            let controller = BoardController::new(TaskScope::Created);

            for drag in [
                DragEnd::parse("2", "todo", Some("todo")).expect("drag parses"),
                DragEnd::parse("2", "todo", None).expect("drag parses"),
            ] {
                let outcome = controller
                    .drag_end(&drag, &ext_cxn, &TaskService {}, &tasks)
                    .await;
                assert_that!(outcome)
                    .is_ok()
                    .matches(|outcome| matches!(outcome, DragOutcome::Ignored(_)));
            }

            let persisted = tasks.read().expect("task rwlock poisoned");
            assert_that!(persisted.mutation_count()).is_equal_to(0);
            assert_that!(persisted.fetches.len()).is_equal_to(0);
            assert_that!(persisted.tasks[1].status).is_equal_to(TaskStatus::Todo);
        }

        #[tokio::test]
        async fn cross_lane_drops_issue_one_mutation_then_one_refetch() {
            let ext_cxn = FakeExternalConnectivity::signed_in(Role::Normal);
            let tasks = persistence();
            let controller = BoardController::new(TaskScope::Created);

            let drag = DragEnd::parse("2", "todo", Some("doing")).expect("drag parses");
            let outcome = controller
                .drag_end(&drag, &ext_cxn, &TaskService {}, &tasks)
                .await;

            let Ok(DragOutcome::Moved(board)) = &outcome else {
                panic!("Dragging across lanes should move the task, got {outcome:?}");
            };
            assert_that!(ids(board.lane(TaskStatus::Doing))).is_equal_to(vec![2, 3]);
            assert_that!(ids(board.lane(TaskStatus::Todo))).is_equal_to(vec![4]);

            let persisted = tasks.read().expect("task rwlock poisoned");
            assert_that!(persisted.status_updates)
                .is_equal_to(vec![(EntityId(2), TaskStatus::Doing)]);
            assert_that!(persisted.mutation_count()).is_equal_to(1);
            assert_that!(persisted.fetches)
                .is_equal_to(vec![(TaskScope::Created, FetchPolicy::NetworkOnly)]);
        }

        #[tokio::test]
        async fn failed_moves_skip_the_refetch() {
            let ext_cxn = FakeExternalConnectivity::signed_in(Role::Normal);
            let mut raw = InMemoryTaskPersistence::new(EntityId(1));
            raw.connectivity = Connectivity::Disconnected;
            let tasks = RwLock::new(raw);

            let drag = DragEnd::parse("2", "todo", Some("done")).expect("drag parses");
            let outcome = BoardController::default()
                .drag_end(&drag, &ext_cxn, &TaskService {}, &tasks)
                .await;
            assert_that!(outcome).is_err();
            assert_that!(tasks.read().expect("task rwlock poisoned").fetches.len())
                .is_equal_to(0);
        }

        #[tokio::test]
        async fn switching_scope_reissues_the_query() {
            let ext_cxn = FakeExternalConnectivity::signed_in(Role::Normal);
            let tasks = persistence();
            let mut controller = BoardController::new(TaskScope::Created);

            let created = controller
                .load(&ext_cxn, &TaskService {}, &tasks)
                .await
                .expect("created tasks load");
            controller.set_scope(controller.scope().toggled());
            let assigned = controller
                .load(&ext_cxn, &TaskService {}, &tasks)
                .await
                .expect("assigned tasks load");

            assert_that!(created.len()).is_equal_to(5);
            assert_that!(ids(assigned.lane(TaskStatus::Done))).is_equal_to(vec![1, 5]);
            assert_that!(assigned.len()).is_equal_to(3);
            let persisted = tasks.read().expect("task rwlock poisoned");
            assert_that!(persisted.fetches).is_equal_to(vec![
                (TaskScope::Created, FetchPolicy::CacheFirst),
                (TaskScope::Assigned, FetchPolicy::CacheFirst),
            ]);
        }
    }
}
