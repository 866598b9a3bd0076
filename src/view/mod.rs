//! View models: the state each page renders and the user actions it reacts to. Nothing here
//! draws anything; a presentation layer reads the state and forwards events.

pub mod auth;
pub mod comments;
pub mod home;
pub mod modal;
pub mod profile;
pub mod projects;
pub mod shell;
pub mod task_board;
pub mod users;

use crate::domain::Error;
use tracing::debug;

/// What a view shows for one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

/// Proof that a request was issued against a [QuerySlot]. Only the newest ticket may fill it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket(u64);

/// Holds one query's latest result. Shows [ViewState::Loading] until the first answer arrives,
/// then keeps showing the previous data while a re-fetch is in flight.
///
/// The `load` methods on views hold `&mut self` across the fetch, so their requests never
/// overlap. Overlap happens when a caller splits a load into [QuerySlot::begin] and
/// [QuerySlot::finish] around a fetch it runs elsewhere, as
/// [task_board::TaskBoardView::begin_load] does; only the newest ticket is then shown.
#[derive(Debug, Clone)]
pub struct QuerySlot<T> {
    generation: u64,
    in_flight: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> Default for QuerySlot<T> {
    fn default() -> Self {
        QuerySlot {
            generation: 0,
            in_flight: false,
            data: None,
            error: None,
        }
    }
}

impl<T> QuerySlot<T> {
    pub fn new() -> QuerySlot<T> {
        QuerySlot::default()
    }

    /// Starts a request, superseding any request still in flight
    pub fn begin(&mut self) -> QueryTicket {
        self.generation += 1;
        self.in_flight = true;
        QueryTicket(self.generation)
    }

    /// Stores a result unless a newer request was started after `ticket`. Returns whether the
    /// result was kept.
    pub fn finish(&mut self, ticket: QueryTicket, result: Result<T, Error>) -> bool {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "Discarding a superseded query result"
            );
            return false;
        }

        self.in_flight = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(err) => self.error = Some(err.user_message()),
        }
        true
    }

    /// Replaces the data outright, as when a controller hands back a freshly fetched value
    pub fn fill(&mut self, data: T) {
        let ticket = self.begin();
        self.finish(ticket, Ok(data));
    }

    pub fn reset(&mut self) {
        *self = QuerySlot {
            generation: self.generation + 1,
            ..QuerySlot::default()
        };
    }

    pub fn state(&self) -> ViewState<&T> {
        match (&self.error, &self.data) {
            (Some(message), _) => ViewState::Failed(message.clone()),
            (None, Some(data)) => ViewState::Ready(data),
            (None, None) => ViewState::Loading,
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A blocking message shown after a mutation finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Notification {
        Notification {
            kind: NotificationKind::Success,
            title: "Success!".to_owned(),
            message: message.into(),
        }
    }

    pub fn deleted(message: impl Into<String>) -> Notification {
        Notification {
            kind: NotificationKind::Success,
            title: "Deleted!".to_owned(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Notification {
        Notification {
            kind: NotificationKind::Error,
            title: "Error!".to_owned(),
            message: message.into(),
        }
    }

    /// Error notification for a failed action, carrying the server's message
    pub fn failure(context: &str, err: &Error) -> Notification {
        Notification::error(format!("{context}: {}", err.user_message()))
    }
}

/// Question asked before anything is destroyed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub title: String,
    pub text: String,
}

impl Confirmation {
    pub fn destructive(text: impl Into<String>) -> Confirmation {
        Confirmation {
            title: "Are you sure?".to_owned(),
            text: text.into(),
        }
    }
}

/// The presentation layer's modal dialogs
#[cfg_attr(test, mockall::automock)]
pub trait Prompt {
    fn notify(&self, notification: &Notification);
    /// Blocks until the user answers. `true` means go ahead.
    fn confirm(&self, confirmation: &Confirmation) -> bool;
}


#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use speculoos::prelude::*;

    mod query_slot {
        use super::*;

        #[test]
        fn loading_until_the_first_answer() {
            let mut slot: QuerySlot<Vec<i32>> = QuerySlot::new();
            assert_that!(slot.state()).is_equal_to(ViewState::Loading);

            let ticket = slot.begin();
            assert_that!(slot.state()).is_equal_to(ViewState::Loading);
            assert!(slot.finish(ticket, Ok(vec![1])));
            assert_that!(slot.state()).is_equal_to(ViewState::Ready(&vec![1]));
        }

        #[test]
        fn previous_data_stays_visible_during_a_refetch() {
            let mut slot = QuerySlot::new();
            slot.fill(7);

            slot.begin();
            assert!(slot.is_fetching());
            assert_that!(slot.state()).is_equal_to(ViewState::Ready(&7));
        }

        #[test]
        fn superseded_results_are_discarded() {
            let mut slot = QuerySlot::new();
            let stale = slot.begin();
            let fresh = slot.begin();

            assert!(slot.finish(fresh, Ok("fresh")));
            assert!(!slot.finish(stale, Ok("stale")));
            assert_that!(slot.data()).is_equal_to(Some(&"fresh"));
        }

        #[test]
        fn failures_carry_the_user_message() {
            let mut slot: QuerySlot<i32> = QuerySlot::new();
            let ticket = slot.begin();
            slot.finish(
                ticket,
                Err(Error::Rejected {
                    action: "fetch users".to_owned(),
                    message: "Not logged in".to_owned(),
                }),
            );

            assert_that!(slot.state()).is_equal_to(ViewState::Failed("Not logged in".to_owned()));
        }

        #[test]
        fn reset_drops_data_and_in_flight_requests() {
            let mut slot = QuerySlot::new();
            slot.fill(1);
            let pending = slot.begin();
            slot.reset();

            assert!(!slot.finish(pending, Ok(2)));
            assert_that!(slot.state()).is_equal_to(ViewState::Loading);
        }
    }

    #[test]
    fn failure_notifications_pass_the_cause_through() {
        let err = Error::RetrieveFailure {
            action: "delete a task".to_owned(),
            cause: anyhow!("connection refused"),
        };
        let notification = Notification::failure("There was an error deleting your task", &err);

        assert_that!(notification.kind).is_equal_to(NotificationKind::Error);
        assert_that!(notification.message.as_str())
            .is_equal_to("There was an error deleting your task: connection refused");
    }
}
