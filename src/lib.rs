//! Headless client for the task manager GraphQL API: session handling, route guarding,
//! typed remote access with a query cache, form controllers and the view models of every page.

pub mod app_env;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod remote;
pub mod storage;
pub mod view;

#[cfg(test)]
mod integration_test;
