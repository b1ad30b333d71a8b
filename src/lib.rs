//! Client for the to-do task service.
//!
//! [`api::TodoClient`] performs login and task CRUD against the REST API;
//! [`config::ClientConfig`] reads its settings from the environment.

pub mod api;
pub mod config;
#[cfg(feature = "cli")]
pub mod session;

pub use api::{
    AckPolicy, Acknowledgment, ApiError, ApiResult, ErrorKind, ListParams, LoginPolicy, NewTask,
    PageMeta, Task, TaskId, TaskPage, TodoClient,
};
pub use config::ClientConfig;
