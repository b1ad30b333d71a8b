//! Access layer for the remote to-do service.
//!
//! All calls go through [`RequestExecutor`]; the session token is an explicit
//! argument of every authenticated operation and is never stored here.
//!
//! Endpoints, relative to the configured base path:
//! - Login: `POST /login`
//! - Create task: `POST /tasks/create`
//! - Get task: `GET /tasks/{id}`
//! - List tasks: `GET /tasks?limit=&order=&page=`
//! - Toggle task: `PATCH /tasks/update/{id}`
//! - Delete task: `DELETE /tasks/delete/{id}`

pub mod auth;
pub mod error;
pub mod executor;
pub mod models;
pub mod tasks;

use reqwest::Url;

use crate::config::ClientConfig;

pub use auth::LoginPolicy;
pub use error::{ApiError, ApiResult, ErrorKind};
pub use executor::{ApiRequest, ApiResponse, RequestExecutor};
pub use models::{
    Acknowledgment, ListParams, NewTask, PageMeta, Task, TaskId, TaskPage, DEFAULT_LIMIT,
    DEFAULT_ORDER, DEFAULT_PAGE,
};
pub use tasks::AckPolicy;

#[derive(Debug, Clone)]
pub struct TodoClient {
    config: ClientConfig,
    base_url: Url,
    executor: RequestExecutor,
}

impl TodoClient {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let executor = RequestExecutor::new(config.timeout)?;
        Self::with_executor(config, executor)
    }

    pub fn with_executor(config: ClientConfig, executor: RequestExecutor) -> ApiResult<Self> {
        let base_url = base_url(&config)?;
        Ok(Self {
            config,
            base_url,
            executor,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::validation(format!("Invalid API base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn base_url(config: &ClientConfig) -> ApiResult<Url> {
    let raw = format!(
        "{}/{}",
        config.api_url.trim_end_matches('/'),
        config.base_path.trim_matches('/')
    );
    let url = Url::parse(&raw)
        .map_err(|e| ApiError::validation(format!("Invalid API base URL '{}': {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::validation(format!("Invalid API base URL: {}", raw)));
    }
    Ok(url)
}
