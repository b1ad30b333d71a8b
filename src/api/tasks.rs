use log::{debug, info, warn};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, ApiResult};
use super::executor::{ApiRequest, ApiResponse};
use super::models::{Acknowledgment, ListParams, NewTask, PageMeta, Task, TaskId, TaskPage};
use super::TodoClient;

/// How a mutation response is recognised as successful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckPolicy {
    /// `data.message` must contain the marker, even on a 2xx status.
    Substring(String),
    /// Any 2xx status acknowledges the mutation.
    StatusOnly,
}

impl AckPolicy {
    pub fn verify(&self, data: &Value, failure: &str) -> ApiResult<Acknowledgment> {
        let ack: Acknowledgment = match data {
            Value::Object(_) => serde_json::from_value(data.clone()).unwrap_or_default(),
            _ => Acknowledgment::default(),
        };

        match self {
            Self::StatusOnly => Ok(ack),
            Self::Substring(marker) if ack.message.contains(marker.as_str()) => Ok(ack),
            Self::Substring(marker) => {
                warn!(
                    "Acknowledgment '{}' does not contain '{}'",
                    ack.message, marker
                );
                Err(ApiError::acknowledgment(failure))
            }
        }
    }
}

impl TodoClient {
    pub async fn create_task(&self, token: &str, payload: &NewTask) -> ApiResult<Task> {
        payload.validate()?;

        let body = serde_json::to_value(payload)
            .map_err(|e| ApiError::validation(format!("Invalid task payload: {}", e)))?;
        let request = ApiRequest::new(Method::POST, self.endpoint(&["tasks", "create"])?)
            .bearer(token)
            .json(body);
        let response = self.executor.execute(request).await?;

        if response.data.get("id").map_or(true, Value::is_null) {
            return Err(ApiError::acknowledgment("Failed to create task"));
        }
        let task: Task = decode(response.data, "created task")?;
        info!("Created task {}", task.id);
        Ok(task)
    }

    pub async fn get_task(&self, token: &str, id: &TaskId) -> ApiResult<Task> {
        if !id.is_numeric() {
            return Err(ApiError::validation("Invalid task ID"));
        }

        let request =
            ApiRequest::new(Method::GET, self.task_endpoint(&[], id)?).bearer(token);
        let mut response = self.executor.execute(request).await?;

        match response.data.get_mut("task").map(Value::take) {
            Some(task) if task.is_object() => decode(task, "task"),
            _ => Err(ApiError::not_found("Task not found")),
        }
    }

    /// Fetches one page. Metadata is passed through as the server sent it.
    pub async fn list_tasks(&self, token: &str, params: &ListParams) -> ApiResult<TaskPage> {
        let request = ApiRequest::new(Method::GET, self.tasks_url(params)?).bearer(token);
        let ApiResponse { data, meta, .. } = self.executor.execute(request).await?;

        let tasks: Vec<Task> = match data {
            Value::Null => Vec::new(),
            Value::Array(_) => decode(data, "task list")?,
            _ => return Err(ApiError::acknowledgment("Unexpected task list payload")),
        };
        let meta = meta.and_then(|m| match serde_json::from_value::<PageMeta>(m) {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!("Ignoring unreadable page metadata: {}", e);
                None
            }
        });

        debug!(
            "Listed {} tasks (page {} of {:?})",
            tasks.len(),
            params.page(),
            meta.as_ref().map(|m| m.pages)
        );
        Ok(TaskPage { tasks, meta })
    }

    /// Asks the server to flip the completion flag of a task.
    pub async fn update_task(&self, token: &str, id: &TaskId) -> ApiResult<Acknowledgment> {
        let request =
            ApiRequest::new(Method::PATCH, self.task_endpoint(&["update"], id)?).bearer(token);
        let response = self.executor.execute(request).await?;

        let ack = self
            .config
            .update_ack
            .verify(&response.data, "Failed to update task")?;
        info!("Toggled task {}", id);
        Ok(ack)
    }

    pub async fn delete_task(&self, token: &str, id: &TaskId) -> ApiResult<Acknowledgment> {
        let request =
            ApiRequest::new(Method::DELETE, self.task_endpoint(&["delete"], id)?).bearer(token);
        let response = self.executor.execute(request).await?;

        let ack = self
            .config
            .delete_ack
            .verify(&response.data, "Failed to delete task")?;
        info!("Deleted task {}", id);
        Ok(ack)
    }

    /// URL of the listing endpoint with its query string.
    pub fn tasks_url(&self, params: &ListParams) -> ApiResult<Url> {
        let mut url = self.endpoint(&["tasks"])?;
        url.query_pairs_mut().extend_pairs(params.query_pairs());
        Ok(url)
    }

    fn task_endpoint(&self, action: &[&str], id: &TaskId) -> ApiResult<Url> {
        let id = id.path_segment();
        let mut segments = vec!["tasks"];
        segments.extend_from_slice(action);
        segments.push(id.as_str());
        self.endpoint(&segments)
    }
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> ApiResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::acknowledgment(format!("Unexpected {} payload: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_substring_ack() {
        let policy = AckPolicy::Substring("actualizada".to_string());
        let ack = policy
            .verify(&json!({ "message": "Tarea actualizada correctamente" }), "fail")
            .unwrap();
        assert_eq!(ack.message, "Tarea actualizada correctamente");

        let err = policy
            .verify(&json!({ "message": "Tarea borrada" }), "Failed to update task")
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.message(), "Failed to update task");

        assert!(policy.verify(&Value::Null, "fail").is_err());
        assert!(policy.verify(&json!({ "message": 3 }), "fail").is_err());
    }

    #[test]
    fn test_status_only_ack() {
        let ack = AckPolicy::StatusOnly.verify(&json!({}), "fail").unwrap();
        assert!(ack.message.is_empty());
        assert!(AckPolicy::StatusOnly.verify(&json!("ok"), "fail").is_ok());
    }
}
