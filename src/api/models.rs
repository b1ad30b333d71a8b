//! Wire types exchanged with the task service.
//!
//! Every task value here originates from a server response. The structs keep
//! fields they do not know about in `extra`, so a task rendered back to JSON
//! carries everything the server sent.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::error::{ApiError, ApiResult};

pub const DEFAULT_LIMIT: u32 = 5;
pub const DEFAULT_ORDER: &str = "-created_at";
pub const DEFAULT_PAGE: u32 = 1;

/// Server-assigned task identifier. The service may use numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl TaskId {
    /// True when the identifier is non-blank and reads as a finite number.
    pub fn is_numeric(&self) -> bool {
        match self {
            Self::Number(_) => true,
            Self::Text(raw) => {
                let raw = raw.trim();
                !raw.is_empty() && raw.parse::<f64>().map(f64::is_finite).unwrap_or(false)
            }
        }
    }

    /// Text placed in URL paths, surrounding whitespace removed.
    pub fn path_segment(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for TaskId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Fields without a typed slot, including timestamps that did not parse.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Reads a task object. Only `id` is required; every other field is
    /// taken as loosely as the server sends it.
    fn from_map(mut raw: Map<String, Value>) -> Result<Self, String> {
        let id = match raw.remove("id") {
            Some(Value::Number(n)) => n
                .as_i64()
                .map(TaskId::Number)
                .unwrap_or_else(|| TaskId::Text(n.to_string())),
            Some(Value::String(s)) => TaskId::Text(s),
            None | Some(Value::Null) => return Err("task has no id".to_string()),
            Some(other) => TaskId::Text(other.to_string()),
        };

        Ok(Self {
            id,
            title: raw.remove("title").and_then(lenient::text).unwrap_or_default(),
            description: raw.remove("description").and_then(lenient::text),
            is_completed: raw
                .remove("is_completed")
                .as_ref()
                .and_then(lenient::flag)
                .unwrap_or(false),
            user_email: raw.remove("user_email").and_then(lenient::text),
            created_at: take_timestamp(&mut raw, "created_at"),
            updated_at: take_timestamp(&mut raw, "updated_at"),
            extra: raw,
        })
    }
}

impl<'de> Deserialize<'de> for Task {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_map(raw).map_err(de::Error::custom)
    }
}

/// Removes `key` when it holds a readable timestamp or null. Anything else
/// stays in `raw` untouched.
fn take_timestamp(raw: &mut Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let parsed = raw.get(key).and_then(lenient::timestamp);
    if parsed.is_some() || raw.get(key).is_some_and(Value::is_null) {
        raw.remove(key);
    }
    parsed
}

/// Payload for task creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub user_email: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewTask {
    pub fn new(user_email: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            user_email: user_email.into(),
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> ApiResult<()> {
        let mut missing = Vec::new();
        if self.user_email.trim().is_empty() {
            missing.push("user_email");
        }
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub pages: u64,
    pub page: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for PageMeta {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut count = |key: &str| raw.remove(key).as_ref().and_then(lenient::count);

        let total = count("total").unwrap_or(0);
        let pages = count("pages").unwrap_or(0);
        let page = count("page").unwrap_or(u64::from(DEFAULT_PAGE));
        let limit = count("limit");
        Ok(Self {
            total,
            pages,
            page,
            limit,
            extra: raw,
        })
    }
}

impl PageMeta {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn previous_page(&self) -> Option<u64> {
        self.has_previous().then(|| self.page - 1)
    }

    pub fn next_page(&self) -> Option<u64> {
        self.has_next().then(|| self.page + 1)
    }

    pub fn page_numbers(&self) -> std::ops::RangeInclusive<u64> {
        1..=self.pages
    }

    /// Whether `page` lies within the pages the server reported.
    pub fn accepts_page(&self, page: u64) -> bool {
        page >= 1 && page <= self.pages
    }
}

/// Query parameters for the task listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    limit: u32,
    order: String,
    page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            order: DEFAULT_ORDER.to_string(),
            page: DEFAULT_PAGE,
        }
    }
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds parameters from untyped input. Anything that is not a positive
    /// integer falls back to the default, as does a blank order.
    pub fn from_raw(limit: Option<&str>, order: Option<&str>, page: Option<&str>) -> Self {
        let params = Self::default();
        let params = match limit.and_then(parse_positive) {
            Some(limit) => params.with_limit(limit),
            None => params,
        };
        let params = match order {
            Some(order) => params.with_order(order),
            None => params,
        };
        match page.and_then(parse_positive) {
            Some(page) => params.with_page(page),
            None => params,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        let order = order.into();
        let order = order.trim();
        self.order = if order.is_empty() {
            DEFAULT_ORDER.to_string()
        } else {
            order.to_string()
        };
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(DEFAULT_PAGE);
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn order(&self) -> &str {
        &self.order
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Sort key without the descending marker.
    pub fn sort_key(&self) -> &str {
        self.order.trim_start_matches('-')
    }

    pub fn is_descending(&self) -> bool {
        self.order.starts_with('-')
    }

    /// Query pairs in wire order: limit, order, page.
    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("limit", self.limit.to_string()),
            ("order", self.order.clone()),
            ("page", self.page.to_string()),
        ]
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// One page of tasks together with the server's pagination summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub meta: Option<PageMeta>,
}

/// Confirmation returned by the update and delete endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgment {
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
}

mod lenient {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde_json::Value;

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn text(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    pub fn flag(value: &Value) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|n| n != 0.0),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn count(value: &Value) -> Option<u64> {
        match value {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// RFC 3339, RFC 2822 (HTTP dates), naive ISO-8601 read as UTC, or
    /// Unix seconds/milliseconds.
    pub fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::String(raw) => parse(raw),
            Value::Number(n) => {
                let secs = n.as_i64()?;
                if secs.abs() >= 100_000_000_000 {
                    DateTime::from_timestamp_millis(secs)
                } else {
                    DateTime::from_timestamp(secs, 0)
                }
            }
            _ => None,
        }
    }

    fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}
