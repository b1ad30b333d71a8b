use reqwest::StatusCode;

/// Category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected client-side before any request was sent.
    Validation,
    Authentication,
    NotFound,
    /// The server answered with a success status but not with the expected payload.
    Acknowledgment,
    /// Transport failure or a body that could not be read as JSON.
    Network,
    /// Any other non-success status returned by the server.
    Status,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::NotFound => "not found",
            Self::Acknowledgment => "acknowledgment",
            Self::Network => "network",
            Self::Status => "status",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            kind,
            message: message.into(),
            status,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message, Some(400))
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message, Some(401))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message, Some(404))
    }

    pub fn acknowledgment(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Acknowledgment, message, Some(500))
    }

    pub fn network(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::new(ErrorKind::Network, message, status)
    }

    /// Maps a failed HTTP status to an error, keeping the server-provided message.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let kind = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Authentication,
            StatusCode::NOT_FOUND => ErrorKind::NotFound,
            _ => ErrorKind::Status,
        };
        Self::new(kind, message, Some(status.as_u16()))
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let message = if err.is_timeout() {
            format!("Request timed out: {}", err)
        } else if err.is_connect() {
            format!("Connection failed: {}", err)
        } else {
            format!("Request failed: {}", err)
        };
        Self::network(message, status)
    }
}
