use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Method;
use serde_json::Value;

use super::error::{ApiError, ApiResult};
use super::executor::ApiRequest;
use super::models::LoginRequest;
use super::TodoClient;

static EMAIL_SHAPE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").ok());

fn has_email_shape(email: &str) -> bool {
    EMAIL_SHAPE
        .as_ref()
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

/// Which addresses may attempt a login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginPolicy {
    allowed_email: Option<String>,
}

impl LoginPolicy {
    /// Any address with a basic email shape.
    pub fn open() -> Self {
        Self::default()
    }

    /// Only `email`, compared trimmed and case-insensitively.
    pub fn restricted_to(email: impl Into<String>) -> Self {
        Self {
            allowed_email: Some(email.into().trim().to_lowercase()),
        }
    }

    pub fn allowed_email(&self) -> Option<&str> {
        self.allowed_email.as_deref()
    }

    pub fn check(&self, email: &str) -> ApiResult<()> {
        if email.is_empty() || !has_email_shape(email) {
            return Err(ApiError::validation("Invalid email format"));
        }
        if let Some(allowed) = self.allowed_email.as_deref() {
            if email.trim().to_lowercase() != allowed {
                return Err(ApiError::validation("This account does not exist"));
            }
        }
        Ok(())
    }
}

impl TodoClient {
    /// Exchanges an email for a session token. The caller keeps the token.
    pub async fn login(&self, email: &str) -> ApiResult<String> {
        self.config.login.check(email)?;

        let body = serde_json::to_value(LoginRequest { email })
            .map_err(|e| ApiError::validation(format!("Invalid login payload: {}", e)))?;
        let request = ApiRequest::new(Method::POST, self.endpoint(&["login"])?).json(body);
        let response = self.executor.execute(request).await?;

        match response.data.get("token") {
            Some(Value::String(token)) if !token.is_empty() => {
                info!("Login succeeded");
                Ok(token.clone())
            }
            _ => {
                warn!("Login response carried no token");
                Err(ApiError::authentication("Authentication failed"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorKind;

    #[test]
    fn test_email_shape() {
        let policy = LoginPolicy::open();
        assert!(policy.check("test@gmail.com").is_ok());
        assert!(policy.check("a.b+c@sub.example.org").is_ok());

        for bad in ["", "test", "test@gmail", "@gmail.com", "te st@gmail.com", "test@.com"] {
            let err = policy.check(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{bad}");
            assert_eq!(err.status(), Some(400));
        }
    }

    #[test]
    fn test_restricted_policy() {
        let policy = LoginPolicy::restricted_to("Test@Gmail.com");
        assert_eq!(policy.allowed_email(), Some("test@gmail.com"));
        assert!(policy.check("test@gmail.com").is_ok());
        assert!(policy.check("TEST@gmail.com").is_ok());

        let err = policy.check("other@gmail.com").unwrap_err();
        assert_eq!(err.message(), "This account does not exist");
    }
}
