//! GitHub API errors.

use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Rate limit exhausted{}", reset_suffix(.reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },
}

fn reset_suffix(reset_at: &Option<DateTime<Utc>>) -> String {
    reset_at
        .map(|t| format!(", resets at {}", t.to_rfc3339()))
        .unwrap_or_default()
}

impl From<GitHubError> for actionsusage_core::Error {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::RateLimited { .. } => {
                actionsusage_core::Error::RateLimited(err.to_string())
            }
            _ => actionsusage_core::Error::Source(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rate_limited_message() {
        let err = GitHubError::RateLimited {
            reset_at: Utc.timestamp_opt(0, 0).single(),
        };
        assert_eq!(
            err.to_string(),
            "Rate limit exhausted, resets at 1970-01-01T00:00:00+00:00"
        );

        let err = GitHubError::RateLimited { reset_at: None };
        assert_eq!(err.to_string(), "Rate limit exhausted");
    }

    #[test]
    fn test_into_core_error() {
        let core: actionsusage_core::Error = GitHubError::Api("boom".to_string()).into();
        assert!(matches!(core, actionsusage_core::Error::Source(_)));

        let core: actionsusage_core::Error = GitHubError::RateLimited { reset_at: None }.into();
        assert!(matches!(core, actionsusage_core::Error::RateLimited(_)));
    }
}
