use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 from the API. The stored token has already been cleared when this is returned.
    #[error("{}", .detail.as_deref().unwrap_or("Your session has expired. Please sign in again."))]
    Unauthorized { detail: Option<String> },
    #[error("{}", status_message(.status, .detail.as_deref()))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("could not reach the nutrition service: {0}")]
    Network(#[source] reqwest::Error),
    #[error("unexpected response from the nutrition service: {0}")]
    Decode(#[from] serde_json::Error),
}

fn status_message(status: &StatusCode, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => detail.to_string(),
        None => format!(
            "request failed: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string(),
    }
}

/// FastAPI answers errors with `{"detail": "..."}`, or a list of field problems for 422s.
#[derive(Deserialize)]
struct ErrorBody {
    detail: ErrorDetail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldProblem>),
}

#[derive(Deserialize)]
struct FieldProblem {
    msg: String,
}

pub(crate) fn extract_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    let detail = match parsed.detail {
        ErrorDetail::Message(message) => message,
        ErrorDetail::Fields(problems) => problems
            .into_iter()
            .map(|p| p.msg)
            .collect::<Vec<_>>()
            .join("; "),
    };
    let detail = detail.trim().to_string();
    (!detail.is_empty()).then_some(detail)
}

impl ApiError {
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let detail = extract_detail(body);
        if status == StatusCode::UNAUTHORIZED {
            ApiError::Unauthorized { detail }
        } else {
            ApiError::Status { status, detail }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    /// The server-provided message, if the error response carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { detail } | ApiError::Status { detail, .. } => {
                detail.as_deref()
            }
            _ => None,
        }
    }

    /// Message for a user-facing notice: the server's own words when there are any.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}
