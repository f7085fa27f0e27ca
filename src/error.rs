//! Error types that cross the triage engine boundary
//!
//! Only precondition failures surface to callers. Invocation, format, and
//! reconciliation problems are absorbed by the fallback policy and never show
//! up here.

use crate::store::StoreError;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Main error type for triage operations
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("Missing triage context: {field}")]
    MissingContext { field: &'static str },

    #[error("Customer not found: {customer_id}")]
    CustomerNotFound { customer_id: String },

    #[error("Ticket not found: {ticket_id}")]
    TicketNotFound { ticket_id: String },

    #[error("Agent roster unavailable for organization {org_id}: {message}")]
    RosterUnavailable { org_id: String, message: String },

    #[error("Ticket store error: {0}")]
    Store(#[from] StoreError),
}

impl TriageError {
    /// Create missing context error
    pub fn missing_context(field: &'static str) -> Self {
        Self::MissingContext { field }
    }

    /// Create customer not found error
    pub fn customer_not_found<S: Into<String>>(customer_id: S) -> Self {
        Self::CustomerNotFound {
            customer_id: customer_id.into(),
        }
    }

    /// Create ticket not found error
    pub fn ticket_not_found<S: Into<String>>(ticket_id: S) -> Self {
        Self::TicketNotFound {
            ticket_id: ticket_id.into(),
        }
    }

    /// Create roster unavailable error
    pub fn roster_unavailable<S: Into<String>, M: Into<String>>(org_id: S, message: M) -> Self {
        Self::RosterUnavailable {
            org_id: org_id.into(),
            message: message.into(),
        }
    }

    /// Error text safe to log or show to an operator
    pub fn sanitized_message(&self) -> String {
        sanitize_error_message(&self.to_string())
    }
}

static SECRET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|token|key|secret)[=:]\s*\S+").expect("secret pattern is valid")
});

static SENSITIVE_PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/[a-zA-Z0-9._/-]+/(secrets?|\.ssh|\.aws|\.config)/[a-zA-Z0-9._/-]+")
        .expect("path pattern is valid")
});

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Redact credentials and sensitive paths, then cap the length.
///
/// Provider error bodies can echo request headers or keys back, so everything
/// that reaches a log line from an upstream failure goes through here.
pub fn sanitize_error_message(message: &str) -> String {
    let mut sanitized = SECRET_PATTERN
        .replace_all(message, "${1}=***")
        .to_string();

    sanitized = SENSITIVE_PATH_PATTERN
        .replace_all(&sanitized, "/***REDACTED***/")
        .to_string();

    if sanitized.len() > MAX_ERROR_MESSAGE_LEN {
        let truncate_suffix = "...[truncated]";
        let mut cut = MAX_ERROR_MESSAGE_LEN - truncate_suffix.len();
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized = format!("{}{}", &sanitized[..cut], truncate_suffix);
    }

    sanitized
}

/// Result type for triage operations
pub type TriageResult<T> = Result<T, TriageError>;
