// User-Facing Diagnostics
//
// Turns reconciler errors into the summary/detail pairs a host shows
// to the end user.

use serde::Serialize;

use super::{Operation, ReconcileError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

impl ReconcileError {
    pub fn diagnostic(&self) -> Diagnostic {
        let detail = match self {
            ReconcileError::InvalidIdentifier { source, .. } => {
                format!("Unable to parse data.id, got error: {source}")
            }
            ReconcileError::RemoteCallFailed { operation, source } => {
                format!("{}, got error: {source}", action(*operation))
            }
            ReconcileError::DeserializationFailed { operation, source } => {
                format!("{}, got malformed response: {source}", action(*operation))
            }
        };

        Diagnostic::error("Client Error", detail)
    }
}

fn action(operation: Operation) -> &'static str {
    match operation {
        Operation::Create | Operation::Update => "Unable to create request",
        Operation::Read => "Unable to read settings",
    }
}

impl From<&ReconcileError> for Diagnostic {
    fn from(err: &ReconcileError) -> Self {
        err.diagnostic()
    }
}
