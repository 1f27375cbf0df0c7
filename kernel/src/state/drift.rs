// Drift Detection
//
// Compares the record a host was tracking with the record a refresh
// returned and classifies what changed outside of this tool.

use serde::Serialize;
use tracing::Level;

use crate::reconciler::diagnostics::{Diagnostic, Severity};
use crate::record::SettingsRecord;

/// Severity of detected drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DriftSeverity {
    /// Server-computed value moved; nothing the caller controls.
    Info,

    /// A caller-controlled value was changed out of band.
    Warning,

    /// The server answered for a different resource.
    Critical,
}

impl DriftSeverity {
    /// Level a finding of this severity is logged at.
    pub fn log_level(&self) -> Level {
        match self {
            DriftSeverity::Info => Level::INFO,
            DriftSeverity::Warning => Level::WARN,
            DriftSeverity::Critical => Level::ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DriftType {
    IdentityMismatch,
    ResourceTypeChanged,
    SastEnabledChanged,
    AutofixEnabledChanged,
}

/// A single drift finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftFinding {
    pub drift_type: DriftType,
    pub severity: DriftSeverity,
    pub message: String,
}

/// Full drift report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub findings: Vec<DriftFinding>,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn highest_severity(&self) -> Option<DriftSeverity> {
        self.findings.iter().map(|f| f.severity).max()
    }

    /// Warning diagnostics for every finding above `Info`.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.findings
            .iter()
            .filter(|f| f.severity > DriftSeverity::Info)
            .map(|f| Diagnostic {
                severity: Severity::Warning,
                summary: "Settings Drift".into(),
                detail: f.message.clone(),
            })
            .collect()
    }
}

/// Detect and classify drift between the tracked and refreshed record.
pub fn detect_drift(tracked: &SettingsRecord, refreshed: &SettingsRecord) -> DriftReport {
    let mut findings = Vec::new();

    if tracked.id != refreshed.id {
        findings.push(DriftFinding {
            drift_type: DriftType::IdentityMismatch,
            severity: DriftSeverity::Critical,
            message: format!(
                "server returned settings for `{}` while refreshing `{}`",
                refreshed.id, tracked.id
            ),
        });
    }

    if tracked.resource_type != refreshed.resource_type {
        findings.push(DriftFinding {
            drift_type: DriftType::ResourceTypeChanged,
            severity: DriftSeverity::Warning,
            message: format!(
                "type changed from `{}` to `{}`",
                tracked.resource_type, refreshed.resource_type
            ),
        });
    }

    if tracked.desired.sast_enabled != refreshed.desired.sast_enabled {
        findings.push(DriftFinding {
            drift_type: DriftType::SastEnabledChanged,
            severity: DriftSeverity::Warning,
            message: format!(
                "sast_enabled changed outside of management: {} -> {}",
                tracked.desired.sast_enabled, refreshed.desired.sast_enabled
            ),
        });
    }

    // Nothing observed yet means nothing to compare against.
    if let (Some(before), Some(after)) = (tracked.autofix_enabled(), refreshed.autofix_enabled()) {
        if before != after {
            findings.push(DriftFinding {
                drift_type: DriftType::AutofixEnabledChanged,
                severity: DriftSeverity::Info,
                message: format!("autofix_enabled changed: {before} -> {after}"),
            });
        }
    }

    DriftReport { findings }
}
