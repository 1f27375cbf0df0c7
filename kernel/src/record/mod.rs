// Settings Record
//
// The single unit of tracked state: what the caller wants for an
// organization's SAST setting and what the server last reported.

use serde::{Deserialize, Serialize};

/// Resource type used when the caller does not supply one.
pub const DEFAULT_RESOURCE_TYPE: &str = "sast_settings";

/// Caller-controlled part of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredSettings {
    pub sast_enabled: bool,
}

/// Server-computed part of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedSettings {
    pub autofix_enabled: bool,
}

/// Settings for one organization, keyed by the remote identifier.
///
/// NOTE:
/// `id` is never generated locally. It is expected to be a UUID but is
/// only checked before a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub id: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    pub desired: DesiredSettings,

    /// `None` until a server response has been observed.
    #[serde(default)]
    pub observed: Option<ObservedSettings>,
}

impl SettingsRecord {
    /// A planned record with the default resource type and nothing observed.
    pub fn planned(id: impl Into<String>, sast_enabled: bool) -> Self {
        Self {
            id: id.into(),
            resource_type: DEFAULT_RESOURCE_TYPE.to_string(),
            desired: DesiredSettings { sast_enabled },
            observed: None,
        }
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }

    pub fn autofix_enabled(&self) -> Option<bool> {
        self.observed.map(|o| o.autofix_enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planned_record_uses_default_type() {
        let record = SettingsRecord::planned("org-1", true);

        assert_eq!(record.resource_type, DEFAULT_RESOURCE_TYPE);
        assert!(record.desired.sast_enabled);
        assert_eq!(record.autofix_enabled(), None);
    }

    #[test]
    fn explicit_type_overrides_default() {
        let record = SettingsRecord::planned("org-1", false).with_resource_type("custom");
        assert_eq!(record.resource_type, "custom");
    }

    #[test]
    fn state_without_observed_field_parses() {
        let json = r#"
        {
          "id": "11111111-1111-1111-1111-111111111111",
          "type": "sast_settings",
          "desired": { "sast_enabled": true }
        }
        "#;

        let record: SettingsRecord = serde_json::from_str(json).unwrap();
        assert!(record.observed.is_none());
        assert!(record.desired.sast_enabled);
    }
}
