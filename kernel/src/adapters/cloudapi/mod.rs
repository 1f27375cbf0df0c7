// Cloud API Settings Envelopes
//
// Wire shapes for the remote settings endpoint and the mapping
// between them and `SettingsRecord`. Pure field copying, no I/O.

pub mod client;
pub mod config;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::{DesiredSettings, ObservedSettings, SettingsRecord};

/// Body sent on upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRequest {
    pub data: SettingsRequestData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRequestData {
    pub id: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    pub attributes: SettingsRequestAttributes,
}

/// Only caller-settable attributes. Server-computed fields never go upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRequestAttributes {
    #[serde(rename = "sast_enabled", alias = "enabled_flag")]
    pub sast_enabled: bool,
}

/// Body returned by both upsert and fetch.
///
/// Every nested object is required: a body without `data` or
/// `attributes` fails to parse rather than producing defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub data: SettingsResponseData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsResponseData {
    pub id: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    pub attributes: SettingsResponseAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsResponseAttributes {
    #[serde(rename = "sast_enabled", alias = "enabled_flag")]
    pub sast_enabled: bool,

    pub autofix_enabled: bool,
}

impl SettingsResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

impl FromStr for SettingsResponse {
    type Err = serde_json::Error;

    fn from_str(body: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(body)
    }
}

/// Build the upsert body for a record.
pub fn to_request_envelope(record: &SettingsRecord) -> SettingsRequest {
    SettingsRequest {
        data: SettingsRequestData {
            id: record.id.clone(),
            resource_type: record.resource_type.clone(),
            attributes: SettingsRequestAttributes {
                sast_enabled: record.desired.sast_enabled,
            },
        },
    }
}

/// Convert a server response into the record the caller should track.
pub fn from_response_envelope(envelope: SettingsResponse) -> SettingsRecord {
    let SettingsResponseData {
        id,
        resource_type,
        attributes,
    } = envelope.data;

    SettingsRecord {
        id,
        resource_type,
        desired: DesiredSettings {
            sast_enabled: attributes.sast_enabled,
        },
        observed: Some(ObservedSettings {
            autofix_enabled: attributes.autofix_enabled,
        }),
    }
}

impl From<SettingsResponse> for SettingsRecord {
    fn from(envelope: SettingsResponse) -> Self {
        from_response_envelope(envelope)
    }
}
