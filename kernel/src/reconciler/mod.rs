// Settings Reconciler
//
// Drives the remote SAST setting toward the desired record and
// reports what the server ended up with. Create and update share the
// same upsert; delete only stops management.
//
// Each operation is one request/response round trip. Nothing is
// cached, retried or merged with prior state.

pub mod diagnostics;

use tracing::{debug, info};
use uuid::Uuid;

use crate::adapters::cloudapi::{from_response_envelope, to_request_envelope};
use crate::adapters::remote::{RemoteSettingsClient, TransportError};
use crate::record::SettingsRecord;

/// Which reconciler operation produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// `id` is not a UUID. Raised by read before any network access.
    #[error("invalid identifier `{id}`: {source}")]
    InvalidIdentifier {
        id: String,
        #[source]
        source: uuid::Error,
    },

    #[error("{operation} failed: {source}")]
    RemoteCallFailed {
        operation: Operation,
        #[source]
        source: TransportError,
    },

    #[error("{operation} returned a malformed settings envelope: {source}")]
    DeserializationFailed {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },
}

impl ReconcileError {
    fn from_transport(operation: Operation, err: TransportError) -> Self {
        match err {
            TransportError::Decode(source) => {
                ReconcileError::DeserializationFailed { operation, source }
            }
            source => ReconcileError::RemoteCallFailed { operation, source },
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            ReconcileError::InvalidIdentifier { .. } => Operation::Read,
            ReconcileError::RemoteCallFailed { operation, .. }
            | ReconcileError::DeserializationFailed { operation, .. } => *operation,
        }
    }
}

/// Reconciles settings records against a remote client.
#[derive(Debug)]
pub struct SettingsReconciler<C> {
    client: C,
}

impl SettingsReconciler<()> {
    /// A reconciler without a remote client. Only `delete` is available,
    /// since it never talks to the server.
    pub fn detached() -> Self {
        Self { client: () }
    }
}

impl<C> SettingsReconciler<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Stop managing a record. The remote setting is left as is.
    pub fn delete(&self, tracked: &SettingsRecord) {
        info!(id = %tracked.id, "settings no longer managed; remote value left unchanged");
    }
}

impl<C: RemoteSettingsClient> SettingsReconciler<C> {
    /// Realize a newly planned record.
    pub async fn create(&self, desired: &SettingsRecord) -> Result<SettingsRecord, ReconcileError> {
        let record = self.upsert(Operation::Create, desired).await?;
        info!(id = %record.id, sast_enabled = record.desired.sast_enabled, "created settings");
        Ok(record)
    }

    /// Refresh a tracked record from the server.
    pub async fn read(&self, tracked: &SettingsRecord) -> Result<SettingsRecord, ReconcileError> {
        Uuid::parse_str(&tracked.id).map_err(|source| ReconcileError::InvalidIdentifier {
            id: tracked.id.clone(),
            source,
        })?;

        debug!(id = %tracked.id, "fetching settings");
        let response = self
            .client
            .fetch_by_id(&tracked.id)
            .await
            .map_err(|e| ReconcileError::from_transport(Operation::Read, e))?;

        Ok(from_response_envelope(response))
    }

    /// Resend the full desired record. Same call as create; last write wins.
    pub async fn update(&self, desired: &SettingsRecord) -> Result<SettingsRecord, ReconcileError> {
        let record = self.upsert(Operation::Update, desired).await?;
        info!(id = %record.id, sast_enabled = record.desired.sast_enabled, "updated settings");
        Ok(record)
    }


    async fn upsert(
        &self,
        operation: Operation,
        desired: &SettingsRecord,
    ) -> Result<SettingsRecord, ReconcileError> {
        let request = to_request_envelope(desired);

        debug!(id = %desired.id, %operation, "upserting settings");
        let response = self
            .client
            .upsert(&desired.id, &request)
            .await
            .map_err(|e| ReconcileError::from_transport(operation, e))?;

        Ok(from_response_envelope(response))
    }
}
