// Managed Settings Lifecycle
//
// Host-side driver tying the reconciler to a state store:
// plan → create/update → persist, tracked → read → drift → persist,
// tracked → delete → forget.
//
// Records are only written after the reconciler succeeds, so a failed
// operation leaves tracked state as it was. The record stored is exactly
// the record returned.

use serde::Serialize;
use tracing::{error, info, warn, Level};

use crate::adapters::remote::RemoteSettingsClient;
use crate::reconciler::{ReconcileError, SettingsReconciler};
use crate::record::SettingsRecord;
use crate::state::drift::{detect_drift, DriftFinding, DriftReport};
use crate::state::{StateError, StateStore};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("no tracked settings for `{0}`")]
    NotTracked(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub action: ApplyAction,
    pub record: SettingsRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    pub record: SettingsRecord,
    pub drift: DriftReport,
}

/// Realize `planned`: update when the id is already tracked, create otherwise.
pub async fn apply<C, S>(
    reconciler: &SettingsReconciler<C>,
    store: &mut S,
    planned: &SettingsRecord,
) -> Result<ApplyOutcome, LifecycleError>
where
    C: RemoteSettingsClient,
    S: StateStore,
{
    let (action, record) = match store.get(&planned.id)? {
        Some(_) => (ApplyAction::Updated, reconciler.update(planned).await?),
        None => (ApplyAction::Created, reconciler.create(planned).await?),
    };

    track(store, &planned.id, &record)?;

    Ok(ApplyOutcome { action, record })
}

/// Re-read a tracked record and report drift against what was tracked.
pub async fn refresh<C, S>(
    reconciler: &SettingsReconciler<C>,
    store: &mut S,
    id: &str,
) -> Result<RefreshOutcome, LifecycleError>
where
    C: RemoteSettingsClient,
    S: StateStore,
{
    let tracked = store
        .get(id)?
        .ok_or_else(|| LifecycleError::NotTracked(id.to_string()))?;

    let refreshed = reconciler.read(&tracked).await?;
    let drift = detect_drift(&tracked, &refreshed);

    for finding in &drift.findings {
        log_finding(id, finding);
    }

    track(store, &tracked.id, &refreshed)?;

    Ok(RefreshOutcome {
        record: refreshed,
        drift,
    })
}

/// Stop managing `id`. The remote setting is not changed, so any
/// reconciler will do, including `SettingsReconciler::detached()`.
pub fn forget<C, S>(
    reconciler: &SettingsReconciler<C>,
    store: &mut S,
    id: &str,
) -> Result<Option<SettingsRecord>, LifecycleError>
where
    S: StateStore,
{
    let Some(tracked) = store.get(id)? else {
        return Ok(None);
    };

    reconciler.delete(&tracked);
    Ok(store.remove(id)?)
}

/// Persist `record` as returned. If the server answered under a different
/// id, the entry for `previous_id` is dropped so one record stays tracked.
fn track<S: StateStore>(
    store: &mut S,
    previous_id: &str,
    record: &SettingsRecord,
) -> Result<(), StateError> {
    store.put(record.clone())?;

    if record.id != previous_id {
        warn!(previous = previous_id, returned = %record.id, "server returned a different id");
        store.remove(previous_id)?;
    }
    Ok(())
}

fn log_finding(id: &str, finding: &DriftFinding) {
    let level = finding.severity.log_level();
    if level == Level::ERROR {
        error!(id, severity = ?finding.severity, "{}", finding.message);
    } else if level == Level::WARN {
        warn!(id, severity = ?finding.severity, "{}", finding.message);
    } else {
        info!(id, severity = ?finding.severity, "{}", finding.message);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::reconciler::testing::{settings_body, StubClient};
    use crate::state::drift::DriftType;
    use crate::state::InMemoryStateStore;

    const ORG_ID: &str = "11111111-1111-1111-1111-111111111111";
    const OTHER_ID: &str = "22222222-2222-2222-2222-222222222222";

    #[tokio::test]
    async fn first_apply_creates_then_updates() {
        let reconciler = SettingsReconciler::new(StubClient::settings(ORG_ID, true, false));
        let mut store = InMemoryStateStore::new();

        let first = apply(&reconciler, &mut store, &SettingsRecord::planned(ORG_ID, true))
            .await
            .unwrap();
        assert_eq!(first.action, ApplyAction::Created);
        assert_eq!(store.get(ORG_ID).unwrap(), Some(first.record.clone()));

        reconciler
            .client()
            .set_response(settings_body(ORG_ID, false, true));

        let second = apply(&reconciler, &mut store, &SettingsRecord::planned(ORG_ID, false))
            .await
            .unwrap();
        assert_eq!(second.action, ApplyAction::Updated);
        assert_eq!(second.record.autofix_enabled(), Some(true));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn failed_apply_leaves_state_unchanged() {
        let reconciler = SettingsReconciler::new(StubClient::failing(500));
        let mut store = InMemoryStateStore::new();

        let err = apply(&reconciler, &mut store, &SettingsRecord::planned(ORG_ID, true))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::Reconcile(ReconcileError::RemoteCallFailed { .. })
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn refresh_reports_out_of_band_change() {
        let reconciler = SettingsReconciler::new(StubClient::settings(ORG_ID, true, false));
        let mut store = InMemoryStateStore::new();
        apply(&reconciler, &mut store, &SettingsRecord::planned(ORG_ID, true))
            .await
            .unwrap();

        reconciler
            .client()
            .set_response(settings_body(ORG_ID, false, false));

        let outcome = refresh(&reconciler, &mut store, ORG_ID).await.unwrap();

        assert_eq!(outcome.drift.findings.len(), 1);
        assert_eq!(
            outcome.drift.findings[0].drift_type,
            DriftType::SastEnabledChanged
        );
        assert!(!store.get(ORG_ID).unwrap().unwrap().desired.sast_enabled);
    }

    #[tokio::test]
    async fn refresh_of_untracked_id_fails() {
        let reconciler = SettingsReconciler::new(StubClient::settings(ORG_ID, true, false));
        let mut store = InMemoryStateStore::new();

        let err = refresh(&reconciler, &mut store, ORG_ID).await.unwrap_err();

        assert!(matches!(err, LifecycleError::NotTracked(_)));
        assert_eq!(reconciler.client().calls(), 0);
    }

    #[tokio::test]
    async fn refresh_with_invalid_id_keeps_tracked_record() {
        let reconciler = SettingsReconciler::new(StubClient::settings(ORG_ID, true, false));
        let mut store = InMemoryStateStore::new();
        store.put(SettingsRecord::planned("not-a-uuid", true)).unwrap();

        let err = refresh(&reconciler, &mut store, "not-a-uuid")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::Reconcile(ReconcileError::InvalidIdentifier { .. })
        ));
        assert!(store.get("not-a-uuid").unwrap().is_some());
        assert_eq!(reconciler.client().calls(), 0);
    }

    #[tokio::test]
    async fn apply_stores_exactly_what_it_returns() {
        let reconciler = SettingsReconciler::new(StubClient::settings(OTHER_ID, true, false));
        let mut store = InMemoryStateStore::new();

        let outcome = apply(&reconciler, &mut store, &SettingsRecord::planned(ORG_ID, true))
            .await
            .unwrap();

        assert_eq!(outcome.record.id, OTHER_ID);
        assert_eq!(store.get(OTHER_ID).unwrap(), Some(outcome.record.clone()));
        assert!(store.get(ORG_ID).unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn refresh_stores_exactly_what_it_returns() {
        let reconciler = SettingsReconciler::new(StubClient::settings(ORG_ID, true, false));
        let mut store = InMemoryStateStore::new();
        apply(&reconciler, &mut store, &SettingsRecord::planned(ORG_ID, true))
            .await
            .unwrap();

        reconciler
            .client()
            .set_response(settings_body(OTHER_ID, true, false));
        let outcome = refresh(&reconciler, &mut store, ORG_ID).await.unwrap();

        assert_eq!(
            outcome.drift.findings[0].drift_type,
            DriftType::IdentityMismatch
        );
        assert_eq!(store.get(OTHER_ID).unwrap(), Some(outcome.record.clone()));
        assert!(store.get(ORG_ID).unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn forget_needs_no_client() {
        let mut store = InMemoryStateStore::new();
        store.put(SettingsRecord::planned(ORG_ID, true)).unwrap();

        let dropped = forget(&SettingsReconciler::detached(), &mut store, ORG_ID).unwrap();

        assert_eq!(dropped.map(|r| r.id), Some(ORG_ID.to_string()));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn forget_drops_record_without_remote_call() {
        let reconciler = SettingsReconciler::new(StubClient::settings(ORG_ID, true, false));
        let mut store = InMemoryStateStore::new();
        apply(&reconciler, &mut store, &SettingsRecord::planned(ORG_ID, true))
            .await
            .unwrap();
        let calls_before = reconciler.client().upserts.load(Ordering::SeqCst);

        let dropped = forget(&reconciler, &mut store, ORG_ID).unwrap();

        assert!(dropped.is_some());
        assert!(store.is_empty());
        assert_eq!(reconciler.client().upserts.load(Ordering::SeqCst), calls_before);
        assert_eq!(reconciler.client().fetches.load(Ordering::SeqCst), 0);
        assert!(forget(&reconciler, &mut store, ORG_ID).unwrap().is_none());
    }
}
