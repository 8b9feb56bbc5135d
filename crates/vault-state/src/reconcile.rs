//! Two-replica reconciliation
//!
//! Decisions are made per key over the union of both replicas, in priority
//! order:
//!
//! | local        | remote       | action                              |
//! |--------------|--------------|-------------------------------------|
//! | absent       | present      | `local.set(remote)`                 |
//! | present      | absent       | `remote.set(local)`                 |
//! | version >    | version      | invariant violation, no write       |
//! | version <    | version      | `local.set(remote)`                 |
//! | same version | other value  | `EqualVersionPolicy`                |
//! | same         | same         | nothing                             |
//!
//! All writes flow through this algorithm, so a local replica ahead of the
//! ledger means corrupted data. That case is reported and never repaired.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use vault_core::{Replica, UpdateResult, ValVer, VaultResult};

use crate::{EqualVersionPolicy, KeyData};

/// Which replica a write goes to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Local,
    Remote,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Local => f.write_str("local"),
            Side::Remote => f.write_str("remote"),
        }
    }
}

/// Local replica ahead of the remote one for a key
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("key {key}: local version {local_version} is ahead of remote version {remote_version}")]
pub struct InvariantViolation {
    pub key: String,
    pub local_version: u64,
    pub remote_version: u64,
}

/// Equal versions with different values, left alone under `Report`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conflict {
    pub key: String,
    pub local: ValVer,
    pub remote: ValVer,
}

/// Outcome of the decision step for one key
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Write { target: Side, value: ValVer },
    Violation(InvariantViolation),
    Conflict(Conflict),
}

/// A decision for a key that needs attention
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedAction {
    pub key: String,
    pub decision: Decision,
}

/// Decide what to do for every key in the union of both replicas.
///
/// Keys that already agree produce no action. The result is ordered by key.
pub fn plan(local: &Replica, remote: &Replica, policy: EqualVersionPolicy) -> Vec<PlannedAction> {
    let keys: BTreeSet<&String> = local.keys().chain(remote.keys()).collect();

    keys.into_iter()
        .filter_map(|key| {
            let decision = decide(key, local.get(key), remote.get(key), policy)?;
            Some(PlannedAction {
                key: key.clone(),
                decision,
            })
        })
        .collect()
}

fn decide(
    key: &str,
    local: Option<&ValVer>,
    remote: Option<&ValVer>,
    policy: EqualVersionPolicy,
) -> Option<Decision> {
    let write = |target, value: &ValVer| Decision::Write {
        target,
        value: value.clone(),
    };

    match (local, remote) {
        (None, None) => None,
        (None, Some(r)) => Some(write(Side::Local, r)),
        (Some(l), None) => Some(write(Side::Remote, l)),
        (Some(l), Some(r)) if l.version > r.version => {
            Some(Decision::Violation(InvariantViolation {
                key: key.to_string(),
                local_version: l.version,
                remote_version: r.version,
            }))
        }
        (Some(l), Some(r)) if l.version < r.version => Some(write(Side::Local, r)),
        (Some(l), Some(r)) if l.value != r.value => match policy {
            EqualVersionPolicy::LocalWins => Some(write(Side::Remote, l)),
            EqualVersionPolicy::RemoteWins => Some(write(Side::Local, r)),
            EqualVersionPolicy::Report => Some(Decision::Conflict(Conflict {
                key: key.to_string(),
                local: l.clone(),
                remote: r.clone(),
            })),
        },
        (Some(_), Some(_)) => None,
    }
}

/// A write issued by reconciliation, running on its own task
#[derive(Debug)]
pub struct PendingWrite {
    pub key: String,
    pub target: Side,
    pub value: ValVer,
    handle: JoinHandle<UpdateResult>,
}

impl PendingWrite {
    /// Wait for the write to finish
    pub async fn outcome(self) -> UpdateResult {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => UpdateResult::error(format!("write task failed: {}", e)),
        }
    }
}

/// Everything one reconciliation pass produced
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub writes: Vec<PendingWrite>,
    pub violations: Vec<InvariantViolation>,
    pub conflicts: Vec<Conflict>,
}

impl Reconciliation {
    /// Wait for every write and collect the per-key outcomes
    pub async fn wait_all(self) -> ReconciliationReport {
        let mut outcomes = Vec::with_capacity(self.writes.len());
        for write in self.writes {
            let key = write.key.clone();
            let target = write.target;
            outcomes.push(WriteOutcome {
                key,
                target,
                result: write.outcome().await,
            });
        }

        ReconciliationReport {
            outcomes,
            violations: self.violations,
            conflicts: self.conflicts,
        }
    }
}

/// Finished write
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOutcome {
    pub key: String,
    pub target: Side,
    pub result: UpdateResult,
}

/// Reconciliation with every write resolved
#[derive(Clone, Debug, Default)]
pub struct ReconciliationReport {
    pub outcomes: Vec<WriteOutcome>,
    pub violations: Vec<InvariantViolation>,
    pub conflicts: Vec<Conflict>,
}

impl ReconciliationReport {
    pub fn failed_writes(&self) -> impl Iterator<Item = &WriteOutcome> {
        self.outcomes.iter().filter(|o| !o.result.is_success())
    }

    /// Every write succeeded and no key was left unresolved
    pub fn is_clean(&self) -> bool {
        self.failed_writes().next().is_none()
            && self.violations.is_empty()
            && self.conflicts.is_empty()
    }
}

/// Reconcile `local` against `remote`.
///
/// Both replicas are read concurrently; a failed read aborts the pass. Each
/// write is spawned immediately and handed back as a `PendingWrite`, so the
/// caller can await them or let them run detached.
pub async fn reconcile<L, R>(
    local: Arc<L>,
    remote: Arc<R>,
    policy: EqualVersionPolicy,
) -> VaultResult<Reconciliation>
where
    L: KeyData + ?Sized + 'static,
    R: KeyData + ?Sized + 'static,
{
    let (local_keys, remote_keys) = tokio::join!(local.keys(), remote.keys());
    let local_keys = local_keys?;
    let remote_keys = remote_keys?;
    tracing::debug!(
        local = local_keys.len(),
        remote = remote_keys.len(),
        %policy,
        "fetched replicas"
    );

    let mut result = Reconciliation::default();
    for action in plan(&local_keys, &remote_keys, policy) {
        match action.decision {
            Decision::Write { target, value } => {
                tracing::info!(key = %action.key, %target, version = value.version, "issuing write");
                let handle = match target {
                    Side::Local => spawn_write(&local, &action.key, &value),
                    Side::Remote => spawn_write(&remote, &action.key, &value),
                };
                result.writes.push(PendingWrite {
                    key: action.key,
                    target,
                    value,
                    handle,
                });
            }
            Decision::Violation(violation) => {
                tracing::warn!("invariant violation: {}", violation);
                result.violations.push(violation);
            }
            Decision::Conflict(conflict) => {
                tracing::warn!(key = %conflict.key, version = conflict.local.version, "equal-version conflict left unresolved");
                result.conflicts.push(conflict);
            }
        }
    }

    Ok(result)
}

fn spawn_write<S>(store: &Arc<S>, key: &str, value: &ValVer) -> JoinHandle<UpdateResult>
where
    S: KeyData + ?Sized + 'static,
{
    let store = Arc::clone(store);
    let key = key.to_string();
    let value = value.clone();
    tokio::spawn(async move { store.set(&key, &value.value, value.version).await })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryKeyData;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use vault_core::VaultError;

    fn replica(entries: &[(&str, &str, u64)]) -> Replica {
        entries
            .iter()
            .map(|(k, v, ver)| (k.to_string(), ValVer::new(*v, *ver)))
            .collect()
    }

    fn stores(
        local: &[(&str, &str, u64)],
        remote: &[(&str, &str, u64)],
    ) -> (Arc<MemoryKeyData>, Arc<MemoryKeyData>) {
        (
            Arc::new(MemoryKeyData::from_replica(replica(local))),
            Arc::new(MemoryKeyData::from_replica(replica(remote))),
        )
    }

    #[tokio::test]
    async fn test_converged_replicas_issue_no_writes() {
        let (local, remote) = stores(
            &[("a", "x", 1), ("b", "y", 7)],
            &[("a", "x", 1), ("b", "y", 7)],
        );
        let result = reconcile(local, remote, EqualVersionPolicy::default())
            .await
            .unwrap();

        assert!(result.writes.is_empty());
        assert!(result.violations.is_empty());
    }

    #[tokio::test]
    async fn test_newer_remote_updates_local() {
        let (local, remote) = stores(&[("a", "x", 1)], &[("a", "y", 2)]);
        let result = reconcile(local.clone(), remote.clone(), EqualVersionPolicy::default())
            .await
            .unwrap();

        assert_eq!(result.writes.len(), 1);
        let write = &result.writes[0];
        assert_eq!(write.key, "a");
        assert_eq!(write.target, Side::Local);
        assert_eq!(write.value, ValVer::new("y", 2));

        let report = result.wait_all().await;
        assert!(report.is_clean());
        assert_eq!(local.get("a"), Some(ValVer::new("y", 2)));
        assert_eq!(remote.get("a"), Some(ValVer::new("y", 2)));
    }

    #[tokio::test]
    async fn test_local_only_key_is_pushed() {
        let (local, remote) = stores(&[("b", "z", 0)], &[]);
        let result = reconcile(local, remote.clone(), EqualVersionPolicy::default())
            .await
            .unwrap();

        assert_eq!(result.writes.len(), 1);
        assert_eq!(result.writes[0].target, Side::Remote);
        assert_eq!(result.writes[0].value, ValVer::new("z", 0));

        let outcome = result.writes.into_iter().next().unwrap().outcome().await;
        assert_eq!(outcome, UpdateResult::success("b", 0));
        assert_eq!(remote.get("b"), Some(ValVer::new("z", 0)));
    }

    #[tokio::test]
    async fn test_remote_only_key_is_pulled() {
        let (local, remote) = stores(&[], &[("r", "w", 5)]);
        let report = reconcile(local.clone(), remote, EqualVersionPolicy::default())
            .await
            .unwrap()
            .wait_all()
            .await;

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].target, Side::Local);
        assert_eq!(local.get("r"), Some(ValVer::new("w", 5)));
    }

    #[tokio::test]
    async fn test_equal_version_local_wins() {
        let (local, remote) = stores(&[("c", "p", 3)], &[("c", "q", 3)]);
        let result = reconcile(local, remote.clone(), EqualVersionPolicy::LocalWins)
            .await
            .unwrap();

        assert_eq!(result.writes.len(), 1);
        assert_eq!(result.writes[0].target, Side::Remote);
        assert_eq!(result.writes[0].value, ValVer::new("p", 3));

        result.wait_all().await;
        assert_eq!(remote.get("c"), Some(ValVer::new("p", 3)));
    }

    #[test]
    fn test_equal_version_other_policies() {
        let local = replica(&[("c", "p", 3)]);
        let remote = replica(&[("c", "q", 3)]);

        let remote_wins = plan(&local, &remote, EqualVersionPolicy::RemoteWins);
        assert_eq!(
            remote_wins[0].decision,
            Decision::Write {
                target: Side::Local,
                value: ValVer::new("q", 3)
            }
        );

        let report = plan(&local, &remote, EqualVersionPolicy::Report);
        assert!(matches!(&report[0].decision, Decision::Conflict(c) if c.key == "c"));
    }

    #[tokio::test]
    async fn test_local_ahead_is_violation_without_write() {
        let (local, remote) = stores(
            &[("d", "new", 4), ("e", "x", 1)],
            &[("d", "old", 2), ("e", "y", 2)],
        );
        let result = reconcile(local.clone(), remote.clone(), EqualVersionPolicy::default())
            .await
            .unwrap();

        assert_eq!(
            result.violations,
            vec![InvariantViolation {
                key: "d".into(),
                local_version: 4,
                remote_version: 2,
            }]
        );
        // Only the other key is written
        assert_eq!(result.writes.len(), 1);
        assert_eq!(result.writes[0].key, "e");

        let report = result.wait_all().await;
        assert!(!report.is_clean());
        assert_eq!(remote.get("d"), Some(ValVer::new("old", 2)));
        assert_eq!(local.get("d"), Some(ValVer::new("new", 4)));
    }

    #[test]
    fn test_plan_is_ordered_by_key() {
        let local = replica(&[("z", "1", 0), ("m", "1", 0)]);
        let remote = replica(&[("a", "1", 0)]);
        let keys: Vec<_> = plan(&local, &remote, EqualVersionPolicy::default())
            .into_iter()
            .map(|a| a.key)
            .collect();
        assert_eq!(keys, vec!["a", "m", "z"]);
    }

    struct Unreadable;

    #[async_trait]
    impl KeyData for Unreadable {
        async fn keys(&self) -> VaultResult<Replica> {
            Err(VaultError::NotConnected)
        }

        async fn set(&self, _key: &str, _value: &str, _version: u64) -> UpdateResult {
            UpdateResult::error("unreachable")
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let local = Arc::new(MemoryKeyData::from_replica(replica(&[("a", "x", 0)])));
        let result = reconcile(local, Arc::new(Unreadable), EqualVersionPolicy::default()).await;
        assert_eq!(result.err(), Some(VaultError::NotConnected));
    }

    /// Accepts reads, rejects writes to one key
    struct RejectingStore {
        inner: MemoryKeyData,
        reject: &'static str,
    }

    #[async_trait]
    impl KeyData for RejectingStore {
        async fn keys(&self) -> VaultResult<Replica> {
            self.inner.keys().await
        }

        async fn set(&self, key: &str, value: &str, version: u64) -> UpdateResult {
            if key == self.reject {
                return UpdateResult::error("rejected");
            }
            self.inner.set(key, value, version).await
        }
    }

    #[tokio::test]
    async fn test_write_failure_is_isolated_per_key() {
        let local = Arc::new(MemoryKeyData::from_replica(replica(&[
            ("bad", "1", 0),
            ("good", "2", 0),
        ])));
        let remote = Arc::new(RejectingStore {
            inner: MemoryKeyData::new(),
            reject: "bad",
        });

        let report = reconcile(local, remote.clone(), EqualVersionPolicy::default())
            .await
            .unwrap()
            .wait_all()
            .await;

        let failed: Vec<_> = report.failed_writes().map(|o| o.key.as_str()).collect();
        assert_eq!(failed, vec!["bad"]);
        assert_eq!(remote.inner.get("good"), Some(ValVer::new("2", 0)));
    }

    fn arb_replica() -> impl Strategy<Value = Replica> {
        prop::collection::btree_map(
            "[a-e]",
            ("[xy]", 0u64..4).prop_map(|(v, ver)| ValVer::new(v, ver)),
            0..5,
        )
    }

    fn apply(local: &mut Replica, remote: &mut Replica, actions: &[PlannedAction]) {
        for action in actions {
            if let Decision::Write { target, value } = &action.decision {
                let side = match target {
                    Side::Local => &mut *local,
                    Side::Remote => &mut *remote,
                };
                side.insert(action.key.clone(), value.clone());
            }
        }
    }

    proptest! {
        #[test]
        fn prop_one_pass_converges(mut local in arb_replica(), mut remote in arb_replica()) {
            let first = plan(&local, &remote, EqualVersionPolicy::LocalWins);
            apply(&mut local, &mut remote, &first);

            let second = plan(&local, &remote, EqualVersionPolicy::LocalWins);
            prop_assert!(second
                .iter()
                .all(|a| matches!(a.decision, Decision::Violation(_))));
        }

        #[test]
        fn prop_identical_replicas_need_nothing(replica in arb_replica()) {
            prop_assert!(plan(&replica, &replica, EqualVersionPolicy::Report).is_empty());
        }
    }
}
