//! One synchronization pass between a local replica and the ledger

use std::path::Path;
use std::sync::Arc;

use vault_core::{Replica, UpdateResult, VaultError, VaultResult};
use vault_state::{reconcile, EqualVersionPolicy, KeyData, ReconciliationReport};

/// Read a seed replica: a JSON object of `key -> {value, version}`
pub fn load_seed(path: &Path) -> VaultResult<Replica> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| VaultError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Reconcile `local` against `remote`, wait for every write and log each
/// outcome
pub async fn sync_replicas<L, R>(
    local: Arc<L>,
    remote: Arc<R>,
    policy: EqualVersionPolicy,
) -> VaultResult<ReconciliationReport>
where
    L: KeyData + ?Sized + 'static,
    R: KeyData + ?Sized + 'static,
{
    let report = reconcile(local, remote, policy).await?.wait_all().await;

    for outcome in &report.outcomes {
        match &outcome.result {
            UpdateResult::Success(ack) => {
                tracing::info!(key = %outcome.key, target = %outcome.target, version = ack.version, "synced");
            }
            UpdateResult::Error(e) => {
                tracing::warn!(key = %outcome.key, target = %outcome.target, "sync failed: {}", e);
            }
        }
    }
    for violation in &report.violations {
        tracing::error!("{}", violation);
    }
    for conflict in &report.conflicts {
        tracing::warn!(key = %conflict.key, "unresolved: {:?} vs {:?}", conflict.local, conflict.remote);
    }

    tracing::info!(
        writes = report.outcomes.len(),
        failed = report.failed_writes().count(),
        violations = report.violations.len(),
        conflicts = report.conflicts.len(),
        "sync finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use vault_core::ValVer;
    use vault_state::MemoryKeyData;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("vault-sync-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_seed() {
        let path = temp_file(
            "seed.json",
            r#"{"key1": {"value": "value1", "version": 0}, "key3": {"value": "value3", "version": 2}}"#,
        );
        let seed = load_seed(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(seed.len(), 2);
        assert_eq!(seed["key3"], ValVer::new("value3", 2));
    }

    #[test]
    fn test_load_seed_errors() {
        let missing = load_seed(Path::new("/nonexistent/seed.json"));
        assert!(matches!(missing, Err(VaultError::Config(_))));

        let path = temp_file("bad.json", r#"{"k": {"value": "v"}}"#);
        let bad = load_seed(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(bad, Err(VaultError::Json(_))));
    }

    #[tokio::test]
    async fn test_sync_replicas_converges() {
        let local = Arc::new(MemoryKeyData::from_replica(
            [("a".to_string(), ValVer::new("x", 1))].into_iter().collect(),
        ));
        let remote = Arc::new(MemoryKeyData::from_replica(
            [("b".to_string(), ValVer::new("y", 0))].into_iter().collect(),
        ));

        let report = sync_replicas(local.clone(), remote.clone(), EqualVersionPolicy::default())
            .await
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(local.snapshot(), remote.snapshot());
    }
}
