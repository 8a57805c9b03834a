//! Sync command implementation.

use std::path::Path;
use stint_model::Record;
use stint_store::Database;
use stint_sync_engine::{
    load_baseline, store_baseline, HttpTransport, ResolvePolicy, SyncClient, SyncConfig, SyncError,
};
use stint_sync_protocol::Conflict;

/// Runs one sync round against a remote server and persists the new
/// baseline on success.
pub fn run(
    server: &str,
    token: &str,
    db_path: &Path,
    baseline_path: &Path,
    policy: ResolvePolicy,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = SyncConfig::new(server, token).with_resolve(policy);
    let store = Database::open(db_path)?;
    let transport = HttpTransport::from_config(&config)?;
    let client = SyncClient::new(transport, store).with_policy(config.resolve);

    let baseline = load_baseline(baseline_path)?;
    let outcome = match client.sync(baseline) {
        Ok(outcome) => outcome,
        Err(SyncError::Unresolved { conflicts }) => {
            eprintln!(
                "conflicts: {} sessions, {} timeframes, {} tasks",
                conflicts.sessions.len(),
                conflicts.timeframes.len(),
                conflicts.tasks.len()
            );
            for conflict in &conflicts.sessions {
                eprintln!("  session {}", conflict_id(conflict));
            }
            for conflict in &conflicts.timeframes {
                eprintln!("  timeframe {}", conflict_id(conflict));
            }
            for conflict in &conflicts.tasks {
                eprintln!("  task {}", conflict_id(conflict));
            }
            return Err(
                "conflicts detected; settle them with --resolve local or --resolve remote".into(),
            );
        }
        Err(err) => return Err(err.into()),
    };

    if outcome.first_sync {
        println!("first sync: no usable baseline, merged additively");
    }
    println!(
        "pushed {} corrections ({} sessions, {} timeframes, {} tasks), resolved {} conflicts",
        outcome.pushed.len(),
        outcome.pushed.sessions.len(),
        outcome.pushed.timeframes.len(),
        outcome.pushed.tasks.len(),
        outcome.resolved
    );

    store_baseline(baseline_path, &outcome.baseline)?;
    println!("baseline stored at {}", baseline_path.display());
    Ok(())
}

fn conflict_id<T: Record>(conflict: &Conflict<T>) -> &str {
    conflict
        .local
        .as_ref()
        .or(conflict.remote.as_ref())
        .or(conflict.original.as_ref())
        .map(Record::id)
        .unwrap_or("?")
}
