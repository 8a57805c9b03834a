//! Serve command implementation.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use stint_store::Database;
use stint_sync_server::{serve, ServerConfig, SyncServer, TokenRegistry};
use tracing::warn;

/// Runs the sync server until interrupted.
pub fn run(
    bind: SocketAddr,
    db_path: &Path,
    tokens_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = TokenRegistry::from_file(tokens_path)?;
    if registry.is_empty() {
        warn!(
            path = %tokens_path.display(),
            "tokens file has no entries; every request will be refused"
        );
    }

    let store = Database::open(db_path)?;
    let server = Arc::new(SyncServer::new(store));
    let config = ServerConfig::new(bind);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(&config, server, Arc::new(registry)))?;
    Ok(())
}
