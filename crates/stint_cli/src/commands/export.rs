//! Export command implementation.

use std::path::Path;
use stint_store::Database;

/// Prints the store's full snapshot as JSON, in the sync wire format.
pub fn run(db_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(db_path)?;
    let snapshot = db.export()?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
