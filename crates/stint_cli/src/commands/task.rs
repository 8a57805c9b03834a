//! Task commands.

use std::path::Path;
use stint_store::Database;

/// Adds a task and prints its ID.
pub fn add(db_path: &Path, description: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(db_path)?;
    let id = db.add_task(description)?;
    println!("{id}");
    Ok(())
}

/// Lists all tasks.
pub fn list(db_path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(db_path)?;
    let tasks = db.list_tasks()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    for task in &tasks {
        println!("{}  {}", task.id, task.description);
    }
    Ok(())
}
