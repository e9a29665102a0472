// src/cli/migrate.rs — Database migration command
//
// Migrations run automatically when the database is opened. This command
// reports what is applied, or reverts the latest migration for development.

use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

use super::print_json;
use crate::memory::schema;

#[derive(Debug, Serialize)]
struct AppliedMigration {
    version: u32,
    name: String,
    applied_at: String,
}

fn applied_migrations(conn: &Connection) -> anyhow::Result<Vec<AppliedMigration>> {
    // current_version creates the tracking table if needed.
    schema::current_version(conn)?;
    let mut stmt =
        conn.prepare("SELECT version, name, applied_at FROM _migrations ORDER BY version")?;
    let rows = stmt.query_map([], |row| {
        Ok(AppliedMigration {
            version: row.get(0)?,
            name: row.get(1)?,
            applied_at: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn run_migrate(db_path: &Path, status_only: bool, rollback: bool) -> anyhow::Result<()> {
    if !db_path.exists() && (status_only || rollback) {
        return print_json(&json!({
            "database": db_path,
            "exists": false,
        }));
    }
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(db_path)?;

    let reverted = if rollback {
        schema::rollback_last(&conn)?
    } else {
        if !status_only {
            schema::run_migrations(&conn)?;
        }
        None
    };

    print_json(&json!({
        "database": db_path,
        "current_version": schema::current_version(&conn)?,
        "latest_version": schema::latest_version(),
        "reverted": reverted,
        "applied": applied_migrations(&conn)?,
    }))
}
