//! Schema versioning for the churchdesk database.
//!
//! The version lives in the `metadata` table. Each step in [`MIGRATIONS`]
//! runs in its own transaction and stamps its version on commit, so an
//! interrupted upgrade resumes from the last completed step.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{CREATE_LOCAL_STORAGE_TABLE, CREATE_METADATA_TABLE, CREATE_UPDATED_INDEX};

/// Key holding the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Ordered schema steps: the version each produces and the statements it runs.
const MIGRATIONS: &[(i32, &[&str])] = &[(
    1,
    &[CREATE_LOCAL_STORAGE_TABLE, CREATE_UPDATED_INDEX],
)];

/// The schema version this build writes.
pub const CURRENT_VERSION: i32 = 1;

/// Bring the database up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns [`Error::DatabaseMigration`] if the stored version is unreadable
/// or newer than this build understands, or a query error if a step fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let version = schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported {CURRENT_VERSION}"
            ),
        });
    }

    for &(target, statements) in MIGRATIONS.iter().filter(|(v, _)| *v > version) {
        apply_step(conn, target, statements)?;
        info!("Migrated database schema to version {}", target);
    }

    debug!("Database schema at version {}", CURRENT_VERSION);
    Ok(())
}

/// The stored schema version, or 0 for a database never stamped.
///
/// # Errors
///
/// Returns an error if the metadata query fails or the marker is not a number.
pub(crate) fn schema_version(conn: &Connection) -> Result<i32> {
    match conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get::<_, String>(0),
    ) {
        Ok(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

fn apply_step(conn: &Connection, version: i32, statements: &[&str]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for statement in statements {
        tx.execute(statement, [])?;
    }
    tx.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    tx.commit()?;
    Ok(())
}
