//! `SQLite` schema definitions for churchdesk.
//!
//! Record collections are stored whole, one JSON document per key, in the
//! `local_storage` table.

/// SQL statement to create the key-value table holding collections.
pub const CREATE_LOCAL_STORAGE_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create an index on `updated_at` for recency listings.
pub const CREATE_UPDATED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_local_storage_updated ON local_storage(updated_at DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";
