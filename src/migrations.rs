//! Versioned schema scripts, embedded at compile time and applied by `Database::migrate`.
//!
//! Scripts are additive: they may create tables, columns and indexes but never drop or
//! rename anything. A new schema change is a new entry at the end of `MIGRATIONS`.

#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "create players table",
    sql: include_str!("../migrations/0001_create_players.sql"),
}];

/// Bookkeeping table listing the versions already applied to a database.
pub const CREATE_SCHEMA_MIGRATIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        version BIGINT PRIMARY KEY,
        description TEXT NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// Migrations whose version is not in `applied`, in ascending version order.
pub fn pending(applied: &[i64]) -> Vec<&'static Migration> {
    let mut pending: Vec<&'static Migration> = MIGRATIONS
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .collect();
    pending.sort_by_key(|m| m.version);
    pending
}
