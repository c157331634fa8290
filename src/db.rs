use crate::config::DatabaseConfig;
use crate::error::ApiError;
use crate::migrations::{self, CREATE_SCHEMA_MIGRATIONS};
use crate::models::player::{NewPlayer, Player};
use deadpool_postgres::{Config, Object, Pool, Runtime};
use tokio_postgres::{NoTls, Row};
use tracing::{error, info};

const PLAYER_COLUMNS: &str = "id, created_at, updated_at, deleted_at, name, xp, hp";

/// Key for `pg_advisory_xact_lock` held while migrating.
const MIGRATION_LOCK_ID: i64 = 0x706c_6179_6572;

/// Postgres access for the player table.
/// Holds a deadpool `Pool`; the pool governs concurrent access, so the handle is shared
/// between requests without any extra locking.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Builds the connection pool and verifies the database answers before returning.
    /// Failing here is a startup error; callers do not retry.
    pub async fn new(config: DatabaseConfig) -> Result<Self, ApiError> {
        info!("Connecting to PostgreSQL with {}", config.describe());

        let pool = Self::create_pool(config)?;

        let db = Database { pool };
        db.test_connection().await?;

        Ok(db)
    }

    fn create_pool(config: DatabaseConfig) -> Result<Pool, ApiError> {
        let mut pg_config = Config::new();

        // Set connection parameters
        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);

        // Transport security is always off for the in-network database
        pg_config.ssl_mode = Some(deadpool_postgres::SslMode::Disable);

        // Configure connection pool
        pg_config.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        pg_config.pool = Some(deadpool_postgres::PoolConfig::new(config.max_connections as usize));

        pg_config.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| {
                error!("Failed to create connection pool: {}", e);
                ApiError::Database(format!("Connection pool creation failed: {}", e))
            })
    }

    async fn get_connection(&self) -> Result<Object, ApiError> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// Runs `SELECT 1` on a pooled connection.
    pub async fn test_connection(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[])
            .await
            .map_err(|e| {
                error!("Database connection test failed: {}", e);
                ApiError::Database(format!("Connection test failed: {}", e))
            })?;

        info!("Database connection test successful");
        Ok(())
    }

    /// Applies every embedded migration that the database has not seen yet.
    /// Pending scripts and their `schema_migrations` rows commit in one transaction, and an
    /// advisory lock serializes concurrent migrators, so a failure leaves the schema untouched.
    pub async fn migrate(&self) -> Result<(), ApiError> {
        info!("Running database migrations");

        let mut client = self.get_connection().await?;
        let transaction = client.transaction().await.map_err(ApiError::from)?;

        transaction.execute("SELECT pg_advisory_xact_lock($1)", &[&MIGRATION_LOCK_ID])
            .await
            .map_err(ApiError::from)?;

        transaction.batch_execute(CREATE_SCHEMA_MIGRATIONS)
            .await
            .map_err(|e| {
                error!("Failed to create schema_migrations table: {}", e);
                ApiError::Database(format!("Migration bookkeeping failed: {}", e))
            })?;

        let applied: Vec<i64> = transaction
            .query("SELECT version FROM schema_migrations ORDER BY version", &[])
            .await
            .map_err(ApiError::from)?
            .iter()
            .map(|row| row.get(0))
            .collect();

        let pending = migrations::pending(&applied);
        if pending.is_empty() {
            transaction.commit().await.map_err(ApiError::from)?;
            info!("Schema is up to date ({} migrations applied)", applied.len());
            return Ok(());
        }

        for migration in pending {
            transaction.batch_execute(migration.sql)
                .await
                .map_err(|e| {
                    error!("Migration {} ({}) failed: {}", migration.version, migration.description, e);
                    ApiError::Database(format!("Migration {} failed: {}", migration.version, e))
                })?;

            transaction
                .execute(
                    "INSERT INTO schema_migrations (version, description) VALUES ($1, $2)",
                    &[&migration.version, &migration.description],
                )
                .await
                .map_err(ApiError::from)?;

            info!("Applied migration {}: {}", migration.version, migration.description);
        }

        transaction.commit().await.map_err(ApiError::from)?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Inserts one player and returns the row as stored, with its generated id and timestamps.
    pub async fn insert_player(&self, new_player: NewPlayer) -> Result<Player, ApiError> {
        let client = self.get_connection().await?;

        let query = format!(
            r#"
            INSERT INTO players (created_at, updated_at, deleted_at, name, xp, hp)
            VALUES (NOW(), NOW(), NULL, $1, $2, $3)
            RETURNING {}
            "#,
            PLAYER_COLUMNS
        );

        let row = client.query_one(
            query.as_str(),
            &[&new_player.name, &new_player.xp, &new_player.hp]
        )
        .await
        .map_err(ApiError::from)?;

        let player = row_to_player(&row);

        info!("Created player with id: {}", player.id);
        Ok(player)
    }

    /// Number of players that are not soft-deleted.
    pub async fn count_players(&self) -> Result<i64, ApiError> {
        let client = self.get_connection().await?;

        let row = client.query_one("SELECT COUNT(*) FROM players WHERE deleted_at IS NULL", &[])
            .await
            .map_err(ApiError::from)?;

        Ok(row.get(0))
    }
}

fn row_to_player(row: &Row) -> Player {
    Player {
        id: row.get(0),
        created_at: row.get(1),
        updated_at: row.get(2),
        deleted_at: row.get(3),
        name: row.get(4),
        xp: row.get(5),
        hp: row.get(6),
    }
}
