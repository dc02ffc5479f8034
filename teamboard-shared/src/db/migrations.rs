/// Schema migrations for the document table
///
/// The migration files under `migrations/` are embedded at compile time.
///
/// # Example
///
/// ```no_run
/// use teamboard_shared::db::migrations::{create_database_if_missing, run_migrations};
/// use teamboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example(url: &str) -> Result<(), Box<dyn std::error::Error>> {
/// create_database_if_missing(url).await?;
/// let pool = create_pool(DatabaseConfig::new(url)).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::migrate::{MigrateDatabase, MigrateError, Migrator};
use sqlx::postgres::{PgPool, Postgres};
use tracing::{error, info};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// What the database reports as applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub applied: usize,

    /// Version (file name timestamp) of the newest applied migration
    pub latest_version: Option<i64>,

    /// Migrations embedded in this build
    pub known: usize,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.known
    }
}

/// Applies pending migrations; already-applied ones are skipped
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    info!(known = MIGRATOR.iter().count(), "Applying document store migrations");

    MIGRATOR.run(pool).await.inspect_err(|err| {
        error!(error = %err, "Document store migration failed");
    })
}

/// Reads `_sqlx_migrations`, treating a missing table as nothing applied
pub async fn migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let known = MIGRATOR.iter().count();

    let tracked: bool =
        sqlx::query_scalar("SELECT to_regclass('public._sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await?;

    if !tracked {
        return Ok(MigrationStatus {
            applied: 0,
            latest_version: None,
            known,
        });
    }

    let (applied, latest_version): (i64, Option<i64>) =
        sqlx::query_as("SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success")
            .fetch_one(pool)
            .await?;

    Ok(MigrationStatus {
        applied: applied as usize,
        latest_version,
        known,
    })
}

/// Creates the database named in `url` when the server does not have it yet
pub async fn create_database_if_missing(url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(url).await? {
        return Ok(());
    }

    info!("Creating missing document store database");
    Postgres::create_database(url).await
}
