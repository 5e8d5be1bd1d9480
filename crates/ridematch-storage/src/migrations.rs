//! Embedded schema migrations.
//!
//! The SQL lives in `crates/ridematch-storage/migrations/` as reversible
//! `<version>_<name>.up.sql` / `.down.sql` pairs.

use sqlx::PgPool;
use sqlx::migrate::Migrator;

use crate::Result;

/// The embedded migration set.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply every pending migration.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    log::info!("Database migrations applied");
    Ok(())
}

/// Revert every applied migration.
pub async fn revert_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR.undo(pool, 0).await?;
    log::info!("Database migrations reverted");
    Ok(())
}
