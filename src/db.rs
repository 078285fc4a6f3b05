use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::AppConfig;

/// Connect to Postgres if configured. `None` means the server should run on
/// in-memory stores: either no URL was given or the database did not answer
/// within the configured timeout.
pub async fn connect(config: &AppConfig) -> Option<PgPool> {
    let Some(url) = config.database_url.as_deref() else {
        info!("DATABASE_URL not set; using in-memory stores");
        return None;
    };

    let timeout = Duration::from_secs(config.db_connect_timeout_secs);
    let connect = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(timeout)
        .connect(url);

    let db = match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(db)) => db,
        Ok(Err(e)) => {
            warn!(error = %e, "database connection failed; continuing with in-memory stores");
            return None;
        }
        Err(_) => {
            warn!(?timeout, "database connection timed out; continuing with in-memory stores");
            return None;
        }
    };

    // Run migrations if present
    if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
        warn!(error = %e, "migration failed; continuing");
    }

    info!("database connected");
    Some(db)
}
