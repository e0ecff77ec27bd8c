use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::models::drink::{Ingredient, NewDrink, Recipe};

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Stored recipe is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify driver errors so unique/check violations read the same as the in-memory store
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DatabaseError::Conflict(db_err.message().to_string());
            }
            if db_err.is_check_violation() || db_err.code().as_deref() == Some("22001") {
                return DatabaseError::Constraint(db_err.message().to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Connection and schema lifecycle for the drinks database
pub struct DatabaseManager;

impl DatabaseManager {
    const CREATE_TABLE: &'static str = "CREATE TABLE IF NOT EXISTS drinks (
        id SERIAL PRIMARY KEY,
        title VARCHAR(80) NOT NULL UNIQUE,
        recipe VARCHAR(180) NOT NULL
    )";

    const DROP_TABLE: &'static str = "DROP TABLE IF EXISTS drinks";

    /// Open a pool using the configured connection string
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::validate_url(config.url.as_deref())?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!("Created database pool (max_connections={})", config.max_connections);
        Ok(pool)
    }

    fn validate_url(url: Option<&str>) -> Result<String, DatabaseError> {
        let raw = url.ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let parsed = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match parsed.scheme() {
            "postgres" | "postgresql" => Ok(parsed.into()),
            _ => Err(DatabaseError::InvalidDatabaseUrl),
        }
    }

    /// Create the drinks table. With `reset` the table is dropped first, and
    /// with `seed` a sample drink is inserted after a reset.
    pub async fn init_schema(pool: &PgPool, reset: bool, seed: bool) -> Result<(), DatabaseError> {
        let mut tx = pool.begin().await?;
        if reset {
            sqlx::query(Self::DROP_TABLE).execute(&mut *tx).await?;
            info!("Dropped drinks table");
        }
        sqlx::query(Self::CREATE_TABLE).execute(&mut *tx).await?;

        if reset && seed {
            let sample = Self::sample_drink();
            sqlx::query("INSERT INTO drinks (title, recipe) VALUES ($1, $2)")
                .bind(&sample.title)
                .bind(sample.recipe.to_text()?)
                .execute(&mut *tx)
                .await
                .map_err(DatabaseError::from_sqlx)?;
            info!("Seeded sample drink '{}'", sample.title);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Drink inserted when a freshly reset database is seeded
    pub fn sample_drink() -> NewDrink {
        NewDrink {
            title: "water".to_string(),
            recipe: Recipe(vec![Ingredient {
                color: "blue".to_string(),
                name: "water".to_string(),
                parts: 1,
            }]),
        }
    }
}
