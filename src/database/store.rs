use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::drink::{Drink, DrinkRow, NewDrink};

/// Persistence operations the drink handlers rely on
#[async_trait]
pub trait DrinkStore: Send + Sync {
    /// Every drink, ordered by id ascending
    async fn all(&self) -> Result<Vec<Drink>, DatabaseError>;

    async fn get(&self, id: i32) -> Result<Option<Drink>, DatabaseError>;

    /// Insert a new drink; the store assigns the id
    async fn insert(&self, drink: NewDrink) -> Result<Drink, DatabaseError>;

    /// Persist title and recipe of an existing drink
    async fn update(&self, drink: &Drink) -> Result<(), DatabaseError>;

    async fn delete(&self, id: i32) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Postgres-backed store. Every write runs in its own transaction.
#[derive(Clone)]
pub struct PgDrinkStore {
    pool: PgPool,
}

impl PgDrinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    async fn all(&self) -> Result<Vec<Drink>, DatabaseError> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| Drink::try_from(row).map_err(DatabaseError::from))
            .collect()
    }

    async fn get(&self, id: i32) -> Result<Option<Drink>, DatabaseError> {
        let row = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Drink::try_from).transpose().map_err(DatabaseError::from)
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, DatabaseError> {
        let recipe = drink.recipe.to_text()?;
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, DrinkRow>(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(&recipe)
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(row) => {
                tx.commit().await?;
                Ok(Drink::try_from(row)?)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(DatabaseError::from_sqlx(e))
            }
        }
    }

    async fn update(&self, drink: &Drink) -> Result<(), DatabaseError> {
        let recipe = drink.recipe.to_text()?;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE drinks SET title = $1, recipe = $2 WHERE id = $3")
            .bind(&drink.title)
            .bind(&recipe)
            .bind(drink.id)
            .execute(&mut *tx)
            .await;

        match updated {
            Ok(_) => Ok(tx.commit().await?),
            Err(e) => {
                tx.rollback().await?;
                Err(DatabaseError::from_sqlx(e))
            }
        }
    }

    async fn delete(&self, id: i32) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        tx.commit().await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
