use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::drink::{Drink, NewDrink, RECIPE_MAX_LEN, TITLE_MAX_LEN};
use crate::database::store::DrinkStore;

/// In-process store with the same constraints as the `drinks` table:
/// unique titles, column widths, and ids that are never handed out twice.
#[derive(Default)]
pub struct MemoryDrinkStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    rows: BTreeMap<i32, Drink>,
    last_id: i32,
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the sample drink, mirroring a seeded database
    pub async fn seeded() -> Result<Self, DatabaseError> {
        let store = Self::new();
        store.insert(DatabaseManager::sample_drink()).await?;
        Ok(store)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_columns(drink: &Drink) -> Result<(), DatabaseError> {
        if drink.title.chars().count() > TITLE_MAX_LEN {
            return Err(DatabaseError::Constraint(format!(
                "title longer than {} characters",
                TITLE_MAX_LEN
            )));
        }
        if drink.recipe.to_text()?.chars().count() > RECIPE_MAX_LEN {
            return Err(DatabaseError::Constraint(format!(
                "recipe longer than {} characters",
                RECIPE_MAX_LEN
            )));
        }
        Ok(())
    }

    fn check_unique_title(inner: &Inner, drink: &Drink) -> Result<(), DatabaseError> {
        let taken = inner
            .rows
            .values()
            .any(|other| other.id != drink.id && other.title == drink.title);
        if taken {
            return Err(DatabaseError::Conflict(format!(
                "title '{}' already exists",
                drink.title
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn all(&self) -> Result<Vec<Drink>, DatabaseError> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Drink>, DatabaseError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, DatabaseError> {
        let mut inner = self.inner.write().await;
        let candidate = Drink {
            id: inner.last_id + 1,
            title: drink.title,
            recipe: drink.recipe,
        };
        Self::check_columns(&candidate)?;
        Self::check_unique_title(&inner, &candidate)?;

        inner.last_id = candidate.id;
        inner.rows.insert(candidate.id, candidate.clone());
        Ok(candidate)
    }

    async fn update(&self, drink: &Drink) -> Result<(), DatabaseError> {
        let mut inner = self.inner.write().await;
        Self::check_columns(drink)?;
        Self::check_unique_title(&inner, drink)?;

        // Matches UPDATE semantics: a missing row is not an error
        if let Some(row) = inner.rows.get_mut(&drink.id) {
            *row = drink.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), DatabaseError> {
        self.inner.write().await.rows.remove(&id);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
