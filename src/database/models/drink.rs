use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Column width of `drinks.title`
pub const TITLE_MAX_LEN: usize = 80;
/// Column width of `drinks.recipe` (serialized JSON text)
pub const RECIPE_MAX_LEN: usize = 180;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub color: String,
    pub name: String,
    pub parts: u32,
}

/// Ordered list of ingredients. Clients may send a single ingredient object,
/// which is treated as a one-element recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecipeInput")]
pub struct Recipe(pub Vec<Ingredient>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl From<RecipeInput> for Recipe {
    fn from(input: RecipeInput) -> Self {
        match input {
            RecipeInput::Many(items) => Recipe(items),
            RecipeInput::One(item) => Recipe(vec![item]),
        }
    }
}

impl Recipe {
    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Recipe,
}

/// A drink that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Recipe,
}

/// Raw `drinks` row; the recipe column holds JSON text
#[derive(Debug, Clone, FromRow)]
pub struct DrinkRow {
    pub id: i32,
    pub title: String,
    pub recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = serde_json::Error;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe: Recipe::from_text(&row.recipe)?,
        })
    }
}

/// Public projection: ingredient names are withheld
#[derive(Debug, Serialize)]
pub struct ShortDrink<'a> {
    pub id: i32,
    pub title: &'a str,
    pub recipe: Vec<ShortIngredient<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ShortIngredient<'a> {
    pub color: &'a str,
    pub parts: u32,
}

/// Full projection for callers holding a detail or write permission
#[derive(Debug, Serialize)]
pub struct LongDrink<'a> {
    pub id: i32,
    pub title: &'a str,
    pub recipe: &'a [Ingredient],
}

impl Drink {
    pub fn short(&self) -> ShortDrink<'_> {
        ShortDrink {
            id: self.id,
            title: &self.title,
            recipe: self
                .recipe
                .ingredients()
                .iter()
                .map(|i| ShortIngredient {
                    color: &i.color,
                    parts: i.parts,
                })
                .collect(),
        }
    }

    pub fn long(&self) -> LongDrink<'_> {
        LongDrink {
            id: self.id,
            title: &self.title,
            recipe: self.recipe.ingredients(),
        }
    }
}
