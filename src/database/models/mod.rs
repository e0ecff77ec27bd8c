pub mod drink;

pub use drink::{Drink, DrinkRow, Ingredient, LongDrink, NewDrink, Recipe, ShortDrink, ShortIngredient};
