use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::api::AppState;
use crate::auth::Claims;
use crate::database::models::drink::{Drink, NewDrink, Recipe};
use crate::error::{ApiError, ApiResult};

/// Body accepted by POST /drinks and PATCH /drinks/:id.
/// The recipe stays raw until a branch actually uses it.
#[derive(Debug, Deserialize)]
pub struct DrinkPayload {
    pub title: Option<String>,
    pub recipe: Option<Value>,
}

fn parse_body(body: Result<Json<DrinkPayload>, JsonRejection>) -> ApiResult<DrinkPayload> {
    body.map(|Json(payload)| payload).map_err(|e| {
        debug!("Rejected drink body: {}", e);
        ApiError::Unprocessable
    })
}

fn parse_recipe(raw: Value) -> ApiResult<Recipe> {
    serde_json::from_value(raw).map_err(|e| {
        debug!("Rejected recipe: {}", e);
        ApiError::Unprocessable
    })
}

/// Ids that are not integers cannot exist
fn parse_id(raw: &str) -> ApiResult<i32> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

/// GET /drinks - public listing with ingredient names withheld
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let drinks = state.store.all().await?;
    let short: Vec<_> = drinks.iter().map(Drink::short).collect();

    Ok(Json(json!({ "success": true, "drinks": short })))
}

/// GET /drinks-detail - full recipes, requires `get:drinks-detail`
pub async fn detail(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Value>> {
    let drinks = state.store.all().await?;
    debug!(sub = ?claims.sub, count = drinks.len(), "Listing drink details");
    let long: Vec<_> = drinks.iter().map(Drink::long).collect();

    Ok(Json(json!({ "success": true, "drinks": long })))
}

/// POST /drinks - create a drink, requires `post:drinks`
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<DrinkPayload>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let payload = parse_body(body)?;
    let (Some(title), Some(recipe)) = (payload.title, payload.recipe) else {
        return Err(ApiError::Unprocessable);
    };

    let recipe = parse_recipe(recipe)?;

    let drink = state.store.insert(NewDrink { title, recipe }).await?;
    info!(id = drink.id, sub = ?claims.sub, "Created drink '{}'", drink.title);

    Ok(Json(json!({ "success": true, "drinks": [drink.long()] })))
}

/// PATCH /drinks/:id - requires `post:drinks`.
/// A non-empty title wins; the recipe is only applied when no title is given.
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Result<Json<DrinkPayload>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id)?;
    let mut drink = state.store.get(id).await?.ok_or(ApiError::NotFound)?;
    let payload = parse_body(body)?;

    match (payload.title, payload.recipe) {
        (Some(title), _) if !title.is_empty() => drink.title = title,
        (_, Some(raw)) => {
            let recipe = parse_recipe(raw)?;
            if !recipe.is_empty() {
                drink.recipe = recipe;
            }
        }
        _ => {}
    }

    state.store.update(&drink).await?;
    info!(id = drink.id, sub = ?claims.sub, "Updated drink '{}'", drink.title);

    Ok(Json(json!({ "success": true, "drinks": [drink.long()] })))
}

/// DELETE /drinks/:id - requires `delete:drinks`
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id)?;
    if state.store.get(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    state.store.delete(id).await?;
    info!(id, sub = ?claims.sub, "Deleted drink");

    Ok(Json(json!({ "success": true, "deleted_id": id })))
}
