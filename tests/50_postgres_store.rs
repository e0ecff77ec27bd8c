//! Runs against the database named by DATABASE_URL; skipped when it is unset.
//! Each test resets the `drinks` table, so they hold a shared lock.

mod common;

use axum::http::{Method, StatusCode};
use once_cell::sync::Lazy;
use serde_json::json;
use tokio::sync::Mutex;

use coffee_shop_api::database::models::drink::{Ingredient, NewDrink, Recipe};
use coffee_shop_api::database::{DatabaseError, DrinkStore};
use common::{call, create_drink, token, water, MANAGER};

static DB_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn new_drink(title: &str, name: &str) -> NewDrink {
    NewDrink {
        title: title.to_string(),
        recipe: Recipe(vec![Ingredient {
            color: "brown".to_string(),
            name: name.to_string(),
            parts: 1,
        }]),
    }
}

#[tokio::test]
async fn pg_store_lists_in_id_order_and_round_trips_recipes() {
    let _guard = DB_LOCK.lock().await;
    let Some((_, store)) = common::pg_app().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let a = store.insert(new_drink("Mocha", "chocolate")).await.unwrap();
    let b = store.insert(new_drink("Americano", "espresso")).await.unwrap();
    assert!(b.id > a.id);

    let all = store.all().await.unwrap();
    assert_eq!(all, vec![a.clone(), b]);
    assert_eq!(store.get(a.id).await.unwrap(), Some(a));
    assert_eq!(store.get(-1).await.unwrap(), None);
    store.health_check().await.unwrap();
}

#[tokio::test]
async fn pg_store_classifies_constraint_violations() {
    let _guard = DB_LOCK.lock().await;
    let Some((_, store)) = common::pg_app().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    store.insert(new_drink("Latte", "milk")).await.unwrap();
    let err = store.insert(new_drink("Latte", "milk")).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)), "{:?}", err);

    let err = store.insert(new_drink("Huge", &"m".repeat(200))).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Constraint(_)), "{:?}", err);

    let mut mocha = store.insert(new_drink("Mocha", "chocolate")).await.unwrap();
    mocha.title = "Latte".to_string();
    let err = store.update(&mocha).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)), "{:?}", err);

    // Failed writes were rolled back
    let titles: Vec<_> = store.all().await.unwrap().into_iter().map(|d| d.title).collect();
    assert_eq!(titles, vec!["Latte", "Mocha"]);
}

#[tokio::test]
async fn pg_ids_are_not_reused_after_delete() {
    let _guard = DB_LOCK.lock().await;
    let Some((app, _)) = common::pg_app().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let id = create_drink(&app, water()).await;
    let (status, body) = call(&app, Method::DELETE, &format!("/drinks/{}", id), Some(&token(MANAGER)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_id"], id);

    let next = create_drink(&app, water()).await;
    assert!(next > id);
}

#[tokio::test]
async fn pg_rejected_writes_are_422_over_http() {
    let _guard = DB_LOCK.lock().await;
    let Some((app, store)) = common::pg_app().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    create_drink(&app, water()).await;
    let (status, _) = call(&app, Method::POST, "/drinks", Some(&token(MANAGER)), Some(water())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let long_recipe = json!({"title": "Flight", "recipe": [{"color": "brown", "name": "x".repeat(200), "parts": 1}]});
    let (status, _) = call(&app, Method::POST, "/drinks", Some(&token(MANAGER)), Some(long_recipe)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(store.all().await.unwrap().len(), 1);
}
