//! Favorites, shopping cart and subscription flows over HTTP.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use common::{spawn_app, token_auth};
use serde_json::Value;

#[tokio::test]
async fn test_favorite_toggle() {
    let app = spawn_app().await;
    let (_, julia) = app.user("julia").await;
    let (_, jamie) = app.user("jamie").await;
    let salt = app.ingredient("Salt", "g").await;
    let id = app.recipe(&julia, "Soup", &[(salt, 5)]).await;
    let url = format!("/api/recipes/{}/favorite/", id);

    let response = app
        .server
        .post(&url)
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await;
    response.assert_status(StatusCode::CREATED);
    let summary: Value = response.json();
    assert_eq!(summary["id"], id);
    assert_eq!(summary["name"], "Soup");
    assert_eq!(summary["cooking_time"], 25);
    assert!(summary.get("ingredients").is_none());

    app.server
        .post(&url)
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await
        .assert_status_bad_request();

    let recipe: Value = app
        .server
        .get(&format!("/api/recipes/{}/", id))
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await
        .json();
    assert_eq!(recipe["is_favorited"], true);
    assert_eq!(recipe["is_in_shopping_cart"], false);

    app.server
        .delete(&url)
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .delete(&url)
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await
        .assert_status_not_found();

    app.server
        .post("/api/recipes/9999/favorite/")
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await
        .assert_status_not_found();
    app.server.post(&url).await.assert_status_unauthorized();
}

#[tokio::test]
async fn test_shopping_list_download() {
    let app = spawn_app().await;
    let (_, julia) = app.user("julia").await;
    let salt = app.ingredient("Salt", "g").await;
    let milk = app.ingredient("Milk", "ml").await;
    let soup = app.recipe(&julia, "Soup", &[(salt, 10), (milk, 200)]).await;
    let stew = app.recipe(&julia, "Stew", &[(salt, 5)]).await;

    app.server
        .get("/api/recipes/download_shopping_cart/")
        .add_header(AUTHORIZATION, token_auth(&julia))
        .await
        .assert_status_not_found();

    app.add_to_cart(&julia, soup).await;
    app.add_to_cart(&julia, stew).await;

    let response = app
        .server
        .get("/api/recipes/download_shopping_cart/")
        .add_header(AUTHORIZATION, token_auth(&julia))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=shopping_list.txt"
    );

    let text = response.text();
    assert!(text.contains("\nSalt - 15 g\n"), "{}", text);
    assert!(text.contains("\nMilk - 200 ml\n"), "{}", text);
    // Smaller totals come first.
    assert!(text.find("Salt").unwrap() < text.find("Milk").unwrap());
    assert!(text.starts_with("Shopping list for: "));

    app.server
        .delete(&format!("/api/recipes/{}/shopping_cart/", soup))
        .add_header(AUTHORIZATION, token_auth(&julia))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let text = app
        .server
        .get("/api/recipes/download_shopping_cart/")
        .add_header(AUTHORIZATION, token_auth(&julia))
        .await
        .text();
    assert!(text.contains("\nSalt - 5 g\n"), "{}", text);
    assert!(!text.contains("Milk"));
}

#[tokio::test]
async fn test_shopping_list_requires_token() {
    let app = spawn_app().await;
    app.server
        .get("/api/recipes/download_shopping_cart/")
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_subscribe_cycle() {
    let app = spawn_app().await;
    let (julia_id, julia) = app.user("julia").await;
    let (jamie_id, jamie) = app.user("jamie").await;
    let salt = app.ingredient("Salt", "g").await;
    for name in ["Soup", "Stew", "Pie"] {
        app.recipe(&julia, name, &[(salt, 5)]).await;
    }

    app.server
        .post(&format!("/api/users/{}/subscribe/", jamie_id))
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await
        .assert_status_bad_request();

    let response = app
        .server
        .post(&format!("/api/users/{}/subscribe/", julia_id))
        .add_query_param("recipes_limit", 2)
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await;
    response.assert_status(StatusCode::CREATED);
    let subscription: Value = response.json();
    assert_eq!(subscription["username"], "julia");
    assert_eq!(subscription["is_subscribed"], true);
    assert_eq!(subscription["recipes_count"], 3);
    assert_eq!(subscription["recipes"].as_array().unwrap().len(), 2);

    app.server
        .post(&format!("/api/users/{}/subscribe/", julia_id))
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await
        .assert_status_bad_request();

    let profile: Value = app
        .server
        .get(&format!("/api/users/{}/", julia_id))
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await
        .json();
    assert_eq!(profile["is_subscribed"], true);

    let page: Value = app
        .server
        .get("/api/users/subscriptions/")
        .add_query_param("recipes_limit", 1)
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await
        .json();
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["id"], julia_id);
    assert_eq!(page["results"][0]["recipes"].as_array().unwrap().len(), 1);

    // A non-numeric limit is ignored.
    let page: Value = app
        .server
        .get("/api/users/subscriptions/")
        .add_query_param("recipes_limit", "lots")
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await
        .json();
    assert_eq!(page["results"][0]["recipes"].as_array().unwrap().len(), 3);

    app.server
        .delete(&format!("/api/users/{}/subscribe/", julia_id))
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .delete(&format!("/api/users/{}/subscribe/", julia_id))
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await
        .assert_status_not_found();

    app.server
        .post("/api/users/9999/subscribe/")
        .add_header(AUTHORIZATION, token_auth(&jamie))
        .await
        .assert_status_not_found();
}
