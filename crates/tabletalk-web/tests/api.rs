use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use tabletalk_common::{MealStatus, MealType};
use tabletalk_db::{InMemoryMealRepository, InMemoryPreferenceRepository, PreferenceRepository, PreferenceVector};
use tabletalk_test_utils::{location_body, north_of, MealBuilder, MILAN};
use tabletalk_web::config::Config;
use tabletalk_web::router::build_router;
use tabletalk_web::state::AppState;

struct TestApp {
    router: Router,
    prefs: Arc<InMemoryPreferenceRepository>,
}

fn app_with_meals(meals: InMemoryMealRepository) -> TestApp {
    let prefs = Arc::new(InMemoryPreferenceRepository::new());
    let state = AppState::new(Config::default(), prefs.clone(), Arc::new(meals));
    TestApp { router: build_router(state), prefs }
}

fn seeded_app() -> TestApp {
    app_with_meals(InMemoryMealRepository::from_records(vec![
        MealBuilder::new("pasta").cuisine("italian").location("Trattoria").record("h1"),
        MealBuilder::new("sushi").cuisine("japanese").at(north_of(MILAN, 2.0)).record("h2"),
        MealBuilder::new("tacos").cuisine("mexican").at(north_of(MILAN, 6.0)).record("h3"),
        MealBuilder::new("online").meal_type(MealType::Virtual).record("h4"),
        MealBuilder::new("over").status(MealStatus::Completed).location("Trattoria").record("h5"),
        MealBuilder::new("remote").at(north_of(MILAN, 40.0)).record("h6"),
    ]))
}

async fn send(app: &TestApp, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

#[tokio::test]
async fn health_is_ok() {
    let app = seeded_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn recommendations_envelope() {
    let app = seeded_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/ai/recommendations?limit=2&radius=10",
        Some("u1"),
        Some(location_body(MILAN)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["meta"]["totalFound"], 3);
    assert_eq!(body["meta"]["recommended"], 2);
    assert_eq!(body["meta"]["radius"], 10.0);
    assert_eq!(body["meta"]["aiProvider"], "smart-internal");

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["rank"], 1);
    assert_eq!(data[1]["rank"], 2);
    assert!(data[0]["score"].as_f64().unwrap() >= data[1]["score"].as_f64().unwrap());
    assert!(data[0]["reason"].as_str().is_some_and(|r| !r.is_empty()));
    assert!(data[0]["distanceKm"].is_number());
    assert_eq!(data[0]["reasonTags"].as_array().unwrap().len(), 2);

    // First use created the preferences
    assert!(app.prefs.find("u1").await.unwrap().is_some());
}

#[tokio::test]
async fn recommendations_accept_lng_lat_pairs() {
    let app = seeded_app();
    let body = json!({ "userLocation": { "coordinates": [MILAN.longitude, MILAN.latitude] } });
    let (status, body) = send(&app, "POST", "/api/ai/recommendations", Some("u1"), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["totalFound"], 3);
    assert_eq!(body["meta"]["radius"], 15.0);
}

#[tokio::test]
async fn no_nearby_meals_returns_empty_list() {
    let app = app_with_meals(InMemoryMealRepository::new());
    let (status, body) = send(
        &app,
        "POST",
        "/api/ai/recommendations",
        Some("u1"),
        Some(location_body(MILAN)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!([]));
    assert!(body["message"].is_string());
    assert!(app.prefs.is_empty().await);
}

#[tokio::test]
async fn recommendations_require_location() {
    let app = seeded_app();
    let (status, body) = send(&app, "POST", "/api/ai/recommendations", Some("u1"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn invalid_location_and_radius_are_client_errors() {
    let app = seeded_app();
    let bad_lat = json!({ "userLocation": { "latitude": 91.0, "longitude": 9.0 } });
    let (status, _) = send(&app, "POST", "/api/ai/recommendations", Some("u1"), Some(bad_lat)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/ai/recommendations?radius=5000",
        Some("u1"),
        Some(location_body(MILAN)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/ai/recommendations?limit=0",
        Some("u1"),
        Some(location_body(MILAN)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_user_header_is_rejected() {
    let app = seeded_app();
    let (status, body) = send(&app, "GET", "/api/ai/preferences", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn preferences_are_created_on_first_read() {
    let app = seeded_app();
    let (status, body) = send(&app, "GET", "/api/ai/preferences", Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userId"], "u1");
    assert_eq!(body["data"]["cuisineAffinity"]["italian"], 0.6);
    assert_eq!(body["data"]["maxDistanceKm"], 15.0);
    assert!(body["message"].is_string());

    let (_, again) = send(&app, "GET", "/api/ai/preferences", Some("u1"), None).await;
    assert_eq!(again["data"]["createdAt"], body["data"]["createdAt"]);
    assert!(again.get("message").is_none());
}

#[tokio::test]
async fn preference_update_validates() {
    let app = seeded_app();
    let patch = json!({ "timeAffinity": { "lunch": 0.9 }, "maxDistanceKm": 30 });
    let (status, body) = send(&app, "PUT", "/api/ai/preferences", Some("u1"), Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["timeAffinity"]["lunch"], 0.9);
    assert_eq!(body["data"]["maxDistanceKm"], 30.0);

    let too_big = json!({ "priceAffinity": { "budget": 1.5 } });
    let (status, _) = send(&app, "PUT", "/api/ai/preferences", Some("u1"), Some(too_big)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unknown = json!({ "cuisineAffinity": { "martian": 0.2 } });
    let (status, _) = send(&app, "PUT", "/api/ai/preferences", Some("u1"), Some(unknown)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let bad_slot = json!({ "timeAffinity": { "brunch": 0.2 } });
    let (status, _) = send(&app, "PUT", "/api/ai/preferences", Some("u1"), Some(bad_slot)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let stored = app.prefs.find("u1").await.unwrap().unwrap();
    assert_eq!(stored.vector.price(tabletalk_common::PriceBand::Budget), 0.4);
}

#[tokio::test]
async fn advanced_preferences_are_stored() {
    let app = seeded_app();
    let patch = json!({
        "locationPreferences": { "preferredAreas": ["Navigli"], "avoidAreas": ["Stazione Centrale"] },
        "advancedPreferences": {
            "allergies": ["nuts", "dairy"],
            "languagePreferences": ["italian", "english"],
            "accessibility": { "wheelchair": true }
        }
    });
    let (status, _) = send(&app, "PUT", "/api/ai/preferences", Some("u1"), Some(patch)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/ai/preferences", Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    let advanced = &body["data"]["advancedPreferences"];
    assert_eq!(advanced["allergies"], json!(["nuts", "dairy"]));
    assert_eq!(advanced["languagePreferences"], json!(["italian", "english"]));
    assert_eq!(advanced["dietaryRestrictions"], json!([]));
    assert_eq!(advanced["accessibility"]["wheelchair"], true);
    assert_eq!(advanced["accessibility"]["visual"], false);
    assert_eq!(body["data"]["locationPreferences"]["avoidAreas"], json!(["Stazione Centrale"]));

    let not_strings = json!({ "advancedPreferences": { "allergies": [1, 2] } });
    let (status, _) = send(&app, "PUT", "/api/ai/preferences", Some("u1"), Some(not_strings)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let too_many = json!({ "advancedPreferences": { "allergies": vec!["nuts"; 21] } });
    let (status, _) = send(&app, "PUT", "/api/ai/preferences", Some("u1"), Some(too_many)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let stored = app.prefs.find("u1").await.unwrap().unwrap();
    assert_eq!(stored.vector.advanced_preferences.allergies, vec!["nuts", "dairy"]);
}

#[tokio::test]
async fn tracking_learns_from_meal_data() {
    let app = seeded_app();
    let body = json!({
        "mealId": "sushi",
        "interactionType": "joined",
        "mealData": {
            "cuisineType": "japanese",
            "scheduledAt": "2026-10-18T19:00:00+02:00",
            "estimatedCost": 25
        }
    });
    let (status, resp) = send(&app, "POST", "/api/ai/track", Some("u1"), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["learned"], true);
    assert_eq!(resp["data"]["activity"]["totalJoined"], 1);

    let prefs = app.prefs.find("u1").await.unwrap().unwrap();
    assert!((prefs.vector.cuisine("japanese") - 0.2).abs() < 1e-9);
    assert!((prefs.vector.time(tabletalk_common::TimeSlot::Dinner) - 0.7).abs() < 1e-9);
    assert!((prefs.vector.price(tabletalk_common::PriceBand::Moderate) - 0.7).abs() < 1e-9);
    assert_eq!(prefs.vector.activity.total_meals, 1);
}

#[tokio::test]
async fn unknown_interaction_type_mutates_nothing() {
    let app = seeded_app();
    send(&app, "GET", "/api/ai/preferences", Some("u1"), None).await;
    let before = app.prefs.find("u1").await.unwrap().unwrap();

    let body = json!({ "interactionType": "liked", "mealData": { "cuisineType": "japanese" } });
    let (status, resp) = send(&app, "POST", "/api/ai/track", Some("u1"), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["success"], false);

    let after = app.prefs.find("u1").await.unwrap().unwrap();
    assert_eq!(after, before);
    assert_eq!(after.vector.activity.total_meals, 0);
}

#[tokio::test]
async fn reset_restores_defaults() {
    let app = seeded_app();
    let patch = json!({ "learningEnabled": false, "cuisineAffinity": { "thai": 0.9 } });
    send(&app, "PUT", "/api/ai/preferences", Some("u1"), Some(patch)).await;

    let (status, body) = send(&app, "DELETE", "/api/ai/preferences", Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["learningEnabled"], true);

    let stored = app.prefs.get_or_create("u1").await.unwrap();
    assert_eq!(stored.vector, PreferenceVector::default());
}

#[tokio::test]
async fn insights_without_preferences() {
    let app = seeded_app();
    let (status, body) = send(&app, "GET", "/api/ai/insights", Some("nobody"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hasPreferences"], false);
    assert!(app.prefs.find("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn insights_summarise_preferences() {
    let app = seeded_app();
    send(&app, "GET", "/api/ai/preferences", Some("u1"), None).await;
    let (status, body) = send(&app, "GET", "/api/ai/insights", Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hasPreferences"], true);
    assert_eq!(body["data"]["topCuisines"][0]["key"], "italian");
    assert_eq!(body["data"]["topCuisines"][0]["score"], 60);
    assert_eq!(body["data"]["preferredTimeSlots"][0]["key"], "dinner");
}

#[tokio::test]
async fn sample_seed_file_serves_recommendations() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/meals.sample.json");
    let app = app_with_meals(InMemoryMealRepository::load_json(path).await.unwrap());

    let (status, body) = send(
        &app,
        "POST",
        "/api/ai/recommendations",
        Some("user-ben"),
        Some(location_body(MILAN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["totalFound"], 3);
    assert_eq!(body["meta"]["aiProvider"], "smart-internal");
}
