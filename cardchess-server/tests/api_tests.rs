//! Integration tests for cardchess-server API

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use cardchess_core::{Action, GameState, Intent, KingPlacement, Side};
use cardchess_server::{create_router, ServerConfig, ServerState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let config = ServerConfig::default();
    let state = Arc::new(ServerState::new());
    create_router(&config, state)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create_seeded(app: &axum::Router, seed: u64) -> String {
    let (status, json) = send(app, post_json("/api/games", json!({ "seed": seed }))).await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

fn place_king(side: Side, to: &str) -> Value {
    let intent = Intent::setup(side, Action::SetupPlaceKing(KingPlacement { to: to.parse().unwrap() }));
    serde_json::to_value(intent).unwrap()
}

#[tokio::test]
async fn test_status_endpoint() {
    let app = test_app();
    let (status, json) = send(&app, get("/api/status")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["engine"], "rust");
    assert_eq!(json["games"], 0);
}

#[tokio::test]
async fn test_create_game_without_body() {
    let app = test_app();
    let (status, json) = send(&app, post_empty("/api/games")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["rev"], 0);
    assert_eq!(json["state"]["phase"]["stage"], "SETUP");

    let state: GameState = serde_json::from_value(json["state"].clone()).unwrap();
    assert!(state.check_consistency().is_ok());

    let (_, status_json) = send(&app, get("/api/status")).await;
    assert_eq!(status_json["games"], 1);
}

#[tokio::test]
async fn test_get_game() {
    let app = test_app();
    let id = create_seeded(&app, 5).await;

    let (status, json) = send(&app, get(&format!("/api/games/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["result"]["status"], "ONGOING");
}

#[tokio::test]
async fn test_unknown_game_is_404() {
    let app = test_app();
    let (status, json) = send(&app, get("/api/games/missing")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["ok"], false);
}

#[tokio::test]
async fn test_setup_legal_intents() {
    let app = test_app();
    let id = create_seeded(&app, 5).await;

    let (status, json) = send(&app, get(&format!("/api/games/{id}/legal"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["side"], "W");

    // King on any back-rank square except the corners
    let intents = json["intents"].as_array().unwrap();
    assert_eq!(intents.len(), 6);
    assert!(intents.iter().all(|i| i["action"]["type"] == "SETUP_PLACE_KING"));
}

#[tokio::test]
async fn test_submit_with_revision() {
    let app = test_app();
    let id = create_seeded(&app, 5).await;
    let uri = format!("/api/games/{id}/intents");

    let (status, json) = send(&app, post_json(&uri, json!({ "rev": 0, "intent": place_king(Side::White, "e1") }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["rev"], 1);
    assert!(json["summary"].as_str().unwrap().contains("e1"));

    // Stale revision
    let (status, json) = send(&app, post_json(&uri, json!({ "rev": 0, "intent": place_king(Side::Black, "e8") }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["ok"], false);
}

#[tokio::test]
async fn test_illegal_intent_is_rejected() {
    let app = test_app();
    let id = create_seeded(&app, 5).await;

    let (status, json) = send(
        &app,
        post_json(&format!("/api/games/{id}/intents"), json!({ "intent": place_king(Side::White, "a1") })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("illegal intent"));

    let (_, json) = send(&app, get(&format!("/api/games/{id}"))).await;
    assert_eq!(json["rev"], 0);
}

#[tokio::test]
async fn test_ai_moves_through_setup() {
    let app = test_app();
    let id = create_seeded(&app, 9).await;
    let uri = format!("/api/games/{id}/ai-move");

    let (status, json) = send(&app, post_empty(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["intent"]["side"], "W");
    let (_, json) = send(&app, post_empty(&uri)).await;
    assert_eq!(json["intent"]["side"], "B");
    assert_eq!(json["rev"], 2);

    let (_, json) = send(&app, get(&format!("/api/games/{id}"))).await;
    let state: GameState = serde_json::from_value(json["state"].clone()).unwrap();
    assert_eq!(state.side_to_act(), Some(Side::White));
    assert!(!state.is_awaiting_draw());
    assert_eq!(state.hand(Side::White).len(), 8);
}

#[tokio::test]
async fn test_legal_for_card_selection() {
    let app = test_app();
    let id = create_seeded(&app, 9).await;
    let uri = format!("/api/games/{id}/ai-move");
    send(&app, post_empty(&uri)).await;
    send(&app, post_empty(&uri)).await;

    let (_, json) = send(&app, get(&format!("/api/games/{id}"))).await;
    let state: GameState = serde_json::from_value(json["state"].clone()).unwrap();
    let card = state.hand(Side::White)[0];

    let (status, json) = send(&app, get(&format!("/api/games/{id}/legal?side=W&cards={card}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["actionTypes"].is_array());
    for intent in json["intents"].as_array().unwrap() {
        assert_eq!(intent["play"]["cardIds"], json!([card.to_string()]));
    }
}

#[tokio::test]
async fn test_bad_card_list_is_400() {
    let app = test_app();
    let id = create_seeded(&app, 9).await;

    let (status, _) = send(&app, get(&format!("/api/games/{id}/legal?side=W&cards=bogus"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_computer_white_opens_on_create() {
    let app = test_app();
    let (status, json) = send(&app, post_json("/api/games", json!({ "seed": 3, "aiSide": "W" }))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["rev"], 1);
    let state: GameState = serde_json::from_value(json["state"].clone()).unwrap();
    assert_eq!(state.side_to_act(), Some(Side::Black));
}

#[tokio::test]
async fn test_game_log_lists_submissions() {
    let app = test_app();
    let id = create_seeded(&app, 5).await;
    let uri = format!("/api/games/{id}/intents");
    send(&app, post_json(&uri, json!({ "intent": place_king(Side::White, "e1") }))).await;

    // Rejected intents are not logged
    let (status, _) = send(&app, post_json(&uri, json!({ "intent": place_king(Side::Black, "a8") }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, json) = send(&app, get(&format!("/api/games/{id}"))).await;
    let log = json["state"]["log"].as_array().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0]["side"], "W");
    assert_eq!(log[0]["intent"]["action"]["type"], "SETUP_PLACE_KING");
    assert!(log[0]["summary"].as_str().unwrap().contains("e1"));
}

#[tokio::test]
async fn test_delete_game() {
    let app = test_app();
    let id = create_seeded(&app, 5).await;
    let uri = format!("/api/games/{id}");

    let delete = |uri: &str| Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap();
    let (status, json) = send(&app, delete(uri.as_str())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(json, Value::Null);

    let (status, _) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, delete(uri.as_str())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, status_json) = send(&app, get("/api/status")).await;
    assert_eq!(status_json["games"], 0);
}
