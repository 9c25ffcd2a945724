//! Game API endpoints
//!
//! Create games, read them back, list legal intents and submit intents
//! (player or computer) through the revisioned store.

use super::error::ApiError;
use crate::state::ServerState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use cardchess_core::{ActionType, CardId, GameConfig, GameResult, GameState, Intent, Selection, Side};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: String,
    pub rev: u64,
    pub state: GameState,
}

/// Create a game; the body is an optional `GameConfig`.
/// When the computer plays White it opens right away.
pub async fn create_game(
    State(state): State<Arc<ServerState>>,
    config: Option<Json<GameConfig>>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let config = config.map(|Json(c)| c).unwrap_or_default();
    let (id, _) = state.games.create(&config).await;
    let session = state.games.run_ai_side(&id).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            rev: session.rev,
            state: session.state,
        }),
    ))
}

#[derive(Serialize)]
pub struct GameResponse {
    pub id: String,
    pub rev: u64,
    pub state: GameState,
    pub result: GameResult,
}

pub async fn get_game(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let session = state.games.get(&id).await?;
    let result = session.state.evaluate_result();
    Ok(Json(GameResponse {
        id,
        rev: session.rev,
        state: session.state,
        result,
    }))
}

/// Forget a finished or abandoned game
pub async fn delete_game(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.games.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct LegalQuery {
    /// Defaults to the side to act
    pub side: Option<Side>,
    /// Comma-separated card ids, e.g. `c_0001,c_0002`
    pub cards: Option<String>,
    pub action: Option<ActionType>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalResponse {
    pub side: Option<Side>,
    pub intents: Vec<Intent>,
    /// Only present when cards were selected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_types: Option<Vec<ActionType>>,
}

fn parse_cards(list: &str) -> Result<Vec<CardId>, ApiError> {
    list.split(',')
        .filter(|s| !s.is_empty())
        .map(|s| s.trim().parse::<CardId>().map_err(ApiError::BadRequest))
        .collect()
}

/// Legal intents for a side, optionally narrowed to a card selection
pub async fn get_legal(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Query(query): Query<LegalQuery>,
) -> Result<Json<LegalResponse>, ApiError> {
    let session = state.games.get(&id).await?;
    let game = session.state.advance_draw_phase();

    let Some(side) = query.side.or_else(|| game.side_to_act()) else {
        return Ok(Json(LegalResponse {
            side: None,
            intents: Vec::new(),
            action_types: None,
        }));
    };

    let response = match query.cards.as_deref() {
        Some(list) => {
            let cards = parse_cards(list)?;
            let mut selection = Selection::cards(cards.clone());
            if let Some(action) = query.action {
                selection = selection.with_action(action);
            }
            LegalResponse {
                side: Some(side),
                intents: game.intents_for_selection(side, &selection),
                action_types: Some(game.available_action_types(side, &cards)),
            }
        }
        None => {
            let mut intents = game.legal_intents(side);
            if let Some(action) = query.action {
                intents.retain(|i| i.action.action_type() == action);
            }
            LegalResponse {
                side: Some(side),
                intents,
                action_types: None,
            }
        }
    };
    Ok(Json(response))
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    /// Revision the client last saw; omitted means "whatever is current"
    pub rev: Option<u64>,
    pub intent: Intent,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
    pub rev: u64,
    pub result: GameResult,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
}

pub async fn submit_intent(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    state.games.submit(&id, req.rev, &req.intent).await?;
    // The configured computer side answers in the same request
    let session = state.games.run_ai_side(&id).await?;
    Ok(Json(SubmitResponse {
        ok: true,
        rev: session.rev,
        result: session.state.evaluate_result(),
        summary: req.intent.to_string(),
        intent: None,
    }))
}

/// Let the computer play the side to act
pub async fn ai_move(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let (intent, session) = state.games.ai_move(&id).await?;
    Ok(Json(SubmitResponse {
        ok: true,
        rev: session.rev,
        result: session.state.evaluate_result(),
        summary: intent.to_string(),
        intent: Some(intent),
    }))
}
