//! Server state management
//!
//! Games live in memory, keyed by id, each with a revision counter. Every
//! submission runs draw -> validate/apply -> draw under one write lock and
//! bumps the revision, so clients holding a stale revision are rejected.

use cardchess_core::{GameConfig, GameState, GreedyPlayer, Intent, RulesError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

/// Store failures, mapped to HTTP statuses by the routes
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("game {0} not found")]
    NotFound(String),

    #[error("revision conflict: expected {expected}, current is {current}")]
    Conflict { expected: u64, current: u64 },

    #[error("no legal intent for the side to act")]
    NothingToPlay,

    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// One stored game
#[derive(Clone, Debug, Serialize)]
pub struct GameSession {
    pub state: GameState,
    pub rev: u64,
}

/// Revisioned in-memory game store
pub struct GameStore {
    games: RwLock<HashMap<String, GameSession>>,
    next_id: AtomicU64,
}

impl GameStore {
    pub fn new() -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a game in setup, revision 0
    pub async fn create(&self, config: &GameConfig) -> (String, GameSession) {
        let id = format!("g{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let session = GameSession {
            state: GameState::new(config),
            rev: 0,
        };
        self.games.write().await.insert(id.clone(), session.clone());
        tracing::info!("Created game {} (seed {:?})", id, config.seed);
        (id, session)
    }

    pub async fn get(&self, id: &str) -> Result<GameSession, StoreError> {
        self.games
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Drop a game; later requests for it get `NotFound`
    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        if self.games.write().await.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        tracing::info!("Removed game {}", id);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.games.read().await.len()
    }

    /// Apply an intent; `expected_rev` must match the stored revision when given
    pub async fn submit(&self, id: &str, expected_rev: Option<u64>, intent: &Intent) -> Result<GameSession, StoreError> {
        let mut games = self.games.write().await;
        let session = games
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(expected) = expected_rev {
            if expected != session.rev {
                return Err(StoreError::Conflict { expected, current: session.rev });
            }
        }

        let next = session
            .state
            .advance_draw_phase()
            .apply_intent(intent)?
            .advance_draw_phase();

        session.state = next;
        session.rev += 1;
        tracing::debug!("Game {} rev {}: {}", id, session.rev, intent);

        let result = session.state.evaluate_result();
        if result.is_ended() {
            tracing::info!("Game {} ended: winner {:?}, reason {:?}", id, result.winner, result.reason);
        } else if session.state.is_stalled() {
            tracing::warn!("Game {} stalled: no legal intents outside check", id);
        }
        Ok(session.clone())
    }

    /// Let the greedy player move for the side to act, through `submit`
    pub async fn ai_move(&self, id: &str) -> Result<(Intent, GameSession), StoreError> {
        let session = self.get(id).await?;
        let state = session.state.advance_draw_phase();
        let intent = GreedyPlayer::with_seed(session.rev)
            .choose(&state)
            .ok_or(StoreError::NothingToPlay)?;
        let next = self.submit(id, Some(session.rev), &intent).await?;
        Ok((intent, next))
    }

    /// Play for the configured `ai_side` while it is the side to act.
    /// Stops on game end or when the computer has nothing legal to play.
    pub async fn run_ai_side(&self, id: &str) -> Result<GameSession, StoreError> {
        let mut session = self.get(id).await?;
        while let Some(ai_side) = session.state.config().ai_side {
            if session.state.evaluate_result().is_ended() || session.state.side_to_act() != Some(ai_side) {
                break;
            }
            match self.ai_move(id).await {
                Ok((_, next)) => session = next,
                Err(StoreError::NothingToPlay) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(session)
    }
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Server-wide shared state
pub struct ServerState {
    pub games: GameStore,
}

impl ServerState {
    pub fn new() -> Self {
        Self { games: GameStore::new() }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
