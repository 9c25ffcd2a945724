//! CARDCHESS Core - Rules engine for card-driven chess
//!
//! This crate provides the rules of CARDCHESS:
//! - Board geometry and standard piece movement
//! - Piece inventory, card decks and the game state
//! - Intent validation and execution (the state transition function)
//! - Legal-intent generation with check filtering and selection queries
//! - A greedy computer opponent

pub mod board;
pub mod pieces;
pub mod cards;
pub mod movement;
pub mod threat;
pub mod config;
pub mod error;
pub mod intent;
pub mod state;
pub mod validate;
pub mod execute;
pub mod legal;
pub mod ai;

// Re-exports for convenient access
pub use board::{Board, BySide, Side, Square, BOARD_SIZE};
pub use pieces::{Lifecycle, Piece, PieceId, PieceType};
pub use cards::{Card, CardId, CardKind, CardPiles, DECK_SIZE, HAND_SIZE};
pub use config::GameConfig;
pub use error::{Illegal, RulesError};
pub use intent::{
    Action, ActionType, BlockCheckPayload, ComboNnPayload, Intent, IntentKind, KingPlacement, KnightPlacement,
    MorphMode, MorphPayload, MoveStep, PlacePayload, Play, PlayMode, SwapPayload,
};
pub use state::{EndReason, GameResult, GameState, GameStatus, LogEntry, Phase, SetupStep, TurnStep};
pub use validate::validate_intent;
pub use legal::Selection;
pub use ai::GreedyPlayer;
