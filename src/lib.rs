pub mod board;
pub mod check;
pub mod config;
pub mod controller;
pub mod error;
pub mod hooks;
pub mod moves;
pub mod pathing;
pub mod piece;
pub mod position;
pub mod simulate;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

pub use board::{Board, Cell, CellState, Coord};
pub use check::{CheckAnalysis, EndState};
pub use config::Rules;
pub use controller::{MatchController, TurnReport};
pub use error::{ConfigError, MoveError};
pub use hooks::Hooks;
pub use moves::{Move, MoveOutcome};
pub use piece::{Piece, PieceId, PieceKind, Side};
pub use position::Position;
