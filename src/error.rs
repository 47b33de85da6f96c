use thiserror::Error;

use crate::board::Coord;
use crate::piece::PieceId;

/// Why a requested move was turned down. Rejections leave the match untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("game already over")]
    GameOver,
    #[error("no piece with id {0:?}")]
    UnknownPiece(PieceId),
    #[error("piece {0:?} has been captured")]
    PieceCaptured(PieceId),
    #[error("piece {0:?} does not belong to the side to move")]
    NotYourTurn(PieceId),
    #[error("piece {0:?} may not move this turn")]
    PieceDisabled(PieceId),
    #[error("target {0} is off the board")]
    OutOfBounds(Coord),
    #[error("illegal move: {piece:?} to {to}")]
    IllegalMove { piece: PieceId, to: Coord },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid rules json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("promotion rank {0} outside 1..=7")]
    InvalidPromotionRank(u8),
}
