use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Coord;
use crate::piece::PieceId;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct Move {
    pub piece: PieceId,
    pub from: Coord,
    pub to: Coord,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} -> {}", self.piece.0, self.from, self.to)
    }
}

/// What happened when a move was actually played.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct MoveOutcome {
    pub mv: Move,
    pub captured: Option<PieceId>,
    /// Id of the Treybok that replaced the moving pawn, if it promoted.
    pub promoted: Option<PieceId>,
}
