use serde::{Deserialize, Serialize};

use crate::board::Coord;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Rank direction this side's pawns advance in.
    pub fn forward(self) -> i32 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
    /// What a pawn becomes inside the promotion zone.
    Treybok,
}

/// How a piece kind reaches its candidate cells.
///
/// Offsets are `(file, rank)`. When `side_relative` is set the rank component
/// is multiplied by the owner's forward sign, so "forward" always points at
/// the opponent.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Movement {
    Rays {
        directions: &'static [(i32, i32)],
        reach: usize,
        side_relative: bool,
    },
    Leaps(&'static [(i32, i32)]),
    Pawn,
}

static ORTHOGONAL: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

static ALL_DIRECTIONS: [(i32, i32); 8] = [
    (0, 1), (0, -1), (1, 0), (-1, 0),
    (1, 1), (1, -1), (-1, 1), (-1, -1),
];

// forward, forward-left, forward-right, backward-right, backward-left
static BISHOP_STEPS: [(i32, i32); 5] = [(0, 1), (-1, 1), (1, 1), (1, -1), (-1, -1)];

static KNIGHT_JUMPS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

impl PieceKind {
    pub fn movement(self) -> Movement {
        match self {
            PieceKind::Pawn => Movement::Pawn,
            PieceKind::Knight => Movement::Leaps(&KNIGHT_JUMPS),
            PieceKind::Rook => Movement::Rays { directions: &ORTHOGONAL, reach: 7, side_relative: false },
            PieceKind::Bishop => Movement::Rays { directions: &BISHOP_STEPS, reach: 1, side_relative: true },
            PieceKind::Queen | PieceKind::Treybok => {
                Movement::Rays { directions: &ALL_DIRECTIONS, reach: 7, side_relative: false }
            }
            PieceKind::King => Movement::Rays { directions: &ALL_DIRECTIONS, reach: 1, side_relative: false },
        }
    }

    /// Attackers whose line to the king can be interposed.
    pub fn is_slider(self) -> bool {
        matches!(
            self,
            PieceKind::Rook | PieceKind::Bishop | PieceKind::Queen | PieceKind::Treybok
        )
    }
}

/// Index of a piece in the position's arena. Ids are never reused; a promoted
/// piece keeps its dead record after a reset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Debug)]
pub struct PieceId(pub usize);

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
    /// Where the piece stands. `None` once captured.
    pub cell: Option<Coord>,
    /// Cell the piece was set up on, used by reset.
    pub home: Option<Coord>,
    pub first_move: bool,
    pub alive: bool,
    /// Whether the side to move may pick this piece up.
    pub enabled: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Piece {
            kind,
            side,
            cell: None,
            home: None,
            first_move: true,
            alive: true,
            enabled: false,
        }
    }

    /// Alive and standing on the board.
    pub fn on_board(&self) -> bool {
        self.alive && self.cell.is_some()
    }
}
