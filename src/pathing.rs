// =============================================================================
// Candidate generation
//
// Produces the cells a piece could geometrically reach from where it stands,
// captures included. Nothing here knows about leaving the own king attacked;
// the simulator filters that out afterwards. Generation only reads the board,
// so calling it twice on an unchanged board gives the same cells.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::board::{Board, CellState, Coord};
use crate::config::Rules;
use crate::piece::{Movement, Piece, PieceKind, Side};

/// Whose turn it is and whether that side stands in check. The king's
/// first-move leap reads this.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct TurnFlags {
    pub to_move: Side,
    pub in_check: bool,
}

impl Default for TurnFlags {
    fn default() -> Self {
        TurnFlags { to_move: Side::White, in_check: false }
    }
}

pub fn candidate_cells(board: &Board, piece: &Piece, rules: &Rules, turn: TurnFlags) -> Vec<Coord> {
    let Some(from) = piece.cell else {
        return Vec::new();
    };
    let mut cells = Vec::new();

    match piece.kind.movement() {
        Movement::Pawn => pawn_cells(board, piece, from, &mut cells),
        Movement::Leaps(offsets) => {
            for &(df, dr) in offsets {
                let state = board.validate_cell(from.file as i32 + df, from.rank as i32 + dr, piece);
                if matches!(state, CellState::Free | CellState::Enemy) {
                    push_offset(from, df, dr, &mut cells);
                }
            }
        }
        Movement::Rays { directions, reach, side_relative } => {
            let sign = if side_relative { piece.side.forward() } else { 1 };
            for &(df, dr) in directions {
                ray_cells(board, piece, from, (df, dr * sign), reach, &mut cells);
            }
        }
    }

    match piece.kind {
        PieceKind::King if rules.king_leap && piece.first_move => {
            let blocked = turn.to_move == piece.side && turn.in_check;
            if !blocked {
                king_leap_cells(board, piece, from, &mut cells);
            }
        }
        PieceKind::Queen if rules.queen_leap && piece.first_move => {
            queen_first_move(board, piece, from, &mut cells);
        }
        _ => {}
    }

    cells
}

fn push_offset(from: Coord, df: i32, dr: i32, cells: &mut Vec<Coord>) {
    if let Some(to) = from.offset(df, dr) {
        cells.push(to);
    }
}

fn ray_cells(board: &Board, piece: &Piece, from: Coord, (df, dr): (i32, i32), reach: usize, cells: &mut Vec<Coord>) {
    let (mut f, mut r) = (from.file as i32, from.rank as i32);
    for _ in 0..reach {
        f += df;
        r += dr;
        match board.validate_cell(f, r, piece) {
            CellState::Free => cells.push(Coord::new(f as u8, r as u8)),
            CellState::Enemy => {
                cells.push(Coord::new(f as u8, r as u8));
                break;
            }
            _ => break,
        }
    }
}

fn pawn_cells(board: &Board, piece: &Piece, from: Coord, cells: &mut Vec<Coord>) {
    let fwd = piece.side.forward();
    let (f, r) = (from.file as i32, from.rank as i32);

    if board.validate_cell(f - 1, r + fwd, piece) == CellState::Enemy {
        push_offset(from, -1, fwd, cells);
    }
    if board.validate_cell(f, r + fwd, piece) == CellState::Free {
        push_offset(from, 0, fwd, cells);
    }
    if board.validate_cell(f + 1, r + fwd, piece) == CellState::Enemy {
        push_offset(from, 1, fwd, cells);
    }
}

fn king_leap_cells(board: &Board, piece: &Piece, from: Coord, cells: &mut Vec<Coord>) {
    let fwd = piece.side.forward();
    for df in [-2, 2] {
        if board.validate_cell(from.file as i32 + df, from.rank as i32 + fwd, piece) == CellState::Free {
            push_offset(from, df, fwd, cells);
        }
    }
}

/// On its first move the queen gives up every forward cell on its own file and
/// may only leap two ranks ahead, onto a free cell.
fn queen_first_move(board: &Board, piece: &Piece, from: Coord, cells: &mut Vec<Coord>) {
    let fwd = piece.side.forward();
    cells.retain(|c| {
        let ahead = (c.rank as i32 - from.rank as i32) * fwd > 0;
        !(c.file == from.file && ahead)
    });
    if board.validate_cell(from.file as i32, from.rank as i32 + 2 * fwd, piece) == CellState::Free {
        push_offset(from, 0, 2 * fwd, cells);
    }
}
