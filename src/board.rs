use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::{Piece, PieceId, Side};

pub const SIZE: usize = 8;

/// A board square as `(file, rank)`, both in `0..8`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct Coord {
    pub file: u8,
    pub rank: u8,
}

impl Coord {
    pub const fn new(file: u8, rank: u8) -> Self {
        Coord { file, rank }
    }

    /// Build a coordinate from signed components, `None` if off the board.
    pub fn try_new(file: i32, rank: i32) -> Option<Self> {
        if Board::in_bounds(file, rank) {
            Some(Coord::new(file as u8, rank as u8))
        } else {
            None
        }
    }

    pub fn in_bounds(self) -> bool {
        (self.file as usize) < SIZE && (self.rank as usize) < SIZE
    }

    pub fn offset(self, df: i32, dr: i32) -> Option<Coord> {
        Coord::try_new(self.file as i32 + df, self.rank as i32 + dr)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.file, self.rank)
    }
}

/// What a cell holds: the piece id plus its side, so classification does not
/// need the piece arena.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Occupant {
    pub id: PieceId,
    pub side: Side,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Cell {
    pub position: Coord,
    pub occupant: Option<Occupant>,
}

/// Classification of a target square relative to the piece asking.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum CellState {
    #[default]
    Unclassified,
    Free,
    Friendly,
    Enemy,
    OutOfBounds,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Board {
    /// Indexed `[rank][file]`.
    cells: [[Cell; SIZE]; SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// All 64 cells, empty.
    pub fn new() -> Self {
        let cells = std::array::from_fn(|rank| {
            std::array::from_fn(|file| Cell {
                position: Coord::new(file as u8, rank as u8),
                occupant: None,
            })
        });
        Board { cells }
    }

    pub fn in_bounds(file: i32, rank: i32) -> bool {
        (0..SIZE as i32).contains(&file) && (0..SIZE as i32).contains(&rank)
    }

    /// `None` for coordinates off the board.
    pub fn cell(&self, at: Coord) -> Option<&Cell> {
        self.cells.get(at.rank as usize)?.get(at.file as usize)
    }

    pub fn occupant(&self, at: Coord) -> Option<Occupant> {
        self.cell(at).and_then(|cell| cell.occupant)
    }

    /// Overwrite a cell's occupant, returning whatever was there. Off-board
    /// coordinates are left alone.
    pub fn set_occupant(&mut self, at: Coord, occupant: Option<Occupant>) -> Option<Occupant> {
        let cell = self.cells.get_mut(at.rank as usize)?.get_mut(at.file as usize)?;
        std::mem::replace(&mut cell.occupant, occupant)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flat_map(|row| row.iter())
    }

    pub fn clear(&mut self) {
        for row in &mut self.cells {
            for cell in row {
                cell.occupant = None;
            }
        }
    }

    /// Classify `(file, rank)` from the point of view of `asking`.
    pub fn validate_cell(&self, file: i32, rank: i32, asking: &Piece) -> CellState {
        let Some(at) = Coord::try_new(file, rank) else {
            return CellState::OutOfBounds;
        };
        match self.occupant(at) {
            None => CellState::Free,
            Some(o) if o.side == asking.side => CellState::Friendly,
            Some(_) => CellState::Enemy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceKind;

    fn white_rook() -> Piece {
        Piece::new(PieceKind::Rook, Side::White)
    }

    #[test]
    fn every_cell_knows_its_coordinate() {
        let board = Board::new();
        assert_eq!(board.cells().count(), 64);
        for cell in board.cells() {
            assert_eq!(board.cell(cell.position).map(|c| c.position), Some(cell.position));
            assert!(cell.occupant.is_none());
        }
    }

    #[test]
    fn validate_cell_classifies_relative_to_asker() {
        let mut board = Board::new();
        board.set_occupant(Coord::new(1, 1), Some(Occupant { id: PieceId(0), side: Side::White }));
        board.set_occupant(Coord::new(2, 2), Some(Occupant { id: PieceId(1), side: Side::Black }));

        let rook = white_rook();
        assert_eq!(board.validate_cell(0, 0, &rook), CellState::Free);
        assert_eq!(board.validate_cell(1, 1, &rook), CellState::Friendly);
        assert_eq!(board.validate_cell(2, 2, &rook), CellState::Enemy);
        assert_eq!(board.validate_cell(-1, 0, &rook), CellState::OutOfBounds);
        assert_eq!(board.validate_cell(3, 8, &rook), CellState::OutOfBounds);
    }

    #[test]
    fn set_occupant_returns_previous() {
        let mut board = Board::new();
        let at = Coord::new(4, 4);
        let o = Occupant { id: PieceId(7), side: Side::Black };
        assert_eq!(board.set_occupant(at, Some(o)), None);
        assert_eq!(board.set_occupant(at, None), Some(o));
        assert_eq!(board.occupant(at), None);
    }

    #[test]
    fn off_board_lookups_are_empty() {
        let board = Board::new();
        assert!(board.cell(Coord::new(8, 0)).is_none());
        assert_eq!(board.occupant(Coord::new(0, 8)), None);
        assert_eq!(board.occupant(Coord::new(255, 255)), None);
    }

    #[test]
    fn offsets_stop_at_the_edge() {
        let corner = Coord::new(7, 7);
        assert_eq!(corner.offset(1, 0), None);
        assert_eq!(corner.offset(-1, -1), Some(Coord::new(6, 6)));
        assert_eq!(CellState::default(), CellState::Unclassified);
    }
}
