// =============================================================================
// Move simulation
//
// Legality is decided by playing the move on the real board, asking whether
// the mover's king is attacked, and putting everything back. The applied
// state is only reachable through `SimulatedMove`, which hands out shared
// access while it lives and restores both cells and the piece's cell when it
// is dropped.
// =============================================================================

use std::ops::Deref;

use crate::board::{Coord, Occupant};
use crate::moves::Move;
use crate::piece::{PieceId, Side};
use crate::position::Position;

struct SimulatedMove<'a> {
    pos: &'a mut Position,
    id: PieceId,
    side: Side,
    from: Coord,
    to: Coord,
    captured: Option<Occupant>,
}

impl<'a> SimulatedMove<'a> {
    fn apply(pos: &'a mut Position, id: PieceId, side: Side, from: Coord, to: Coord) -> Self {
        let board = pos.board_mut();
        board.set_occupant(from, None);
        let captured = board.set_occupant(to, Some(Occupant { id, side }));
        pos.set_piece_cell(id, Some(to));
        SimulatedMove { pos, id, side, from, to, captured }
    }

    /// The piece removed from the game by this hypothetical move.
    fn captured(&self) -> Option<PieceId> {
        self.captured.map(|o| o.id)
    }
}

impl Deref for SimulatedMove<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        &*self.pos
    }
}

impl Drop for SimulatedMove<'_> {
    fn drop(&mut self) {
        self.pos.set_piece_cell(self.id, Some(self.from));
        let board = self.pos.board_mut();
        board.set_occupant(self.to, self.captured);
        board.set_occupant(self.from, Some(Occupant { id: self.id, side: self.side }));
        debug_assert!(self.pos.is_consistent());
    }
}

impl Position {
    /// Whether moving `id` onto `target` keeps its own king out of attack.
    /// The position is left exactly as it was.
    pub fn is_legal_move(&mut self, id: PieceId, target: Coord) -> bool {
        let Some(piece) = self.piece(id).copied() else {
            return false;
        };
        let Some(from) = piece.cell.filter(|_| piece.alive) else {
            return false;
        };
        if from == target || !target.in_bounds() {
            return false;
        }
        if self.board().occupant(target).is_some_and(|o| o.side == piece.side) {
            return false;
        }

        let sim = SimulatedMove::apply(self, id, piece.side, from, target);
        let captured = sim.captured();
        let leaves_in_check = sim.is_in_check(piece.side, captured);
        drop(sim);

        !leaves_in_check
    }

    /// Every legal move of `side`: candidates of each live piece that pass
    /// the simulator.
    pub fn enumerate_legal_moves(&mut self, side: Side) -> Vec<Move> {
        let mut legal = Vec::new();
        for id in self.live_pieces_of(side) {
            let Some(from) = self.piece(id).and_then(|p| p.cell) else {
                continue;
            };
            for to in self.candidates(id) {
                if self.is_legal_move(id, to) {
                    legal.push(Move { piece: id, from, to });
                }
            }
        }
        legal
    }

    /// Legal destinations of one piece.
    pub fn legal_targets(&mut self, id: PieceId) -> Vec<Coord> {
        self.candidates(id)
            .into_iter()
            .filter(|&to| self.is_legal_move(id, to))
            .collect()
    }
}
