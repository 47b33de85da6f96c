// =============================================================================
// Check analysis
//
// Attack detection reuses candidate generation for every piece except pawns,
// whose capture geometry is just the two forward diagonals. Everything that
// needs legal moves goes through the simulator, so those functions take
// `&mut self` even though they leave the position unchanged.
// =============================================================================

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::board::{CellState, Coord};
use crate::moves::Move;
use crate::piece::{Piece, PieceId, PieceKind, Side};
use crate::position::Position;

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum EndState {
    None,
    Check,
    Checkmate,
    Stalemate,
}

impl EndState {
    pub fn is_game_over(self) -> bool {
        matches!(self, EndState::Checkmate | EndState::Stalemate)
    }
}

/// Legal replies to a check, sorted by kind. Empty when not in check.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct CheckAnalysis {
    pub attackers: Vec<PieceId>,
    pub is_double_check: bool,
    pub king_moves: Vec<Move>,
    pub capture_moves: Vec<Move>,
    pub block_moves: Vec<Move>,
}

impl CheckAnalysis {
    pub fn in_check(&self) -> bool {
        !self.attackers.is_empty()
    }

    /// Moves that answer the check. Double check leaves only the king.
    pub fn allowed_moves(&self) -> Vec<Move> {
        let mut moves = self.king_moves.clone();
        if !self.is_double_check {
            moves.extend(self.capture_moves.iter().copied());
            moves.extend(self.block_moves.iter().copied());
        }
        moves
    }

    /// Pieces that have at least one allowed move.
    pub fn responders(&self) -> BTreeSet<PieceId> {
        self.allowed_moves().into_iter().map(|m| m.piece).collect()
    }
}

/// Cells strictly between two squares on a shared rank, file or diagonal.
/// Empty when the squares are adjacent or not aligned.
pub fn squares_between(from: Coord, to: Coord) -> Vec<Coord> {
    let dx = to.file as i32 - from.file as i32;
    let dy = to.rank as i32 - from.rank as i32;
    if !(dx == 0 || dy == 0 || dx.abs() == dy.abs()) {
        return Vec::new();
    }
    let (sx, sy) = (dx.signum(), dy.signum());
    let steps = dx.abs().max(dy.abs());
    (1..steps)
        .filter_map(|i| from.offset(i * sx, i * sy))
        .collect()
}

impl Position {
    fn attacks(&self, piece: &Piece, square: Coord) -> bool {
        let Some(from) = piece.cell else {
            return false;
        };
        if piece.kind == PieceKind::Pawn {
            let fwd = piece.side.forward();
            let hits = [from.offset(-1, fwd), from.offset(1, fwd)].contains(&Some(square));
            if !hits {
                return false;
            }
            let state = self.board().validate_cell(square.file as i32, square.rank as i32, piece);
            return !matches!(state, CellState::Friendly | CellState::OutOfBounds);
        }
        crate::pathing::candidate_cells(self.board(), piece, self.rules(), self.turn()).contains(&square)
    }

    fn attackers_iter(&self, by: Side, ignore: Option<PieceId>) -> impl Iterator<Item = PieceId> + '_ {
        self.pieces_of(by)
            .into_iter()
            .filter(move |&id| Some(id) != ignore)
            .filter(|&id| self.piece(id).is_some_and(|p| p.on_board()))
    }

    /// Whether any piece of `by`, other than `ignore`, attacks `square`.
    pub fn is_square_attacked(&self, square: Coord, by: Side, ignore: Option<PieceId>) -> bool {
        self.attackers_iter(by, ignore)
            .any(|id| self.piece(id).is_some_and(|p| self.attacks(p, square)))
    }

    /// All pieces of `by` attacking `square`.
    pub fn attackers_on_square(&self, square: Coord, by: Side, ignore: Option<PieceId>) -> Vec<PieceId> {
        self.attackers_iter(by, ignore)
            .filter(|&id| self.piece(id).is_some_and(|p| self.attacks(p, square)))
            .collect()
    }

    /// False when `side` has no king on the board.
    pub fn is_in_check(&self, side: Side, ignore: Option<PieceId>) -> bool {
        match self.king_cell(side) {
            Some(king) => self.is_square_attacked(king, side.opposite(), ignore),
            None => false,
        }
    }

    pub fn checking_pieces(&self, side: Side) -> Vec<PieceId> {
        match self.king_cell(side) {
            Some(king) => self.attackers_on_square(king, side.opposite(), None),
            None => Vec::new(),
        }
    }

    /// Keep the cached check flag current when `side` is the one to move, so
    /// the king's leap is withheld while it answers a check.
    fn refresh_check_flag(&mut self, side: Side, in_check: bool) {
        let mut turn = self.turn();
        if turn.to_move == side && turn.in_check != in_check {
            turn.in_check = in_check;
            self.set_turn(turn);
        }
    }

    pub fn analyze_check_responses(&mut self, side: Side) -> CheckAnalysis {
        let mut result = CheckAnalysis {
            attackers: self.checking_pieces(side),
            ..CheckAnalysis::default()
        };
        result.is_double_check = result.attackers.len() >= 2;
        if result.attackers.is_empty() {
            return result;
        }
        self.refresh_check_flag(side, true);

        let legal = self.enumerate_legal_moves(side);
        let is_king = |pos: &Position, mv: &Move| pos.piece(mv.piece).is_some_and(|p| p.kind == PieceKind::King);

        let (king_moves, others): (Vec<Move>, Vec<Move>) = legal.into_iter().partition(|mv| is_king(self, mv));
        result.king_moves = king_moves;
        if result.is_double_check {
            return result;
        }

        let attacker = result.attackers[0];
        let Some(attacker_piece) = self.piece(attacker).copied() else {
            return result;
        };
        let Some(attacker_cell) = attacker_piece.cell else {
            return result;
        };
        let block_squares: BTreeSet<(u8, u8)> = match self.king_cell(side) {
            Some(king) if attacker_piece.kind.is_slider() => squares_between(attacker_cell, king)
                .into_iter()
                .map(|c| (c.file, c.rank))
                .collect(),
            _ => BTreeSet::new(),
        };

        for mv in others {
            if mv.to == attacker_cell {
                result.capture_moves.push(mv);
            } else if block_squares.contains(&(mv.to.file, mv.to.rank)) {
                result.block_moves.push(mv);
            }
        }
        result
    }

    /// Fresh verdict for `side`; nothing is cached between calls.
    pub fn evaluate_end_state(&mut self, side: Side) -> EndState {
        let in_check = self.is_in_check(side, None);
        self.refresh_check_flag(side, in_check);
        let has_moves = !self.enumerate_legal_moves(side).is_empty();

        match (in_check, has_moves) {
            (true, false) => EndState::Checkmate,
            (false, false) => EndState::Stalemate,
            (true, true) => EndState::Check,
            (false, true) => EndState::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rules;
    use crate::pathing::TurnFlags;

    fn c(file: u8, rank: u8) -> Coord {
        Coord::new(file, rank)
    }

    fn settled(pos: &mut Position, kind: PieceKind, side: Side, at: Coord) -> PieceId {
        let mut piece = Piece::new(kind, side);
        piece.first_move = false;
        pos.add_piece(piece, at)
    }

    #[test]
    fn squares_between_lines() {
        assert_eq!(squares_between(c(0, 0), c(0, 3)), vec![c(0, 1), c(0, 2)]);
        assert_eq!(squares_between(c(3, 3), c(0, 0)), vec![c(2, 2), c(1, 1)]);
        assert!(squares_between(c(0, 0), c(1, 2)).is_empty());
        assert!(squares_between(c(4, 4), c(4, 5)).is_empty());
    }

    #[test]
    fn pawn_attacks_its_forward_diagonals_only() {
        let mut pos = Position::empty(Rules::default());
        settled(&mut pos, PieceKind::Pawn, Side::White, c(3, 3));
        assert!(pos.is_square_attacked(c(2, 4), Side::White, None));
        assert!(pos.is_square_attacked(c(4, 4), Side::White, None));
        assert!(!pos.is_square_attacked(c(3, 4), Side::White, None));
        assert!(!pos.is_square_attacked(c(2, 2), Side::White, None));

        settled(&mut pos, PieceKind::Rook, Side::White, c(4, 4));
        // own piece on the diagonal is not attacked
        assert!(pos.attackers_on_square(c(4, 4), Side::White, None).is_empty());
    }

    #[test]
    fn ignored_piece_does_not_attack() {
        let mut pos = Position::empty(Rules::default());
        let rook = settled(&mut pos, PieceKind::Rook, Side::Black, c(0, 7));
        assert!(pos.is_square_attacked(c(0, 0), Side::Black, None));
        assert!(!pos.is_square_attacked(c(0, 0), Side::Black, Some(rook)));
    }

    #[test]
    fn single_check_offers_captures_and_blocks() {
        let mut pos = Position::empty(Rules::default());
        settled(&mut pos, PieceKind::King, Side::White, c(0, 0));
        let checker = settled(&mut pos, PieceKind::Rook, Side::White, c(4, 2));
        let king = settled(&mut pos, PieceKind::King, Side::Black, c(4, 7));
        let rook = settled(&mut pos, PieceKind::Rook, Side::Black, c(0, 4));
        let knight = settled(&mut pos, PieceKind::Knight, Side::Black, c(5, 4));
        pos.set_turn(TurnFlags { to_move: Side::Black, in_check: false });

        assert!(pos.is_in_check(Side::Black, None));
        let analysis = pos.analyze_check_responses(Side::Black);
        assert_eq!(analysis.attackers, vec![checker]);
        assert!(!analysis.is_double_check);

        assert!(analysis.capture_moves.iter().any(|m| m.piece == knight && m.to == c(4, 2)));
        assert!(analysis.block_moves.iter().any(|m| m.piece == rook && m.to == c(4, 4)));
        assert!(analysis.block_moves.iter().any(|m| m.piece == knight && m.to == c(4, 6)));

        let mut king_targets: Vec<Coord> = analysis.king_moves.iter().map(|m| m.to).collect();
        king_targets.sort_by_key(|c| (c.file, c.rank));
        assert_eq!(king_targets, vec![c(3, 6), c(3, 7), c(5, 6), c(5, 7)]);
        assert!(analysis.king_moves.iter().all(|m| m.piece == king));

        assert_eq!(analysis.responders().len(), 3);
        assert_eq!(pos.evaluate_end_state(Side::Black), EndState::Check);
    }

    #[test]
    fn double_check_leaves_only_king_moves() {
        let mut pos = Position::empty(Rules::default());
        settled(&mut pos, PieceKind::King, Side::White, c(0, 0));
        settled(&mut pos, PieceKind::Rook, Side::White, c(4, 2));
        let knight = settled(&mut pos, PieceKind::Knight, Side::White, c(3, 5));
        let king = settled(&mut pos, PieceKind::King, Side::Black, c(4, 7));
        let bishop = settled(&mut pos, PieceKind::Bishop, Side::Black, c(2, 6));
        settled(&mut pos, PieceKind::Rook, Side::Black, c(0, 4));
        pos.set_turn(TurnFlags { to_move: Side::Black, in_check: false });

        // the bishop could take the knight, and the rook could block the file
        assert!(pos.candidates(bishop).contains(&c(3, 5)));

        let analysis = pos.analyze_check_responses(Side::Black);
        assert_eq!(analysis.attackers.len(), 2);
        assert!(analysis.attackers.contains(&knight));
        assert!(analysis.is_double_check);
        assert!(analysis.capture_moves.is_empty());
        assert!(analysis.block_moves.is_empty());

        let mut king_targets: Vec<Coord> = analysis.king_moves.iter().map(|m| m.to).collect();
        king_targets.sort_by_key(|c| (c.file, c.rank));
        assert_eq!(king_targets, vec![c(3, 6), c(3, 7), c(5, 7)]);
        assert_eq!(analysis.allowed_moves(), analysis.king_moves);
        assert_eq!(analysis.responders().into_iter().collect::<Vec<_>>(), vec![king]);
    }

    #[test]
    fn knight_check_cannot_be_blocked() {
        let mut pos = Position::empty(Rules::default());
        settled(&mut pos, PieceKind::King, Side::White, c(0, 0));
        settled(&mut pos, PieceKind::Knight, Side::White, c(3, 5));
        settled(&mut pos, PieceKind::King, Side::Black, c(4, 7));
        settled(&mut pos, PieceKind::Rook, Side::Black, c(7, 6));

        let analysis = pos.analyze_check_responses(Side::Black);
        assert!(analysis.in_check());
        assert!(analysis.block_moves.is_empty());
        assert!(!analysis.king_moves.is_empty());
    }

    #[test]
    fn king_leap_withheld_while_answering_check() {
        let mut pos = Position::empty(Rules::default());
        settled(&mut pos, PieceKind::King, Side::White, c(0, 0));
        settled(&mut pos, PieceKind::Rook, Side::White, c(4, 2));
        let king = pos.add_piece(Piece::new(PieceKind::King, Side::Black), c(4, 7));
        pos.set_turn(TurnFlags { to_move: Side::Black, in_check: false });

        let analysis = pos.analyze_check_responses(Side::Black);
        assert!(pos.turn().in_check);
        assert!(analysis.king_moves.iter().all(|m| m.piece == king));
        assert!(!analysis.king_moves.iter().any(|m| m.to == c(2, 6) || m.to == c(6, 6)));
    }

    #[test]
    fn two_rooks_mate() {
        let mut pos = Position::empty(Rules::default());
        settled(&mut pos, PieceKind::King, Side::White, c(4, 0));
        settled(&mut pos, PieceKind::Rook, Side::White, c(7, 7));
        settled(&mut pos, PieceKind::Rook, Side::White, c(7, 6));
        settled(&mut pos, PieceKind::King, Side::Black, c(0, 7));

        assert!(pos.is_in_check(Side::Black, None));
        assert!(pos.enumerate_legal_moves(Side::Black).is_empty());
        assert_eq!(pos.evaluate_end_state(Side::Black), EndState::Checkmate);
        assert!(EndState::Checkmate.is_game_over());
    }

    #[test]
    fn boxed_king_is_stalemate() {
        let mut pos = Position::empty(Rules::default());
        settled(&mut pos, PieceKind::King, Side::White, c(4, 0));
        settled(&mut pos, PieceKind::Rook, Side::White, c(1, 0));
        settled(&mut pos, PieceKind::Rook, Side::White, c(7, 6));
        settled(&mut pos, PieceKind::King, Side::Black, c(0, 7));

        assert!(!pos.is_in_check(Side::Black, None));
        assert_eq!(pos.evaluate_end_state(Side::Black), EndState::Stalemate);
        assert_eq!(pos.evaluate_end_state(Side::White), EndState::None);
    }

    #[test]
    fn missing_king_is_never_in_check() {
        let mut pos = Position::empty(Rules::default());
        settled(&mut pos, PieceKind::Rook, Side::White, c(0, 0));
        settled(&mut pos, PieceKind::Rook, Side::Black, c(0, 7));

        assert!(!pos.is_in_check(Side::Black, None));
        assert!(pos.checking_pieces(Side::Black).is_empty());
        assert_eq!(pos.analyze_check_responses(Side::Black), CheckAnalysis::default());
        assert_eq!(pos.evaluate_end_state(Side::Black), EndState::None);
    }
}
