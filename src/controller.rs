// =============================================================================
// Match controller
//
// Owns the position and drives the turn cycle: validate and play a move,
// promote pawns that reach the zone, then hand the turn over, judge the new
// side's situation, narrow who may move while in check, and tell the host's
// collaborators what happened.
// =============================================================================

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::board::Coord;
use crate::check::{CheckAnalysis, EndState};
use crate::config::Rules;
use crate::error::MoveError;
use crate::hooks::{Hooks, SoundCue};
use crate::moves::{Move, MoveOutcome};
use crate::pathing::TurnFlags;
use crate::piece::{PieceId, PieceKind, Side};
use crate::position::Position;

/// Result of handing the turn to the next side.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct TurnReport {
    pub to_move: Side,
    pub end_state: EndState,
    /// Set only on checkmate.
    pub winner: Option<Side>,
}

impl TurnReport {
    fn opening() -> Self {
        TurnReport { to_move: Side::White, end_state: EndState::None, winner: None }
    }
}

pub struct MatchController {
    position: Position,
    game_over: bool,
    last_report: TurnReport,
    pending_cue: Option<SoundCue>,
    hooks: Hooks,
}

impl MatchController {
    /// Set up both rosters on the standard layout, White to move.
    pub fn new(rules: Rules, mut hooks: Hooks) -> Self {
        let position = Position::standard(rules, &mut *hooks.factory);
        Self::from_position(position, Side::White, hooks)
    }

    /// Start from an arbitrary position with `to_move` holding the turn.
    /// No end-state evaluation or notification happens here.
    pub fn from_position(mut position: Position, to_move: Side, hooks: Hooks) -> Self {
        position.set_turn(TurnFlags { to_move, in_check: false });
        let mut controller = MatchController {
            position,
            game_over: false,
            last_report: TurnReport { to_move, ..TurnReport::opening() },
            pending_cue: None,
            hooks,
        };
        controller.enable_side(to_move);
        controller
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn rules(&self) -> &Rules {
        self.position.rules()
    }

    pub fn to_move(&self) -> Side {
        self.position.turn().to_move
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn winner(&self) -> Option<Side> {
        self.last_report.winner
    }

    pub fn last_report(&self) -> TurnReport {
        self.last_report
    }

    pub fn piece_at(&self, at: Coord) -> Option<PieceId> {
        self.position.piece_at(at)
    }

    pub fn is_enabled(&self, id: PieceId) -> bool {
        self.position.piece(id).is_some_and(|p| p.alive && p.enabled)
    }

    pub fn enabled_pieces(&self) -> Vec<PieceId> {
        self.position
            .all_pieces()
            .filter(|(_, p)| p.alive && p.enabled)
            .map(|(id, _)| id)
            .collect()
    }

    /// Where an enabled piece of the side to move may go.
    pub fn legal_targets(&mut self, id: PieceId) -> Vec<Coord> {
        if self.game_over || !self.is_enabled(id) {
            return Vec::new();
        }
        self.position.legal_targets(id)
    }

    pub fn legal_moves(&mut self) -> Vec<Move> {
        if self.game_over {
            return Vec::new();
        }
        let side = self.to_move();
        self.position
            .enumerate_legal_moves(side)
            .into_iter()
            .filter(|m| self.is_enabled(m.piece))
            .collect()
    }

    pub fn check_analysis(&mut self) -> CheckAnalysis {
        let side = self.to_move();
        self.position.analyze_check_responses(side)
    }

    /// Play `id` onto `target` if that is legal. Does not pass the turn.
    pub fn attempt_move(&mut self, id: PieceId, target: Coord) -> Result<MoveOutcome, MoveError> {
        if self.game_over {
            return Err(MoveError::GameOver);
        }
        let piece = *self.position.piece(id).ok_or(MoveError::UnknownPiece(id))?;
        if !piece.alive {
            return Err(MoveError::PieceCaptured(id));
        }
        if piece.side != self.to_move() {
            return Err(MoveError::NotYourTurn(id));
        }
        if !piece.enabled {
            return Err(MoveError::PieceDisabled(id));
        }
        if !target.in_bounds() {
            return Err(MoveError::OutOfBounds(target));
        }
        let Some(from) = piece.cell else {
            return Err(MoveError::PieceCaptured(id));
        };
        if !self.position.candidates(id).contains(&target) || !self.position.is_legal_move(id, target) {
            return Err(MoveError::IllegalMove { piece: id, to: target });
        }

        let captured = self.position.relocate(id, target);
        let mv = Move { piece: id, from, to: target };
        debug!("{:?} {:?} {mv}{}", piece.side, piece.kind, if captured.is_some() { " (capture)" } else { "" });
        self.pending_cue = Some(if captured.is_some() { SoundCue::Capture } else { SoundCue::Move });

        let promoted = if piece.kind == PieceKind::Pawn && self.rules().in_promotion_zone(piece.side, target.rank) {
            Some(self.promote(id, target, piece.side))
        } else {
            None
        };

        Ok(MoveOutcome { mv, captured, promoted })
    }

    fn promote(&mut self, pawn: PieceId, at: Coord, side: Side) -> PieceId {
        self.position.kill(pawn);
        let mut treybok = self.hooks.factory.create(PieceKind::Treybok, side);
        treybok.first_move = false;
        treybok.enabled = false;
        let id = self.position.add_promoted(treybok, at);
        debug!("{side:?} pawn promoted to Treybok at {at}");
        id
    }

    /// Hand the turn from `just_moved` to the other side and judge the result.
    pub fn switch_turn(&mut self, just_moved: Side) -> TurnReport {
        if self.game_over {
            return self.last_report;
        }
        let next = just_moved.opposite();
        for side in [Side::White, Side::Black] {
            if self.position.king_cell(side).is_none() {
                warn!("{side:?} has no king on the board");
            }
        }

        self.enable_side(next);
        self.position.set_turn(TurnFlags { to_move: next, in_check: false });
        let end_state = self.position.evaluate_end_state(next);

        if end_state == EndState::Check {
            self.restrict_to_check_responses(next);
        }

        let pending = self.pending_cue.take();
        let mut winner = None;
        match end_state {
            EndState::Checkmate => {
                self.game_over = true;
                self.hooks.clock.stop();
                self.disable_all();
                winner = Some(just_moved);
                info!("checkmate, {just_moved:?} wins");
                self.hooks.notifications.on_checkmate_with_winner(just_moved);
                self.hooks.notifications.on_checkmate();
                self.hooks.sound.play(SoundCue::Checkmate);
            }
            EndState::Stalemate => {
                self.game_over = true;
                self.hooks.clock.stop();
                self.disable_all();
                info!("stalemate, {next:?} has no legal move");
                self.hooks.notifications.on_stalemate();
                self.hooks.sound.play(SoundCue::Draw);
            }
            EndState::Check => {
                info!("{next:?} is in check");
                self.hooks.notifications.on_check();
                self.hooks.sound.play(SoundCue::Check);
            }
            EndState::None => {
                self.hooks.notifications.on_clear_status();
                if let Some(cue) = pending {
                    self.hooks.sound.play(cue);
                }
            }
        }

        if !self.game_over {
            self.hooks.clock.switch_turn();
        }

        self.last_report = TurnReport { to_move: next, end_state, winner };
        self.last_report
    }

    /// Attempt a move and, if it lands, pass the turn.
    pub fn play_move(&mut self, id: PieceId, target: Coord) -> Result<(MoveOutcome, TurnReport), MoveError> {
        let outcome = self.attempt_move(id, target)?;
        let side = self.to_move();
        let report = self.switch_turn(side);
        Ok((outcome, report))
    }

    /// Back to the starting layout with White to move. Promoted pieces are gone.
    pub fn reset_match(&mut self) {
        self.position.restore_setup();
        self.game_over = false;
        self.pending_cue = None;
        self.last_report = TurnReport::opening();
        self.enable_side(Side::White);
        info!("match reset");
        self.hooks.notifications.on_clear_status();
    }

    pub fn pause(&mut self) {
        self.hooks.clock.stop();
    }

    pub fn resume(&mut self) {
        if !self.game_over {
            self.hooks.clock.resume();
        }
    }

    fn set_enabled(&mut self, id: PieceId, enabled: bool) {
        if let Some(p) = self.position.piece_mut(id) {
            p.enabled = enabled && p.alive;
        }
    }

    /// All live pieces of `side` enabled, every opposing piece disabled.
    fn enable_side(&mut self, side: Side) {
        for id in self.position.pieces_of(side) {
            self.set_enabled(id, true);
        }
        for id in self.position.pieces_of(side.opposite()) {
            self.set_enabled(id, false);
        }
    }

    fn disable_all(&mut self) {
        for side in [Side::White, Side::Black] {
            for id in self.position.pieces_of(side) {
                self.set_enabled(id, false);
            }
        }
    }

    fn restrict_to_check_responses(&mut self, side: Side) {
        let analysis = self.position.analyze_check_responses(side);
        let allowed = analysis.responders();
        debug!(
            "{side:?} in check by {} piece(s), {} responder(s)",
            analysis.attackers.len(),
            allowed.len()
        );
        for id in self.position.pieces_of(side) {
            self.set_enabled(id, allowed.contains(&id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;

    fn c(file: u8, rank: u8) -> Coord {
        Coord::new(file, rank)
    }

    fn standard() -> MatchController {
        MatchController::new(Rules::default(), Hooks::default())
    }

    #[test]
    fn white_starts_with_all_pieces_enabled() {
        let game = standard();
        assert_eq!(game.to_move(), Side::White);
        let enabled = game.enabled_pieces();
        assert_eq!(enabled.len(), 16);
        assert!(enabled
            .iter()
            .all(|&id| game.position().piece(id).unwrap().side == Side::White));
    }

    #[test]
    fn rejects_moves_out_of_turn_and_off_the_list() {
        let mut game = standard();
        let black_pawn = game.piece_at(c(0, 5)).unwrap();
        assert_eq!(game.attempt_move(black_pawn, c(0, 4)), Err(MoveError::NotYourTurn(black_pawn)));

        let white_pawn = game.piece_at(c(0, 2)).unwrap();
        assert_eq!(
            game.attempt_move(white_pawn, c(0, 4)),
            Err(MoveError::IllegalMove { piece: white_pawn, to: c(0, 4) })
        );
        assert_eq!(game.attempt_move(white_pawn, c(0, 9)), Err(MoveError::OutOfBounds(c(0, 9))));
        assert_eq!(game.attempt_move(PieceId(99), c(0, 3)), Err(MoveError::UnknownPiece(PieceId(99))));
        assert_eq!(game.position().piece_at(c(0, 2)), Some(white_pawn));
    }

    #[test]
    fn off_board_square_holds_nothing() {
        let mut game = standard();
        assert_eq!(game.piece_at(c(8, 0)), None);
        assert_eq!(game.piece_at(c(0, 8)), None);
        let rook = game.piece_at(c(0, 0)).unwrap();
        assert_eq!(game.attempt_move(rook, c(8, 0)), Err(MoveError::OutOfBounds(c(8, 0))));
    }

    #[test]
    fn turn_passes_to_black() {
        let mut game = standard();
        let pawn = game.piece_at(c(4, 2)).unwrap();
        let (outcome, report) = game.play_move(pawn, c(4, 3)).unwrap();
        assert_eq!(outcome.captured, None);
        assert_eq!(outcome.promoted, None);
        assert_eq!(report, TurnReport { to_move: Side::Black, end_state: EndState::None, winner: None });
        assert!(!game.is_enabled(pawn));
        assert!(game
            .enabled_pieces()
            .iter()
            .all(|&id| game.position().piece(id).unwrap().side == Side::Black));
    }

    #[test]
    fn switch_turn_after_game_over_is_inert() {
        let mut pos = Position::empty(Rules::default());
        let mut wk = Piece::new(PieceKind::King, Side::White);
        wk.first_move = false;
        pos.add_piece(wk, c(4, 0));
        let mut r1 = Piece::new(PieceKind::Rook, Side::White);
        r1.first_move = false;
        pos.add_piece(r1, c(7, 7));
        pos.add_piece(r1, c(7, 6));
        let mut bk = Piece::new(PieceKind::King, Side::Black);
        bk.first_move = false;
        pos.add_piece(bk, c(0, 7));

        let mut game = MatchController::from_position(pos, Side::White, Hooks::default());
        let report = game.switch_turn(Side::White);
        assert_eq!(report.end_state, EndState::Checkmate);
        assert_eq!(report.winner, Some(Side::White));
        assert!(game.is_game_over());
        assert!(game.enabled_pieces().is_empty());

        assert_eq!(game.switch_turn(Side::Black), report);
        let rook = game.piece_at(c(7, 7)).unwrap();
        assert_eq!(game.attempt_move(rook, c(6, 7)), Err(MoveError::GameOver));
    }
}
