// =============================================================================
// Collaborators
//
// The controller never draws, plays audio or keeps time itself. Whatever the
// host application wants to do with those concerns is handed in through these
// traits when the match is built. Every method has an empty default so a host
// only implements what it cares about.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::piece::{Piece, PieceKind, Side};

/// Status signals, at most one category per turn switch.
pub trait NotificationSink {
    fn on_check(&mut self) {}
    fn on_checkmate(&mut self) {}
    fn on_checkmate_with_winner(&mut self, _winner: Side) {}
    fn on_stalemate(&mut self) {}
    fn on_clear_status(&mut self) {}
}

/// Two-sided turn clock.
pub trait TurnClock {
    fn stop(&mut self) {}
    fn resume(&mut self) {}
    /// Hand the clock to the other side, crediting any increment.
    fn switch_turn(&mut self) {}
}

/// Audio feedback for a finished turn.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum SoundCue {
    Move,
    Capture,
    Check,
    Checkmate,
    Draw,
}

pub trait SoundSink {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Creates piece records for the initial rosters and for promotions.
pub trait PieceFactory {
    fn create(&mut self, kind: PieceKind, side: Side) -> Piece {
        Piece::new(kind, side)
    }
}

/// Does nothing; stands in for any collaborator the host leaves out.
#[derive(Clone, Copy, Default, Debug)]
pub struct Silent;

impl NotificationSink for Silent {}
impl TurnClock for Silent {}
impl SoundSink for Silent {}
impl PieceFactory for Silent {}

pub struct Hooks {
    pub notifications: Box<dyn NotificationSink>,
    pub clock: Box<dyn TurnClock>,
    pub sound: Box<dyn SoundSink>,
    pub factory: Box<dyn PieceFactory>,
}

impl Default for Hooks {
    fn default() -> Self {
        Hooks {
            notifications: Box::new(Silent),
            clock: Box::new(Silent),
            sound: Box::new(Silent),
            factory: Box::new(Silent),
        }
    }
}
