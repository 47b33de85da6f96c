use crate::board::Coord;
use crate::check::EndState;
use crate::config::Rules;
use crate::controller::{MatchController, TurnReport};
use crate::hooks::Hooks;
use crate::piece::{PieceKind, Side};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    id: usize,
    kind: PieceKind,
    side: Side,
    enabled: bool,
}

#[derive(Serialize)]
struct BoardState {
    /// `squares[rank][file]`
    squares: Vec<Vec<Option<SquarePiece>>>,
    to_move: Side,
    end_state: EndState,
    winner: Option<Side>,
    game_over: bool,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    captured: bool,
    promoted: bool,
    error: Option<String>,
}

fn build_board_state(game: &MatchController) -> BoardState {
    let pos = game.position();
    let squares = (0..8u8)
        .map(|rank| {
            (0..8u8)
                .map(|file| {
                    pos.piece_at(Coord::new(file, rank)).and_then(|id| {
                        pos.piece(id).map(|p| SquarePiece {
                            id: id.0,
                            kind: p.kind,
                            side: p.side,
                            enabled: p.enabled,
                        })
                    })
                })
                .collect()
        })
        .collect();

    let TurnReport { to_move, end_state, winner } = game.last_report();
    BoardState {
        squares,
        to_move,
        end_state,
        winner,
        game_over: game.is_game_over(),
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
pub struct Game {
    inner: MatchController,
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new(rules_json: Option<String>) -> Result<Game, JsValue> {
        let rules = match rules_json {
            Some(text) => Rules::from_json(&text).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Rules::default(),
        };
        Ok(Game { inner: MatchController::new(rules, Hooks::default()) })
    }

    pub fn get_board_state(&self) -> JsValue {
        to_js(&build_board_state(&self.inner))
    }

    pub fn make_move(&mut self, from_file: u8, from_rank: u8, to_file: u8, to_rank: u8) -> JsValue {
        let from = Coord::new(from_file, from_rank);
        let to = Coord::new(to_file, to_rank);
        let picked = self.inner.piece_at(from).filter(|_| to.in_bounds());
        let Some(id) = picked else {
            let msg = if from.in_bounds() && to.in_bounds() {
                "No piece on that square"
            } else {
                "Square is off the board"
            };
            return to_js(&MoveResult {
                board_state: None,
                captured: false,
                promoted: false,
                error: Some(msg.to_string()),
            });
        };
        match self.inner.play_move(id, to) {
            Ok((outcome, _)) => to_js(&MoveResult {
                board_state: Some(build_board_state(&self.inner)),
                captured: outcome.captured.is_some(),
                promoted: outcome.promoted.is_some(),
                error: None,
            }),
            Err(err) => to_js(&MoveResult {
                board_state: None,
                captured: false,
                promoted: false,
                error: Some(err.to_string()),
            }),
        }
    }

    pub fn get_legal_moves_for_square(&mut self, file: u8, rank: u8) -> JsValue {
        let at = Coord::new(file, rank);
        let targets: Vec<[u8; 2]> = match self.inner.piece_at(at).filter(|_| at.in_bounds()) {
            Some(id) => self
                .inner
                .legal_targets(id)
                .into_iter()
                .map(|c| [c.file, c.rank])
                .collect(),
            None => Vec::new(),
        };
        to_js(&targets)
    }

    pub fn reset(&mut self) {
        self.inner.reset_match();
    }
}
