use crate::board::{Board, Coord, Occupant};
use crate::config::Rules;
use crate::hooks::PieceFactory;
use crate::pathing::{candidate_cells, TurnFlags};
use crate::piece::{Piece, PieceId, PieceKind, Side};

const BACK_RANK_WHITE: [PieceKind; 8] = [
    PieceKind::Rook, PieceKind::Knight, PieceKind::Bishop, PieceKind::King,
    PieceKind::Queen, PieceKind::Bishop, PieceKind::Knight, PieceKind::Rook,
];

const BACK_RANK_BLACK: [PieceKind; 8] = [
    PieceKind::Rook, PieceKind::Knight, PieceKind::Bishop, PieceKind::Queen,
    PieceKind::King, PieceKind::Bishop, PieceKind::Knight, PieceKind::Rook,
];

/// Board plus every piece that has taken part in the match.
///
/// Pieces live in an arena and are addressed by `PieceId`; a piece records the
/// coordinate it stands on and the cell records the id standing on it. The two
/// must agree except inside a simulated move.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Position {
    board: Board,
    pieces: Vec<Piece>,
    white: Vec<PieceId>,
    black: Vec<PieceId>,
    promoted: Vec<PieceId>,
    turn: TurnFlags,
    rules: Rules,
}

impl Position {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty(rules: Rules) -> Self {
        Position {
            board: Board::new(),
            pieces: Vec::new(),
            white: Vec::new(),
            black: Vec::new(),
            promoted: Vec::new(),
            turn: TurnFlags::default(),
            rules,
        }
    }

    /// Both 16-piece rosters on their starting cells: pawns on the third rank
    /// of each side, royalty on the back rank.
    pub fn standard(rules: Rules, factory: &mut dyn PieceFactory) -> Self {
        let mut pos = Position::empty(rules);
        for (side, pawn_rank, back_rank, order) in [
            (Side::White, 2u8, 0u8, BACK_RANK_WHITE),
            (Side::Black, 5, 7, BACK_RANK_BLACK),
        ] {
            for file in 0..8u8 {
                let pawn = factory.create(PieceKind::Pawn, side);
                pos.add_piece(pawn, Coord::new(file, pawn_rank));
            }
            for (file, kind) in order.into_iter().enumerate() {
                let piece = factory.create(kind, side);
                pos.add_piece(piece, Coord::new(file as u8, back_rank));
            }
        }
        pos
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn turn(&self) -> TurnFlags {
        self.turn
    }

    pub fn set_turn(&mut self, turn: TurnFlags) {
        self.turn = turn;
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0)
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id.0)
    }

    pub fn piece_at(&self, at: Coord) -> Option<PieceId> {
        self.board.occupant(at).map(|o| o.id)
    }

    /// The 16 pieces a side started with (or was given in a test setup).
    pub fn roster(&self, side: Side) -> &[PieceId] {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    pub fn promoted(&self) -> &[PieceId] {
        &self.promoted
    }

    /// Roster plus promoted pieces of `side`, dead ones included.
    pub fn pieces_of(&self, side: Side) -> Vec<PieceId> {
        let mut ids = self.roster(side).to_vec();
        ids.extend(
            self.promoted
                .iter()
                .copied()
                .filter(|&id| self.pieces[id.0].side == side),
        );
        ids
    }

    /// Pieces of `side` that are alive and on the board.
    pub fn live_pieces_of(&self, side: Side) -> Vec<PieceId> {
        self.pieces_of(side)
            .into_iter()
            .filter(|&id| self.pieces[id.0].on_board())
            .collect()
    }

    pub fn all_pieces(&self) -> impl Iterator<Item = (PieceId, &Piece)> {
        self.pieces.iter().enumerate().map(|(i, p)| (PieceId(i), p))
    }

    /// Put a piece on an empty cell and track it in its side's roster.
    pub fn add_piece(&mut self, piece: Piece, at: Coord) -> PieceId {
        let side = piece.side;
        let id = self.insert(piece, at);
        match side {
            Side::White => self.white.push(id),
            Side::Black => self.black.push(id),
        }
        id
    }

    /// Put a piece created mid-game on the board, tracked apart from the rosters.
    pub fn add_promoted(&mut self, piece: Piece, at: Coord) -> PieceId {
        let id = self.insert(piece, at);
        self.promoted.push(id);
        id
    }

    fn insert(&mut self, mut piece: Piece, at: Coord) -> PieceId {
        debug_assert!(self.board.occupant(at).is_none(), "cell {at} already occupied");
        let id = PieceId(self.pieces.len());
        piece.cell = Some(at);
        piece.alive = true;
        if piece.home.is_none() {
            piece.home = Some(at);
        }
        self.board.set_occupant(at, Some(Occupant { id, side: piece.side }));
        self.pieces.push(piece);
        id
    }

    pub fn king_cell(&self, side: Side) -> Option<Coord> {
        self.pieces_of(side)
            .into_iter()
            .map(|id| &self.pieces[id.0])
            .find(|p| p.kind == PieceKind::King && p.on_board())
            .and_then(|p| p.cell)
    }

    pub fn candidates(&self, id: PieceId) -> Vec<Coord> {
        match self.piece(id) {
            Some(p) if p.on_board() => candidate_cells(&self.board, p, &self.rules, self.turn),
            _ => Vec::new(),
        }
    }

    /// Play a piece onto `to` for real. Whatever stood there is captured.
    pub(crate) fn relocate(&mut self, id: PieceId, to: Coord) -> Option<PieceId> {
        let Some(from) = self.pieces[id.0].cell else {
            return None;
        };
        let side = self.pieces[id.0].side;

        let captured = self
            .board
            .set_occupant(to, Some(Occupant { id, side }))
            .map(|o| o.id);
        if let Some(victim) = captured {
            let v = &mut self.pieces[victim.0];
            v.alive = false;
            v.cell = None;
            v.enabled = false;
        }
        self.board.set_occupant(from, None);

        let piece = &mut self.pieces[id.0];
        piece.cell = Some(to);
        piece.first_move = false;

        debug_assert!(self.is_consistent());
        captured
    }

    /// Take a piece out of play, clearing its cell.
    pub(crate) fn kill(&mut self, id: PieceId) {
        let piece = &mut self.pieces[id.0];
        if let Some(at) = piece.cell.take() {
            self.board.set_occupant(at, None);
        }
        piece.alive = false;
        piece.enabled = false;
    }

    /// Move a piece's cell reference without touching the board. Only the
    /// simulator uses this, and always pairs it with a restore.
    pub(crate) fn set_piece_cell(&mut self, id: PieceId, at: Option<Coord>) {
        self.pieces[id.0].cell = at;
    }

    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Drop promoted pieces and put every roster piece back on its home cell.
    pub(crate) fn restore_setup(&mut self) {
        for id in std::mem::take(&mut self.promoted) {
            self.kill(id);
        }
        self.board.clear();
        for id in self.white.iter().chain(self.black.iter()).copied() {
            let piece = &mut self.pieces[id.0];
            piece.alive = piece.home.is_some();
            piece.cell = piece.home;
            piece.first_move = true;
            if let Some(home) = piece.home {
                self.board.set_occupant(home, Some(Occupant { id, side: piece.side }));
            }
        }
        self.turn = TurnFlags::default();
        debug_assert!(self.is_consistent());
    }

    /// Every live piece stands on exactly the cell that points back at it.
    pub fn is_consistent(&self) -> bool {
        let pieces_agree = self.pieces.iter().enumerate().all(|(i, p)| match (p.alive, p.cell) {
            (true, Some(at)) => self.board.occupant(at).map(|o| o.id) == Some(PieceId(i)),
            (false, Some(_)) => false,
            _ => true,
        });
        let cells_agree = self.board.cells().all(|cell| match cell.occupant {
            Some(o) => self
                .pieces
                .get(o.id.0)
                .map(|p| p.alive && p.cell == Some(cell.position) && p.side == o.side)
                .unwrap_or(false),
            None => true,
        });
        pieces_agree && cells_agree
    }
}
