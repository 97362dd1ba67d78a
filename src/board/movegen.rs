//! Pseudo-legal move generation and legality filtering.

use super::attack_tables::{slider_attacks, KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};
use super::{bit_for_square, Bitboard, Board, Color, Move, MoveList, Piece, Square, PROMOTION_PIECES};

impl Board {
    pub(crate) fn mobility_counts(&self) -> (i32, i32) {
        let pieces = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];
        let mut counts = [0i32; 2];

        for color in Color::BOTH {
            let c_idx = color.index();
            let mut count = 0;
            for &piece in &pieces {
                for from in self.pieces[c_idx][piece.index()].iter() {
                    count += self.generate_piece_moves(from, piece, color).len() as i32;
                }
            }
            counts[c_idx] = count;
        }

        (counts[0], counts[1])
    }

    fn generate_pseudo_moves(&self) -> MoveList {
        let color = self.current_color();
        let c_idx = color.index();
        let mut moves = MoveList::new();

        for piece in [
            Piece::Pawn,
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ] {
            for from in self.pieces[c_idx][piece.index()].iter() {
                for m in self.generate_piece_moves(from, piece, color).iter() {
                    moves.push(*m);
                }
            }
        }

        moves
    }

    fn generate_piece_moves(&self, from: Square, piece: Piece, color: Color) -> MoveList {
        match piece {
            Piece::Pawn => self.generate_pawn_moves(from, color),
            Piece::Knight => self.generate_leaper_moves(from, color, KNIGHT_ATTACKS[from.index()]),
            Piece::Bishop => self.generate_sliding_moves(from, color, true, false),
            Piece::Rook => self.generate_sliding_moves(from, color, false, true),
            Piece::Queen => self.generate_sliding_moves(from, color, true, true),
            Piece::King => self.generate_king_moves(from, color),
        }
    }

    /// A quiet move if `to` is empty, otherwise a capture.
    fn quiet_or_capture(&self, from: Square, to: Square) -> Move {
        if self.piece_at(to).is_some() {
            Move::capture(from, to)
        } else {
            Move::quiet(from, to)
        }
    }

    fn push_promotions(&self, moves: &mut MoveList, from: Square, to: Square) {
        let is_capture = self.piece_at(to).is_some();
        for promo in PROMOTION_PIECES {
            moves.push(if is_capture {
                Move::new_promotion_capture(from, to, promo)
            } else {
                Move::new_promotion(from, to, promo)
            });
        }
    }

    fn generate_pawn_moves(&self, from: Square, color: Color) -> MoveList {
        let mut moves = MoveList::new();
        let is_white = color == Color::White;
        let promo_rank = if is_white { 7 } else { 0 };
        let start_rank = if is_white { 1 } else { 6 };

        if let Some(forward_sq) = from.forward(is_white) {
            if self.piece_at(forward_sq).is_none() {
                if forward_sq.rank() == promo_rank {
                    self.push_promotions(&mut moves, from, forward_sq);
                } else {
                    moves.push(Move::quiet(from, forward_sq));
                    if from.rank() == start_rank {
                        if let Some(double_sq) = forward_sq.forward(is_white) {
                            if self.piece_at(double_sq).is_none() {
                                moves.push(Move::double_pawn_push(from, double_sq));
                            }
                        }
                    }
                }
            }

            let file = from.file() as isize;
            for df in [-1isize, 1] {
                let capture_file = file + df;
                if !(0..8).contains(&capture_file) {
                    continue;
                }
                let target_sq = Square::new(forward_sq.rank(), capture_file as usize);
                if let Some((target_color, _)) = self.piece_at(target_sq) {
                    if target_color != color {
                        if target_sq.rank() == promo_rank {
                            self.push_promotions(&mut moves, from, target_sq);
                        } else {
                            moves.push(Move::capture(from, target_sq));
                        }
                    }
                } else if Some(target_sq) == self.en_passant_target {
                    moves.push(Move::en_passant(from, target_sq));
                }
            }
        }

        moves
    }

    fn generate_leaper_moves(&self, from: Square, color: Color, attack_mask: u64) -> MoveList {
        let mut moves = MoveList::new();
        let own_occ = self.occupied_by(color).0;
        for to in Bitboard(attack_mask & !own_occ).iter() {
            moves.push(self.quiet_or_capture(from, to));
        }
        moves
    }

    fn generate_sliding_moves(&self, from: Square, color: Color, diag: bool, orth: bool) -> MoveList {
        let mut moves = MoveList::new();
        let own_occ = self.occupied_by(color).0;
        let occ = self.all_occupied.0;
        let idx = from.index();

        let mut attacks = 0u64;
        if diag {
            attacks |= slider_attacks(idx, occ, true);
        }
        if orth {
            attacks |= slider_attacks(idx, occ, false);
        }
        attacks &= !own_occ;

        for to in Bitboard(attacks).iter() {
            moves.push(self.quiet_or_capture(from, to));
        }
        moves
    }

    fn generate_king_moves(&self, from: Square, color: Color) -> MoveList {
        let mut moves = self.generate_leaper_moves(from, color, KING_ATTACKS[from.index()]);

        let back_rank = if color == Color::White { 0 } else { 7 };
        if from != Square::new(back_rank, 4) {
            return moves;
        }

        if self.has_castling_right(color, 'K')
            && self.piece_at(Square::new(back_rank, 5)).is_none()
            && self.piece_at(Square::new(back_rank, 6)).is_none()
            && self.piece_at(Square::new(back_rank, 7)) == Some((color, Piece::Rook))
        {
            moves.push(Move::castle_kingside(from, Square::new(back_rank, 6)));
        }
        if self.has_castling_right(color, 'Q')
            && self.piece_at(Square::new(back_rank, 1)).is_none()
            && self.piece_at(Square::new(back_rank, 2)).is_none()
            && self.piece_at(Square::new(back_rank, 3)).is_none()
            && self.piece_at(Square::new(back_rank, 0)) == Some((color, Piece::Rook))
        {
            moves.push(Move::castle_queenside(from, Square::new(back_rank, 2)));
        }

        moves
    }

    pub(crate) fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces[color.index()][Piece::King.index()].iter().next()
    }

    pub(crate) fn is_square_attacked(&self, square: Square, attacker_color: Color) -> bool {
        let idx = square.index();
        let c_idx = attacker_color.index();

        let pawn_sources = PAWN_ATTACKS[attacker_color.opponent().index()][idx];
        if self.pieces[c_idx][Piece::Pawn.index()].0 & pawn_sources != 0 {
            return true;
        }
        if self.pieces[c_idx][Piece::Knight.index()].0 & KNIGHT_ATTACKS[idx] != 0 {
            return true;
        }
        if self.pieces[c_idx][Piece::King.index()].0 & KING_ATTACKS[idx] != 0 {
            return true;
        }

        let rook_like =
            self.pieces[c_idx][Piece::Rook.index()].0 | self.pieces[c_idx][Piece::Queen.index()].0;
        let bishop_like =
            self.pieces[c_idx][Piece::Bishop.index()].0 | self.pieces[c_idx][Piece::Queen.index()].0;

        if slider_attacks(idx, self.all_occupied.0, false) & rook_like != 0 {
            return true;
        }
        if slider_attacks(idx, self.all_occupied.0, true) & bishop_like != 0 {
            return true;
        }

        false
    }

    pub(crate) fn is_in_check(&self, color: Color) -> bool {
        match self.find_king(color) {
            Some(king_sq) => self.is_square_attacked(king_sq, color.opponent()),
            None => false,
        }
    }

    /// Quick legality check for a single move, used to validate a TT-supplied
    /// move without regenerating the full move list.
    pub(crate) fn is_legal_move(&mut self, m: Move) -> bool {
        let color = self.current_color();
        let pseudo = self.generate_pseudo_moves();
        if !pseudo.iter().any(|pm| *pm == m) {
            return false;
        }
        if m.is_castling() {
            let opponent = color.opponent();
            let mid = Square::new(m.from().rank(), usize::midpoint(m.from().file(), m.to().file()));
            if self.is_square_attacked(m.from(), opponent)
                || self.is_square_attacked(mid, opponent)
                || self.is_square_attacked(m.to(), opponent)
            {
                return false;
            }
        }
        let info = self.make_move(m);
        let legal = !self.is_in_check(color);
        self.unmake_move(m, info);
        legal
    }

    #[must_use]
    pub fn generate_moves(&mut self) -> MoveList {
        let current_color = self.current_color();
        let opponent_color = current_color.opponent();
        let pseudo_moves = self.generate_pseudo_moves();
        let mut legal_moves = MoveList::new();

        for m in &pseudo_moves {
            let m = *m;
            if m.is_castling() {
                let mid = Square::new(m.from().rank(), usize::midpoint(m.from().file(), m.to().file()));
                if self.is_square_attacked(m.from(), opponent_color)
                    || self.is_square_attacked(mid, opponent_color)
                    || self.is_square_attacked(m.to(), opponent_color)
                {
                    continue;
                }
            }

            let info = self.make_move(m);
            if !self.is_in_check(current_color) {
                legal_moves.push(m);
            }
            self.unmake_move(m, info);
        }
        legal_moves
    }

    #[must_use]
    pub fn is_checkmate(&mut self) -> bool {
        let color = self.current_color();
        self.is_in_check(color) && self.generate_moves().is_empty()
    }

    #[must_use]
    pub fn is_stalemate(&mut self) -> bool {
        let color = self.current_color();
        !self.is_in_check(color) && self.generate_moves().is_empty()
    }

    pub(crate) fn generate_tactical_moves(&mut self) -> MoveList {
        let current_color = self.current_color();
        let c_idx = current_color.index();
        let mut pseudo = MoveList::new();

        for from in self.pieces[c_idx][Piece::Pawn.index()].iter() {
            for m in self.generate_pawn_moves(from, current_color).iter() {
                if m.is_capture() {
                    pseudo.push(*m);
                }
            }
        }

        for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King] {
            for from in self.pieces[c_idx][piece.index()].iter() {
                for m in self.generate_piece_moves(from, piece, current_color).iter() {
                    if m.is_capture() {
                        pseudo.push(*m);
                    }
                }
            }
        }

        let mut legal = MoveList::new();
        for m in &pseudo {
            let m = *m;
            let info = self.make_move(m);
            if !self.is_in_check(current_color) {
                legal.push(m);
            }
            self.unmake_move(m, info);
        }
        legal
    }

    pub(crate) fn generate_checking_moves(&mut self) -> MoveList {
        let current_color = self.current_color();
        let opponent = current_color.opponent();
        let pseudo_moves = self.generate_pseudo_moves();
        let mut checking_moves = MoveList::new();

        for m in &pseudo_moves {
            let m = *m;
            if m.is_castling() {
                continue;
            }
            let info = self.make_move(m);
            if self.is_in_check(opponent) {
                checking_moves.push(m);
            }
            self.unmake_move(m, info);
        }

        checking_moves
    }

    #[must_use]
    pub fn perft(&mut self, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }

        let moves = self.generate_moves();
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0;
        for m in &moves {
            let m = *m;
            let info = self.make_move(m);
            nodes += self.perft(depth - 1);
            self.unmake_move(m, info);
        }

        nodes
    }

    /// Bitboard of pieces of `attacker_color` giving check to (or otherwise
    /// attacking) `sq`. Used by `perft_with_stats` to classify checks.
    fn checkers_to(&self, sq: Square, attacker_color: Color) -> Bitboard {
        let idx = sq.index();
        let c_idx = attacker_color.index();
        let mut attackers = 0u64;

        let pawn_sources = PAWN_ATTACKS[attacker_color.opponent().index()][idx];
        attackers |= self.pieces[c_idx][Piece::Pawn.index()].0 & pawn_sources;
        attackers |= self.pieces[c_idx][Piece::Knight.index()].0 & KNIGHT_ATTACKS[idx];
        attackers |= self.pieces[c_idx][Piece::King.index()].0 & KING_ATTACKS[idx];

        let rook_like =
            self.pieces[c_idx][Piece::Rook.index()].0 | self.pieces[c_idx][Piece::Queen.index()].0;
        let bishop_like = self.pieces[c_idx][Piece::Bishop.index()].0
            | self.pieces[c_idx][Piece::Queen.index()].0;
        attackers |= slider_attacks(idx, self.all_occupied.0, false) & rook_like;
        attackers |= slider_attacks(idx, self.all_occupied.0, true) & bishop_like;

        Bitboard(attackers)
    }

    /// Walk the full perft tree to `depth`, tallying move-type and check
    /// breakdowns for every move played along the way (matching the
    /// published chessprogramming.org perft result tables).
    pub fn perft_with_stats(&mut self, depth: usize) -> PerftStats {
        let mut stats = PerftStats::default();
        self.perft_stats_rec(depth, &mut stats);
        stats
    }

    fn perft_stats_rec(&mut self, depth: usize, stats: &mut PerftStats) {
        if depth == 0 {
            stats.nodes += 1;
            return;
        }

        let moves = self.generate_moves();
        for m in &moves {
            let m = *m;
            if m.is_capture() {
                stats.captures += 1;
            }
            if m.is_en_passant() {
                stats.en_passant += 1;
            }
            if m.is_castling() {
                stats.castles += 1;
            }
            if m.promotion().is_some() {
                stats.promotions += 1;
            }

            let info = self.make_move(m);
            let mover_color = self.current_color().opponent();
            let defender = self.current_color();

            if let Some(king_sq) = self.find_king(defender) {
                let checkers = self.checkers_to(king_sq, mover_color);
                let num_checkers = checkers.popcount();
                if num_checkers > 0 {
                    stats.checks += 1;
                    if num_checkers >= 2 {
                        stats.double_checks += 1;
                    } else if (checkers.0 & bit_for_square(m.to()).0) == 0 {
                        stats.discovery_checks += 1;
                    }
                    if self.generate_moves().is_empty() {
                        stats.checkmates += 1;
                    }
                }
            }

            self.perft_stats_rec(depth - 1, stats);
            self.unmake_move(m, info);
        }
    }

    /// Per-root-move leaf counts for `perft divide`.
    #[must_use]
    pub fn perft_divide(&mut self, depth: usize) -> Vec<(Move, u64)> {
        let moves = self.generate_moves();
        let mut out = Vec::with_capacity(moves.len());
        for m in &moves {
            let m = *m;
            let info = self.make_move(m);
            let nodes = if depth == 0 { 1 } else { self.perft(depth - 1) };
            self.unmake_move(m, info);
            out.push((m, nodes));
        }
        out
    }
}

/// Move-type and check breakdown produced by `Board::perft_with_stats`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PerftStats {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub discovery_checks: u64,
    pub double_checks: u64,
    pub checkmates: u64,
}
