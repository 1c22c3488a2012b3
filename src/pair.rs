//! A pairing of two players
//!
//! Identity is unordered: the pair (3,8) is the pair (8,3). Board colours
//! are derived from the two colour preferences at the moment they are
//! needed, never stored. Results arrive as textual codes at the boundary
//! and propagate exactly one game into each player's history.

use std::cmp::Reverse;

use super::player::Game;
use super::roster::Roster;
use super::types::{Colour, Float, GameResult, Points};

/// Two paired players, stored lower number first
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair {
    lower: u32,
    higher: u32,
}

impl Pair {
    pub fn new(a: u32, b: u32) -> Pair {
        debug_assert!(a != b);
        Pair {
            lower: a.min(b),
            higher: a.max(b),
        }
    }

    /// The two numbers, lower first
    #[inline]
    pub fn numbers(&self) -> (u32, u32) {
        (self.lower, self.higher)
    }

    /// The partner of `number` within this pair
    #[inline]
    pub fn other(&self, number: u32) -> u32 {
        if number == self.lower {
            self.higher
        } else {
            self.lower
        }
    }

    /// Search order: strongest pair first (max points, then summed points),
    /// the lower player number breaking ties.
    pub(crate) fn key(&self, roster: &Roster) -> (Reverse<Points>, Reverse<Points>, u32) {
        let pl = roster[self.lower].points();
        let ph = roster[self.higher].points();
        (Reverse(pl.max(ph)), Reverse(pl + ph), self.lower)
    }

    /// Derive the colour split: (white player, black player).
    ///
    /// If only one side has a preference, or the preferences point at
    /// different colours, everyone is satisfied. On a genuine conflict the
    /// stronger degree is granted; equal degrees go to the higher-ranked
    /// player (points, then lower number). With no colour history on either
    /// side the higher-ranked player takes White when their number is odd.
    pub fn colours(&self, roster: &Roster) -> (u32, u32) {
        let (a, b) = (self.lower, self.higher);
        let pa = roster[a].colour_preference();
        let pb = roster[b].colour_preference();

        match (pa.colour, pb.colour) {
            (Some(ca), Some(cb)) if ca != cb => self.grant(a, ca),
            (Some(ca), None) => self.grant(a, ca),
            (None, Some(cb)) => self.grant(b, cb),
            (Some(shared), Some(_)) => {
                let winner = if pa.degree != pb.degree {
                    if pa.degree > pb.degree {
                        a
                    } else {
                        b
                    }
                } else {
                    self.senior(roster)
                };
                self.grant(winner, shared)
            }
            (None, None) => {
                let senior = self.senior(roster);
                let colour = if senior % 2 == 1 {
                    Colour::White
                } else {
                    Colour::Black
                };
                self.grant(senior, colour)
            }
        }
    }

    /// The player taking White under the derived colour split
    pub fn white_of(&self, roster: &Roster) -> u32 {
        self.colours(roster).0
    }

    /// The player taking Black under the derived colour split
    pub fn black_of(&self, roster: &Roster) -> u32 {
        self.colours(roster).1
    }

    /// Higher-ranked member: more points, then the lower number
    fn senior(&self, roster: &Roster) -> u32 {
        if roster[self.higher].points() > roster[self.lower].points() {
            self.higher
        } else {
            self.lower
        }
    }

    fn grant(&self, player: u32, colour: Colour) -> (u32, u32) {
        match colour {
            Colour::White => (player, self.other(player)),
            Colour::Black => (self.other(player), player),
        }
    }

    /// Translate a textual-code result into one game per player. Floats are
    /// fixed by the pre-result scores (the higher-scored player floated
    /// down); forfeit codes record the scheduling fact without a played
    /// game, a colour, or a float.
    pub fn apply_result(&self, result: GameResult, roster: &mut Roster) {
        let (white, black) = self.colours(roster);
        let wp = result.white_points();
        let bp = result.black_points();
        if result.is_forfeit() {
            roster[white].add_game(Game::forfeit(black, wp));
            roster[black].add_game(Game::forfeit(white, bp));
            return;
        }
        let (wf, bf) = match roster[white].points().cmp(&roster[black].points()) {
            std::cmp::Ordering::Greater => (Float::Down, Float::Up),
            std::cmp::Ordering::Less => (Float::Up, Float::Down),
            std::cmp::Ordering::Equal => (Float::None, Float::None),
        };
        roster[white].add_game(Game::played(black, Colour::White, wf, wp));
        roster[black].add_game(Game::played(white, Colour::Black, bf, bp));
    }
}

impl std::fmt::Debug for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}-{})", self.lower, self.higher)
    }
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.lower, self.higher)
    }
}
