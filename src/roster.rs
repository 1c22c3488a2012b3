//! Validated roster: the ordered player list the engine pairs from
//!
//! Numbers must be exactly 1..=len and unique, so number-1 indexes the
//! backing vector directly and every `PlayerSet` bit maps to a player.

use super::player::Player;
use super::player_set::PlayerSet;
use super::types::{PairingError, MAX_PLAYERS};

/// All competitors of one tournament, indexed by roster number
#[derive(Clone, Debug)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Validate and take ownership of the player list. Numbers must cover
    /// 1..=len without gaps or duplicates.
    pub fn new(mut players: Vec<Player>) -> Result<Roster, PairingError> {
        if players.len() > MAX_PLAYERS {
            return Err(PairingError::TooManyPlayers(players.len()));
        }
        let len = players.len();
        let mut seen = vec![false; len];
        for p in &players {
            let n = p.number();
            if n == 0 || n as usize > len {
                return Err(PairingError::NumberOutOfRange { number: n, len });
            }
            if seen[(n - 1) as usize] {
                return Err(PairingError::DuplicateNumber(n));
            }
            seen[(n - 1) as usize] = true;
            // Opponents may be withdrawn players outside the roster, but
            // they must still fit the bitboard capacity.
            for game in p.games() {
                if let Some(opponent) = game.opponent() {
                    if opponent == 0 || opponent as usize > MAX_PLAYERS {
                        return Err(PairingError::OpponentOutOfRange {
                            number: n,
                            opponent,
                        });
                    }
                }
            }
        }
        players.sort_by_key(|p| p.number());
        Ok(Roster { players })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Player> {
        self.players.iter()
    }

    /// Set of every roster number
    pub fn all(&self) -> PlayerSet {
        (1..=self.players.len() as u32).collect()
    }

    /// The round about to be paired: one past the longest history
    pub fn current_round(&self) -> usize {
        self.players.iter().map(|p| p.rounds()).max().unwrap_or(0) + 1
    }

    /// Sticky topscorer marking: over half of the maximum possible score.
    /// Meant to be called by the layer above when the final round arrives.
    pub fn mark_topscorers(&mut self, total_rounds: usize) {
        for p in &mut self.players {
            if p.points().halves() > total_rounds as u32 {
                p.set_topscorer();
            }
        }
    }
}

impl std::ops::Index<u32> for Roster {
    type Output = Player;

    /// Index by roster number (1-based)
    #[inline]
    fn index(&self, number: u32) -> &Player {
        &self.players[(number - 1) as usize]
    }
}

impl std::ops::IndexMut<u32> for Roster {
    #[inline]
    fn index_mut(&mut self, number: u32) -> &mut Player {
        &mut self.players[(number - 1) as usize]
    }
}
