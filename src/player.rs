//! Player and game history model
//!
//! A `Game` is one round's outcome for one player, immutable once created.
//! A `Player` is a stable roster number plus an append-only game list; its
//! colour preference is derived from the colour history on demand, so the
//! derived values can never drift out of step with the games.

use super::player_set::PlayerSet;
use super::types::{Colour, Float, Points, PreferenceDegree};

/// One round's outcome for one player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Game {
    opponent: Option<u32>,
    colour: Option<Colour>,
    float: Float,
    points: Points,
    played: bool,
}

impl Game {
    /// Over-the-board game against an opponent
    pub fn played(opponent: u32, colour: Colour, float: Float, points: Points) -> Game {
        Game {
            opponent: Some(opponent),
            colour: Some(colour),
            float,
            points,
            played: true,
        }
    }

    /// Scheduled game decided by forfeit. The opponent is kept as a
    /// scheduling fact but never counts as a played opponent, and no colour
    /// enters the history.
    pub fn forfeit(opponent: u32, points: Points) -> Game {
        Game {
            opponent: Some(opponent),
            colour: None,
            float: Float::None,
            points,
            played: false,
        }
    }

    /// Pairing-allocated bye. Counts as a downfloat.
    pub fn bye(points: Points) -> Game {
        Game {
            opponent: None,
            colour: None,
            float: Float::Down,
            points,
            played: false,
        }
    }

    /// Administrative absence for the round
    pub fn absent(points: Points) -> Game {
        Game {
            opponent: None,
            colour: None,
            float: Float::None,
            points,
            played: false,
        }
    }

    #[inline]
    pub fn opponent(&self) -> Option<u32> {
        self.opponent
    }

    #[inline]
    pub fn colour(&self) -> Option<Colour> {
        self.colour
    }

    #[inline]
    pub fn float(&self) -> Float {
        self.float
    }

    #[inline]
    pub fn points(&self) -> Points {
        self.points
    }

    #[inline]
    pub fn is_played(&self) -> bool {
        self.played
    }

    /// Pairing-allocated bye?
    #[inline]
    pub fn is_bye(&self) -> bool {
        self.opponent.is_none() && self.float == Float::Down
    }

    /// Win awarded without play against a scheduled opponent?
    #[inline]
    pub fn is_forfeit_win(&self) -> bool {
        self.opponent.is_some() && !self.played && self.points > Points::ZERO
    }
}

/// Derived colour preference: which colour is due and how binding that is.
/// For an absolute preference, `by_imbalance` distinguishes a colour
/// difference beyond one from two same colours in a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColourPreference {
    pub colour: Option<Colour>,
    pub degree: PreferenceDegree,
    by_imbalance: bool,
}

impl ColourPreference {
    pub const NONE: ColourPreference = ColourPreference {
        colour: None,
        degree: PreferenceDegree::None,
        by_imbalance: false,
    };

    fn of(colour: Colour, degree: PreferenceDegree) -> ColourPreference {
        ColourPreference {
            colour: Some(colour),
            degree,
            by_imbalance: false,
        }
    }

    /// Absolute preference caused by a colour difference beyond one
    #[inline]
    pub fn absolute_by_imbalance(&self) -> bool {
        self.degree == PreferenceDegree::Absolute && self.by_imbalance
    }
}

/// A competitor: stable roster number, append-only history, sticky
/// topscorer flag.
#[derive(Clone, Debug)]
pub struct Player {
    number: u32,
    games: Vec<Game>,
    topscorer: bool,
}

impl Player {
    pub fn new(number: u32) -> Player {
        Player {
            number,
            games: Vec::new(),
            topscorer: false,
        }
    }

    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[inline]
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    /// Append one round's game. Histories only ever grow.
    pub fn add_game(&mut self, game: Game) {
        self.games.push(game);
    }

    /// Current score
    pub fn points(&self) -> Points {
        self.games.iter().map(|g| g.points()).sum()
    }

    /// Opponents actually faced over the board. Forfeited pairings are
    /// excluded, so a rematch after a forfeit is legal.
    pub fn opponents(&self) -> PlayerSet {
        self.games
            .iter()
            .filter(|g| g.is_played())
            .filter_map(|g| g.opponent())
            .collect()
    }

    /// Derive the colour preference from the played-colour history
    pub fn colour_preference(&self) -> ColourPreference {
        let colours: Vec<Colour> = self.games.iter().filter_map(|g| g.colour()).collect();
        if colours.is_empty() {
            return ColourPreference::NONE;
        }
        let whites = colours.iter().filter(|&&c| c == Colour::White).count() as i32;
        let diff = 2 * whites - colours.len() as i32;
        if diff > 1 {
            return ColourPreference {
                colour: Some(Colour::Black),
                degree: PreferenceDegree::Absolute,
                by_imbalance: true,
            };
        }
        if diff < -1 {
            return ColourPreference {
                colour: Some(Colour::White),
                degree: PreferenceDegree::Absolute,
                by_imbalance: true,
            };
        }
        let last = colours[colours.len() - 1];
        if colours.len() >= 2 && colours[colours.len() - 2] == last {
            // Two in a row: a third must not happen.
            return ColourPreference::of(last.opposite(), PreferenceDegree::Absolute);
        }
        match diff {
            1 => ColourPreference::of(Colour::Black, PreferenceDegree::Strong),
            -1 => ColourPreference::of(Colour::White, PreferenceDegree::Strong),
            _ => ColourPreference::of(last.opposite(), PreferenceDegree::Mild),
        }
    }

    /// Float direction `rounds_ago` rounds back (1 = most recent game)
    pub fn float_back(&self, rounds_ago: usize) -> Float {
        if self.games.len() >= rounds_ago {
            self.games[self.games.len() - rounds_ago].float()
        } else {
            Float::None
        }
    }

    /// Received a pairing-allocated bye at some point?
    pub fn had_bye(&self) -> bool {
        self.games.iter().any(|g| g.is_bye())
    }

    /// Eligible to be left over for the bye: no previous bye and no
    /// previous forfeit win.
    pub fn bye_eligible(&self) -> bool {
        !self.games.iter().any(|g| g.is_bye() || g.is_forfeit_win())
    }

    #[inline]
    pub fn is_topscorer(&self) -> bool {
        self.topscorer
    }

    /// Mark as a topscorer. Set once, never cleared.
    pub fn set_topscorer(&mut self) {
        self.topscorer = true;
    }

    /// Rounds already on record
    #[inline]
    pub fn rounds(&self) -> usize {
        self.games.len()
    }
}
