//! Core type definitions shared across the pairing engine

use thiserror::Error;

/// Hard capacity of the engine: one bit per roster number.
pub const MAX_PLAYERS: usize = 256;

/// Board colours
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Colour {
    White,
    Black,
}

impl Colour {
    /// The other colour
    #[inline]
    pub fn opposite(self) -> Colour {
        match self {
            Colour::White => Colour::Black,
            Colour::Black => Colour::White,
        }
    }

}

impl std::str::FromStr for Colour {
    type Err = PairingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "white" => Ok(Colour::White),
            "b" | "black" => Ok(Colour::Black),
            _ => Err(PairingError::UnknownColour(s.to_string())),
        }
    }
}

impl std::fmt::Display for Colour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colour::White => write!(f, "white"),
            Colour::Black => write!(f, "black"),
        }
    }
}

/// How binding a derived colour preference is. Ordered weakest to strongest,
/// so the derived `Ord` compares preference priority directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreferenceDegree {
    None,
    Mild,
    Strong,
    Absolute,
}

impl std::str::FromStr for PreferenceDegree {
    type Err = PairingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(PreferenceDegree::None),
            "mild" => Ok(PreferenceDegree::Mild),
            "strong" => Ok(PreferenceDegree::Strong),
            "absolute" => Ok(PreferenceDegree::Absolute),
            _ => Err(PairingError::UnknownDegree(s.to_string())),
        }
    }
}

/// Float direction recorded on a game: Down when paired against (or left to
/// face) lower-scored opposition, Up for higher-scored opposition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Float {
    #[default]
    None,
    Down,
    Up,
}

/// Tournament points stored as half-points, so score arithmetic and grouping
/// stay exact. A win is 2 halves, a draw 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Points(u32);

impl Points {
    pub const ZERO: Points = Points(0);
    pub const DRAW: Points = Points(1);
    pub const WIN: Points = Points(2);

    /// Build from a half-point count
    #[inline]
    pub const fn from_halves(halves: u32) -> Points {
        Points(halves)
    }

    /// Raw half-point count
    #[inline]
    pub const fn halves(self) -> u32 {
        self.0
    }
}

impl std::ops::Add for Points {
    type Output = Points;

    #[inline]
    fn add(self, rhs: Points) -> Points {
        Points(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Points {
    #[inline]
    fn add_assign(&mut self, rhs: Points) {
        self.0 += rhs.0;
    }
}

impl std::iter::Sum for Points {
    fn sum<I: Iterator<Item = Points>>(iter: I) -> Points {
        Points(iter.map(|p| p.0).sum())
    }
}

impl std::fmt::Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

/// Outcome of one pairing, as reported by the layer above in the usual
/// textual codes. Forfeit variants score like their decisive counterparts but
/// the game is never treated as played.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    WhiteForfeit,
    BlackForfeit,
    DoubleForfeit,
}

impl GameResult {
    /// Points received by the white player, in halves
    #[inline]
    pub fn white_points(self) -> Points {
        match self {
            GameResult::WhiteWins | GameResult::WhiteForfeit => Points::WIN,
            GameResult::Draw => Points::DRAW,
            _ => Points::ZERO,
        }
    }

    /// Points received by the black player, in halves
    #[inline]
    pub fn black_points(self) -> Points {
        match self {
            GameResult::BlackWins | GameResult::BlackForfeit => Points::WIN,
            GameResult::Draw => Points::DRAW,
            _ => Points::ZERO,
        }
    }

    /// True for any outcome decided without play
    #[inline]
    pub fn is_forfeit(self) -> bool {
        matches!(
            self,
            GameResult::WhiteForfeit | GameResult::BlackForfeit | GameResult::DoubleForfeit
        )
    }
}

impl std::str::FromStr for GameResult {
    type Err = PairingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1-0" => Ok(GameResult::WhiteWins),
            "0-1" => Ok(GameResult::BlackWins),
            "1/2-1/2" | "=" => Ok(GameResult::Draw),
            "+/-" => Ok(GameResult::WhiteForfeit),
            "-/+" => Ok(GameResult::BlackForfeit),
            "-/-" => Ok(GameResult::DoubleForfeit),
            _ => Err(PairingError::UnknownResult(s.to_string())),
        }
    }
}

/// Structural errors. Anything here means the input itself is malformed;
/// an unpairable round is not an error and is reported through the pairing
/// result instead.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PairingError {
    #[error("duplicate player number {0}")]
    DuplicateNumber(u32),

    #[error("player number {number} out of range for a roster of {len}")]
    NumberOutOfRange { number: u32, len: usize },

    #[error("roster holds {0} players, engine capacity is {MAX_PLAYERS}")]
    TooManyPlayers(usize),

    #[error("player {number} has a game against opponent {opponent}, outside engine capacity")]
    OpponentOutOfRange { number: u32, opponent: u32 },

    #[error("unknown colour code '{0}'")]
    UnknownColour(String),

    #[error("unknown preference degree '{0}'")]
    UnknownDegree(String),

    #[error("unknown result code '{0}'")]
    UnknownResult(String),

    #[error("player {number} has {games} games before round {round}")]
    HistoryTooLong { number: u32, games: usize, round: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_colour_opposite() {
        assert_eq!(Colour::White.opposite(), Colour::Black);
        assert_eq!(Colour::Black.opposite(), Colour::White);
    }

    #[test]
    fn test_colour_parse() {
        assert_eq!(Colour::from_str("w"), Ok(Colour::White));
        assert_eq!(Colour::from_str("Black"), Ok(Colour::Black));
        assert_eq!(
            Colour::from_str("green"),
            Err(PairingError::UnknownColour("green".to_string()))
        );
    }

    #[test]
    fn test_degree_order() {
        assert!(PreferenceDegree::None < PreferenceDegree::Mild);
        assert!(PreferenceDegree::Mild < PreferenceDegree::Strong);
        assert!(PreferenceDegree::Strong < PreferenceDegree::Absolute);
    }

    #[test]
    fn test_degree_parse() {
        assert_eq!(
            PreferenceDegree::from_str("absolute"),
            Ok(PreferenceDegree::Absolute)
        );
        assert_eq!(PreferenceDegree::from_str("Mild"), Ok(PreferenceDegree::Mild));
        assert_eq!(
            PreferenceDegree::from_str("severe"),
            Err(PairingError::UnknownDegree("severe".to_string()))
        );
    }

    #[test]
    fn test_points_display() {
        assert_eq!(Points::ZERO.to_string(), "0");
        assert_eq!(Points::DRAW.to_string(), "0.5");
        assert_eq!(Points::from_halves(5).to_string(), "2.5");
        assert_eq!((Points::WIN + Points::WIN + Points::DRAW).to_string(), "2.5");
    }

    #[test]
    fn test_result_codes() {
        assert_eq!(GameResult::from_str("1-0"), Ok(GameResult::WhiteWins));
        assert_eq!(GameResult::from_str("="), Ok(GameResult::Draw));
        assert_eq!(GameResult::from_str("-/+"), Ok(GameResult::BlackForfeit));
        assert_eq!(GameResult::from_str("-/-"), Ok(GameResult::DoubleForfeit));
        assert!(GameResult::from_str("2-0").is_err());
    }

    #[test]
    fn test_result_points() {
        assert_eq!(GameResult::WhiteWins.white_points(), Points::WIN);
        assert_eq!(GameResult::WhiteWins.black_points(), Points::ZERO);
        assert_eq!(GameResult::Draw.white_points(), Points::DRAW);
        assert_eq!(GameResult::BlackForfeit.black_points(), Points::WIN);
        assert_eq!(GameResult::DoubleForfeit.white_points(), Points::ZERO);
        assert!(GameResult::WhiteForfeit.is_forfeit());
        assert!(!GameResult::Draw.is_forfeit());
    }
}
