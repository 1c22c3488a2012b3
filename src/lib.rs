//! Swiss-system chess pairing engine implementing the FIDE Dutch rules
//!
//! Pairs one round at a time from the players' recorded game histories:
//! - Scoregroup walk from the top, downfloaters bridging the groups
//! - Exhaustive candidate search per bracket over the S1/S2 split, with
//!   transpositions and exchanges
//! - Twelve quality criteria relaxed one tolerance step at a time;
//!   absolute constraints are never waived
//! - Memoized feasibility oracle keeping every release completable below
//!
//! # Example
//!
//! ```
//! use swiss_pairer::{pair_round, Player, Roster, RoundConfig};
//!
//! let players: Vec<Player> = (1..=8).map(Player::new).collect();
//! let mut roster = Roster::new(players).unwrap();
//!
//! let round = pair_round(&mut roster, &RoundConfig::new(7)).unwrap();
//! assert_eq!(round.pairs.len(), 4);
//! assert!(round.leftovers.is_empty());
//! ```

mod bracket;
mod completion;
mod criteria;
mod downfloat;
mod exchanger;
mod pair;
mod player;
pub mod player_set;
mod possible_pairs;
mod roster;
mod round;
pub mod types;

pub use bracket::{Bracket, BracketOutcome};
pub use completion::{completable, required_mdps};
pub use criteria::{count_violations, Criterion, QualityCriteria, CRITERIA};
pub use downfloat::{DownfloatPermit, PermitRule};
pub use exchanger::{Exchange, Exchanger};
pub use pair::Pair;
pub use player::{ColourPreference, Game, Player};
pub use player_set::PlayerSet;
pub use possible_pairs::{Compat, FeasibilityCache, PossiblePairs};
pub use roster::Roster;
pub use round::{pair_round, search_nodes, set_no_memo, RoundConfig, RoundPairing};
pub use types::{
    Colour, Float, GameResult, PairingError, Points, PreferenceDegree, MAX_PLAYERS,
};
