//! Quality criteria: the ordered preferential rules a candidate pairing
//! is judged against, and the tolerance bookkeeping that relaxes them
//!
//! Twelve criteria in strict priority order. A candidate is acceptable
//! when every criterion's violation count stays within its currently
//! allowed tolerance. When a whole sweep of candidates fails, the
//! tolerance of the least important criterion actually recorded as a
//! bottleneck rises by one and everything below it drops back to its
//! floor. A more important criterion is never given up to satisfy a
//! less important one.

use log::debug;

use super::pair::Pair;
use super::player_set::PlayerSet;
use super::roster::Roster;
use super::types::{Colour, Float, PreferenceDegree};

pub const CRITERIA: usize = 12;

/// Preferential rules, most important first
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Criterion {
    /// Pair of equal absolute preferences driven by colour imbalance
    SameAbsoluteImbalance,
    /// Pair of equal absolute preferences driven by two colours in a row
    SameAbsoluteRun,
    /// Pair violating at least one colour preference
    ColourViolation,
    /// Violated preference for White
    WhiteViolation,
    /// Violated preference for Black
    BlackViolation,
    /// Pair in which neither player has any preference
    NoPreferencePair,
    /// Leftovers plus the next scoregroup fall short of the expected pairs
    NextGroupShortfall,
    /// Violated preference of strong or absolute degree
    StrongViolation,
    /// Downfloat repeated from the previous round
    RepeatDownfloat,
    /// Upfloat repeated from the previous round
    RepeatUpfloat,
    /// Downfloat repeated from two rounds ago
    OldDownfloat,
    /// Upfloat repeated from two rounds ago
    OldUpfloat,
}

impl Criterion {
    pub const ALL: [Criterion; CRITERIA] = [
        Criterion::SameAbsoluteImbalance,
        Criterion::SameAbsoluteRun,
        Criterion::ColourViolation,
        Criterion::WhiteViolation,
        Criterion::BlackViolation,
        Criterion::NoPreferencePair,
        Criterion::NextGroupShortfall,
        Criterion::StrongViolation,
        Criterion::RepeatDownfloat,
        Criterion::RepeatUpfloat,
        Criterion::OldDownfloat,
        Criterion::OldUpfloat,
    ];

    #[inline]
    pub fn index(self) -> usize {
        Criterion::ALL.iter().position(|&c| c == self).unwrap()
    }
}

/// Violation counts for one candidate: the chosen pairs plus the players
/// released downward. `next_group_shortfall` is supplied by the caller
/// because only the scoregroup layer can see across the boundary.
pub fn count_violations(
    roster: &Roster,
    pairs: &[Pair],
    downfloaters: PlayerSet,
    next_group_shortfall: u32,
) -> [u32; CRITERIA] {
    let mut counts = [0u32; CRITERIA];
    counts[Criterion::NextGroupShortfall.index()] = next_group_shortfall;

    for pair in pairs {
        let (white, black) = pair.colours(roster);
        let wp = roster[white].colour_preference();
        let bp = roster[black].colour_preference();

        if wp.degree == PreferenceDegree::Absolute
            && bp.degree == PreferenceDegree::Absolute
            && wp.colour == bp.colour
        {
            if wp.absolute_by_imbalance() || bp.absolute_by_imbalance() {
                counts[Criterion::SameAbsoluteImbalance.index()] += 1;
            } else {
                counts[Criterion::SameAbsoluteRun.index()] += 1;
            }
        }
        if wp.colour.is_none() && bp.colour.is_none() {
            counts[Criterion::NoPreferencePair.index()] += 1;
        }

        let mut clash = false;
        for (got, pref) in [(Colour::White, wp), (Colour::Black, bp)] {
            let Some(want) = pref.colour else { continue };
            if want == got {
                continue;
            }
            clash = true;
            match want {
                Colour::White => counts[Criterion::WhiteViolation.index()] += 1,
                Colour::Black => counts[Criterion::BlackViolation.index()] += 1,
            }
            if pref.degree >= PreferenceDegree::Strong {
                counts[Criterion::StrongViolation.index()] += 1;
            }
        }
        if clash {
            counts[Criterion::ColourViolation.index()] += 1;
        }

        let (a, b) = pair.numbers();
        let (pa, pb) = (roster[a].points(), roster[b].points());
        if pa != pb {
            let (down, up) = if pa > pb { (a, b) } else { (b, a) };
            tally_float(roster, down, Float::Down, &mut counts);
            tally_float(roster, up, Float::Up, &mut counts);
        }
    }

    for p in downfloaters {
        tally_float(roster, p, Float::Down, &mut counts);
    }
    counts
}

fn tally_float(roster: &Roster, number: u32, direction: Float, counts: &mut [u32; CRITERIA]) {
    let (previous, older) = match direction {
        Float::Down => (Criterion::RepeatDownfloat, Criterion::OldDownfloat),
        Float::Up => (Criterion::RepeatUpfloat, Criterion::OldUpfloat),
        Float::None => return,
    };
    if roster[number].float_back(1) == direction {
        counts[previous.index()] += 1;
    }
    if roster[number].float_back(2) == direction {
        counts[older.index()] += 1;
    }
}

/// Tolerance state for one bracket search
pub struct QualityCriteria {
    allowed: [u32; CRITERIA],
    floor: [u32; CRITERIA],
    recorded: Option<usize>,
}

impl QualityCriteria {
    pub fn new() -> QualityCriteria {
        QualityCriteria {
            allowed: [0; CRITERIA],
            floor: [0; CRITERIA],
            recorded: None,
        }
    }

    /// Raise a criterion's permanent lower bound; violations proven
    /// unavoidable are tolerated from the start instead of stepped up to.
    pub fn seed(&mut self, criterion: Criterion, unavoidable: u32) {
        let i = criterion.index();
        self.floor[i] = unavoidable;
        if self.allowed[i] < unavoidable {
            self.allowed[i] = unavoidable;
        }
    }

    #[inline]
    pub fn allowed(&self, criterion: Criterion) -> u32 {
        self.allowed[criterion.index()]
    }

    /// First criterion over tolerance, if any. A failure is remembered as
    /// the sweep's bottleneck when no earlier criterion is on record.
    pub fn check(&mut self, counts: &[u32; CRITERIA]) -> Result<(), Criterion> {
        for (i, (&count, &allowed)) in counts.iter().zip(self.allowed.iter()).enumerate() {
            if count > allowed {
                self.recorded = Some(self.recorded.map_or(i, |r| r.max(i)));
                return Err(Criterion::ALL[i]);
            }
        }
        Ok(())
    }

    /// After a failed sweep: give the recorded bottleneck one more
    /// violation and pull every less important tolerance back to its
    /// floor. None means no candidate was ever judged, so relaxing
    /// cannot help.
    pub fn relax(&mut self) -> Option<Criterion> {
        let r = self.recorded.take()?;
        self.allowed[r] += 1;
        for i in r + 1..CRITERIA {
            self.allowed[i] = self.floor[i];
        }
        debug!(
            "relaxing {:?} to {} violations",
            Criterion::ALL[r], self.allowed[r]
        );
        Some(Criterion::ALL[r])
    }
}

impl Default for QualityCriteria {
    fn default() -> QualityCriteria {
        QualityCriteria::new()
    }
}
