//! Round driver: scoregroups, the bracket walk, and last-group remediation
//!
//! Players are grouped by score and the groups paired from the top down.
//! Each bracket releases a computed number of downfloaters to the group
//! below; a bracket that cannot pair at all merges wholesale into the next
//! one. When the walk strands more than one player at the bottom, the
//! driver moves players out of the second-to-last bracket and re-pairs
//! both until at most one player is left over.

use std::cmp::Reverse;

use log::debug;

use super::bracket::{Bracket, BracketOutcome};
use super::completion::required_mdps;
use super::downfloat::{DownfloatPermit, PermitRule};
use super::pair::Pair;
use super::player_set::PlayerSet;
use super::possible_pairs::{Compat, FeasibilityCache, PossiblePairs};
use super::roster::Roster;
use super::types::{PairingError, Points};

/// Tournament-level settings for a pairing run
#[derive(Clone, Copy, Debug)]
pub struct RoundConfig {
    /// Planned number of rounds, used for topscorer detection in the last one
    pub total_rounds: usize,
    /// Points a pairing-allocated bye is worth
    pub bye_points: Points,
    /// Points for a round missed entirely
    pub absent_points: Points,
}

impl RoundConfig {
    /// Full-point byes, nothing for absence
    pub fn new(total_rounds: usize) -> RoundConfig {
        RoundConfig {
            total_rounds,
            bye_points: Points::WIN,
            absent_points: Points::ZERO,
        }
    }
}

impl Default for RoundConfig {
    fn default() -> RoundConfig {
        RoundConfig::new(9)
    }
}

/// The outcome of pairing one round
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundPairing {
    /// Board order: strongest pairs first
    pub pairs: Vec<Pair>,
    /// Players without an opponent, strongest first. At most one entry
    /// unless part of the field genuinely ran out of opponents.
    pub leftovers: Vec<u32>,
}

impl std::fmt::Display for RoundPairing {
    /// Boards space-separated, leftovers bracketed: `1-6 2-7 [11]`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for pair in &self.pairs {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}", pair)?;
            first = false;
        }
        for number in &self.leftovers {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "[{}]", number)?;
            first = false;
        }
        Ok(())
    }
}

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
pub(crate) static SEARCH_NODES: AtomicU64 = AtomicU64::new(0);
pub(crate) static NO_MEMO: AtomicBool = AtomicBool::new(false);

/// Get the search node count from the last pairing (for profiling)
pub fn search_nodes() -> u64 {
    SEARCH_NODES.load(Ordering::Relaxed)
}

/// Set no-memo mode (disables feasibility memoization for debugging)
pub fn set_no_memo(enabled: bool) {
    NO_MEMO.store(enabled, Ordering::Relaxed);
}

pub(crate) fn memo_disabled() -> bool {
    NO_MEMO.load(Ordering::Relaxed)
}

#[inline]
pub(crate) fn count_node() {
    SEARCH_NODES.fetch_add(1, Ordering::Relaxed);
}

/// One distinct score level, members in rank order
struct Scoregroup {
    points: Points,
    members: Vec<u32>,
}

/// What one bracket of the walk consumed and produced
struct GroupWalk {
    mdps: Vec<u32>,
    residents: Vec<u32>,
    outcome: Option<BracketOutcome>,
}

/// Pair one round for the whole field.
///
/// The roster is taken mutably so that topscorer flags can be set when the
/// final round is reached; pairing itself changes nothing. Results come
/// back in board order, strongest pairs first.
pub fn pair_round(roster: &mut Roster, config: &RoundConfig) -> Result<RoundPairing, PairingError> {
    let round = roster.current_round();
    if let Some(player) = roster.iter().find(|p| p.rounds() >= config.total_rounds) {
        return Err(PairingError::HistoryTooLong {
            number: player.number(),
            games: player.rounds(),
            round,
        });
    }
    if round == config.total_rounds {
        roster.mark_topscorers(config.total_rounds);
    }

    SEARCH_NODES.store(0, Ordering::Relaxed);
    let oracle = PossiblePairs::new(roster);
    let mut cache = FeasibilityCache::new();
    let groups = scoregroups(roster);
    debug!(
        "round {}: {} players in {} scoregroups",
        round,
        roster.len(),
        groups.len()
    );

    let mut walks: Vec<GroupWalk> = Vec::with_capacity(groups.len());
    let mut carried: Vec<u32> = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        let last = i + 1 == groups.len();
        let mdps = std::mem::take(&mut carried);
        let residents = group.members.clone();
        let member_set: PlayerSet = mdps.iter().chain(&residents).copied().collect();
        let below: PlayerSet = groups[i + 1..]
            .iter()
            .flat_map(|g| g.members.iter().copied())
            .collect();
        let next_members: PlayerSet = if last {
            PlayerSet::new()
        } else {
            groups[i + 1].members.iter().copied().collect()
        };
        let floats = required_downfloats(&oracle, member_set, below, last, &mut cache);
        let rule = if last {
            if floats == 1 {
                PermitRule::NoByeYet
            } else {
                PermitRule::Unconditional
            }
        } else {
            PermitRule::CompletionPreserving { below }
        };
        let bracket = Bracket::new(
            &oracle,
            mdps.clone(),
            residents.clone(),
            floats,
            rule,
            next_members,
        );
        let outcome = bracket.pair(&mut cache);
        carried = match &outcome {
            Some(got) => by_rank(roster, got.downfloaters.iter()),
            // The whole group merges into the next one.
            None => by_rank(
                roster,
                mdps.iter().copied().chain(residents.iter().copied()),
            ),
        };
        walks.push(GroupWalk {
            mdps,
            residents,
            outcome,
        });
    }
    let mut leftovers = carried;

    if leftovers.len() > 1 && walks.len() >= 2 {
        if let Some(rescued) = rescue_last_group(&oracle, roster, &groups, &mut walks, &mut cache) {
            leftovers = rescued;
        }
    }

    let mut pairs: Vec<Pair> = Vec::new();
    for walk in &walks {
        if let Some(outcome) = &walk.outcome {
            let mut board = outcome.pairs.clone();
            board.sort_by_key(|pair| pair.key(roster));
            pairs.extend(board);
        }
    }
    debug!(
        "round {}: {} pairs, {} left over, {} search nodes",
        round,
        pairs.len(),
        leftovers.len(),
        search_nodes()
    );
    Ok(RoundPairing { pairs, leftovers })
}

/// The number of players a bracket must release for the walk to stay
/// feasible: enough to drain its own unpairable surplus, enough to
/// complete the field below, and of the right parity.
fn required_downfloats(
    oracle: &PossiblePairs,
    members: PlayerSet,
    below: PlayerSet,
    last: bool,
    cache: &mut FeasibilityCache,
) -> usize {
    let total = members.size();
    let mut floats = oracle.incompatibilities(members, Compat::Opponents, cache);
    if !last {
        let needed = required_mdps(oracle, below, cache);
        if needed > floats {
            floats = needed.min(total);
            if (total - floats) % 2 != 0 {
                floats += 1;
            }
        }
    }
    floats
}

/// Remediation when the last scoregroup strands more than one player.
///
/// Moves sets of players out of the second-to-last bracket, smallest sets
/// and most junior players first, and re-pairs both brackets. The first
/// arrangement leaving at most one player over wins; on success the two
/// walk entries are replaced and the new leftovers returned.
fn rescue_last_group(
    oracle: &PossiblePairs,
    roster: &Roster,
    groups: &[Scoregroup],
    walks: &mut [GroupWalk],
    cache: &mut FeasibilityCache,
) -> Option<Vec<u32>> {
    let n = walks.len();
    let penult_members: Vec<u32> = walks[n - 2]
        .mdps
        .iter()
        .chain(&walks[n - 2].residents)
        .copied()
        .collect();
    let last_core = &groups[n - 1].members;
    let last_core_set: PlayerSet = last_core.iter().copied().collect();

    for k in 1..penult_members.len() {
        let mut movers =
            DownfloatPermit::new(oracle, &penult_members, k, 0, vec![PermitRule::Unconditional]);
        while let Some(moved) = movers.next_allowed(cache) {
            let kept_mdps: Vec<u32> = walks[n - 2]
                .mdps
                .iter()
                .copied()
                .filter(|&p| !moved.have(p))
                .collect();
            let kept_residents: Vec<u32> = walks[n - 2]
                .residents
                .iter()
                .copied()
                .filter(|&p| !moved.have(p))
                .collect();
            let kept_set: PlayerSet = kept_mdps.iter().chain(&kept_residents).copied().collect();
            let below = last_core_set.union(moved);
            let floats = required_downfloats(oracle, kept_set, below, false, cache);
            let bracket = Bracket::new(
                oracle,
                kept_mdps,
                kept_residents,
                floats,
                PermitRule::CompletionPreserving { below },
                below,
            );
            let Some(penult) = bracket.pair(cache) else {
                continue;
            };

            let arriving = by_rank(roster, moved.iter().chain(penult.downfloaters.iter()));
            let joint = last_core_set.union(moved).union(penult.downfloaters);
            let floats_last = required_downfloats(oracle, joint, PlayerSet::new(), true, cache);
            if floats_last > 1 {
                continue;
            }
            let rule = if floats_last == 1 {
                PermitRule::NoByeYet
            } else {
                PermitRule::Unconditional
            };
            let bracket = Bracket::new(
                oracle,
                arriving,
                last_core.clone(),
                floats_last,
                rule,
                PlayerSet::new(),
            );
            let Some(bottom) = bracket.pair(cache) else {
                continue;
            };

            debug!("rescued last scoregroup by moving {:?} down", moved);
            let rescued = by_rank(roster, bottom.downfloaters.iter());
            walks[n - 2].outcome = Some(penult);
            walks[n - 1].outcome = Some(bottom);
            return Some(rescued);
        }
    }
    None
}

/// Distinct score levels, highest first, members in rank order
fn scoregroups(roster: &Roster) -> Vec<Scoregroup> {
    let mut groups: Vec<Scoregroup> = Vec::new();
    for number in by_rank(roster, roster.all().iter()) {
        let points = roster[number].points();
        match groups.last_mut() {
            Some(group) if group.points == points => group.members.push(number),
            _ => groups.push(Scoregroup {
                points,
                members: vec![number],
            }),
        }
    }
    groups
}

/// Rank order: points descending, then ascending pairing number
fn by_rank(roster: &Roster, players: impl IntoIterator<Item = u32>) -> Vec<u32> {
    let mut ranked: Vec<u32> = players.into_iter().collect();
    ranked.sort_by_key(|&p| (Reverse(roster[p].points()), p));
    ranked
}
