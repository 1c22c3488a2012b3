//! Bracket search: pairing one scoregroup's players
//!
//! A bracket runs *building* (choose downfloaters, split the kept
//! players into S1/S2), *pairing* (recursive search over S1 x S2) and
//! *exchanging* (advance the transposition stream and rebuild), ending
//! *paired* or *unpairable*. Heterogeneous brackets host their
//! moved-down players against residents first, park the unhostable ones
//! in limbo and recurse into the leftover residents. Every complete
//! candidate is judged against the quality criteria under one shared
//! tolerance state; when a whole sweep fails, the tolerances relax and
//! the sweep restarts.

use fxhash::FxHashSet;
use log::debug;

use super::criteria::{count_violations, Criterion, QualityCriteria};
use super::downfloat::{DownfloatPermit, PermitRule};
use super::exchanger::{Exchange, Exchanger};
use super::pair::Pair;
use super::player_set::PlayerSet;
use super::possible_pairs::{Compat, FeasibilityCache, PossiblePairs};
use super::types::{Points, PreferenceDegree};

/// A paired bracket: the pairs plus the players released downward
#[derive(Debug)]
pub struct BracketOutcome {
    pub pairs: Vec<Pair>,
    pub downfloaters: PlayerSet,
}

/// One scoregroup's pairing problem. `mdps` and `residents` are given in
/// priority order (points descending, number ascending); `downfloats` is
/// the exact number of players the bracket must release.
pub struct Bracket<'a> {
    oracle: &'a PossiblePairs<'a>,
    mdps: Vec<u32>,
    residents: Vec<u32>,
    downfloats: usize,
    base_rule: PermitRule,
    next_members: PlayerSet,
}

impl<'a> Bracket<'a> {
    pub fn new(
        oracle: &'a PossiblePairs<'a>,
        mdps: Vec<u32>,
        residents: Vec<u32>,
        downfloats: usize,
        base_rule: PermitRule,
        next_members: PlayerSet,
    ) -> Bracket<'a> {
        Bracket {
            oracle,
            mdps,
            residents,
            downfloats,
            base_rule,
            next_members,
        }
    }

    /// Find the best compliant pairing, or None when the bracket cannot
    /// be paired at its required size under any tolerance.
    pub fn pair(&self, cache: &mut FeasibilityCache) -> Option<BracketOutcome> {
        let total = self.mdps.len() + self.residents.len();
        if total == 0 {
            return Some(BracketOutcome {
                pairs: Vec::new(),
                downfloaters: PlayerSet::new(),
            });
        }
        let heterogeneous = !self.mdps.is_empty() && self.mdps.len() < self.residents.len();
        let mut downfloats = self.downfloats;
        if heterogeneous {
            // Moved-down players never meet each other here, so the ones
            // with no resident partner left must float whatever release
            // count was requested.
            let resident_set: PlayerSet = self.residents.iter().copied().collect();
            let forced = self
                .mdps
                .iter()
                .filter(|&&p| {
                    self.oracle
                        .partners_in(p, resident_set, Compat::Opponents)
                        .is_empty()
                })
                .count();
            if forced > downfloats {
                downfloats = forced;
                if (total - downfloats) % 2 != 0 {
                    downfloats += 1;
                }
            }
        }
        if downfloats > total || (total - downfloats) % 2 != 0 {
            return None;
        }
        let target = (total - downfloats) / 2;
        debug!(
            "bracket of {} ({} moved down), {} pairs wanted, {} to release",
            total,
            self.mdps.len(),
            target,
            downfloats
        );

        let mut quality = QualityCriteria::new();
        self.seed_unavoidable(&mut quality, target, downfloats, cache);

        if heterogeneous {
            self.pair_heterogeneous(target, downfloats, &mut quality, cache)
        } else {
            self.pair_homogeneous(target, downfloats, &mut quality, cache)
        }
    }

    /// All members in priority order; moved-down players outrank residents.
    fn members(&self) -> Vec<u32> {
        let mut members = self.mdps.clone();
        members.extend_from_slice(&self.residents);
        members
    }

    /// Violations no candidate can avoid are tolerated from the start, so
    /// the relaxation loop never grinds up to a provable lower bound.
    fn seed_unavoidable(
        &self,
        quality: &mut QualityCriteria,
        target: usize,
        downfloats: usize,
        cache: &mut FeasibilityCache,
    ) {
        let roster = self.oracle.roster();
        let members = self.members();
        let member_set: PlayerSet = members.iter().copied().collect();

        let no_preference = members
            .iter()
            .filter(|&&p| roster[p].colour_preference().colour.is_none())
            .count();
        let with_preference = members.len() - no_preference;
        let forced_blank_pairs =
            no_preference.saturating_sub(with_preference + downfloats) / 2;
        quality.seed(Criterion::NoPreferencePair, forced_blank_pairs as u32);

        let colour_pairs = self.oracle.count(member_set, Compat::Colour, cache);
        quality.seed(
            Criterion::ColourViolation,
            target.saturating_sub(colour_pairs) as u32,
        );
        let strong_pairs = self.oracle.count(member_set, Compat::StrongColour, cache);
        quality.seed(
            Criterion::StrongViolation,
            target.saturating_sub(strong_pairs) as u32,
        );
    }

    fn pair_homogeneous(
        &self,
        target: usize,
        downfloats: usize,
        quality: &mut QualityCriteria,
        cache: &mut FeasibilityCache,
    ) -> Option<BracketOutcome> {
        let members = self.members();
        loop {
            let mut permit = DownfloatPermit::new(
                self.oracle,
                &members,
                downfloats,
                target,
                self.permit_rules(&members),
            );
            while let Some(floaters) = permit.next_allowed(cache) {
                let shortfall = self.shortfall(floaters, cache);
                let kept: Vec<u32> = members
                    .iter()
                    .copied()
                    .filter(|&p| !floaters.have(p))
                    .collect();
                let mut stream = SplitStream::new(self, kept, target);
                while let Some(pairs) = stream.next_candidate() {
                    let counts =
                        count_violations(self.oracle.roster(), &pairs, floaters, shortfall);
                    if quality.check(&counts).is_ok() {
                        return Some(BracketOutcome {
                            pairs,
                            downfloaters: floaters,
                        });
                    }
                }
            }
            quality.relax()?;
        }
    }

    fn pair_heterogeneous(
        &self,
        target: usize,
        downfloats: usize,
        quality: &mut QualityCriteria,
        cache: &mut FeasibilityCache,
    ) -> Option<BracketOutcome> {
        let resident_set: PlayerSet = self.residents.iter().copied().collect();
        let mdp_set: PlayerSet = self.mdps.iter().copied().collect();

        // Moved-down players with no opponent left among the residents can
        // never be hosted; they sit in limbo unconditionally.
        let (hostable, forced): (Vec<u32>, Vec<u32>) = self.mdps.iter().copied().partition(|&p| {
            !self
                .oracle
                .partners_in(p, resident_set, Compat::Opponents)
                .is_empty()
        });
        let cross = self
            .oracle
            .count_cross(mdp_set, resident_set, Compat::Opponents, cache);
        let hosted_count = cross.min(hostable.len());
        let forced_limbo: PlayerSet = forced.iter().copied().collect();

        loop {
            let mut limbo_exchanger =
                Exchanger::new(hosted_count, hostable.len() - hosted_count);
            let mut limbo_exchange: Option<Exchange> = None;
            loop {
                let (s1, parked) =
                    split_members(&hostable, hosted_count, limbo_exchange.as_ref());
                let limbo = forced_limbo.union(parked.iter().copied().collect());
                let remainder_floats = downfloats.saturating_sub(limbo.size());

                if let Some(outcome) = self.seek_hosted(
                    &s1,
                    limbo,
                    target,
                    remainder_floats,
                    quality,
                    cache,
                ) {
                    return Some(outcome);
                }
                match limbo_exchanger.next_exchange() {
                    Some(e) => limbo_exchange = Some(e),
                    None => break,
                }
            }
            quality.relax()?;
        }
    }

    /// One limbo configuration: host `s1` against the residents, then
    /// recurse into the remainder, judging each full candidate jointly.
    fn seek_hosted(
        &self,
        s1: &[u32],
        limbo: PlayerSet,
        target: usize,
        remainder_floats: usize,
        quality: &mut QualityCriteria,
        cache: &mut FeasibilityCache,
    ) -> Option<BracketOutcome> {
        let Some(remainder_target) = target.checked_sub(s1.len()) else {
            return None;
        };
        // Limbo members float without passing through the permit, so the
        // bracket's release rule must hold for them too: no second bye,
        // and the completion check covers them alongside whatever the
        // remainder releases.
        if matches!(self.base_rule, PermitRule::NoByeYet)
            && !limbo.iter().all(|p| self.oracle.roster()[p].bye_eligible())
        {
            return None;
        }
        let release_rule = match &self.base_rule {
            PermitRule::CompletionPreserving { below } => PermitRule::CompletionPreserving {
                below: below.union(limbo),
            },
            other => other.clone(),
        };
        let mut hosting = PairSearch::new(self, s1.to_vec(), self.residents.clone());
        while let Some(host_pairs) = hosting.next_candidate() {
            let mut consumed = PlayerSet::new();
            for pair in &host_pairs {
                let (a, b) = pair.numbers();
                consumed.add(a).add(b);
            }
            let remainder: Vec<u32> = self
                .residents
                .iter()
                .copied()
                .filter(|&p| !consumed.have(p))
                .collect();
            if remainder.len() < remainder_floats {
                continue;
            }

            let mut permit = DownfloatPermit::new(
                self.oracle,
                &remainder,
                remainder_floats,
                remainder_target,
                vec![release_rule.clone()],
            );
            while let Some(released) = permit.next_allowed(cache) {
                let floaters = limbo.union(released);
                let shortfall = self.shortfall(floaters, cache);
                let kept: Vec<u32> = remainder
                    .iter()
                    .copied()
                    .filter(|&p| !released.have(p))
                    .collect();
                let mut stream = SplitStream::new(self, kept, remainder_target);
                while let Some(remainder_pairs) = stream.next_candidate() {
                    let mut pairs = host_pairs.clone();
                    pairs.extend(remainder_pairs);
                    let counts =
                        count_violations(self.oracle.roster(), &pairs, floaters, shortfall);
                    if quality.check(&counts).is_ok() {
                        return Some(BracketOutcome {
                            pairs,
                            downfloaters: floaters,
                        });
                    }
                }
            }
        }
        None
    }

    fn permit_rules(&self, members: &[u32]) -> Vec<PermitRule> {
        let mut rules = vec![self.base_rule.clone()];
        if !self.mdps.is_empty() {
            // Merged treatment: every score band must still shed the
            // players that cannot meet anyone in the bracket.
            rules.push(PermitRule::MovedDown {
                quotas: self.band_quotas(members),
            });
        }
        rules
    }

    /// Per score band of the moved-down players (lowest first): how many
    /// members provably cannot stay.
    fn band_quotas(&self, members: &[u32]) -> Vec<(PlayerSet, usize)> {
        let roster = self.oracle.roster();
        let member_set: PlayerSet = members.iter().copied().collect();
        let mut bands: Vec<(Points, PlayerSet)> = Vec::new();
        for &p in &self.mdps {
            let points = roster[p].points();
            match bands.iter_mut().find(|(band, _)| *band == points) {
                Some((_, set)) => {
                    set.add(p);
                }
                None => bands.push((points, PlayerSet::single(p))),
            }
        }
        bands.sort_by_key(|&(points, _)| points);
        bands
            .into_iter()
            .map(|(_, band)| {
                let stuck = band
                    .iter()
                    .filter(|&p| {
                        self.oracle
                            .partners_in(p, member_set, Compat::Opponents)
                            .is_empty()
                    })
                    .count();
                (band, stuck)
            })
            .collect()
    }

    /// Criterion 7: how far the released players, joined to the next
    /// scoregroup, fall short of their expected pair count.
    fn shortfall(&self, floaters: PlayerSet, cache: &mut FeasibilityCache) -> u32 {
        let joint = self.next_members.union(floaters);
        let expected = joint.size() / 2;
        let actual = self.oracle.count(joint, Compat::Opponents, cache);
        expected.saturating_sub(actual) as u32
    }

    /// Absolute pair legality: never met before, and no identical absolute
    /// colour preference unless both are topscorers.
    fn compatible(&self, a: u32, b: u32) -> bool {
        let roster = self.oracle.roster();
        if roster[a].opponents().have(b) || roster[b].opponents().have(a) {
            return false;
        }
        let pa = roster[a].colour_preference();
        let pb = roster[b].colour_preference();
        if pa.degree == PreferenceDegree::Absolute
            && pb.degree == PreferenceDegree::Absolute
            && pa.colour == pb.colour
        {
            return roster[a].is_topscorer() && roster[b].is_topscorer();
        }
        true
    }
}

/// Distribute priority-ordered members into (top, bottom) of sizes
/// (n1, rest), applying a transposition given as sequence-number masks.
/// Both halves come back in priority order.
fn split_members(ordered: &[u32], n1: usize, exchange: Option<&Exchange>) -> (Vec<u32>, Vec<u32>) {
    let mut top = Vec::with_capacity(n1);
    let mut bottom = Vec::with_capacity(ordered.len() - n1);
    for (i, &player) in ordered.iter().enumerate() {
        let seq = (i + 1) as u32;
        let in_top = i < n1;
        let swapped = exchange.map_or(false, |e| {
            if in_top {
                e.from_s1.have(seq)
            } else {
                e.from_s2.have(seq)
            }
        });
        if in_top != swapped {
            top.push(player);
        } else {
            bottom.push(player);
        }
    }
    (top, bottom)
}

type Combination = Vec<(u32, u32)>;

/// Failed combinations seen while searching one split. Absolute dead ends
/// persist; judged candidates and anything poisoned by them are kept
/// apart so they never harden into absolute records.
#[derive(Default)]
struct CombinationRecords {
    impossible: FxHashSet<Combination>,
    rejected: FxHashSet<Combination>,
}

enum SeekResult {
    Found,
    Dead { tainted: bool },
}

/// Candidate pairings for one fixed S1/S2 split, yielded in order: S1 by
/// priority, each taking the first admissible S2 partner.
struct PairSearch<'a, 'b> {
    bracket: &'b Bracket<'a>,
    s1: Vec<u32>,
    s2: Vec<u32>,
    records: CombinationRecords,
}

impl<'a, 'b> PairSearch<'a, 'b> {
    fn new(bracket: &'b Bracket<'a>, s1: Vec<u32>, s2: Vec<u32>) -> PairSearch<'a, 'b> {
        PairSearch {
            bracket,
            s1,
            s2,
            records: CombinationRecords::default(),
        }
    }

    fn next_candidate(&mut self) -> Option<Vec<Pair>> {
        let mut chosen: Combination = Vec::with_capacity(self.s1.len());
        let mut used = PlayerSet::new();
        match self.seek(0, &mut used, &mut chosen) {
            SeekResult::Found => {
                // A yielded candidate is judged exactly once.
                self.records.rejected.insert(canonical(&chosen));
                Some(chosen.iter().map(|&(a, b)| Pair::new(a, b)).collect())
            }
            SeekResult::Dead { .. } => None,
        }
    }

    fn seek(
        &mut self,
        depth: usize,
        used: &mut PlayerSet,
        chosen: &mut Combination,
    ) -> SeekResult {
        super::round::count_node();
        if depth == self.s1.len() {
            let key = canonical(chosen);
            if self.records.impossible.contains(&key) {
                return SeekResult::Dead { tainted: false };
            }
            if self.records.rejected.contains(&key) {
                return SeekResult::Dead { tainted: true };
            }
            return SeekResult::Found;
        }
        let player = self.s1[depth];
        let mut tainted = false;
        for i in 0..self.s2.len() {
            let candidate = self.s2[i];
            if used.have(candidate) || !self.bracket.compatible(player, candidate) {
                continue;
            }
            chosen.push((player, candidate));
            let key = canonical(chosen);
            if self.records.impossible.contains(&key) {
                chosen.pop();
                continue;
            }
            if self.records.rejected.contains(&key) {
                tainted = true;
                chosen.pop();
                continue;
            }
            used.add(candidate);
            match self.seek(depth + 1, used, chosen) {
                SeekResult::Found => return SeekResult::Found,
                SeekResult::Dead { tainted: t } => {
                    tainted |= t;
                    used.remove(candidate);
                    chosen.pop();
                }
            }
        }
        if depth > 0 {
            let key = canonical(chosen);
            if tainted {
                self.records.rejected.insert(key);
            } else {
                self.records.impossible.insert(key);
            }
        }
        SeekResult::Dead { tainted }
    }
}

/// Order-independent key for a partial or complete combination
fn canonical(chosen: &[(u32, u32)]) -> Combination {
    let mut key: Combination = chosen
        .iter()
        .map(|&(a, b)| if a < b { (a, b) } else { (b, a) })
        .collect();
    key.sort_unstable();
    key
}

/// Candidate pairings across all splits of one kept member set: the
/// unexchanged half-split first, then every transposition in order.
struct SplitStream<'a, 'b> {
    bracket: &'b Bracket<'a>,
    kept: Vec<u32>,
    n1: usize,
    exchanger: Exchanger,
    search: Option<PairSearch<'a, 'b>>,
    begun: bool,
}

impl<'a, 'b> SplitStream<'a, 'b> {
    fn new(bracket: &'b Bracket<'a>, kept: Vec<u32>, n1: usize) -> SplitStream<'a, 'b> {
        let n2 = kept.len() - n1;
        SplitStream {
            bracket,
            kept,
            n1,
            exchanger: Exchanger::new(n1, n2),
            search: None,
            begun: false,
        }
    }

    fn next_candidate(&mut self) -> Option<Vec<Pair>> {
        loop {
            if let Some(search) = self.search.as_mut() {
                if let Some(found) = search.next_candidate() {
                    return Some(found);
                }
                self.search = None;
                continue;
            }
            let exchange = if self.begun {
                Some(self.exchanger.next_exchange()?)
            } else {
                self.begun = true;
                None
            };
            let (s1, s2) = split_members(&self.kept, self.n1, exchange.as_ref());
            self.search = Some(PairSearch::new(self.bracket, s1, s2));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Game, Player};
    use crate::roster::Roster;
    use crate::types::{Colour, Float};

    fn roster_with_games(n: u32, played: &[(u32, u32)]) -> Roster {
        let mut players: Vec<Player> = (1..=n).map(Player::new).collect();
        for &(white, black) in played {
            players[(white - 1) as usize].add_game(Game::played(
                black,
                Colour::White,
                Float::None,
                Points::DRAW,
            ));
            players[(black - 1) as usize].add_game(Game::played(
                white,
                Colour::Black,
                Float::None,
                Points::DRAW,
            ));
        }
        Roster::new(players).unwrap()
    }

    fn pairs(outcome: &BracketOutcome) -> Vec<(u32, u32)> {
        outcome.pairs.iter().map(Pair::numbers).collect()
    }

    #[test]
    fn test_fresh_bracket_pairs_top_half_against_bottom() {
        let roster = roster_with_games(10, &[]);
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        let bracket = Bracket::new(
            &oracle,
            Vec::new(),
            (1..=10).collect(),
            0,
            PermitRule::Unconditional,
            PlayerSet::new(),
        );
        let outcome = bracket.pair(&mut cache).unwrap();
        assert_eq!(pairs(&outcome), vec![(1, 6), (2, 7), (3, 8), (4, 9), (5, 10)]);
        assert!(outcome.downfloaters.is_empty());
    }

    #[test]
    fn test_search_backtracks_around_previous_opponents() {
        let roster = roster_with_games(10, &[(5, 10)]);
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        let bracket = Bracket::new(
            &oracle,
            Vec::new(),
            (1..=10).collect(),
            0,
            PermitRule::Unconditional,
            PlayerSet::new(),
        );
        let outcome = bracket.pair(&mut cache).unwrap();
        assert_eq!(
            pairs(&outcome),
            vec![(1, 6), (2, 7), (3, 8), (4, 10), (5, 9)]
        );
    }

    #[test]
    fn test_identical_absolute_preferences_deadlock() {
        // 1-4 each carry two Blacks against outsiders: all demand White
        // absolutely, so no pair among them is legal.
        let roster = roster_with_games(
            8,
            &[(5, 1), (6, 1), (5, 2), (6, 2), (7, 3), (8, 3), (7, 4), (8, 4)],
        );
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        let bracket = Bracket::new(
            &oracle,
            Vec::new(),
            vec![1, 2, 3, 4],
            0,
            PermitRule::Unconditional,
            PlayerSet::new(),
        );
        assert!(bracket.pair(&mut cache).is_none());
    }

    #[test]
    fn test_topscorers_override_the_deadlock() {
        let mut players: Vec<Player> = (1..=8).map(Player::new).collect();
        for (white, black) in [(5, 1), (6, 1), (5, 2), (6, 2), (7, 3), (8, 3), (7, 4), (8, 4)] {
            players[(white - 1) as usize].add_game(Game::played(
                black,
                Colour::White,
                Float::None,
                Points::DRAW,
            ));
            players[(black - 1) as usize].add_game(Game::played(
                white,
                Colour::Black,
                Float::None,
                Points::DRAW,
            ));
        }
        for p in 0..4 {
            players[p].set_topscorer();
        }
        let roster = Roster::new(players).unwrap();
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        let bracket = Bracket::new(
            &oracle,
            Vec::new(),
            vec![1, 2, 3, 4],
            0,
            PermitRule::Unconditional,
            PlayerSet::new(),
        );
        let outcome = bracket.pair(&mut cache).unwrap();
        assert_eq!(pairs(&outcome), vec![(1, 3), (2, 4)]);
    }

    #[test]
    fn test_moved_down_players_are_hosted_first() {
        let mut players: Vec<Player> = (1..=6).map(Player::new).collect();
        players[0].add_game(Game::bye(Points::WIN));
        players[1].add_game(Game::bye(Points::WIN));
        let roster = Roster::new(players).unwrap();
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        let bracket = Bracket::new(
            &oracle,
            vec![1, 2],
            vec![3, 4, 5, 6],
            0,
            PermitRule::Unconditional,
            PlayerSet::new(),
        );
        let outcome = bracket.pair(&mut cache).unwrap();
        assert_eq!(pairs(&outcome), vec![(1, 3), (2, 4), (5, 6)]);
        assert!(outcome.downfloaters.is_empty());
    }

    #[test]
    fn test_releases_the_played_out_and_respects_colours() {
        // 5 and 6 have met everyone; among the rest, 1 and 3 are due
        // Black, 2 and 4 due White.
        let roster = roster_with_games(
            6,
            &[
                (5, 1),
                (2, 5),
                (5, 3),
                (4, 5),
                (5, 6),
                (1, 6),
                (6, 2),
                (3, 6),
                (6, 4),
            ],
        );
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        let bracket = Bracket::new(
            &oracle,
            Vec::new(),
            (1..=6).collect(),
            2,
            PermitRule::Unconditional,
            PlayerSet::new(),
        );
        let outcome = bracket.pair(&mut cache).unwrap();
        assert_eq!(pairs(&outcome), vec![(1, 4), (2, 3)]);
        assert_eq!(outcome.downfloaters.iter().collect::<Vec<_>>(), vec![5, 6]);
    }

    #[test]
    fn test_limbo_player_cannot_take_a_second_bye() {
        // 1 sits on an earlier bye and has since played every resident:
        // nobody can host it, and handing it the bye again is illegal, so
        // the bracket must give up rather than strand it.
        let mut players: Vec<Player> = (1..=5).map(Player::new).collect();
        players[0].add_game(Game::bye(Points::WIN));
        for opp in 2..=5u32 {
            players[0].add_game(Game::played(opp, Colour::White, Float::None, Points::WIN));
            players[(opp - 1) as usize].add_game(Game::played(
                1,
                Colour::Black,
                Float::None,
                Points::ZERO,
            ));
        }
        let roster = Roster::new(players).unwrap();
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        let bracket = Bracket::new(
            &oracle,
            vec![1],
            vec![2, 3, 4, 5],
            1,
            PermitRule::NoByeYet,
            PlayerSet::new(),
        );
        assert!(bracket.pair(&mut cache).is_none());
    }

    #[test]
    fn test_limbo_release_keeps_the_rest_completable() {
        // 1 won by forfeit once and has faced every resident and both
        // players below: every configuration ships it downward, where it
        // breaks the bottom's completion, so the bracket must fail.
        let mut players: Vec<Player> = (1..=7).map(Player::new).collect();
        players[0].add_game(Game::forfeit(8, Points::WIN));
        for opp in 2..=7u32 {
            players[0].add_game(Game::played(opp, Colour::White, Float::None, Points::DRAW));
            players[(opp - 1) as usize].add_game(Game::played(
                1,
                Colour::Black,
                Float::None,
                Points::DRAW,
            ));
        }
        let roster = Roster::new(players).unwrap();
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        let below: PlayerSet = [6u32, 7].into_iter().collect();
        let bracket = Bracket::new(
            &oracle,
            vec![1],
            vec![2, 3, 4, 5],
            1,
            PermitRule::CompletionPreserving { below },
            below,
        );
        assert!(bracket.pair(&mut cache).is_none());
    }

    #[test]
    fn test_blocked_moved_down_pair_floats_past_the_bracket() {
        // 1 and 2 arrive moved down but have faced every resident. Even
        // with no release requested they can only continue downward, and
        // the residents still pair among themselves.
        let roster = roster_with_games(
            6,
            &[(1, 3), (1, 4), (5, 1), (6, 1), (2, 5), (2, 6), (3, 2), (4, 2)],
        );
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        let bracket = Bracket::new(
            &oracle,
            vec![1, 2],
            vec![3, 4, 5, 6],
            0,
            PermitRule::Unconditional,
            PlayerSet::new(),
        );
        let outcome = bracket.pair(&mut cache).unwrap();
        assert_eq!(pairs(&outcome), vec![(3, 5), (4, 6)]);
        assert_eq!(outcome.downfloaters.iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_merged_bracket_floats_its_own_score_first() {
        let mut players: Vec<Player> = (1..=3).map(Player::new).collect();
        players[0].add_game(Game::bye(Points::WIN));
        players[1].add_game(Game::bye(Points::WIN));
        let roster = Roster::new(players).unwrap();
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        let bracket = Bracket::new(
            &oracle,
            vec![1, 2],
            vec![3],
            1,
            PermitRule::Unconditional,
            PlayerSet::new(),
        );
        let outcome = bracket.pair(&mut cache).unwrap();
        assert_eq!(pairs(&outcome), vec![(1, 2)]);
        assert_eq!(outcome.downfloaters.iter().collect::<Vec<_>>(), vec![3]);
    }
}
