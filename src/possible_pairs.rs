//! Feasibility oracle: the maximum number of disjoint compatible pairs a
//! player set can yield
//!
//! Counting runs a deterministic reduction: a sufficiency shortcut when
//! every member has partners to spare, a pigeonhole strip for members whose
//! identical partner sets cannot host them all, and least-connected removal
//! for the rest. Results are memoized per exact player set in a cache owned
//! by the round driver and passed in explicitly.

use fxhash::FxHashMap;
use log::trace;

use super::player_set::PlayerSet;
use super::roster::Roster;
use super::types::PreferenceDegree;

/// Compatibility predicate the oracle runs under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compat {
    /// Never met over the board
    Opponents,
    /// Opponents rule plus no colour-preference clash
    Colour,
    /// Opponents rule plus no clash stronger than mild-versus-mild
    StrongColour,
}

type SetKey = [u64; 4];

/// Round-scoped memo of oracle results, keyed by the canonical word form of
/// the queried sets so member order can never matter.
#[derive(Default)]
pub struct FeasibilityCache {
    counts: FxHashMap<(Compat, SetKey), usize>,
    cross: FxHashMap<(Compat, SetKey, SetKey), usize>,
}

impl FeasibilityCache {
    pub fn new() -> FeasibilityCache {
        FeasibilityCache::default()
    }

    /// Number of memoized entries
    pub fn len(&self) -> usize {
        self.counts.len() + self.cross.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The oracle itself: a thin view over the roster
pub struct PossiblePairs<'a> {
    roster: &'a Roster,
}

impl<'a> PossiblePairs<'a> {
    pub fn new(roster: &'a Roster) -> PossiblePairs<'a> {
        PossiblePairs { roster }
    }

    #[inline]
    pub fn roster(&self) -> &Roster {
        self.roster
    }

    /// Can these two meet under the given predicate?
    pub fn compatible(&self, a: u32, b: u32, compat: Compat) -> bool {
        if a == b {
            return false;
        }
        if self.roster[a].opponents().have(b) || self.roster[b].opponents().have(a) {
            return false;
        }
        match compat {
            Compat::Opponents => true,
            Compat::Colour => !self.colour_clash(a, b, false),
            Compat::StrongColour => !self.colour_clash(a, b, true),
        }
    }

    /// Same-colour preference clash. With `mild_ok`, a clash between two
    /// mild preferences does not count.
    fn colour_clash(&self, a: u32, b: u32, mild_ok: bool) -> bool {
        let pa = self.roster[a].colour_preference();
        let pb = self.roster[b].colour_preference();
        match (pa.colour, pb.colour) {
            (Some(ca), Some(cb)) if ca == cb => {
                !(mild_ok
                    && pa.degree == PreferenceDegree::Mild
                    && pb.degree == PreferenceDegree::Mild)
            }
            _ => false,
        }
    }

    /// Compatible partners of one player within a set
    pub fn partners_in(&self, player: u32, within: PlayerSet, compat: Compat) -> PlayerSet {
        within
            .iter()
            .filter(|&other| self.compatible(player, other, compat))
            .collect()
    }

    /// Maximum disjoint compatible pairs within the set
    pub fn count(&self, set: PlayerSet, compat: Compat, cache: &mut FeasibilityCache) -> usize {
        if set.size() < 2 {
            return 0;
        }
        let memo = !super::round::memo_disabled();
        let key = (compat, set.words());
        if memo {
            if let Some(&hit) = cache.counts.get(&key) {
                return hit;
            }
        }
        let result = self.count_uncached(set, compat);
        trace!("possible pairs {:?} for {:?}: {}", compat, set, result);
        if memo {
            cache.counts.insert(key, result);
        }
        result
    }

    /// Members of the set that a maximum pairing must leave out
    pub fn incompatibilities(
        &self,
        set: PlayerSet,
        compat: Compat,
        cache: &mut FeasibilityCache,
    ) -> usize {
        set.size() - 2 * self.count(set, compat, cache)
    }

    fn count_uncached(&self, set: PlayerSet, compat: Compat) -> usize {
        let mut alive = set;
        let mut pairs = 0usize;

        // Colour variants first shed players no remaining partner will take.
        if compat != Compat::Opponents {
            loop {
                let isolated: PlayerSet = alive
                    .iter()
                    .filter(|&p| self.partners_in(p, alive, compat).is_empty())
                    .collect();
                if isolated.is_empty() {
                    break;
                }
                alive.remove_all(isolated);
            }
        }

        loop {
            let n = alive.size();
            if n < 2 {
                break;
            }

            let partner_sets: Vec<(u32, PlayerSet)> = alive
                .iter()
                .map(|p| (p, self.partners_in(p, alive, compat)))
                .collect();
            let min_deg = partner_sets
                .iter()
                .map(|(_, ps)| ps.size())
                .min()
                .unwrap_or(0);
            if 2 * min_deg >= n {
                pairs += n / 2;
                break;
            }

            if self.strip_pigeonholes(&partner_sets, &mut alive) {
                continue;
            }

            // Least-connected member, lowest number on ties; pair it with
            // its least-connected partner or drop it alone.
            let Some((p, p_partners)) = partner_sets
                .iter()
                .min_by_key(|(p, ps)| (ps.size(), *p))
                .map(|(p, ps)| (*p, *ps))
            else {
                break;
            };
            if p_partners.is_empty() {
                alive.remove(p);
                continue;
            }
            let Some(q) = p_partners.iter().min_by_key(|&q| {
                let deg = partner_sets
                    .iter()
                    .find(|(m, _)| *m == q)
                    .map(|(_, ps)| ps.size())
                    .unwrap_or(0);
                (deg, q)
            }) else {
                break;
            };
            alive.remove(p);
            alive.remove(q);
            pairs += 1;
        }
        pairs
    }

    /// Remove pigeonhole-forced failures: where a group shares one identical
    /// partner set too small to host it, the junior excess cannot pair.
    /// Returns true if anything was removed.
    fn strip_pigeonholes(
        &self,
        partner_sets: &[(u32, PlayerSet)],
        alive: &mut PlayerSet,
    ) -> bool {
        let mut groups: FxHashMap<SetKey, (PlayerSet, usize)> = FxHashMap::default();
        for (p, ps) in partner_sets {
            let entry = groups
                .entry(ps.words())
                .or_insert_with(|| (PlayerSet::new(), ps.size()));
            entry.0.add(*p);
        }
        let mut stripped = false;
        for (group, partner_count) in groups.values() {
            let excess = group.size().saturating_sub(*partner_count);
            if excess == 0 {
                continue;
            }
            let mut doomed: Vec<u32> = group.iter().collect();
            doomed.reverse();
            for p in doomed.into_iter().take(excess) {
                alive.remove(p);
                stripped = true;
            }
        }
        stripped
    }

    /// Rectangular variant: maximum pairs matching movers against hosts
    pub fn count_cross(
        &self,
        movers: PlayerSet,
        hosts: PlayerSet,
        compat: Compat,
        cache: &mut FeasibilityCache,
    ) -> usize {
        if movers.is_empty() || hosts.is_empty() {
            return 0;
        }
        let memo = !super::round::memo_disabled();
        let key = (compat, movers.words(), hosts.words());
        if memo {
            if let Some(&hit) = cache.cross.get(&key) {
                return hit;
            }
        }
        let result = self.count_cross_uncached(movers, hosts, compat);
        trace!(
            "cross pairs {:?} for {:?} into {:?}: {}",
            compat,
            movers,
            hosts,
            result
        );
        if memo {
            cache.cross.insert(key, result);
        }
        result
    }

    fn count_cross_uncached(&self, movers: PlayerSet, hosts: PlayerSet, compat: Compat) -> usize {
        let mut m_alive = movers;
        let mut h_alive = hosts;
        let mut pairs = 0usize;

        loop {
            if m_alive.is_empty() || h_alive.is_empty() {
                break;
            }

            let mover_hosts: Vec<(u32, PlayerSet)> = m_alive
                .iter()
                .map(|m| (m, self.partners_in(m, h_alive, compat)))
                .collect();

            let isolated: PlayerSet = mover_hosts
                .iter()
                .filter(|(_, hs)| hs.is_empty())
                .map(|(m, _)| *m)
                .collect();
            if !isolated.is_empty() {
                m_alive.remove_all(isolated);
                continue;
            }

            let min_deg = mover_hosts
                .iter()
                .map(|(_, hs)| hs.size())
                .min()
                .unwrap_or(0);
            let m_count = m_alive.size();
            if min_deg >= m_count && h_alive.size() >= m_count {
                pairs += m_count;
                break;
            }

            if self.strip_pigeonholes(&mover_hosts, &mut m_alive) {
                continue;
            }

            let Some((m, m_hosts)) = mover_hosts
                .iter()
                .min_by_key(|(m, hs)| (hs.size(), *m))
                .map(|(m, hs)| (*m, *hs))
            else {
                break;
            };
            let Some(h) = m_hosts.iter().min_by_key(|&h| {
                let takers = m_alive
                    .iter()
                    .filter(|&m2| self.compatible(m2, h, compat))
                    .count();
                (takers, h)
            }) else {
                break;
            };
            m_alive.remove(m);
            h_alive.remove(h);
            pairs += 1;
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Game, Player};
    use crate::types::{Colour, Float, Points};

    /// Roster of n players where `played` lists games already on record
    fn roster_with_games(n: u32, played: &[(u32, u32)]) -> Roster {
        let mut players: Vec<Player> = (1..=n).map(Player::new).collect();
        for &(a, b) in played {
            players[(a - 1) as usize].add_game(Game::played(
                b,
                Colour::White,
                Float::None,
                Points::DRAW,
            ));
            players[(b - 1) as usize].add_game(Game::played(
                a,
                Colour::Black,
                Float::None,
                Points::DRAW,
            ));
        }
        Roster::new(players).unwrap()
    }

    fn set_of(numbers: &[u32]) -> PlayerSet {
        numbers.iter().copied().collect()
    }

    #[test]
    fn test_fresh_group_pairs_fully() {
        let roster = roster_with_games(10, &[]);
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        assert_eq!(
            oracle.count(set_of(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]), Compat::Opponents, &mut cache),
            5
        );
        assert_eq!(
            oracle.count(set_of(&[1, 2, 3]), Compat::Opponents, &mut cache),
            1
        );
        assert_eq!(oracle.count(set_of(&[1]), Compat::Opponents, &mut cache), 0);
    }

    #[test]
    fn test_played_out_members_reduce_count() {
        // 5 and 6 have faced everyone in the set, including each other.
        let roster = roster_with_games(
            6,
            &[
                (5, 1),
                (5, 2),
                (5, 3),
                (5, 4),
                (5, 6),
                (6, 1),
                (6, 2),
                (6, 3),
                (6, 4),
            ],
        );
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        let all = set_of(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(oracle.count(all, Compat::Opponents, &mut cache), 2);
        assert_eq!(oracle.incompatibilities(all, Compat::Opponents, &mut cache), 2);
    }

    #[test]
    fn test_pigeonhole_group() {
        // 1, 2 and 3 can only meet 4: two of them are forced failures.
        let roster = roster_with_games(
            4,
            &[(1, 2), (1, 3), (2, 3)],
        );
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        assert_eq!(
            oracle.count(set_of(&[1, 2, 3, 4]), Compat::Opponents, &mut cache),
            1
        );
    }

    #[test]
    fn test_order_invariance() {
        let roster = roster_with_games(8, &[(1, 2), (3, 4), (5, 6), (1, 8)]);
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();

        let forward = set_of(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let backward: PlayerSet = [8u32, 7, 6, 5, 4, 3, 2, 1].into_iter().collect();
        assert_eq!(
            oracle.count(forward, Compat::Opponents, &mut cache),
            oracle.count(backward, Compat::Opponents, &mut cache)
        );
        // One canonical entry, not two.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_colour_variant_filters_clashes() {
        // 1 and 2 both carry two whites in a row: absolute clash.
        let mut players: Vec<Player> = (1..=4).map(Player::new).collect();
        for n in [0usize, 1] {
            players[n].add_game(Game::played(5, Colour::White, Float::None, Points::DRAW));
            players[n].add_game(Game::played(6, Colour::White, Float::None, Points::DRAW));
        }
        let roster = Roster::new(players).unwrap();
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();

        let all = set_of(&[1, 2, 3, 4]);
        assert_eq!(oracle.count(all, Compat::Opponents, &mut cache), 2);
        assert_eq!(oracle.count(all, Compat::Colour, &mut cache), 2);

        // Only the clashing pair remains: colour-aware count drops to zero.
        let clash = set_of(&[1, 2]);
        assert_eq!(oracle.count(clash, Compat::Opponents, &mut cache), 1);
        assert_eq!(oracle.count(clash, Compat::Colour, &mut cache), 0);
    }

    #[test]
    fn test_strong_colour_tolerates_mild_clash() {
        // Alternating histories ending on the same colour: mild clash only.
        let mut players: Vec<Player> = (1..=2).map(Player::new).collect();
        for p in players.iter_mut() {
            p.add_game(Game::played(5, Colour::White, Float::None, Points::DRAW));
            p.add_game(Game::played(6, Colour::Black, Float::None, Points::DRAW));
        }
        let roster = Roster::new(players).unwrap();
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();

        let both = set_of(&[1, 2]);
        assert_eq!(oracle.count(both, Compat::Colour, &mut cache), 0);
        assert_eq!(oracle.count(both, Compat::StrongColour, &mut cache), 1);
    }

    #[test]
    fn test_cross_count() {
        // Two movers, four hosts; mover 2 has faced all hosts but one.
        let roster = roster_with_games(6, &[(2, 3), (2, 4), (2, 5)]);
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();

        let movers = set_of(&[1, 2]);
        let hosts = set_of(&[3, 4, 5, 6]);
        assert_eq!(
            oracle.count_cross(movers, hosts, Compat::Opponents, &mut cache),
            2
        );

        // A fresh cache: memo keys carry the sets, not the roster.
        let blocked = roster_with_games(6, &[(1, 6), (2, 3), (2, 4), (2, 5), (2, 6)]);
        let oracle = PossiblePairs::new(&blocked);
        let mut cache = FeasibilityCache::new();
        assert_eq!(
            oracle.count_cross(movers, hosts, Compat::Opponents, &mut cache),
            1
        );
    }

    #[test]
    fn test_cross_pigeonhole() {
        // Both movers only fit host 3.
        let roster = roster_with_games(4, &[(1, 4), (2, 4)]);
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        assert_eq!(
            oracle.count_cross(set_of(&[1, 2]), set_of(&[3, 4]), Compat::Opponents, &mut cache),
            1
        );
    }
}
