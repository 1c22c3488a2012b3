//! Completability of a release set: can the rest of the tournament still be
//! paired if these players are left to it?

use super::player_set::PlayerSet;
use super::possible_pairs::{Compat, FeasibilityCache, PossiblePairs};

/// A set completes when everyone pairs under the opponents rule, except
/// that an odd set may leave exactly one bye-eligible player over.
pub fn completable(oracle: &PossiblePairs, set: PlayerSet, cache: &mut FeasibilityCache) -> bool {
    let n = set.size();
    if n == 0 {
        return true;
    }
    if n % 2 == 0 {
        return oracle.count(set, Compat::Opponents, cache) == n / 2;
    }
    set.iter().any(|p| {
        oracle.roster()[p].bye_eligible() && {
            let mut rest = set;
            rest.remove(p);
            oracle.count(rest, Compat::Opponents, cache) == (n - 1) / 2
        }
    })
}

/// Minimum number of moved-down players that would make the set
/// completable. Arriving players are modelled as compatible with everybody;
/// with them present the parity leftover may be anyone, since the bye rule
/// is enforced again when the receiving bracket actually pairs.
pub fn required_mdps(
    oracle: &PossiblePairs,
    set: PlayerSet,
    cache: &mut FeasibilityCache,
) -> usize {
    let n = set.size();
    for k in 0..=n + 1 {
        if completable_with_extras(oracle, set, k, cache) {
            return k;
        }
    }
    n + 1
}

fn completable_with_extras(
    oracle: &PossiblePairs,
    set: PlayerSet,
    extras: usize,
    cache: &mut FeasibilityCache,
) -> bool {
    if extras == 0 {
        return completable(oracle, set, cache);
    }
    let n = set.size();
    let total = n + extras;
    let own_pairs = oracle.count(set, Compat::Opponents, cache);
    let stranded = n - 2 * own_pairs;
    let absorbed = extras.min(stranded);
    let pairs = own_pairs + absorbed + (extras - absorbed) / 2;
    if total % 2 == 0 {
        2 * pairs == total
    } else {
        2 * pairs == total - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Game, Player};
    use crate::roster::Roster;
    use crate::types::{Colour, Float, Points};

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
    fn test_fresh_sets_complete() {
        let roster = roster_with_games(4, &[]);
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        assert!(completable(&oracle, set_of(&[1, 2, 3, 4]), &mut cache));
        assert!(completable(&oracle, set_of(&[1, 2, 3]), &mut cache));
        assert!(completable(&oracle, PlayerSet::new(), &mut cache));
    }

    #[test]
    fn test_exhausted_pair_does_not_complete() {
        let roster = roster_with_games(2, &[(1, 2)]);
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        assert!(!completable(&oracle, set_of(&[1, 2]), &mut cache));
        // One arriving player pairs one of them; the other takes the bye.
        assert_eq!(required_mdps(&oracle, set_of(&[1, 2]), &mut cache), 1);
    }

    #[test]
    fn test_odd_set_needs_eligible_bye() {
        let mut players = vec![Player::new(1)];
        players[0].add_game(Game::bye(Points::WIN));
        let roster = Roster::new(players).unwrap();
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();

        // Already had a bye: cannot be left over again.
        assert!(!completable(&oracle, set_of(&[1]), &mut cache));
        assert_eq!(required_mdps(&oracle, set_of(&[1]), &mut cache), 1);
    }

    #[test]
    fn test_odd_set_with_internal_block() {
        let roster = roster_with_games(3, &[(1, 2)]);
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        // 3 takes on one of the blocked two, the other gets the bye.
        assert!(completable(&oracle, set_of(&[1, 2, 3]), &mut cache));
    }

    #[test]
    fn test_required_mdps_zero_when_complete() {
        let roster = roster_with_games(4, &[]);
        let oracle = PossiblePairs::new(&roster);
        let mut cache = FeasibilityCache::new();
        assert_eq!(required_mdps(&oracle, set_of(&[1, 2, 3, 4]), &mut cache), 0);
        assert_eq!(required_mdps(&oracle, set_of(&[1]), &mut cache), 0);
    }
}
