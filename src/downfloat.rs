//! Downfloat permits: which players a bracket may release downward
//!
//! A permit streams candidate downfloat sets of the required size in
//! preference order (the players a bracket parts with most readily come
//! first), applies its variant rule, then checks that the players kept
//! back can still produce the required number of pairs.

use log::trace;

use super::completion::completable;
use super::player_set::PlayerSet;
use super::possible_pairs::{Compat, FeasibilityCache, PossiblePairs};

/// Variant-specific admissibility rule; a permit may stack several
#[derive(Clone)]
pub enum PermitRule {
    /// Plain bracket-internal selection
    Unconditional,
    /// Last scoregroup: every released player must still be bye-eligible
    NoByeYet,
    /// Released players joined to everything below must stay completable
    CompletionPreserving { below: PlayerSet },
    /// Multi-band bracket: each score band must release its forced count
    MovedDown { quotas: Vec<(PlayerSet, usize)> },
}

/// Streams admissible downfloat sets for one bracket configuration
pub struct DownfloatPermit<'a> {
    oracle: &'a PossiblePairs<'a>,
    ordered: Vec<u32>,
    full: PlayerSet,
    required: usize,
    target_pairs: usize,
    rules: Vec<PermitRule>,
    idx: Vec<usize>,
    started: bool,
    done: bool,
}

impl<'a> DownfloatPermit<'a> {
    /// Build a permit over bracket members given in priority order (most
    /// senior first). Enumeration prefers releasing the most junior; with
    /// a moved-down rule in play, the lowest score leaves first and
    /// juniors lead inside a band.
    pub fn new(
        oracle: &'a PossiblePairs<'a>,
        members: &[u32],
        required: usize,
        target_pairs: usize,
        rules: Vec<PermitRule>,
    ) -> DownfloatPermit<'a> {
        let mut ordered: Vec<u32> = members.to_vec();
        if rules.iter().any(|r| matches!(r, PermitRule::MovedDown { .. })) {
            let roster = oracle.roster();
            ordered.sort_by_key(|&p| (roster[p].points(), std::cmp::Reverse(p)));
        } else {
            ordered.reverse();
        }
        DownfloatPermit {
            oracle,
            full: members.iter().copied().collect(),
            ordered,
            required,
            target_pairs,
            rules,
            idx: Vec::new(),
            started: false,
            done: false,
        }
    }

    /// Next admissible downfloat set, or None when exhausted
    pub fn next_allowed(&mut self, cache: &mut FeasibilityCache) -> Option<PlayerSet> {
        loop {
            let subset = self.next_combination()?;
            if !self.legal(subset, cache) {
                continue;
            }
            let kept = self.full.different(subset);
            if self.oracle.count(kept, Compat::Opponents, cache) < self.target_pairs {
                continue;
            }
            trace!("downfloat candidate {:?}", subset);
            return Some(subset);
        }
    }

    fn legal(&self, subset: PlayerSet, cache: &mut FeasibilityCache) -> bool {
        self.rules.iter().all(|rule| match rule {
            PermitRule::Unconditional => true,
            PermitRule::NoByeYet => subset
                .iter()
                .all(|p| self.oracle.roster()[p].bye_eligible()),
            PermitRule::CompletionPreserving { below } => {
                completable(self.oracle, below.union(subset), cache)
            }
            PermitRule::MovedDown { quotas } => quotas
                .iter()
                .all(|(band, quota)| subset.intersect(*band).size() >= *quota),
        })
    }

    /// Lexicographic combinations over the preference order; a required
    /// size of zero yields exactly the empty set.
    fn next_combination(&mut self) -> Option<PlayerSet> {
        if self.done {
            return None;
        }
        if self.required == 0 {
            self.done = true;
            return Some(PlayerSet::new());
        }
        if self.required > self.ordered.len() {
            self.done = true;
            return None;
        }
        let k = self.required;
        let n = self.ordered.len();
        if !self.started {
            self.started = true;
            self.idx = (0..k).collect();
        } else {
            let mut i = k;
            loop {
                if i == 0 {
                    self.done = true;
                    return None;
                }
                i -= 1;
                if self.idx[i] != n - k + i {
                    break;
                }
                if i == 0 {
                    self.done = true;
                    return None;
                }
            }
            self.idx[i] += 1;
            for j in i + 1..k {
                self.idx[j] = self.idx[j - 1] + 1;
            }
        }
        Some(self.idx.iter().map(|&i| self.ordered[i]).collect())
    }
}
