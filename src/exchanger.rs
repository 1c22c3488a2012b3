//! Ordered exchange sequence between the two halves of a bracket
//!
//! Works purely on in-bracket sequence numbers: S1 holds 1..=n1, S2 holds
//! n1+1..=n1+n2. Candidates come out k-subset by k-subset in strictly
//! increasing displacement order; every exchange is relative to the original
//! split, never cumulative. The bracket maps sequence numbers back to
//! players and re-sorts both halves after applying one.
//!
//! The same sequence drives limbo swaps in heterogeneous brackets: the
//! second zone is then the limbo instead of S2.

use fxhash::FxHashMap;

use super::player_set::PlayerSet;

/// One candidate transposition: matching subsets to swap between zones
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exchange {
    pub from_s1: PlayerSet,
    pub from_s2: PlayerSet,
}

/// Streams every (k-subset, k-subset) swap in the canonical order:
/// k ascending; then sequence-sum distance ascending; then the S1 subset
/// displacing the highest-ranked members last; junior-most subsets first on
/// remaining ties.
pub struct Exchanger {
    s1: Vec<u32>,
    s2: Vec<u32>,
    k: usize,
    sum_pairs: Vec<(u32, u32)>,
    buckets1: FxHashMap<u32, Vec<PlayerSet>>,
    buckets2: FxHashMap<u32, Vec<PlayerSet>>,
    pair_idx: usize,
    a_idx: usize,
    b_idx: usize,
    exhausted: bool,
}

impl Exchanger {
    /// Build for zone sizes n1 and n2, assigning sequence numbers across
    /// both zones in order.
    pub fn new(n1: usize, n2: usize) -> Exchanger {
        Exchanger {
            s1: (1..=n1 as u32).collect(),
            s2: (n1 as u32 + 1..=(n1 + n2) as u32).collect(),
            k: 0,
            sum_pairs: Vec::new(),
            buckets1: FxHashMap::default(),
            buckets2: FxHashMap::default(),
            pair_idx: 0,
            a_idx: 0,
            b_idx: 0,
            exhausted: n1 == 0 || n2 == 0,
        }
    }

    /// No further exchanges remain
    #[inline]
    pub fn limit_reached(&self) -> bool {
        self.exhausted
    }

    /// Current exchange size
    #[inline]
    pub fn size(&self) -> usize {
        self.k
    }

    /// The next candidate, or None once every size is exhausted
    pub fn next_exchange(&mut self) -> Option<Exchange> {
        loop {
            if self.exhausted {
                return None;
            }
            if self.k == 0 || self.pair_idx >= self.sum_pairs.len() {
                self.advance_size();
                continue;
            }
            let (sa, sb) = self.sum_pairs[self.pair_idx];
            let a_list = &self.buckets1[&sa];
            if self.a_idx >= a_list.len() {
                self.pair_idx += 1;
                self.a_idx = 0;
                self.b_idx = 0;
                continue;
            }
            let b_list = &self.buckets2[&sb];
            if self.b_idx >= b_list.len() {
                self.a_idx += 1;
                self.b_idx = 0;
                continue;
            }
            let exchange = Exchange {
                from_s1: a_list[self.a_idx],
                from_s2: b_list[self.b_idx],
            };
            self.b_idx += 1;
            return Some(exchange);
        }
    }

    /// Materialize the buckets for the next subset size
    fn advance_size(&mut self) {
        self.k += 1;
        if self.k > self.s1.len().min(self.s2.len()) {
            self.exhausted = true;
            return;
        }
        self.buckets1 = bucket_by_sum(&self.s1, self.k);
        self.buckets2 = bucket_by_sum(&self.s2, self.k);

        self.sum_pairs.clear();
        for &sa in self.buckets1.keys() {
            for &sb in self.buckets2.keys() {
                self.sum_pairs.push((sa, sb));
            }
        }
        self.sum_pairs
            .sort_by_key(|&(sa, sb)| (sb as i64 - sa as i64, std::cmp::Reverse(sa)));
        self.pair_idx = 0;
        self.a_idx = 0;
        self.b_idx = 0;
    }
}

/// All k-subsets grouped by element sum, each bucket ordered junior-most
/// subset first
fn bucket_by_sum(items: &[u32], k: usize) -> FxHashMap<u32, Vec<PlayerSet>> {
    let mut buckets: FxHashMap<u32, Vec<PlayerSet>> = FxHashMap::default();
    for subset in k_subsets(items, k) {
        buckets.entry(subset.number_sum()).or_default().push(subset);
    }
    for bucket in buckets.values_mut() {
        bucket.sort_by(|a, b| b.cmp(a));
    }
    buckets
}

/// Enumerate k-subsets of the items in index order
fn k_subsets(items: &[u32], k: usize) -> Vec<PlayerSet> {
    let n = items.len();
    let mut out = Vec::new();
    if k == 0 || k > n {
        return out;
    }
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        out.push(idx.iter().map(|&i| items[i]).collect());
        // Classic next-combination step on the index vector.
        let mut i = k;
        loop {
            if i == 0 {
                return out;
            }
            i -= 1;
            if idx[i] != n - k + i {
                break;
            }
            if i == 0 {
                return out;
            }
        }
        idx[i] += 1;
        for j in i + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}
