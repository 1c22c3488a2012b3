//! Player-set bitboard representation
//!
//! A set of player numbers packed into four 64-bit words, one bit per
//! number. Number n (1-based) lives at bit n-1, so iteration yields numbers
//! in ascending order, which is seniority order inside a scoregroup. The
//! same type doubles as a set of in-bracket sequence numbers during
//! exchange enumeration.

use super::types::MAX_PLAYERS;

const WORDS: usize = MAX_PLAYERS / 64;

/// Set of player numbers as a fixed-width bitboard
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlayerSet {
    words: [u64; WORDS],
}

impl PlayerSet {
    /// Create the empty set
    #[inline]
    pub const fn new() -> Self {
        PlayerSet { words: [0; WORDS] }
    }

    /// Set holding a single number
    #[inline]
    pub fn single(number: u32) -> Self {
        let mut s = PlayerSet::new();
        s.add(number);
        s
    }

    /// Raw words, canonical for use as a memo key
    #[inline]
    pub fn words(&self) -> [u64; WORDS] {
        self.words
    }

    /// Count of members
    #[inline]
    pub fn size(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Check membership
    #[inline]
    pub fn have(&self, number: u32) -> bool {
        let bit = (number - 1) as usize;
        self.words[bit / 64] & (1u64 << (bit % 64)) != 0
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Lowest member: the most senior player in the set
    #[inline]
    pub fn top(&self) -> Option<u32> {
        for (i, &w) in self.words.iter().enumerate() {
            if w != 0 {
                return Some((i * 64) as u32 + w.trailing_zeros() + 1);
            }
        }
        None
    }

    /// Highest member: the most junior player in the set
    #[inline]
    pub fn bottom(&self) -> Option<u32> {
        for (i, &w) in self.words.iter().enumerate().rev() {
            if w != 0 {
                return Some((i * 64) as u32 + 63 - w.leading_zeros() + 1);
            }
        }
        None
    }

    /// Union of two sets
    #[inline]
    pub fn union(&self, other: PlayerSet) -> PlayerSet {
        let mut words = self.words;
        for i in 0..WORDS {
            words[i] |= other.words[i];
        }
        PlayerSet { words }
    }

    /// Intersection of two sets
    #[inline]
    pub fn intersect(&self, other: PlayerSet) -> PlayerSet {
        let mut words = self.words;
        for i in 0..WORDS {
            words[i] &= other.words[i];
        }
        PlayerSet { words }
    }

    /// Members of self not in other
    #[inline]
    pub fn different(&self, other: PlayerSet) -> PlayerSet {
        let mut words = self.words;
        for i in 0..WORDS {
            words[i] &= !other.words[i];
        }
        PlayerSet { words }
    }

    /// Check if self contains every member of other
    #[inline]
    pub fn include(&self, other: PlayerSet) -> bool {
        self.intersect(other) == other
    }

    /// Add a single number
    #[inline]
    pub fn add(&mut self, number: u32) -> &mut Self {
        let bit = (number - 1) as usize;
        self.words[bit / 64] |= 1u64 << (bit % 64);
        self
    }

    /// Remove a single number
    #[inline]
    pub fn remove(&mut self, number: u32) -> &mut Self {
        let bit = (number - 1) as usize;
        self.words[bit / 64] &= !(1u64 << (bit % 64));
        self
    }

    /// Add all members of another set
    #[inline]
    pub fn add_all(&mut self, other: PlayerSet) -> &mut Self {
        for i in 0..WORDS {
            self.words[i] |= other.words[i];
        }
        self
    }

    /// Remove all members of another set
    #[inline]
    pub fn remove_all(&mut self, other: PlayerSet) -> &mut Self {
        for i in 0..WORDS {
            self.words[i] &= !other.words[i];
        }
        self
    }

    /// Sum of the member numbers, used as an exchange distance measure
    #[inline]
    pub fn number_sum(&self) -> u32 {
        self.iter().sum()
    }

    /// Iterate members in ascending number order
    pub fn iter(&self) -> PlayerSetIterator {
        PlayerSetIterator {
            words: self.words,
            word: 0,
        }
    }
}

/// Big-integer comparison over the packed words: the set whose most junior
/// distinguishing member is higher compares greater. The exchanger relies on
/// this to move junior-most subsets first.
impl Ord for PlayerSet {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        for i in (0..WORDS).rev() {
            match self.words[i].cmp(&other.words[i]) {
                std::cmp::Ordering::Equal => continue,
                ord => return ord,
            }
        }
        std::cmp::Ordering::Equal
    }
}

impl PartialOrd for PlayerSet {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Debug for PlayerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for n in self.iter() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", n)?;
            first = false;
        }
        write!(f, "}}")
    }
}

impl FromIterator<u32> for PlayerSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut s = PlayerSet::new();
        for n in iter {
            s.add(n);
        }
        s
    }
}

/// Iterator over member numbers, ascending
pub struct PlayerSetIterator {
    words: [u64; WORDS],
    word: usize,
}

impl Iterator for PlayerSetIterator {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while self.word < WORDS {
            let w = self.words[self.word];
            if w == 0 {
                self.word += 1;
                continue;
            }
            let bit = w.trailing_zeros();
            self.words[self.word] &= w - 1; // Clear lowest set bit
            return Some((self.word * 64) as u32 + bit + 1);
        }
        None
    }
}

impl IntoIterator for PlayerSet {
    type Item = u32;
    type IntoIter = PlayerSetIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &PlayerSet {
    type Item = u32;
    type IntoIter = PlayerSetIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
