//! Hint masks: sets of stem indices active at a point of the outline.

use crate::Axis;

type Word = u64;
const WORD_BITS: usize = Word::BITS as usize;

/// An ordered set of stem indices for one axis.
///
/// The representation never stores trailing zero words, so two masks with
/// the same members always compare equal.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HintMask {
    words: Vec<Word>,
}

impl HintMask {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mask with every index below `count` set.
    pub fn all(count: usize) -> Self {
        (0..count).collect()
    }

    pub fn insert(&mut self, index: usize) -> bool {
        let (word, bit) = (index / WORD_BITS, index % WORD_BITS);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let was_set = self.words[word] & (1 << bit) != 0;
        self.words[word] |= 1 << bit;
        !was_set
    }

    pub fn remove(&mut self, index: usize) -> bool {
        let (word, bit) = (index / WORD_BITS, index % WORD_BITS);
        let Some(value) = self.words.get_mut(word) else {
            return false;
        };
        let was_set = *value & (1 << bit) != 0;
        *value &= !(1 << bit);
        self.trim();
        was_set
    }

    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / WORD_BITS)
            .map(|word| word & (1 << (index % WORD_BITS)) != 0)
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of indices in the mask.
    pub fn len(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Iterates over the set indices in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .filter(|(_, word)| **word != 0)
            .flat_map(|(ix, word)| {
                let word = *word;
                (0..WORD_BITS)
                    .filter(move |bit| word & (1 << bit) != 0)
                    .map(move |bit| ix * WORD_BITS + bit)
            })
    }

    /// Largest index in the mask.
    pub fn max(&self) -> Option<usize> {
        let (ix, word) = self.words.iter().enumerate().next_back()?;
        Some(ix * WORD_BITS + (WORD_BITS - 1 - word.leading_zeros() as usize))
    }

    pub fn union_with(&mut self, other: &HintMask) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= *b;
        }
    }

    pub fn union(&self, other: &HintMask) -> HintMask {
        let mut result = self.clone();
        result.union_with(other);
        result
    }

    /// Returns the indices in `self` that are not in `other`.
    pub fn difference(&self, other: &HintMask) -> HintMask {
        let mut result = self.clone();
        for (a, b) in result.words.iter_mut().zip(&other.words) {
            *a &= !*b;
        }
        result.trim();
        result
    }

    pub fn is_subset(&self, other: &HintMask) -> bool {
        self.words
            .iter()
            .enumerate()
            .all(|(ix, word)| word & !other.words.get(ix).copied().unwrap_or(0) == 0)
    }

    /// Rewrites indices through `map`, dropping those that map to `None`.
    pub fn remap(&self, map: &[Option<usize>]) -> HintMask {
        self.iter()
            .filter_map(|ix| map.get(ix).copied().flatten())
            .collect()
    }

    /// Packs the mask into bytes, most significant bit first, covering
    /// `stem_count` stems.
    ///
    /// This matches the layout of a PostScript `hintmask` operand for a
    /// single axis.
    pub fn to_bytes(&self, stem_count: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; stem_count.div_ceil(8)];
        for ix in self.iter().filter(|ix| *ix < stem_count) {
            bytes[ix / 8] |= 0x80 >> (ix % 8);
        }
        bytes
    }

    /// Inverse of [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8], stem_count: usize) -> HintMask {
        (0..stem_count.min(bytes.len() * 8))
            .filter(|ix| bytes[ix / 8] & (0x80 >> (ix % 8)) != 0)
            .collect()
    }

    fn trim(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }
}

impl FromIterator<usize> for HintMask {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut mask = HintMask::new();
        for ix in iter {
            mask.insert(ix);
        }
        mask
    }
}

impl std::fmt::Debug for HintMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Masks for both axes, recorded together at a mask change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaskPair {
    pub horizontal: HintMask,
    pub vertical: HintMask,
}

impl MaskPair {
    pub fn new(horizontal: HintMask, vertical: HintMask) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn get(&self, axis: Axis) -> &HintMask {
        match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        }
    }

    pub fn get_mut(&mut self, axis: Axis) -> &mut HintMask {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }
}

impl From<[HintMask; 2]> for MaskPair {
    fn from(value: [HintMask; 2]) -> Self {
        let [horizontal, vertical] = value;
        Self {
            horizontal,
            vertical,
        }
    }
}
