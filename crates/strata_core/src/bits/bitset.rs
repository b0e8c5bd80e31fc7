//! # Bitset
//!
//! A packed bit sequence stored as 64-bit words in a [`DynamicArray`].
//!
//! ## Performance
//!
//! - Set/get: O(1), single word operation
//! - `next_set_bit`: O(words scanned), one `trailing_zeros` per non-zero word
//! - `any_bit_set`: O(n/64), whole-word OR reduction

use std::fmt;

use crate::memory::DynamicArray;

/// Bits per storage word.
pub const WORD_BITS: usize = u64::BITS as usize;

/// Number of words needed to hold `bits` bits.
#[inline]
const fn words_for(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

/// A resizable, packed sequence of bits.
///
/// Bits past `len()` inside the last word are padding and are always kept
/// clear, so growing never resurrects bits that were shrunk away.
///
/// # Example
///
/// ```rust
/// use strata_core::Bitset;
///
/// let mut bits = Bitset::with_len(200);
/// bits.set_bit(70, true);
/// assert_eq!(bits.next_set_bit(0), 70);
/// assert_eq!(bits.next_set_bit(71), 200);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Bitset {
    /// Backing words; `words.len() == ceil(len / 64)`.
    words: DynamicArray<u64>,
    /// Logical bit count.
    len: usize,
}

impl Bitset {
    /// Creates an empty bitset.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            words: DynamicArray::new(),
            len: 0,
        }
    }

    /// Creates a bitset of `len` cleared bits.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        let mut bits = Self::new();
        bits.resize(len);
        bits
    }

    /// Rebuilds a bitset from raw words.
    ///
    /// Returns `None` if the word count does not match `len` or padding
    /// bits are set.
    pub(crate) fn from_words(words: DynamicArray<u64>, len: usize) -> Option<Self> {
        if words.len() != words_for(len) {
            return None;
        }
        let bits = Self { words, len };
        if bits.words.last().copied().unwrap_or(0) & !bits.last_word_mask() != 0 {
            return None;
        }
        Some(bits)
    }

    /// Logical number of bits.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the bitset holds no bits.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw storage words, least significant bit first.
    #[inline]
    #[must_use]
    pub fn words(&self) -> &[u64] {
        self.words.as_slice()
    }

    /// Mask of the valid bits in the last word.
    #[inline]
    fn last_word_mask(&self) -> u64 {
        match self.len % WORD_BITS {
            0 => u64::MAX,
            tail => (1u64 << tail) - 1,
        }
    }

    /// Sets the logical length to `len` bits.
    ///
    /// Bits exposed by growth read as `false`. Shrinking clears the cut
    /// bits that remain inside the retained last word.
    pub fn resize(&mut self, len: usize) {
        let old_words = self.words.len();
        let new_words = words_for(len);

        self.words.resize(new_words, 0);
        self.len = len;

        let mask = self.last_word_mask();
        if let Some(last) = self.words.as_mut_slice().last_mut() {
            *last &= mask;
        }

        if old_words != new_words {
            tracing::debug!(bits = len, old_words, new_words, "bitset resized");
        }
    }

    #[inline]
    #[track_caller]
    fn check_index(&self, index: usize) {
        assert!(
            index < self.len,
            "bit index {index} out of bounds for bitset of length {}",
            self.len
        );
    }

    /// Sets or clears bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    #[track_caller]
    pub fn set_bit(&mut self, index: usize, value: bool) {
        self.check_index(index);
        let word = &mut self.words[index / WORD_BITS];
        let mask = 1u64 << (index % WORD_BITS);
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Returns bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn get_bit(&self, index: usize) -> bool {
        self.check_index(index);
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Returns the smallest set index `>= from`, or `len()` if there is none.
    ///
    /// Only the word containing `from` is masked; the rest are scanned a
    /// whole word at a time.
    #[must_use]
    pub fn next_set_bit(&self, from: usize) -> usize {
        if from >= self.len {
            return self.len;
        }

        let words = self.words.as_slice();
        let mut word_idx = from / WORD_BITS;
        let mut word = words[word_idx] & (u64::MAX << (from % WORD_BITS));

        loop {
            if word != 0 {
                // Padding is kept clear, so this is always < len.
                return word_idx * WORD_BITS + word.trailing_zeros() as usize;
            }
            word_idx += 1;
            if word_idx >= words.len() {
                return self.len;
            }
            word = words[word_idx];
        }
    }

    /// Returns `true` if any bit is set.
    #[inline]
    #[must_use]
    pub fn any_bit_set(&self) -> bool {
        self.words.iter().fold(0, |acc, word| acc | word) != 0
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Clears every bit, keeping the length.
    pub fn clear_all(&mut self) {
        self.words.as_mut_slice().fill(0);
    }

    /// Iterates set bit indices in ascending order.
    #[inline]
    pub fn iter_ones(&self) -> SetBits<'_> {
        SetBits {
            bits: self,
            next: 0,
        }
    }
}

impl fmt::Debug for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitset")
            .field("len", &self.len)
            .field("ones", &self.iter_ones().collect::<Vec<_>>())
            .finish()
    }
}

/// Iterator over set bit indices, driven by [`Bitset::next_set_bit`].
pub struct SetBits<'a> {
    bits: &'a Bitset,
    next: usize,
}

impl Iterator for SetBits<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        let index = self.bits.next_set_bit(self.next);
        if index >= self.bits.len {
            self.next = self.bits.len;
            return None;
        }
        self.next = index + 1;
        Some(index)
    }
}
