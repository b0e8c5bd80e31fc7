//! # Bit Containers
//!
//! Packed boolean storage on top of [`DynamicArray`](crate::DynamicArray).

mod bitset;

pub use bitset::{Bitset, SetBits, WORD_BITS};
