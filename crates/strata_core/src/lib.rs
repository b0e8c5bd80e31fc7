//! # STRATA Core
//!
//! The container runtime every other STRATA system is built on:
//! - [`DynamicArray`]: owned, contiguous, geometrically growing storage
//! - [`Bitset`]: packed bits with word-at-a-time scanning
//! - [`FixedTuple`]: fixed-arity heterogeneous values with positional access
//! - [`StructureOfArrays`]: one column per declared type, kept in lockstep
//!
//! ## Architecture Rules
//!
//! 1. **Exclusive ownership** - every buffer has exactly one owner
//! 2. **Size is not capacity** - growing capacity never initializes
//! 3. **Single-threaded values** - no internal locking; callers serialize
//!    shared access themselves
//!
//! ## Example
//!
//! ```rust
//! use strata_core::{Bitset, DynamicArray, StructureOfArrays};
//!
//! let mut ids = DynamicArray::new();
//! ids.push_back(7u32);
//!
//! let mut alive = Bitset::with_len(128);
//! alive.set_bit(100, true);
//! assert_eq!(alive.next_set_bit(0), 100);
//!
//! let mut particles: StructureOfArrays<(f32, f32)> = StructureOfArrays::new();
//! particles.push_back();
//! assert_eq!(particles.data_slice::<0>().len(), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bits;
pub mod config;
pub mod error;
pub mod memory;
pub mod soa;
pub mod wire;

pub use bits::{Bitset, SetBits};
pub use config::GrowthPolicy;
pub use error::{ContainerError, ContainerResult};
pub use memory::DynamicArray;
pub use soa::{
    ColumnAt, ColumnSet, ElementType, FixedTuple, StructureOfArrays, TupleArity, TupleElement,
};
pub use wire::{decode_into, from_bytes, to_bytes, WireDecode, WireEncode, WireReader};
