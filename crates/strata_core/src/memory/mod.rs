//! # Memory Management
//!
//! Owned, growable storage that the rest of the runtime is built on.
//!
//! ## Design Philosophy
//!
//! - One owner per buffer, no sharing, no reference counting
//! - Length and capacity are separate: growing capacity never initializes
//! - Growth is geometric so appends stay amortized O(1)

mod dynamic_array;

pub(crate) use dynamic_array::growth_failed;
pub use dynamic_array::DynamicArray;
