//! # Column Composition
//!
//! Compile-time type lists and the parallel-array layout built on them.
//!
//! - [`FixedTuple`] holds one value per declared type, indexed by position
//! - [`ElementType`] names the type at a position without a value
//! - [`StructureOfArrays`] holds one [`DynamicArray`](crate::DynamicArray)
//!   per declared type, all the same length

mod structure_of_arrays;
mod tuple;

pub use structure_of_arrays::{ColumnAt, ColumnSet, StructureOfArrays};
pub use tuple::{ElementType, FixedTuple, TupleArity, TupleElement};
