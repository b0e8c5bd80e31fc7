//! # Structure of Arrays
//!
//! A record type stored as one [`DynamicArray`] per field.
//!
//! ## Why
//!
//! ```text
//! Array of structs:   [x0 y0 z0][x1 y1 z1][x2 y2 z2] ...
//! Structure of arrays: x: [x0 x1 x2 ...]
//!                      y: [y0 y1 y2 ...]
//!                      z: [z0 z1 z2 ...]
//! ```
//!
//! A hot loop that only touches `x` streams one contiguous column instead
//! of striding over every field.
//!
//! ## Row removal
//!
//! [`StructureOfArrays::remove_at`] is a swap-remove: the last row moves
//! into the hole. Every column performs the same swap in the same call, so
//! rows stay aligned, but row order is not preserved.

use std::fmt;

use crate::error::ContainerResult;
use crate::memory::{growth_failed, DynamicArray};
use crate::soa::tuple::{ElementType, FixedTuple, TupleArity};

/// A declared list of column types, written as a tuple: `(f32, f32, f32)`.
///
/// Implemented for tuples of 1 through 8 types, each of which must be
/// `Default` so that [`StructureOfArrays::push_back`] can create a row.
/// The column storage mirrors the list as a [`FixedTuple`] of arrays.
pub trait ColumnSet: Sized {
    /// One `DynamicArray` per declared type.
    type Columns: Default;

    /// Number of columns.
    const COLUMN_COUNT: usize;

    /// Length of the first column.
    fn row_count(columns: &Self::Columns) -> usize;

    /// Returns `true` if every column has the same length.
    fn is_synchronized(columns: &Self::Columns) -> bool;

    /// Makes room for `additional` rows in every column.
    ///
    /// # Errors
    ///
    /// Growth errors. Lengths are untouched either way.
    fn try_reserve_additional(columns: &mut Self::Columns, additional: usize)
        -> ContainerResult<()>;

    /// Appends one default row. Capacity must already be reserved.
    ///
    /// The whole row is built before any column grows.
    fn push_default_row(columns: &mut Self::Columns);

    /// Appends one row of values. Capacity must already be reserved.
    fn push_values(columns: &mut Self::Columns, row: Self);

    /// Swap-removes `row` from every column and returns its values.
    ///
    /// Nothing is dropped here, so every column is swapped even if a
    /// value's destructor later panics.
    fn swap_remove_row(columns: &mut Self::Columns, row: usize) -> Self;

    /// Clears every column.
    fn clear_columns(columns: &mut Self::Columns);

    /// Shrinks every column to its length.
    fn shrink_columns(columns: &mut Self::Columns);
}

/// Access to column `I` of a [`ColumnSet`].
pub trait ColumnAt<const I: usize>: ColumnSet {
    /// The declared type of column `I`.
    type Value;

    /// Column `I`.
    fn column(columns: &Self::Columns) -> &DynamicArray<Self::Value>;

    /// Column `I`, mutably.
    fn column_mut(columns: &mut Self::Columns) -> &mut DynamicArray<Self::Value>;
}

/// Parallel columns of a fixed type list, kept the same length.
///
/// # Example
///
/// ```rust
/// use strata_core::StructureOfArrays;
///
/// let mut points: StructureOfArrays<(f32, f32, f32)> = StructureOfArrays::new();
/// let row = points.push_back();
/// *points.at_mut::<1>(row) = 2.5;
///
/// let ys: f32 = points.data_slice::<1>().iter().sum();
/// assert_eq!(ys, 2.5);
/// ```
pub struct StructureOfArrays<C: ColumnSet> {
    columns: C::Columns,
    len: usize,
}

impl<C: ColumnSet> StructureOfArrays<C> {
    /// Number of columns.
    pub const COLUMN_COUNT: usize = C::COLUMN_COUNT;

    /// Creates an empty structure. Does not allocate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: Default::default(),
            len: 0,
        }
    }

    /// Shared row count.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no rows.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn debug_check_sync(&self) {
        debug_assert!(C::is_synchronized(&self.columns));
        debug_assert_eq!(C::row_count(&self.columns), self.len);
    }

    #[inline]
    #[track_caller]
    fn check_row(&self, row: usize) {
        assert!(
            row < self.len,
            "row {row} out of bounds for structure of arrays with {} rows",
            self.len
        );
    }

    /// Appends a default row to every column and returns its index.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts via the allocation error
    /// handler if the allocator refuses.
    pub fn push_back(&mut self) -> usize {
        match self.try_push_back() {
            Ok(row) => row,
            Err(err) => growth_failed(&err),
        }
    }

    /// Appends a default row to every column and returns its index.
    ///
    /// Every column reserves before any column grows, so on error all
    /// columns keep their previous length.
    ///
    /// # Errors
    ///
    /// Growth errors from any column.
    pub fn try_push_back(&mut self) -> ContainerResult<usize> {
        C::try_reserve_additional(&mut self.columns, 1)?;
        C::push_default_row(&mut self.columns);
        self.len += 1;
        self.debug_check_sync();
        Ok(self.len - 1)
    }

    /// Appends a row of values and returns its index.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts via the allocation error
    /// handler if the allocator refuses.
    pub fn push_row(&mut self, row: C) -> usize {
        if let Err(err) = C::try_reserve_additional(&mut self.columns, 1) {
            growth_failed(&err);
        }
        C::push_values(&mut self.columns, row);
        self.len += 1;
        self.debug_check_sync();
        self.len - 1
    }

    /// Makes room for `additional` more rows in every column.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts via the allocation error
    /// handler if the allocator refuses.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = C::try_reserve_additional(&mut self.columns, additional) {
            growth_failed(&err);
        }
    }

    /// Removes `row` from every column by swapping in the last row.
    ///
    /// After the call, the row previously at `len() - 1` (if different)
    /// lives at `row` in every column.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len()`.
    #[track_caller]
    pub fn remove_at(&mut self, row: usize) {
        self.check_row(row);
        let removed = C::swap_remove_row(&mut self.columns, row);
        self.len -= 1;
        self.debug_check_sync();
        drop(removed);
    }

    /// Removes every row. Capacity is kept.
    pub fn clear(&mut self) {
        C::clear_columns(&mut self.columns);
        self.len = 0;
    }

    /// Releases unused capacity in every column.
    pub fn shrink(&mut self) {
        C::shrink_columns(&mut self.columns);
    }

    /// Value of column `I` at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len()`.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn at<const I: usize>(&self, row: usize) -> &<C as ColumnAt<I>>::Value
    where
        C: ColumnAt<I>,
    {
        self.check_row(row);
        C::column(&self.columns).at(row)
    }

    /// Mutable value of column `I` at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= len()`.
    #[inline]
    #[track_caller]
    pub fn at_mut<const I: usize>(&mut self, row: usize) -> &mut <C as ColumnAt<I>>::Value
    where
        C: ColumnAt<I>,
    {
        self.check_row(row);
        C::column_mut(&mut self.columns).at_mut(row)
    }

    /// Contiguous view of column `I`; its length is always `len()`.
    ///
    /// Invalidated by any call that adds rows.
    #[inline]
    #[must_use]
    pub fn data_slice<const I: usize>(&self) -> &[<C as ColumnAt<I>>::Value]
    where
        C: ColumnAt<I>,
    {
        C::column(&self.columns).as_slice()
    }

    /// Mutable contiguous view of column `I`.
    ///
    /// Values can change, lengths cannot.
    #[inline]
    pub fn data_slice_mut<const I: usize>(&mut self) -> &mut [<C as ColumnAt<I>>::Value]
    where
        C: ColumnAt<I>,
    {
        C::column_mut(&mut self.columns).as_mut_slice()
    }

    /// Column `I` as an array, for capacity inspection or serialization.
    #[inline]
    #[must_use]
    pub fn column<const I: usize>(&self) -> &DynamicArray<<C as ColumnAt<I>>::Value>
    where
        C: ColumnAt<I>,
    {
        C::column(&self.columns)
    }
}

impl<C: ColumnSet> Default for StructureOfArrays<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ColumnSet> Clone for StructureOfArrays<C>
where
    C::Columns: Clone,
{
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            len: self.len,
        }
    }
}

impl<C: ColumnSet> fmt::Debug for StructureOfArrays<C>
where
    C::Columns: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructureOfArrays")
            .field("len", &self.len)
            .field("columns", &self.columns)
            .finish()
    }
}

/// `ColumnSet` for one tuple size; `$all` carries the full type list.
macro_rules! column_set_impls {
    ($all:tt $($idx:tt : $T:ident),+) => {
        column_set!($all [$($idx),+]);
        $( column_at!($all $idx : $T); )+
    };
}

macro_rules! column_set {
    ([$($G:ident),+] [$($i:tt),+]) => {
        impl<$($G: Default),+> ColumnSet for ($($G,)+) {
            type Columns = FixedTuple<($(DynamicArray<$G>,)+)>;

            const COLUMN_COUNT: usize = <FixedTuple<($($G,)+)> as TupleArity>::ARITY;

            #[inline]
            fn row_count(columns: &Self::Columns) -> usize {
                columns.get::<0>().len()
            }

            fn is_synchronized(columns: &Self::Columns) -> bool {
                let len = columns.get::<0>().len();
                $( columns.get::<$i>().len() == len )&&+
            }

            fn try_reserve_additional(
                columns: &mut Self::Columns,
                additional: usize,
            ) -> ContainerResult<()> {
                $( columns.get_mut::<$i>().try_reserve_additional(additional)?; )+
                Ok(())
            }

            fn push_default_row(columns: &mut Self::Columns) {
                let row: Self = ($($G::default(),)+);
                Self::push_values(columns, row);
            }

            fn push_values(columns: &mut Self::Columns, row: Self) {
                $( columns.get_mut::<$i>().push_back(row.$i); )+
            }

            fn swap_remove_row(columns: &mut Self::Columns, row: usize) -> Self {
                ($( columns.get_mut::<$i>().swap_remove(row), )+)
            }

            fn clear_columns(columns: &mut Self::Columns) {
                $( columns.get_mut::<$i>().clear(); )+
            }

            fn shrink_columns(columns: &mut Self::Columns) {
                $( columns.get_mut::<$i>().shrink(); )+
            }
        }
    };
}

macro_rules! column_at {
    ([$($G:ident),+] $idx:tt : $T:ident) => {
        impl<$($G: Default),+> ColumnAt<$idx> for ($($G,)+) {
            type Value = ElementType<FixedTuple<($($G,)+)>, $idx>;

            #[inline]
            fn column(columns: &Self::Columns) -> &DynamicArray<$T> {
                columns.get::<$idx>()
            }

            #[inline]
            fn column_mut(columns: &mut Self::Columns) -> &mut DynamicArray<$T> {
                columns.get_mut::<$idx>()
            }
        }
    };
}

column_set_impls!([A] 0: A);
column_set_impls!([A, B] 0: A, 1: B);
column_set_impls!([A, B, C] 0: A, 1: B, 2: C);
column_set_impls!([A, B, C, D] 0: A, 1: B, 2: C, 3: D);
column_set_impls!([A, B, C, D, E] 0: A, 1: B, 2: C, 3: D, 4: E);
column_set_impls!([A, B, C, D, E, F] 0: A, 1: B, 2: C, 3: D, 4: E, 5: F);
column_set_impls!([A, B, C, D, E, F, G] 0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G);
column_set_impls!([A, B, C, D, E, F, G, H] 0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G, 7: H);

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::panic::{self, AssertUnwindSafe};

    type Points = StructureOfArrays<(f32, f32, f32)>;

    fn filled(rows: usize) -> StructureOfArrays<(u32, String, bool)> {
        let mut soa = StructureOfArrays::new();
        for i in 0..rows {
            soa.push_row((i as u32, format!("row{i}"), i % 2 == 0));
        }
        soa
    }

    #[test]
    fn test_column_count() {
        assert_eq!(Points::COLUMN_COUNT, 3);
        assert_eq!(StructureOfArrays::<(u8,)>::COLUMN_COUNT, 1);
    }

    #[test]
    fn test_push_back_defaults_every_column() {
        let mut points = Points::new();
        for k in 1..=50 {
            let row = points.push_back();
            assert_eq!(row, k - 1);
            assert_eq!(points.len(), k);
            assert_eq!(points.data_slice::<0>().len(), k);
            assert_eq!(points.data_slice::<1>().len(), k);
            assert_eq!(points.data_slice::<2>().len(), k);
        }
        assert!(points.data_slice::<2>().iter().all(|z| *z == 0.0));
    }

    #[test]
    fn test_at_mut_writes_single_column() {
        let mut points = Points::new();
        points.push_back();
        points.push_back();
        *points.at_mut::<0>(1) = 4.0;
        *points.at_mut::<2>(0) = -1.0;

        assert_eq!(points.data_slice::<0>(), &[0.0, 4.0]);
        assert_eq!(points.data_slice::<1>(), &[0.0, 0.0]);
        assert_eq!(points.data_slice::<2>(), &[-1.0, 0.0]);
        assert_eq!(*points.at::<0>(1), 4.0);
    }

    #[test]
    fn test_batch_update_through_slice() {
        let mut points = Points::new();
        for _ in 0..8 {
            points.push_back();
        }
        for (i, x) in points.data_slice_mut::<0>().iter_mut().enumerate() {
            *x = i as f32;
        }
        let total: f32 = points.data_slice::<0>().iter().sum();
        assert_eq!(total, 28.0);
    }

    #[test]
    fn test_remove_at_swaps_last_row_in() {
        let mut soa = filled(5);
        soa.remove_at(1);

        assert_eq!(soa.len(), 4);
        assert_eq!(soa.data_slice::<0>(), &[0, 4, 2, 3]);
        assert_eq!(soa.at::<1>(1), "row4");
        assert!(*soa.at::<2>(1));
        for row in 0..soa.len() {
            assert_eq!(soa.at::<1>(row), &format!("row{}", soa.at::<0>(row)));
        }
    }

    #[test]
    fn test_remove_last_row() {
        let mut soa = filled(3);
        soa.remove_at(2);
        assert_eq!(soa.data_slice::<0>(), &[0, 1]);
        soa.remove_at(0);
        soa.remove_at(0);
        assert!(soa.is_empty());
        assert!(soa.data_slice::<1>().is_empty());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_remove_at_out_of_bounds_panics() {
        let mut soa = filled(2);
        soa.remove_at(2);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_at_mut_out_of_bounds_panics() {
        let mut points = Points::new();
        *points.at_mut::<1>(0) = 1.0;
    }

    #[test]
    fn test_clear_and_shrink() {
        let mut soa = filled(10);
        soa.clear();
        assert_eq!(soa.len(), 0);
        assert!(soa.column::<0>().capacity() >= 10);
        soa.shrink();
        assert_eq!(soa.column::<0>().capacity(), 0);
        assert_eq!(soa.column::<1>().capacity(), 0);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = filled(3);
        let mut copy = original.clone();
        copy.at_mut::<1>(0).push('!');
        assert_eq!(original.at::<1>(0), "row0");
        assert_eq!(copy.at::<1>(0), "row0!");
    }

    thread_local! {
        static ARMED: Cell<bool> = const { Cell::new(false) };
    }

    /// Panics in `Default` while armed.
    #[derive(Debug)]
    struct Volatile;

    impl Default for Volatile {
        fn default() -> Self {
            assert!(!ARMED.with(Cell::get), "volatile default");
            Self
        }
    }

    /// Panics in `Drop` while armed.
    #[derive(Debug, Default)]
    struct Fragile(u32);

    impl Drop for Fragile {
        fn drop(&mut self) {
            if ARMED.with(|armed| armed.replace(false)) {
                panic!("fragile drop");
            }
        }
    }

    /// Too large for any allocator to provide even one slot.
    struct Huge {
        _bytes: [u8; 1 << 60],
    }

    impl Default for Huge {
        fn default() -> Self {
            unreachable!("never constructed")
        }
    }

    fn assert_columns_match<A: Default, B: Default>(soa: &StructureOfArrays<(A, B)>) {
        assert_eq!(soa.data_slice::<0>().len(), soa.len());
        assert_eq!(soa.data_slice::<1>().len(), soa.len());
    }

    #[test]
    fn test_panicking_default_leaves_columns_aligned() {
        let mut soa: StructureOfArrays<(u32, Volatile)> = StructureOfArrays::new();
        soa.push_back();

        ARMED.with(|armed| armed.set(true));
        let result = panic::catch_unwind(AssertUnwindSafe(|| soa.push_back()));
        ARMED.with(|armed| armed.set(false));

        assert!(result.is_err());
        assert_eq!(soa.len(), 1);
        assert_columns_match(&soa);

        soa.push_back();
        assert_eq!(soa.len(), 2);
        assert_columns_match(&soa);
    }

    #[test]
    fn test_panicking_drop_leaves_columns_aligned() {
        let mut soa: StructureOfArrays<(Fragile, u32)> = StructureOfArrays::new();
        for i in 0..3 {
            soa.push_row((Fragile(i), i));
        }

        ARMED.with(|armed| armed.set(true));
        let result = panic::catch_unwind(AssertUnwindSafe(|| soa.remove_at(0)));
        ARMED.with(|armed| armed.set(false));

        assert!(result.is_err());
        assert_eq!(soa.len(), 2);
        assert_columns_match(&soa);
        assert_eq!(soa.at::<0>(0).0, 2);
        assert_eq!(*soa.at::<1>(0), 2);
    }

    #[test]
    fn test_failed_growth_keeps_every_column_empty() {
        let mut soa: StructureOfArrays<(u8, Huge)> = StructureOfArrays::new();

        assert!(soa.try_push_back().is_err());
        assert_eq!(soa.len(), 0);
        assert!(soa.data_slice::<0>().is_empty());
        assert!(soa.data_slice::<1>().is_empty());
    }

    #[test]
    fn test_reserve_covers_later_pushes() {
        let mut points = Points::new();
        points.reserve(100);
        let capacity = points.column::<1>().capacity();
        for _ in 0..100 {
            points.push_back();
        }
        assert_eq!(points.column::<1>().capacity(), capacity);
    }
}
