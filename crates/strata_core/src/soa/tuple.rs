//! # Fixed Tuple
//!
//! A heterogeneous value holder with type-level arity and positional
//! access checked at compile time.
//!
//! ```rust
//! use strata_core::{ElementType, FixedTuple};
//!
//! let mut t = FixedTuple::new((1u8, "two", 3.0f32));
//! *t.get_mut::<0>() += 1;
//! assert_eq!(*t.get::<0>(), 2);
//!
//! let second: ElementType<FixedTuple<(u8, &str, f32)>, 1> = "x";
//! assert_eq!(second, "x");
//! ```
//!
//! An out-of-range position has no `TupleElement` impl and fails to compile:
//!
//! ```compile_fail
//! use strata_core::FixedTuple;
//!
//! let t = FixedTuple::new((1u8, 2u16));
//! let _ = t.get::<2>();
//! ```

/// A fixed-arity tuple of heterogeneous values.
///
/// Implemented for arities 1 through 8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedTuple<T>(T);

/// Number of elements held by a tuple type.
pub trait TupleArity {
    /// Element count.
    const ARITY: usize;
}

/// Positional access to element `I`.
pub trait TupleElement<const I: usize> {
    /// Type stored at position `I`.
    type Output;

    /// Shared reference to element `I`.
    fn element(&self) -> &Self::Output;

    /// Mutable reference to element `I`.
    fn element_mut(&mut self) -> &mut Self::Output;
}

/// The type stored at position `I` of tuple type `T`, without a value.
pub type ElementType<T, const I: usize> = <T as TupleElement<I>>::Output;

impl<T> FixedTuple<T> {
    /// Wraps a plain tuple.
    #[inline]
    #[must_use]
    pub const fn new(values: T) -> Self {
        Self(values)
    }

    /// Unwraps into the plain tuple.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Shared reference to the underlying tuple.
    #[inline]
    #[must_use]
    pub const fn as_inner(&self) -> &T {
        &self.0
    }

    /// Element at compile-time position `I`.
    #[inline]
    #[must_use]
    pub fn get<const I: usize>(&self) -> &ElementType<Self, I>
    where
        Self: TupleElement<I>,
    {
        <Self as TupleElement<I>>::element(self)
    }

    /// Mutable element at compile-time position `I`.
    #[inline]
    pub fn get_mut<const I: usize>(&mut self) -> &mut ElementType<Self, I>
    where
        Self: TupleElement<I>,
    {
        <Self as TupleElement<I>>::element_mut(self)
    }
}

impl<T> From<T> for FixedTuple<T> {
    fn from(values: T) -> Self {
        Self(values)
    }
}

/// One `TupleElement` impl; `$all` carries the full generic list.
macro_rules! tuple_element {
    ([$($G:ident),+] $idx:tt : $T:ident) => {
        impl<$($G),+> TupleElement<$idx> for FixedTuple<($($G,)+)> {
            type Output = $T;

            #[inline]
            fn element(&self) -> &$T {
                &(self.0).$idx
            }

            #[inline]
            fn element_mut(&mut self) -> &mut $T {
                &mut (self.0).$idx
            }
        }
    };
}

/// Arity plus every positional impl for one tuple size.
macro_rules! fixed_tuple_impls {
    ($arity:literal => $all:tt $($idx:tt : $T:ident),+) => {
        tuple_arity!($arity, $all);
        $( tuple_element!($all $idx : $T); )+
    };
}

macro_rules! tuple_arity {
    ($arity:literal, [$($G:ident),+]) => {
        impl<$($G),+> TupleArity for FixedTuple<($($G,)+)> {
            const ARITY: usize = $arity;
        }
    };
}

fixed_tuple_impls!(1 => [A] 0: A);
fixed_tuple_impls!(2 => [A, B] 0: A, 1: B);
fixed_tuple_impls!(3 => [A, B, C] 0: A, 1: B, 2: C);
fixed_tuple_impls!(4 => [A, B, C, D] 0: A, 1: B, 2: C, 3: D);
fixed_tuple_impls!(5 => [A, B, C, D, E] 0: A, 1: B, 2: C, 3: D, 4: E);
fixed_tuple_impls!(6 => [A, B, C, D, E, F] 0: A, 1: B, 2: C, 3: D, 4: E, 5: F);
fixed_tuple_impls!(7 => [A, B, C, D, E, F, G] 0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G);
fixed_tuple_impls!(8 => [A, B, C, D, E, F, G, H] 0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G, 7: H);
