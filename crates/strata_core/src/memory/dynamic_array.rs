//! # Dynamic Array
//!
//! Owned, contiguous, growable storage with an explicit split between the
//! live range (`len`) and the allocated range (`capacity`).
//!
//! ## Layout
//!
//! ```text
//! ptr ─► [ T0 | T1 | ... | T(len-1) | ?? | ?? | ... ]
//!         └──────── live ──────────┘└── spare ──┘
//!         └─────────────── capacity ─────────────┘
//! ```
//!
//! Slots in `[0, len)` are always initialized. Slots in `[len, capacity)`
//! are uninitialized memory and are never read or dropped.
//!
//! ## Aliasing
//!
//! Any call that can reallocate (`push_back`, `append`, `reserve`,
//! `resize*`, `shrink`) invalidates raw pointers previously obtained from
//! [`DynamicArray::as_ptr`]. Borrowed slices are protected by the borrow
//! checker; raw pointers are not.

// SAFETY: This module owns raw storage and manages initialization by hand.
// Every unsafe block states the invariant it relies on.
#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr::{self, NonNull};
use std::slice;

use crate::config::GrowthPolicy;
use crate::error::{ContainerError, ContainerResult};

/// A contiguous, growable sequence that exclusively owns its buffer.
///
/// Growth follows the array's [`GrowthPolicy`] (doubling by default), so
/// [`push_back`](Self::push_back) is amortized O(1). Capacity only ever
/// shrinks through [`shrink`](Self::shrink).
///
/// # Example
///
/// ```rust
/// use strata_core::DynamicArray;
///
/// let mut values = DynamicArray::new();
/// values.push_back(1);
/// values.append(&[2, 3, 4]);
/// assert_eq!(values.as_slice(), &[1, 2, 3, 4]);
/// ```
pub struct DynamicArray<T> {
    /// Start of the buffer. Dangling while `capacity == 0` or `T` is zero-sized.
    ptr: NonNull<T>,
    /// Number of initialized elements.
    len: usize,
    /// Number of allocated slots.
    capacity: usize,
    /// How capacity grows.
    policy: GrowthPolicy,
    /// We own values of `T`.
    _owns: PhantomData<T>,
}

// SAFETY: The buffer is exclusively owned, so thread-safety follows `T`.
unsafe impl<T: Send> Send for DynamicArray<T> {}
// SAFETY: Shared access only hands out `&T`.
unsafe impl<T: Sync> Sync for DynamicArray<T> {}

/// Escalates a growth failure from an infallible method.
///
/// Allocator refusals go to the global allocation error handler; anything
/// else is a capacity overflow and panics.
#[cold]
#[inline(never)]
pub(crate) fn growth_failed(err: &ContainerError) -> ! {
    if let ContainerError::AllocationFailed { bytes, align } = *err {
        if let Ok(layout) = Layout::from_size_align(bytes, align) {
            alloc::handle_alloc_error(layout);
        }
    }
    panic!("dynamic array growth failed: {err}");
}

impl<T> DynamicArray<T> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// Creates an empty array with the default growth policy.
    ///
    /// Does not allocate.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_policy(GrowthPolicy::DEFAULT)
    }

    /// Creates an empty array that grows according to `policy`.
    #[inline]
    #[must_use]
    pub const fn with_policy(policy: GrowthPolicy) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            capacity: 0,
            policy,
            _owns: PhantomData,
        }
    }

    /// Creates an empty array with exactly `capacity` slots allocated.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts via the allocation error
    /// handler if the allocator refuses.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut array = Self::new();
        array.reserve(capacity);
        array
    }

    /// Returns the number of live elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no live elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of allocated slots.
    ///
    /// Zero-sized types never allocate and report `usize::MAX`.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        if Self::IS_ZST {
            usize::MAX
        } else {
            self.capacity
        }
    }

    /// Returns the growth policy.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Replaces the growth policy. Takes effect on the next growth.
    #[inline]
    pub fn set_policy(&mut self, policy: GrowthPolicy) {
        self.policy = policy;
    }

    /// Raw pointer to the first element.
    ///
    /// Invalidated by any call that may reallocate.
    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Mutable raw pointer to the first element.
    ///
    /// Invalidated by any call that may reallocate.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// View of the live elements.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` is initialized and `ptr` is non-null and aligned.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Mutable view of the live elements.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, and `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// The uninitialized slots `[len, capacity)`.
    ///
    /// Write into these, then publish them with
    /// [`resize_uninitialised`](Self::resize_uninitialised).
    #[inline]
    pub fn spare_capacity_mut(&mut self) -> &mut [MaybeUninit<T>] {
        // SAFETY: the spare range lies within the allocation and
        // `MaybeUninit` tolerates any contents.
        unsafe {
            slice::from_raw_parts_mut(
                self.ptr.as_ptr().add(self.len).cast::<MaybeUninit<T>>(),
                self.capacity() - self.len,
            )
        }
    }

    /// Returns a reference to element `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn at(&self, index: usize) -> &T {
        assert!(
            index < self.len,
            "index {index} out of bounds for dynamic array of length {}",
            self.len
        );
        // SAFETY: bounds-checked above.
        unsafe { &*self.ptr.as_ptr().add(index) }
    }

    /// Returns a mutable reference to element `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    #[track_caller]
    pub fn at_mut(&mut self, index: usize) -> &mut T {
        assert!(
            index < self.len,
            "index {index} out of bounds for dynamic array of length {}",
            self.len
        );
        // SAFETY: bounds-checked above.
        unsafe { &mut *self.ptr.as_ptr().add(index) }
    }

    /// Iterates the live elements in index order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterates the live elements mutably in index order.
    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    // ------------------------------------------------------------------
    // Capacity management
    // ------------------------------------------------------------------

    fn layout_for(capacity: usize) -> ContainerResult<Layout> {
        Layout::array::<T>(capacity).map_err(|_| ContainerError::CapacityOverflow {
            requested: capacity,
        })
    }

    /// Moves the buffer to exactly `new_capacity` slots.
    ///
    /// On failure the old buffer is untouched.
    fn try_reallocate(&mut self, new_capacity: usize) -> ContainerResult<()> {
        debug_assert!(new_capacity >= self.len, "reallocation would drop live elements");

        if Self::IS_ZST || new_capacity == self.capacity {
            return Ok(());
        }

        if new_capacity == 0 {
            self.release();
            return Ok(());
        }

        let new_layout = Self::layout_for(new_capacity)?;

        // SAFETY: `new_layout` has non-zero size. When a buffer exists it was
        // allocated with `layout_for(self.capacity)`, which therefore succeeds.
        let raw = unsafe {
            if self.capacity == 0 {
                alloc::alloc(new_layout)
            } else {
                let old_layout = Self::layout_for(self.capacity)?;
                alloc::realloc(self.ptr.as_ptr().cast::<u8>(), old_layout, new_layout.size())
            }
        };

        let Some(new_ptr) = NonNull::new(raw.cast::<T>()) else {
            tracing::warn!(
                bytes = new_layout.size(),
                align = new_layout.align(),
                "dynamic array allocation failed"
            );
            return Err(ContainerError::AllocationFailed {
                bytes: new_layout.size(),
                align: new_layout.align(),
            });
        };

        tracing::trace!(
            old_capacity = self.capacity,
            new_capacity,
            element_size = mem::size_of::<T>(),
            "dynamic array reallocated"
        );

        self.ptr = new_ptr;
        self.capacity = new_capacity;
        Ok(())
    }

    /// Frees the buffer. Live elements must already be gone.
    fn release(&mut self) {
        debug_assert_eq!(self.len, 0);
        if !Self::IS_ZST && self.capacity > 0 {
            if let Ok(layout) = Self::layout_for(self.capacity) {
                // SAFETY: allocated with this exact layout.
                unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout) };
            }
        }
        self.ptr = NonNull::dangling();
        self.capacity = 0;
    }

    /// Ensures room for `additional` more elements, growing geometrically.
    ///
    /// # Errors
    ///
    /// [`ContainerError::CapacityOverflow`] or
    /// [`ContainerError::AllocationFailed`]; the array is unchanged.
    pub fn try_reserve_additional(&mut self, additional: usize) -> ContainerResult<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(ContainerError::CapacityOverflow {
                requested: usize::MAX,
            })?;
        if required <= self.capacity() {
            return Ok(());
        }
        let new_capacity = self.policy.next_capacity(self.capacity, required);
        self.try_reallocate(new_capacity)
    }

    /// Ensures `capacity() >= capacity` without changing `len()`.
    ///
    /// Allocates exactly `capacity` slots when it has to grow.
    ///
    /// # Errors
    ///
    /// [`ContainerError::CapacityOverflow`] or
    /// [`ContainerError::AllocationFailed`]; the array is unchanged.
    pub fn try_reserve(&mut self, capacity: usize) -> ContainerResult<()> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        self.try_reallocate(capacity)
    }

    /// Ensures `capacity() >= capacity` without changing `len()`.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts via the allocation error
    /// handler if the allocator refuses.
    pub fn reserve(&mut self, capacity: usize) {
        if let Err(err) = self.try_reserve(capacity) {
            growth_failed(&err);
        }
    }

    /// Reduces capacity to exactly `len()`, freeing the buffer when empty.
    ///
    /// Element values are preserved. If the allocator cannot move the
    /// buffer, the current allocation is kept.
    pub fn shrink(&mut self) {
        if Self::IS_ZST || self.capacity == self.len {
            return;
        }
        let old_capacity = self.capacity;
        match self.try_reallocate(self.len) {
            Ok(()) => tracing::debug!(old_capacity, new_capacity = self.len, "dynamic array shrunk"),
            Err(err) => tracing::warn!(%err, "shrink failed, keeping current allocation"),
        }
    }

    // ------------------------------------------------------------------
    // Length management
    // ------------------------------------------------------------------

    /// Appends one element.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts via the allocation error
    /// handler if the allocator refuses.
    #[inline]
    pub fn push_back(&mut self, value: T) {
        if let Err(err) = self.try_push_back(value) {
            growth_failed(&err);
        }
    }

    /// Appends one element.
    ///
    /// # Errors
    ///
    /// Growth errors; the array is unchanged and `value` is dropped.
    #[inline]
    pub fn try_push_back(&mut self, value: T) -> ContainerResult<()> {
        if self.len == self.capacity() {
            self.try_reserve_additional(1)?;
        }
        // SAFETY: `len < capacity`, so the slot is allocated and spare.
        unsafe { ptr::write(self.ptr.as_ptr().add(self.len), value) };
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last element.
    #[inline]
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was live and is now outside `[0, len)`.
        Some(unsafe { ptr::read(self.ptr.as_ptr().add(self.len)) })
    }

    /// Drops every element past `len`. Capacity is unchanged.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let tail = ptr::slice_from_raw_parts_mut(
            // SAFETY: `len < self.len`, so the offset is in bounds.
            unsafe { self.ptr.as_ptr().add(len) },
            self.len - len,
        );
        // Shorten first so a panicking destructor cannot cause a double drop.
        self.len = len;
        // SAFETY: the tail was live and is no longer reachable.
        unsafe { ptr::drop_in_place(tail) };
    }

    /// Drops every element. Capacity is unchanged.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Removes element `index`, moving the last element into its place.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[track_caller]
    pub fn swap_remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "swap_remove index {index} out of bounds for length {}",
            self.len
        );
        let base = self.ptr.as_ptr();
        // SAFETY: `index` and `len - 1` are live slots. After the read, the
        // hole at `index` is filled by the last element and `len` shrinks.
        unsafe {
            let value = ptr::read(base.add(index));
            self.len -= 1;
            if index != self.len {
                ptr::copy_nonoverlapping(base.add(self.len), base.add(index), 1);
            }
            value
        }
    }

    /// Removes element `index`, shifting everything after it down by one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[track_caller]
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "remove index {index} out of bounds for length {}",
            self.len
        );
        let base = self.ptr.as_ptr();
        // SAFETY: `index` is live; the shifted range `[index + 1, len)` is live.
        unsafe {
            let value = ptr::read(base.add(index));
            ptr::copy(base.add(index + 1), base.add(index), self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Sets `len()` to `new_len` without initializing new slots.
    ///
    /// Growing exposes slots holding uninitialized memory; shrinking drops
    /// the cut elements and keeps capacity. Growing past capacity follows
    /// the growth policy.
    ///
    /// # Safety
    ///
    /// When growing, every slot in `[old_len, new_len)` must be written
    /// (for example through [`as_mut_ptr`](Self::as_mut_ptr) or
    /// [`spare_capacity_mut`](Self::spare_capacity_mut)) before it is read
    /// or the array is dropped.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts via the allocation error
    /// handler if the allocator refuses.
    pub unsafe fn resize_uninitialised(&mut self, new_len: usize) {
        if let Err(err) = self.try_resize_uninitialised(new_len) {
            growth_failed(&err);
        }
    }

    /// Fallible [`resize_uninitialised`](Self::resize_uninitialised).
    ///
    /// # Safety
    ///
    /// Same contract as [`resize_uninitialised`](Self::resize_uninitialised).
    ///
    /// # Errors
    ///
    /// Growth errors; the array is unchanged.
    pub unsafe fn try_resize_uninitialised(&mut self, new_len: usize) -> ContainerResult<()> {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        self.try_reserve_additional(new_len - self.len)?;
        self.len = new_len;
        Ok(())
    }

    /// Sets `len()` to `new_len`, filling new slots with `fill()`.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts via the allocation error
    /// handler if the allocator refuses.
    pub fn resize_with<F>(&mut self, new_len: usize, mut fill: F)
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        if let Err(err) = self.try_reserve_additional(new_len - self.len) {
            growth_failed(&err);
        }
        while self.len < new_len {
            // SAFETY: capacity was reserved above; `len` tracks each write
            // so a panicking `fill` leaves only initialized slots live.
            unsafe { ptr::write(self.ptr.as_ptr().add(self.len), fill()) };
            self.len += 1;
        }
    }

    /// Moves the contents out, leaving `self` empty with no allocation.
    #[must_use]
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::with_policy(self.policy))
    }
}

impl<T: Clone> DynamicArray<T> {
    /// Sets `len()` to `new_len`, filling new slots with clones of `value`.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts via the allocation error
    /// handler if the allocator refuses.
    pub fn resize(&mut self, new_len: usize, value: T) {
        self.resize_with(new_len, || value.clone());
    }
}

impl<T: Copy> DynamicArray<T> {
    /// Appends all of `source` with a single capacity check.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts via the allocation error
    /// handler if the allocator refuses.
    #[inline]
    pub fn append(&mut self, source: &[T]) {
        if let Err(err) = self.try_append(source) {
            growth_failed(&err);
        }
    }

    /// Appends all of `source` with a single capacity check.
    ///
    /// # Errors
    ///
    /// Growth errors; the array is unchanged.
    pub fn try_append(&mut self, source: &[T]) -> ContainerResult<()> {
        self.try_reserve_additional(source.len())?;
        // SAFETY: room for `source.len()` more was reserved; `source` is a
        // borrowed slice so it cannot overlap our exclusively owned spare slots.
        unsafe {
            ptr::copy_nonoverlapping(
                source.as_ptr(),
                self.ptr.as_ptr().add(self.len),
                source.len(),
            );
        }
        self.len += source.len();
        Ok(())
    }
}

impl<T: bytemuck::Pod> DynamicArray<T> {
    /// The live elements as raw bytes, ready for upload or hashing.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        self.clear();
        self.release();
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    /// Deep copy with capacity equal to the source length.
    fn clone(&self) -> Self {
        let mut copy = Self::with_policy(self.policy);
        copy.reserve(self.len);
        for item in self {
            copy.push_back(item.clone());
        }
        copy
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Index<usize> for DynamicArray<T> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, index: usize) -> &T {
        self.at(index)
    }
}

impl<T> IndexMut<usize> for DynamicArray<T> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.at_mut(index)
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if let Err(err) = self.try_reserve_additional(lower) {
            growth_failed(&err);
        }
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T: Clone> From<&[T]> for DynamicArray<T> {
    fn from(source: &[T]) -> Self {
        source.iter().cloned().collect()
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
    fn from(source: [T; N]) -> Self {
        source.into_iter().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynamicArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T: Hash> Hash for DynamicArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}
