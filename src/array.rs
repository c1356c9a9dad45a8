use std::{
    fmt,
    ops::{self, Deref, DerefMut},
    ptr::{self, NonNull},
};

use crate::{
    error::{Error, Result},
    mem_allocator::{AllocFlags, Allocator, prelude::ctx_alloc},
    slice::{BackIndex, Index, Slice, SliceMut, checked_index},
};

/// Types for which the all-zero bit pattern is a valid value.
///
/// # Safety
///
/// Implementors must accept zeroed memory as an initialized value.
pub unsafe trait Zeroable: Copy {}

macro_rules! impl_zeroable {
    ($($t:ty),* $(,)?) => {
        $(unsafe impl Zeroable for $t {})*
    };
}

impl_zeroable!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char
);

unsafe impl<T: Zeroable, const N: usize> Zeroable for [T; N] {}

/// Smallest capacity an array grows to.
pub const MIN_CAPACITY: usize = 8;

/// Capacity to grow to when `required` elements do not fit in `cap`.
pub fn next_capacity(cap: usize, required: usize) -> usize {
    required.max(MIN_CAPACITY).max(cap + cap / 2)
}

/// Growable array whose storage comes from an [`Allocator`].
///
/// The array remembers its allocator and routes every resize and the final
/// free through it. Capacity never shrinks implicitly.
pub struct Array<'a, T: Copy> {
    data: NonNull<T>,
    len: usize,
    cap: usize,
    alloc: Allocator<'a>,
}

impl<T: Copy> Array<'static, T> {
    /// Empty array on the context allocator.
    pub fn new() -> Self {
        Self::new_in(ctx_alloc())
    }
}

impl<T: Zeroable> Array<'static, T> {
    /// `len` zeroed elements with room for `max(len, cap)` on the context
    /// allocator.
    #[track_caller]
    pub fn make(len: usize, cap: usize) -> Self {
        Self::make_in(len, cap, ctx_alloc())
    }

    #[track_caller]
    pub fn with_len(len: usize) -> Self {
        Self::make(len, len)
    }
}

impl<T: Copy> Default for Array<'static, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Copy> Array<'a, T> {
    pub fn new_in(alloc: Allocator<'a>) -> Self {
        Self {
            data: NonNull::dangling(),
            len: 0,
            cap: 0,
            alloc,
        }
    }

    #[track_caller]
    pub fn with_capacity_in(cap: usize, alloc: Allocator<'a>) -> Self {
        let mut array = Self::new_in(alloc);
        array.reserve(cap);
        array
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn allocator(&self) -> Allocator<'a> {
        self.alloc
    }

    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    pub fn as_slice(&self) -> Slice<'_, T> {
        unsafe { Slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    pub fn as_slice_mut(&mut self) -> SliceMut<'_, T> {
        unsafe { SliceMut::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    /// Makes room for exactly `cap` elements; no-op when already large enough.
    #[track_caller]
    pub fn reserve(&mut self, cap: usize) {
        if let Err(e) = self.grow_to(cap, AllocFlags::empty()) {
            fail!("{e}");
        }
    }

    /// Like [`Array::reserve`], reporting allocation failure instead of
    /// failing.
    #[track_caller]
    pub fn try_reserve(&mut self, cap: usize) -> Result<()> {
        self.grow_to(cap, AllocFlags::NO_PANIC)
    }

    #[track_caller]
    fn grow_to(&mut self, cap: usize, flags: AllocFlags) -> Result<()> {
        if cap <= self.cap {
            return Ok(());
        }

        let align = align_of::<T>();
        let Some(new) = cap.checked_mul(size_of::<T>()) else {
            return crate::mem_allocator::out_of_memory(usize::MAX, align, flags);
        };
        let old = self.cap * size_of::<T>();

        if new > 0 {
            let ptr = (old > 0).then(|| self.data.cast::<u8>());
            let data = unsafe {
                self.alloc
                    .reallocate(ptr, old, new, align, flags | AllocFlags::NON_ZERO)?
            };
            let Some(data) = data else {
                return Err(Error::OutOfMemory { size: new, align });
            };
            self.data = data.cast();
        }
        self.cap = cap;

        Ok(())
    }

    #[track_caller]
    fn grow_for(&mut self, required: usize) {
        if required > self.cap {
            self.reserve(next_capacity(self.cap, required));
        }
    }

    #[track_caller]
    pub fn push(&mut self, value: T) {
        self.grow_for(self.len + 1);
        unsafe { self.data.add(self.len).write(value) };
        self.len += 1;
    }

    #[track_caller]
    pub fn extend_from_slice(&mut self, values: &[T]) {
        let high = self.len + values.len();
        self.grow_for(high);
        unsafe {
            let dst = self.data.add(self.len).as_ptr();
            ptr::copy_nonoverlapping(values.as_ptr(), dst, values.len());
        }
        self.len = high;
    }

    /// Removes and returns the last element.
    #[track_caller]
    pub fn pop(&mut self) -> T {
        check_bounds!(self.len > 0);
        self.len -= 1;
        unsafe { self.data.add(self.len).read() }
    }

    /// Removes element `i`, shifting the tail down.
    #[track_caller]
    pub fn remove_ordered(&mut self, i: Index) -> T {
        let i = checked_index(i, self.len);
        unsafe {
            let at = self.data.add(i);
            let value = at.read();
            ptr::copy(at.add(1).as_ptr(), at.as_ptr(), self.len - i - 1);
            self.len -= 1;
            value
        }
    }

    /// Removes element `i`, moving the last element into its slot.
    #[track_caller]
    pub fn remove_unordered(&mut self, i: Index) -> T {
        let i = checked_index(i, self.len);
        self.len -= 1;
        unsafe {
            let at = self.data.add(i);
            let value = at.read();
            at.write(self.data.add(self.len).read());
            value
        }
    }

    /// Shortens the array, keeping its storage.
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Releases the storage through the array's allocator.
    pub fn destroy(self) {}
}

impl<'a, T: Zeroable> Array<'a, T> {
    /// `len` zeroed elements with room for `max(len, cap)`.
    #[track_caller]
    pub fn make_in(len: usize, cap: usize, alloc: Allocator<'a>) -> Self {
        let mut array = Self::with_capacity_in(len.max(cap), alloc);
        array.resize(len);
        array
    }

    /// Sets the length; newly exposed elements are zeroed.
    #[track_caller]
    pub fn resize(&mut self, len: usize) {
        self.grow_for(len);
        if len > self.len {
            unsafe { self.data.add(self.len).write_bytes(0, len - self.len) };
        }
        self.len = len;
        debug_check!(self.len <= self.cap);
    }
}

impl Array<'_, u8> {
    pub fn to_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(self)?)
    }
}

impl<T: Copy> Drop for Array<'_, T> {
    fn drop(&mut self) {
        let bytes = self.cap * size_of::<T>();
        if bytes > 0 {
            unsafe { self.alloc.free(self.data.cast(), bytes, align_of::<T>()) };
        }
    }
}

impl<T: Copy> Deref for Array<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }
}

impl<T: Copy> DerefMut for Array<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.data.as_ptr(), self.len) }
    }
}

impl<T: Copy> ops::Index<Index> for Array<'_, T> {
    type Output = T;

    #[track_caller]
    fn index(&self, i: Index) -> &T {
        let i = checked_index(i, self.len);
        unsafe { self.data.add(i).as_ref() }
    }
}

impl<T: Copy> ops::IndexMut<Index> for Array<'_, T> {
    #[track_caller]
    fn index_mut(&mut self, i: Index) -> &mut T {
        let i = checked_index(i, self.len);
        unsafe { self.data.add(i).as_mut() }
    }
}

impl<T: Copy> ops::Index<BackIndex> for Array<'_, T> {
    type Output = T;

    #[track_caller]
    fn index(&self, i: BackIndex) -> &T {
        &self[i.resolve(self.len)]
    }
}

impl<T: Copy> ops::IndexMut<BackIndex> for Array<'_, T> {
    #[track_caller]
    fn index_mut(&mut self, i: BackIndex) -> &mut T {
        let i = i.resolve(self.len);
        &mut self[i]
    }
}

impl<T: Copy> Extend<T> for Array<'_, T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Array<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
