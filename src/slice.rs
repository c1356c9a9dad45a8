//! Non-owning, bounds-checked views.
//!
//! Positions are signed ([`Index`]) so that negative values are caught by the
//! bounds check instead of wrapping. Positions counted from the back are
//! written `END - n`; `END - 1` is the last element.

use std::{
    fmt,
    marker::PhantomData,
    ops::{self, Deref, DerefMut, Sub},
    ptr,
};

pub type Index = isize;

/// A position counted back from the end of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackIndex(Index);

/// One past the last element.
pub const END: BackIndex = BackIndex(0);

impl Sub<Index> for BackIndex {
    type Output = BackIndex;

    fn sub(self, n: Index) -> BackIndex {
        BackIndex(self.0 + n)
    }
}

impl BackIndex {
    pub(crate) fn resolve(self, len: usize) -> Index {
        len as Index - self.0
    }
}

#[inline]
#[track_caller]
pub(crate) fn checked_index(i: Index, len: usize) -> usize {
    check_bounds!(i >= 0 && (i as usize) < len);
    i as usize
}

#[inline]
#[track_caller]
pub(crate) fn checked_range(low: Index, high: Index, len: usize) -> ops::Range<usize> {
    check_bounds!(0 <= low && low <= high && (high as usize) <= len);
    low as usize..high as usize
}

/// Shared view of `len` elements.
///
/// A null slice (see [`Slice::null`]) is distinct from an empty one with a
/// valid pointer, but both deref to an empty `[T]`.
pub struct Slice<'a, T> {
    data: *const T,
    len: usize,
    _marker: PhantomData<&'a [T]>,
}

impl<T> Clone for Slice<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Slice<'_, T> {}

impl<'a, T> Slice<'a, T> {
    pub const fn null() -> Self {
        Self {
            data: ptr::null(),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// # Safety
    ///
    /// `data` must be valid for reads of `len` elements for `'a`.
    pub const unsafe fn from_raw_parts(data: *const T, len: usize) -> Self {
        Self {
            data,
            len,
            _marker: PhantomData,
        }
    }

    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the viewed elements in bytes.
    pub fn bytes(&self) -> usize {
        self.len * size_of::<T>()
    }

    pub fn as_ptr(&self) -> *const T {
        self.data
    }

    pub fn as_slice(&self) -> &'a [T] {
        if self.data.is_null() {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.data, self.len) }
    }

    /// Elements in `[low, high)`.
    #[track_caller]
    pub fn slice(&self, low: Index, high: Index) -> Slice<'a, T> {
        let range = checked_range(low, high, self.len);
        unsafe { Slice::from_raw_parts(self.data.wrapping_add(range.start), range.len()) }
    }

    #[track_caller]
    pub fn slice_from(&self, low: Index) -> Slice<'a, T> {
        self.slice(low, self.len as Index)
    }

    #[track_caller]
    pub fn slice_to(&self, high: Index) -> Slice<'a, T> {
        self.slice(0, high)
    }
}

impl<T> Default for Slice<'_, T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<'a, T> From<&'a [T]> for Slice<'a, T> {
    fn from(s: &'a [T]) -> Self {
        unsafe { Self::from_raw_parts(s.as_ptr(), s.len()) }
    }
}

impl<T> Deref for Slice<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> ops::Index<Index> for Slice<'_, T> {
    type Output = T;

    #[track_caller]
    fn index(&self, i: Index) -> &T {
        let i = checked_index(i, self.len);
        unsafe { &*self.data.add(i) }
    }
}

impl<T> ops::Index<BackIndex> for Slice<'_, T> {
    type Output = T;

    #[track_caller]
    fn index(&self, i: BackIndex) -> &T {
        &self[i.resolve(self.len)]
    }
}

impl<T: fmt::Debug> fmt::Debug for Slice<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Mutable view of `len` elements.
pub struct SliceMut<'a, T> {
    data: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T> SliceMut<'a, T> {
    pub const fn null() -> Self {
        Self {
            data: ptr::null_mut(),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// # Safety
    ///
    /// `data` must be valid for reads and writes of `len` elements for `'a`,
    /// with no other access meanwhile.
    pub const unsafe fn from_raw_parts(data: *mut T, len: usize) -> Self {
        Self {
            data,
            len,
            _marker: PhantomData,
        }
    }

    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bytes(&self) -> usize {
        self.len * size_of::<T>()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data
    }

    pub fn as_slice(&self) -> Slice<'_, T> {
        unsafe { Slice::from_raw_parts(self.data, self.len) }
    }

    #[track_caller]
    pub fn slice_mut(&mut self, low: Index, high: Index) -> SliceMut<'_, T> {
        let range = checked_range(low, high, self.len);
        unsafe { SliceMut::from_raw_parts(self.data.wrapping_add(range.start), range.len()) }
    }
}

impl<'a, T> From<&'a mut [T]> for SliceMut<'a, T> {
    fn from(s: &'a mut [T]) -> Self {
        unsafe { Self::from_raw_parts(s.as_mut_ptr(), s.len()) }
    }
}

impl<T> Deref for SliceMut<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        if self.data.is_null() {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.data, self.len) }
    }
}

impl<T> DerefMut for SliceMut<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        if self.data.is_null() {
            return &mut [];
        }
        unsafe { std::slice::from_raw_parts_mut(self.data, self.len) }
    }
}

impl<T> ops::Index<Index> for SliceMut<'_, T> {
    type Output = T;

    #[track_caller]
    fn index(&self, i: Index) -> &T {
        let i = checked_index(i, self.len);
        unsafe { &*self.data.add(i) }
    }
}

impl<T> ops::IndexMut<Index> for SliceMut<'_, T> {
    #[track_caller]
    fn index_mut(&mut self, i: Index) -> &mut T {
        let i = checked_index(i, self.len);
        unsafe { &mut *self.data.add(i) }
    }
}

impl<T> ops::Index<BackIndex> for SliceMut<'_, T> {
    type Output = T;

    #[track_caller]
    fn index(&self, i: BackIndex) -> &T {
        &self[i.resolve(self.len)]
    }
}

impl<T> ops::IndexMut<BackIndex> for SliceMut<'_, T> {
    #[track_caller]
    fn index_mut(&mut self, i: BackIndex) -> &mut T {
        let i = i.resolve(self.len);
        &mut self[i]
    }
}

impl<T: fmt::Debug> fmt::Debug for SliceMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Copies `min(dst.len(), src.len())` elements and returns that count.
pub fn copy<T: Copy>(dst: &mut [T], src: &[T]) -> usize {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
    n
}
