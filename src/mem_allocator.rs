use std::{
    marker::PhantomData,
    num::NonZeroUsize,
    ptr::{self, NonNull},
};

use memkit_utils::bits::is_power_of_two;

use crate::error::{Error, Result};

mod arena;
mod context;
mod heap;
mod slab_arena;

pub mod prelude {
    pub use super::arena::Arena;
    pub use super::context::{
        ScopedAlloc, ScopedTempAlloc, ctx_alloc, ctx_temp_alloc, scope_alloc, scope_temp_alloc,
    };
    pub use super::heap::Heap;
    pub use super::slab_arena::SlabArena;
    pub use super::{AllocFlags, Allocator, MemAllocator};
}

pub use context::{allocate, free, free_all, reallocate};
pub use heap::MIN_ALIGN;
pub use slab_arena::SLAB_ALIGN;

bitflags::bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AllocFlags: u8 {
        /// Release everything the allocator handed out.
        const FREE_ALL = 1;
        /// Skip zero-filling the bytes past the copied prefix.
        const NON_ZERO = 1 << 1;
        /// Return [`Error::OutOfMemory`] instead of failing.
        const NO_PANIC = 1 << 2;
    }
}

/// A realloc-shaped allocation strategy.
///
/// One entry point covers every operation:
///
/// - `ptr == None, old == 0, new > 0` allocates,
/// - `ptr == Some(_), new > 0` grows or shrinks, keeping `min(old, new)` bytes,
/// - `new == 0` frees and returns `Ok(None)`,
/// - [`AllocFlags::FREE_ALL`] releases everything, where supported.
///
/// Out of memory fails unless [`AllocFlags::NO_PANIC`] is set, in which case
/// [`Error::OutOfMemory`] is returned. A non power-of-two alignment always
/// fails.
pub trait MemAllocator {
    /// # Safety
    ///
    /// `ptr`, when given, must be a live block returned by this same
    /// allocator with exactly `old` bytes and `align` alignment. With
    /// [`AllocFlags::FREE_ALL`] every block it handed out becomes dangling.
    unsafe fn reallocate(
        &self,
        ptr: Option<NonNull<u8>>,
        old: usize,
        new: usize,
        align: usize,
        flags: AllocFlags,
    ) -> Result<Option<NonNull<u8>>>;
}

/// Copyable handle to one of the built-in allocators.
///
/// The handle does not own anything; the allocator it points at must outlive
/// `'a`, and every block must go back through the handle that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocator<'a> {
    kind: Kind,
    _marker: PhantomData<&'a ()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Heap,
    Arena(NonNull<arena::Arena<'static>>),
    Slab(NonNull<slab_arena::SlabArena<'static>>),
}

impl Default for Allocator<'_> {
    fn default() -> Self {
        context::ctx_alloc()
    }
}

impl<'a> Allocator<'a> {
    pub const fn heap() -> Self {
        Self {
            kind: Kind::Heap,
            _marker: PhantomData,
        }
    }

    pub(crate) fn from_arena(arena: &'a arena::Arena<'_>) -> Self {
        Self {
            kind: Kind::Arena(NonNull::from(arena).cast()),
            _marker: PhantomData,
        }
    }

    pub(crate) fn from_slab_arena(arena: &'a slab_arena::SlabArena<'_>) -> Self {
        Self {
            kind: Kind::Slab(NonNull::from(arena).cast()),
            _marker: PhantomData,
        }
    }

    /// # Safety
    ///
    /// The allocator behind the handle must stay alive for as long as the
    /// returned handle is used.
    pub(crate) unsafe fn erase(self) -> Allocator<'static> {
        Allocator {
            kind: self.kind,
            _marker: PhantomData,
        }
    }

    pub fn is_heap(&self) -> bool {
        matches!(self.kind, Kind::Heap)
    }

    /// Returns `size` fresh bytes aligned to `align`.
    ///
    /// A zero `size` yields a dangling, aligned pointer that must not be
    /// dereferenced. [`AllocFlags::FREE_ALL`] is ignored here.
    #[track_caller]
    pub fn allocate(&self, size: usize, align: usize, flags: AllocFlags) -> Result<NonNull<u8>> {
        check_align(align);
        let flags = flags - AllocFlags::FREE_ALL;
        match unsafe { self.reallocate(None, 0, size, align, flags) }? {
            Some(ptr) => Ok(ptr),
            None => Ok(dangling(align)),
        }
    }

    /// # Safety
    ///
    /// See [`MemAllocator::reallocate`].
    #[track_caller]
    pub unsafe fn reallocate(
        &self,
        ptr: Option<NonNull<u8>>,
        old: usize,
        new: usize,
        align: usize,
        flags: AllocFlags,
    ) -> Result<Option<NonNull<u8>>> {
        unsafe {
            match self.kind {
                Kind::Heap => heap::Heap.reallocate(ptr, old, new, align, flags),
                Kind::Arena(arena) => arena.as_ref().reallocate(ptr, old, new, align, flags),
                Kind::Slab(slab) => slab.as_ref().reallocate(ptr, old, new, align, flags),
            }
        }
    }

    /// # Safety
    ///
    /// `ptr` must be a live block of this allocator with exactly `size`
    /// bytes and `align` alignment.
    #[track_caller]
    pub unsafe fn free(&self, ptr: NonNull<u8>, size: usize, align: usize) {
        if size == 0 {
            return;
        }
        // Freeing never reports out of memory.
        let _ = unsafe { self.reallocate(Some(ptr), size, 0, align, AllocFlags::empty()) };
    }

    /// Fails on the heap allocator.
    ///
    /// # Safety
    ///
    /// Every block handed out by this allocator becomes dangling.
    #[track_caller]
    pub unsafe fn free_all(&self) {
        let _ = unsafe { self.reallocate(None, 0, 0, 1, AllocFlags::FREE_ALL) };
    }
}

#[track_caller]
pub(crate) fn check_align(align: usize) {
    fail_if!(
        align == 0 || !is_power_of_two(align),
        "Alignment {align} is not a power of two."
    );
}

/// Graceful or fatal out-of-memory, depending on [`AllocFlags::NO_PANIC`].
#[track_caller]
pub(crate) fn out_of_memory<T>(size: usize, align: usize, flags: AllocFlags) -> Result<T> {
    let e = Error::OutOfMemory { size, align };
    if flags.contains(AllocFlags::NO_PANIC) {
        return Err(e);
    }
    fail!("{e}")
}

/// Aligned, non-null and never dereferenced.
pub(crate) fn dangling(align: usize) -> NonNull<u8> {
    NonZeroUsize::new(align).map_or(NonNull::dangling(), |addr| {
        NonNull::dangling().with_addr(addr)
    })
}

/// Copies `min(old, new)` bytes from `src` to `dst`, then zero-fills the
/// rest of `dst` unless [`AllocFlags::NON_ZERO`] is set.
///
/// # Safety
///
/// `dst` must be writable for `new` bytes and `src`, when given, readable
/// for `old` bytes. The two may overlap.
pub(crate) unsafe fn copy_and_zero(
    dst: NonNull<u8>,
    new: usize,
    src: Option<NonNull<u8>>,
    old: usize,
    flags: AllocFlags,
) {
    let mut copied = 0;
    unsafe {
        if let Some(src) = src {
            copied = old.min(new);
            ptr::copy(src.as_ptr(), dst.as_ptr(), copied);
        }
        if !flags.contains(AllocFlags::NON_ZERO) && new > copied {
            ptr::write_bytes(dst.as_ptr().add(copied), 0, new - copied);
        }
    }
}
