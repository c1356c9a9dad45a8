//! Thread-local default allocators.
//!
//! Each thread starts with the heap as its context allocator and a lazily
//! created [`DEFAULT_TEMP_ARENA_SIZE`] arena as its temporary allocator. Both
//! can be overridden for a scope with [`scope_alloc`] / [`scope_temp_alloc`].

use std::{cell::Cell, ptr::NonNull};

use super::{AllocFlags, Allocator, SLAB_ALIGN, arena::Arena};
use crate::{error::Result, options::DEFAULT_TEMP_ARENA_SIZE};

thread_local! {
    static CTX_ALLOC: Cell<Allocator<'static>> = const { Cell::new(Allocator::heap()) };
    static CTX_TEMP_ALLOC: Cell<Option<Allocator<'static>>> = const { Cell::new(None) };
    static TEMP_ARENA: TempArena = TempArena::new();
}

/// Heap-backed arena owned by the thread.
struct TempArena {
    base: NonNull<u8>,
    size: usize,
    arena: Arena<'static>,
}

impl TempArena {
    fn new() -> Self {
        let size = DEFAULT_TEMP_ARENA_SIZE;
        let base = match Allocator::heap().allocate(size, SLAB_ALIGN, AllocFlags::NON_ZERO) {
            Ok(base) => base,
            Err(e) => fail!("{e}"),
        };
        tracing::trace!(size, "temp arena created");

        Self {
            base,
            size,
            arena: unsafe { Arena::from_raw_parts(base, size) },
        }
    }
}

impl Drop for TempArena {
    fn drop(&mut self) {
        unsafe { Allocator::heap().free(self.base, self.size, SLAB_ALIGN) };
    }
}

/// The thread's general purpose allocator, the heap unless overridden.
pub fn ctx_alloc() -> Allocator<'static> {
    CTX_ALLOC.with(Cell::get)
}

/// The thread's scratch allocator.
///
/// Blocks handed out by the default temp arena live until someone calls
/// `free_all` on it; the arena is never reset implicitly.
pub fn ctx_temp_alloc() -> Allocator<'static> {
    if let Some(alloc) = CTX_TEMP_ALLOC.with(Cell::get) {
        return alloc;
    }
    // The arena lives until the thread exits.
    TEMP_ARENA.with(|temp| unsafe { temp.arena.allocator().erase() })
}

/// Restores the previous context allocator on drop.
#[must_use = "the override ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopedAlloc {
    prev: Allocator<'static>,
}

impl Drop for ScopedAlloc {
    fn drop(&mut self) {
        CTX_ALLOC.with(|ctx| ctx.set(self.prev));
    }
}

/// Restores the previous temp allocator on drop.
#[must_use = "the override ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopedTempAlloc {
    prev: Option<Allocator<'static>>,
}

impl Drop for ScopedTempAlloc {
    fn drop(&mut self) {
        CTX_TEMP_ALLOC.with(|ctx| ctx.set(self.prev));
    }
}

pub fn scope_alloc(alloc: Allocator<'static>) -> ScopedAlloc {
    ScopedAlloc {
        prev: CTX_ALLOC.with(|ctx| ctx.replace(alloc)),
    }
}

pub fn scope_temp_alloc(alloc: Allocator<'static>) -> ScopedTempAlloc {
    ScopedTempAlloc {
        prev: CTX_TEMP_ALLOC.with(|ctx| ctx.replace(Some(alloc))),
    }
}

/// [`Allocator::allocate`] on the context allocator.
#[track_caller]
pub fn allocate(size: usize, align: usize, flags: AllocFlags) -> Result<NonNull<u8>> {
    ctx_alloc().allocate(size, align, flags)
}

/// [`Allocator::reallocate`] on the context allocator.
///
/// # Safety
///
/// See [`super::MemAllocator::reallocate`].
#[track_caller]
pub unsafe fn reallocate(
    ptr: Option<NonNull<u8>>,
    old: usize,
    new: usize,
    align: usize,
    flags: AllocFlags,
) -> Result<Option<NonNull<u8>>> {
    unsafe { ctx_alloc().reallocate(ptr, old, new, align, flags) }
}

/// # Safety
///
/// See [`Allocator::free`].
#[track_caller]
pub unsafe fn free(ptr: NonNull<u8>, size: usize, align: usize) {
    unsafe { ctx_alloc().free(ptr, size, align) }
}

/// # Safety
///
/// See [`Allocator::free_all`].
#[track_caller]
pub unsafe fn free_all() {
    unsafe { ctx_alloc().free_all() }
}
