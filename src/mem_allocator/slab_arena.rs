use std::{
    cell::{Cell, RefCell},
    ptr::NonNull,
};

use super::{
    AllocFlags, Allocator, MemAllocator, arena::Arena, check_align, context::ctx_alloc,
    copy_and_zero, out_of_memory,
};
use crate::{
    array::{Array, next_capacity},
    error::Result,
    options::DEFAULT_SLAB_SIZE,
    slice::END,
};

/// Minimum alignment of every slab.
pub const SLAB_ALIGN: usize = 64;

#[derive(Debug, Clone, Copy)]
struct Slab {
    ptr: NonNull<u8>,
    len: usize,
    align: usize,
}

impl Slab {
    #[track_caller]
    fn allocate(
        alloc: Allocator<'_>,
        len: usize,
        align: usize,
        flags: AllocFlags,
    ) -> Result<Self> {
        let ptr = alloc.allocate(len, align, flags | AllocFlags::NON_ZERO)?;
        Ok(Self { ptr, len, align })
    }
}

/// Growable bump allocator made of slabs.
///
/// Allocations bump the last slab. When it is exhausted a new slab of
/// `max(size, slab_size)` bytes is appended and the allocation starts at its
/// beginning. Slab 0 always exists and survives `free_all`.
pub struct SlabArena<'a> {
    slabs: RefCell<Array<'a, Slab>>,
    /// Offset into the last slab.
    head: Cell<usize>,
    slab_size: usize,
}

impl SlabArena<'static> {
    /// Slab arena with [`DEFAULT_SLAB_SIZE`] slabs taken from the context
    /// allocator.
    #[track_caller]
    pub fn new() -> Self {
        Self::new_in(ctx_alloc())
    }
}

impl Default for SlabArena<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SlabArena<'a> {
    #[track_caller]
    pub fn new_in(alloc: Allocator<'a>) -> Self {
        Self::with_slab_size_in(DEFAULT_SLAB_SIZE, alloc)
    }

    #[track_caller]
    pub fn with_slab_size_in(slab_size: usize, alloc: Allocator<'a>) -> Self {
        match Self::create(slab_size, alloc, AllocFlags::empty()) {
            Ok(arena) => arena,
            Err(e) => fail!("{e}"),
        }
    }

    #[track_caller]
    pub(crate) fn create(
        slab_size: usize,
        alloc: Allocator<'a>,
        flags: AllocFlags,
    ) -> Result<Self> {
        fail_if!(slab_size == 0, "Slab size must be positive.");

        let first = Slab::allocate(alloc, slab_size, SLAB_ALIGN, flags)?;
        let mut slabs = Array::new_in(alloc);
        slabs.push(first);

        Ok(Self {
            slabs: RefCell::new(slabs),
            head: Cell::new(0),
            slab_size,
        })
    }

    pub fn allocator(&self) -> Allocator<'_> {
        Allocator::from_slab_arena(self)
    }

    pub fn slab_count(&self) -> usize {
        self.slabs.borrow().len()
    }

    pub fn slab_size(&self) -> usize {
        self.slab_size
    }

    pub fn head(&self) -> usize {
        self.head.get()
    }

    /// Bytes held in slabs.
    pub fn mem_usage(&self) -> usize {
        self.slabs.borrow().iter().map(|slab| slab.len).sum()
    }

    /// Safe counterpart of `free_all`: the borrow proves no block is live.
    pub fn reset(&mut self) {
        self.release();
    }

    fn release(&self) {
        let mut slabs = self.slabs.borrow_mut();
        let alloc = slabs.allocator();
        for slab in slabs.iter().skip(1) {
            unsafe { alloc.free(slab.ptr, slab.len, slab.align) };
        }

        let released = slabs.len() - 1;
        slabs.truncate(1);
        self.head.set(0);

        tracing::debug!(released, "slab arena reset");
    }
}

impl MemAllocator for SlabArena<'_> {
    #[track_caller]
    unsafe fn reallocate(
        &self,
        ptr: Option<NonNull<u8>>,
        old: usize,
        new: usize,
        align: usize,
        flags: AllocFlags,
    ) -> Result<Option<NonNull<u8>>> {
        check_align(align);

        if flags.contains(AllocFlags::FREE_ALL) {
            self.release();
            return Ok(None);
        }
        if new == 0 {
            return Ok(None);
        }

        let mut slabs = self.slabs.borrow_mut();

        let last = slabs[END - 1];
        let active = unsafe { Arena::resume(last.ptr, last.len, self.head.get()) };
        if let Ok(block) =
            unsafe { active.reallocate(ptr, old, new, align, flags | AllocFlags::NO_PANIC) }
        {
            self.head.set(active.head());
            return Ok(block);
        }

        // Make room in the slab list first so a new slab is never lost.
        if slabs.len() == slabs.capacity() {
            let cap = next_capacity(slabs.capacity(), slabs.len() + 1);
            if slabs.try_reserve(cap).is_err() {
                return out_of_memory(new, align, flags);
            }
        }

        let size = new.max(self.slab_size);
        let slab_align = align.max(SLAB_ALIGN);
        let Ok(slab) = Slab::allocate(slabs.allocator(), size, slab_align, AllocFlags::NO_PANIC)
        else {
            return out_of_memory(new, align, flags);
        };
        slabs.push(slab);
        self.head.set(new);

        tracing::debug!(slabs = slabs.len(), size, "slab arena grew");

        unsafe { copy_and_zero(slab.ptr, new, ptr, old, flags) };
        Ok(Some(slab.ptr))
    }
}

impl Drop for SlabArena<'_> {
    fn drop(&mut self) {
        let slabs = self.slabs.get_mut();
        let alloc = slabs.allocator();
        for slab in slabs.iter() {
            unsafe { alloc.free(slab.ptr, slab.len, slab.align) };
        }
    }
}

impl std::fmt::Debug for SlabArena<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlabArena")
            .field("slab_count", &self.slab_count())
            .field("slab_size", &self.slab_size)
            .field("head", &self.head.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, test_utils::catch_exception};
    use memkit_utils::bits::{KIB, MIB};

    #[test]
    fn test_default_slab_size() {
        let arena = SlabArena::new();
        assert_eq!(arena.slab_size(), 8 * MIB);
        assert_eq!(arena.slab_count(), 1);
        assert_eq!(arena.mem_usage(), 8 * MIB);
    }

    #[test]
    fn test_grows_by_one_slab() {
        let arena = SlabArena::new_in(Allocator::heap());
        let alloc = arena.allocator();

        alloc.allocate(6 * MIB, 1, AllocFlags::empty()).unwrap();
        assert_eq!(arena.slab_count(), 1);
        assert_eq!(arena.head(), 6 * MIB);

        let ptr = alloc.allocate(6 * MIB, 64, AllocFlags::empty()).unwrap();
        assert_eq!(arena.slab_count(), 2);
        assert_eq!(arena.head(), 6 * MIB);
        assert_eq!(ptr.addr().get() % 64, 0);
    }

    #[test]
    fn test_oversized_allocation_gets_its_own_slab() {
        let arena = SlabArena::with_slab_size_in(4 * KIB, Allocator::heap());
        let alloc = arena.allocator();

        alloc.allocate(10 * KIB, 128, AllocFlags::empty()).unwrap();
        assert_eq!(arena.slab_count(), 2);
        assert_eq!(arena.mem_usage(), 14 * KIB);
        assert_eq!(arena.head(), 10 * KIB);
    }

    #[test]
    fn test_free_all_keeps_first_slab() {
        let arena = SlabArena::new_in(Allocator::heap());
        let alloc = arena.allocator();

        for _ in 0..3 {
            alloc.allocate(6 * MIB, 16, AllocFlags::empty()).unwrap();
        }
        assert_eq!(arena.slab_count(), 3);

        unsafe { alloc.free_all() };
        assert_eq!(arena.slab_count(), 1);
        assert_eq!(arena.head(), 0);

        alloc.allocate(64, 16, AllocFlags::empty()).unwrap();
        assert_eq!(arena.slab_count(), 1);
        assert_eq!(arena.head(), 64);
    }

    #[test]
    fn test_reset() {
        let mut arena = SlabArena::with_slab_size_in(KIB, Allocator::heap());
        arena.allocator().allocate(2 * KIB, 8, AllocFlags::empty()).unwrap();
        assert_eq!(arena.slab_count(), 2);

        arena.reset();
        assert_eq!(arena.slab_count(), 1);
        assert_eq!(arena.mem_usage(), KIB);
    }

    #[test]
    fn test_slabs_from_a_parent_arena() {
        let mut buf = vec![0u8; 16 * KIB];
        let parent = Arena::new(&mut buf);
        let arena = SlabArena::with_slab_size_in(4 * KIB, parent.allocator());

        let alloc = arena.allocator();
        alloc.allocate(3 * KIB, 8, AllocFlags::empty()).unwrap();
        alloc.allocate(3 * KIB, 8, AllocFlags::empty()).unwrap();
        assert_eq!(arena.slab_count(), 2);

        let err = alloc.allocate(64 * KIB, 8, AllocFlags::NO_PANIC).unwrap_err();
        assert!(matches!(err, Error::OutOfMemory { size, align: 8 } if size == 64 * KIB));
        assert_eq!(arena.slab_count(), 2);
    }

    #[test]
    fn test_slab_list_growth_respects_no_panic() {
        // Parent sizes around the point where the ninth slab fits but the
        // slab list cannot grow from 8 to 12 entries.
        for parent_size in (600..1600).step_by(8) {
            let mut buf = vec![0u8; parent_size];
            let parent = Arena::new(&mut buf);
            let arena = SlabArena::with_slab_size_in(64, parent.allocator());
            let alloc = arena.allocator();

            loop {
                let slabs = arena.slab_count();
                match alloc.allocate(64, 1, AllocFlags::NO_PANIC) {
                    Ok(_) => assert!(arena.slab_count() <= slabs + 1),
                    Err(err) => {
                        assert!(matches!(err, Error::OutOfMemory { size: 64, align: 1 }));
                        assert_eq!(arena.slab_count(), slabs, "parent size {parent_size}");
                        break;
                    }
                }
            }
        }
    }

    #[test]
    fn test_growth_failure_is_fatal_without_no_panic() {
        let mut buf = vec![0u8; 4 * KIB];
        let parent = Arena::new(&mut buf);
        let arena = SlabArena::with_slab_size_in(KIB, parent.allocator());
        let alloc = arena.allocator();

        let e = catch_exception(|| alloc.allocate(8 * KIB, 32, AllocFlags::empty()));
        assert_eq!(
            e.msg,
            format!("Failed to allocate {} bytes aligned to a 32-byte boundary.", 8 * KIB)
        );
        assert_eq!(arena.slab_count(), 1);
    }

    #[test]
    fn test_first_slab_is_zeroed_after_free_all() {
        let arena = SlabArena::with_slab_size_in(KIB, Allocator::heap());
        let alloc = arena.allocator();

        let first = alloc.allocate(256, 8, AllocFlags::empty()).unwrap();
        unsafe { first.as_ptr().write_bytes(0xFF, 256) };

        unsafe { alloc.free_all() };
        let again = alloc.allocate(256, 8, AllocFlags::empty()).unwrap();
        assert_eq!(again, first);

        let bytes = unsafe { std::slice::from_raw_parts(again.as_ptr(), 256) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_slab_size_fails() {
        let e = catch_exception(|| SlabArena::with_slab_size_in(0, Allocator::heap()));
        assert_eq!(e.msg, "Slab size must be positive.");
    }
}
