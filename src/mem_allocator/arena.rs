use std::{cell::Cell, marker::PhantomData, ptr::NonNull};

use memkit_utils::bits::align_up;

use super::{AllocFlags, Allocator, MemAllocator, check_align, copy_and_zero, out_of_memory};
use crate::error::Result;

/// Bump allocator over a caller-owned buffer.
///
/// Individual frees are accepted and ignored; space only comes back through
/// [`Arena::reset`] or [`AllocFlags::FREE_ALL`]. Offsets are aligned against
/// absolute addresses, so the buffer itself needs no particular alignment.
pub struct Arena<'buf> {
    base: NonNull<u8>,
    len: usize,
    head: Cell<usize>,
    _marker: PhantomData<&'buf mut [u8]>,
}

unsafe impl Send for Arena<'_> {}

impl<'buf> Arena<'buf> {
    pub fn new(buf: &'buf mut [u8]) -> Self {
        let len = buf.len();
        Self {
            base: NonNull::from(buf).cast(),
            len,
            head: Cell::new(0),
            _marker: PhantomData,
        }
    }

    /// # Safety
    ///
    /// `base` must be valid for reads and writes of `len` bytes for `'buf`,
    /// and nothing else may access that memory meanwhile.
    pub unsafe fn from_raw_parts(base: NonNull<u8>, len: usize) -> Self {
        Self {
            base,
            len,
            head: Cell::new(0),
            _marker: PhantomData,
        }
    }

    /// Resumes bumping a buffer at `head`.
    ///
    /// # Safety
    ///
    /// Same as [`Arena::from_raw_parts`], with `head <= len`.
    pub(super) unsafe fn resume(base: NonNull<u8>, len: usize, head: usize) -> Self {
        let arena = unsafe { Self::from_raw_parts(base, len) };
        arena.head.set(head);
        arena
    }

    pub fn allocator(&self) -> Allocator<'_> {
        Allocator::from_arena(self)
    }

    /// Offset of the first free byte.
    pub fn head(&self) -> usize {
        self.head.get()
    }

    pub fn capacity(&self) -> usize {
        self.len
    }

    pub fn remaining(&self) -> usize {
        self.len - self.head.get()
    }

    /// Safe counterpart of `free_all`: the borrow proves no block is live.
    pub fn reset(&mut self) {
        self.head.set(0);
    }

    fn bump(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let base = self.base.addr().get();
        let start = align_up(base.checked_add(self.head.get())?, align)? - base;
        let end = start.checked_add(size)?;
        if end > self.len {
            return None;
        }

        self.head.set(end);
        Some(unsafe { self.base.add(start) })
    }
}

impl MemAllocator for Arena<'_> {
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
            tracing::trace!(head = self.head.get(), "arena reset");
            self.head.set(0);
            return Ok(None);
        }
        if new == 0 {
            return Ok(None);
        }

        match self.bump(new, align) {
            Some(block) => {
                unsafe { copy_and_zero(block, new, ptr, old, flags) };
                Ok(Some(block))
            }
            None => out_of_memory(new, align, flags),
        }
    }
}

impl std::fmt::Debug for Arena<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("len", &self.len)
            .field("head", &self.head.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::{error::Error, test_utils::catch_exception};

    #[test]
    fn test_out_of_memory() {
        let mut buf = [0u8; 128];
        let arena = Arena::new(&mut buf);
        let alloc = arena.allocator();

        let err = alloc.allocate(129, 1, AllocFlags::NO_PANIC).unwrap_err();
        assert!(matches!(err, Error::OutOfMemory { size: 129, align: 1 }));
        assert_eq!(arena.head(), 0);

        let e = catch_exception(|| alloc.allocate(129, 1, AllocFlags::empty()));
        assert_eq!(e.msg, "Failed to allocate 129 bytes aligned to a 1-byte boundary.");

        alloc.allocate(128, 1, AllocFlags::empty()).unwrap();
        assert_eq!(arena.remaining(), 0);
    }

    #[test]
    fn test_free_is_a_no_op() {
        let mut buf = [0u8; 128];
        let arena = Arena::new(&mut buf);
        let alloc = arena.allocator();

        let a = alloc.allocate(10, 1, AllocFlags::empty()).unwrap();
        assert_eq!(arena.head(), 10);
        unsafe { alloc.free(a, 10, 1) };
        assert_eq!(arena.head(), 10);

        alloc.allocate(20, 1, AllocFlags::empty()).unwrap();
        assert_eq!(arena.head(), 30);
    }

    #[test]
    fn test_free_all_resets_head() {
        let mut buf = [0u8; 128];
        let arena = Arena::new(&mut buf);
        let alloc = arena.allocator();

        alloc.allocate(100, 1, AllocFlags::empty()).unwrap();
        assert!(alloc.allocate(100, 1, AllocFlags::NO_PANIC).is_err());

        unsafe { alloc.free_all() };
        assert_eq!(arena.head(), 0);
        alloc.allocate(100, 1, AllocFlags::empty()).unwrap();
    }

    #[test]
    fn test_reset() {
        let mut buf = [0u8; 64];
        let mut arena = Arena::new(&mut buf);
        arena.allocator().allocate(64, 1, AllocFlags::empty()).unwrap();
        assert_eq!(arena.remaining(), 0);

        arena.reset();
        assert_eq!(arena.head(), 0);
        assert_eq!(arena.capacity(), 64);
    }

    #[test]
    fn test_bump_monotonicity() {
        let mut rng = rand::rng();
        let mut buf = vec![0u8; 4096];
        let arena = Arena::new(&mut buf);
        let alloc = arena.allocator();
        let base = arena.base.addr().get();

        for _ in 0..4 {
            let mut expected_head = 0;
            loop {
                let size = rng.random_range(1..200);
                let align = 1 << rng.random_range(0..7);

                let start = (base + expected_head).next_multiple_of(align) - base;
                let fits = start + size <= arena.capacity();

                match alloc.allocate(size, align, AllocFlags::NO_PANIC) {
                    Ok(ptr) => {
                        assert!(fits);
                        assert_eq!(ptr.addr().get() - base, start);
                        expected_head = start + size;
                        assert_eq!(arena.head(), expected_head);
                    }
                    Err(_) => {
                        assert!(!fits);
                        assert_eq!(arena.head(), expected_head);
                        break;
                    }
                }
            }

            unsafe { alloc.free_all() };
            assert_eq!(arena.remaining(), arena.capacity());
        }
    }

    #[test]
    fn test_reallocate_moves_forward() {
        let mut buf = [0u8; 64];
        let arena = Arena::new(&mut buf);
        let alloc = arena.allocator();

        let a = alloc.allocate(4, 4, AllocFlags::empty()).unwrap();
        unsafe {
            a.as_ptr().copy_from([1, 2, 3, 4].as_ptr(), 4);
            let b = alloc
                .reallocate(Some(a), 4, 8, 4, AllocFlags::empty())
                .unwrap()
                .unwrap();
            assert!(b > a);
            assert_eq!(std::slice::from_raw_parts(b.as_ptr(), 8), &[1, 2, 3, 4, 0, 0, 0, 0]);
        }
    }
}
