use std::{alloc::Layout, ptr::NonNull};

use memkit_utils::bits::align_up;

use super::{AllocFlags, MemAllocator, check_align, copy_and_zero, out_of_memory};
use crate::error::Result;

/// Smallest alignment the heap allocator hands out.
pub const MIN_ALIGN: usize = 2 * size_of::<usize>();

/// Stateless allocator over the global heap.
#[derive(Debug, Default, Clone, Copy)]
pub struct Heap;

/// Sizes are rounded up to the effective alignment, so the layout of a block
/// is recomputed from the same `(size, align)` pair when it is freed.
fn layout(size: usize, align: usize) -> Option<Layout> {
    let align = align.max(MIN_ALIGN);
    Layout::from_size_align(align_up(size, align)?, align).ok()
}

impl MemAllocator for Heap {
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
        fail_if!(
            flags.contains(AllocFlags::FREE_ALL),
            "The heap allocator does not support free_all."
        );

        if new == 0 {
            unsafe { dealloc(ptr, old, align) };
            return Ok(None);
        }

        let Some(layout) = layout(new, align) else {
            return out_of_memory(new, align, flags);
        };
        let Some(block) = NonNull::new(unsafe { std::alloc::alloc(layout) }) else {
            return out_of_memory(new, align, flags);
        };

        unsafe {
            copy_and_zero(block, new, ptr, old, flags);
            dealloc(ptr, old, align);
        }
        Ok(Some(block))
    }
}

#[track_caller]
unsafe fn dealloc(ptr: Option<NonNull<u8>>, size: usize, align: usize) {
    let Some(ptr) = ptr else {
        return;
    };
    if size == 0 {
        return;
    }
    match layout(size, align) {
        Some(layout) => unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) },
        None => fail!(
            "Freed a heap block with an impossible layout ({size} bytes, {align} alignment)."
        ),
    }
}
