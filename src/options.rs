use memkit_utils::bits::MIB;

use crate::{
    error::Result,
    mem_allocator::{AllocFlags, Allocator, SLAB_ALIGN, prelude::SlabArena},
};

/// Size of each slab unless configured otherwise.
pub const DEFAULT_SLAB_SIZE: usize = 8 * MIB;

/// Size of the per-thread temporary arena.
pub const DEFAULT_TEMP_ARENA_SIZE: usize = 4 * MIB;

#[derive(Debug, Clone)]
pub struct SlabArenaOptions<'a> {
    slab_size: usize,

    allocator: Option<Allocator<'a>>,
}

impl Default for SlabArenaOptions<'_> {
    fn default() -> Self {
        Self {
            slab_size: DEFAULT_SLAB_SIZE,
            allocator: None,
        }
    }
}

impl<'a> SlabArenaOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of slab 0 and minimum size of every later slab.
    pub fn slab_size(&mut self, size: usize) -> &mut Self {
        self.slab_size = size;
        self
    }

    /// Backing allocator for the slabs and the slab list, the context
    /// allocator by default.
    pub fn allocator(&mut self, alloc: Allocator<'a>) -> &mut Self {
        self.allocator = Some(alloc);
        self
    }

    /// Creates the arena, reporting allocation failure of the first slab.
    #[track_caller]
    pub fn build(&self) -> Result<SlabArena<'a>> {
        warn_if!(self.slab_size < SLAB_ALIGN);

        let alloc = self.allocator.unwrap_or_default();
        SlabArena::create(self.slab_size, alloc, AllocFlags::NO_PANIC)
    }
}
