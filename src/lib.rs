#[macro_use]
pub mod panic;

pub mod array;
pub mod error;
pub mod fs;
pub mod mem_allocator;
pub mod options;
pub mod ring;
pub mod slice;

#[cfg(test)]
mod test_utils;

pub use memkit_utils as utils;

pub mod prelude {
    pub use crate::array::{Array, Zeroable};
    pub use crate::error::{Error, Result};
    pub use crate::mem_allocator::prelude::*;
    pub use crate::options::SlabArenaOptions;
    pub use crate::panic::Exception;
    pub use crate::ring::Ring;
    pub use crate::slice::{BackIndex, END, Index, Slice, SliceMut};
}
