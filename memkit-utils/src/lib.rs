pub mod bits;
pub mod geometry;

pub mod prelude {
    pub use crate::bits::{GIB, KIB, MIB, align_up, is_power_of_two};
    pub use crate::geometry::prelude::*;
}
