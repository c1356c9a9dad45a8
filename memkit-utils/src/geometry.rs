//! Small 2D helpers: vectors, 1D ranges, axis-aligned rectangles and affine
//! transforms, all in `f32`.

mod range;
mod rect;
mod transform;
mod vec2;

pub mod prelude {
    pub use super::range::Range;
    pub use super::rect::Rect;
    pub use super::transform::Transform2;
    pub use super::vec2::Vec2;
}
