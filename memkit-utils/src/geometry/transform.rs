use std::{f32::consts::TAU, ops::Mul};

use super::{rect::Rect, vec2::Vec2};

/// 3x3 affine matrix with an implicit `[0 0 1]` last row:
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2 {
    pub const fn identity() -> Self {
        Self::translate(0.0, 0.0)
    }

    pub const fn translate(x: f32, y: f32) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: x,
            f: y,
        }
    }

    /// Uniform scale.
    pub const fn scale(s: f32) -> Self {
        Self {
            a: s,
            b: 0.0,
            c: 0.0,
            d: s,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Counterclockwise rotation, the angle is given in full turns.
    pub fn rotate_ccw(turns: f32) -> Self {
        let (s, c) = (turns * TAU).sin_cos();
        Self {
            a: c,
            b: s,
            c: -s,
            d: c,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn rotate_cw(turns: f32) -> Self {
        Self::rotate_ccw(-turns)
    }

    /// Maps `src` onto `dst`. A flipped Y axis is expressed by a destination
    /// whose `max.y` is smaller than its `min.y`.
    pub fn map_rect_to_rect(src: &Rect, dst: &Rect) -> Self {
        let src_size = src.size();
        let dst_size = dst.size();

        let a = dst_size.x / src_size.x;
        let d = dst_size.y / src_size.y;

        Self {
            a,
            b: 0.0,
            c: 0.0,
            d,
            e: dst.min.x - src.min.x * a,
            f: dst.min.y - src.min.y * d,
        }
    }
}

impl Mul for Transform2 {
    type Output = Transform2;

    fn mul(self, n: Transform2) -> Transform2 {
        let m = self;
        Transform2 {
            a: m.a * n.a + m.c * n.b,
            b: m.b * n.a + m.d * n.b,
            c: m.a * n.c + m.c * n.d,
            d: m.b * n.c + m.d * n.d,
            e: m.a * n.e + m.c * n.f + m.e,
            f: m.b * n.e + m.d * n.f + m.f,
        }
    }
}

impl Mul<Vec2> for Transform2 {
    type Output = Vec2;

    fn mul(self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.a * v.x + self.c * v.y + self.e,
            self.b * v.x + self.d * v.y + self.f,
        )
    }
}
