use std::ops::{Add, Mul, Neg, Sub};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length2(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length2().sqrt()
    }

    pub fn min_component(self) -> f32 {
        self.x.min(self.y)
    }

    pub fn max_component(self) -> f32 {
        self.x.max(self.y)
    }

    /// Component-wise minimum.
    pub fn min(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Component-wise clamp, `lo` must not exceed `hi` in either axis.
    pub fn clamp(self, lo: Vec2, hi: Vec2) -> Vec2 {
        self.max(lo).min(hi)
    }

    /// A zero vector yields NaN components.
    pub fn normalized(self) -> Vec2 {
        self * (1.0 / self.length())
    }

    /// Rotated by 90 degrees clockwise.
    pub fn perpendicular_cw(self) -> Vec2 {
        Vec2::new(self.y, -self.x)
    }

    /// Rotated by 90 degrees counterclockwise.
    pub fn perpendicular_ccw(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let u = Vec2::new(1.0, 2.0);
        let v = Vec2::new(3.0, -1.0);

        assert_eq!(-u, Vec2::new(-1.0, -2.0));
        assert_eq!(u + v, Vec2::new(4.0, 1.0));
        assert_eq!(u - v, Vec2::new(-2.0, 3.0));
        assert_eq!(u * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(u.dot(v), 1.0);
    }

    #[test]
    fn test_length_and_normalize() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.length2(), 25.0);
        assert_eq!(v.length(), 5.0);

        let n = v.normalized();
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!((n.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_min_max_clamp() {
        let u = Vec2::new(1.0, 5.0);
        let v = Vec2::new(3.0, 2.0);

        assert_eq!(u.min_component(), 1.0);
        assert_eq!(u.max_component(), 5.0);
        assert_eq!(u.min(v), Vec2::new(1.0, 2.0));
        assert_eq!(u.max(v), Vec2::new(3.0, 5.0));
        assert_eq!(
            Vec2::new(-1.0, 9.0).clamp(Vec2::ZERO, Vec2::new(4.0, 4.0)),
            Vec2::new(0.0, 4.0)
        );
    }

    #[test]
    fn test_perpendicular() {
        let v = Vec2::new(1.0, 0.0);
        assert_eq!(v.perpendicular_cw(), Vec2::new(0.0, -1.0));
        assert_eq!(v.perpendicular_ccw(), Vec2::new(0.0, 1.0));
        assert_eq!(v.perpendicular_cw().dot(v), 0.0);
    }
}
