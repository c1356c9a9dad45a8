use super::vec2::Vec2;

/// Axis-aligned rectangle, `min` is the bottom-left corner.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width() / self.height()
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn tl(&self) -> Vec2 {
        Vec2::new(self.min.x, self.max.y)
    }

    pub fn tr(&self) -> Vec2 {
        self.max
    }

    pub fn bl(&self) -> Vec2 {
        self.min
    }

    pub fn br(&self) -> Vec2 {
        Vec2::new(self.max.x, self.min.y)
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// `radius2` is the squared circle radius.
    pub fn overlaps_circle(&self, center: Vec2, radius2: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        (center - closest).length2() <= radius2
    }
}
