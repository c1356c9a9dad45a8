/// Closed interval `[min, max]`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Both ranges must be ordered (`min <= max`).
    pub fn overlaps(self, other: Range) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    pub fn min_max(a: f32, b: f32) -> Range {
        if a < b { Range::new(a, b) } else { Range::new(b, a) }
    }

    pub fn min_max4(a: f32, b: f32, c: f32, d: f32) -> Range {
        let mut r = Range::min_max(a, b);
        let (lo, hi) = if c < d { (c, d) } else { (d, c) };
        if lo < r.min {
            r.min = lo;
        }
        if hi > r.max {
            r.max = hi;
        }
        r
    }
}
