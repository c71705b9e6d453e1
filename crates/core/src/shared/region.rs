/// An axis-aligned detection rectangle in image pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Grouping predicate: every edge of `self` lies within
    /// `eps * mean(min width, min height)` of the matching edge of `other`.
    pub fn is_similar(&self, other: &Region, eps: f64) -> bool {
        let delta = eps
            * (self.width.min(other.width) as f64 + self.height.min(other.height) as f64)
            * 0.5;
        (self.x - other.x).abs() as f64 <= delta
            && (self.y - other.y).abs() as f64 <= delta
            && (self.right() - other.right()).abs() as f64 <= delta
            && (self.bottom() - other.bottom()).abs() as f64 <= delta
    }

    /// True when `self` fits inside `outer` grown by `eps` of its size on each side.
    pub fn is_inside(&self, outer: &Region, eps: f64) -> bool {
        let dx = round_half_even(outer.width as f64 * eps);
        let dy = round_half_even(outer.height as f64 * eps);
        self.x >= outer.x - dx
            && self.y >= outer.y - dy
            && self.right() <= outer.right() + dx
            && self.bottom() <= outer.bottom() + dy
    }
}

/// Rounds to the nearest integer, ties to even (the rounding mode of the
/// default floating-point environment).
pub(crate) fn round_half_even(value: f64) -> i32 {
    let rounded = value.round();
    let result = if (value - value.trunc()).abs() == 0.5 && rounded % 2.0 != 0.0 {
        rounded - value.signum()
    } else {
        rounded
    };
    result as i32
}
