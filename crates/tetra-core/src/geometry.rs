//! Plain `[x, y]` vector helpers and the axis-aligned box used for collisions.

pub type Vec2 = [f64; 2];

pub fn add(a: Vec2, b: Vec2) -> Vec2 {
    [a[0] + b[0], a[1] + b[1]]
}

pub fn sub(a: Vec2, b: Vec2) -> Vec2 {
    [a[0] - b[0], a[1] - b[1]]
}

pub fn scale(v: Vec2, k: f64) -> Vec2 {
    [v[0] * k, v[1] * k]
}

pub fn neg(v: Vec2) -> Vec2 {
    [-v[0], -v[1]]
}

pub fn length(v: Vec2) -> f64 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}

pub fn distance(a: Vec2, b: Vec2) -> f64 {
    length(sub(a, b))
}

/// Unit vector along `v`, or `fallback` when `v` has zero length.
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let len = length(v);
    if len > 0.0 {
        [v[0] / len, v[1] / len]
    } else {
        fallback
    }
}

/// Axis-aligned box anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    pub fn left(&self) -> f64 {
        self.origin[0]
    }

    pub fn top(&self) -> f64 {
        self.origin[1]
    }

    pub fn right(&self) -> f64 {
        self.origin[0] + self.size[0]
    }

    pub fn bottom(&self) -> f64 {
        self.origin[1] + self.size[1]
    }

    pub fn center(&self) -> Vec2 {
        [
            self.origin[0] + self.size[0] * 0.5,
            self.origin[1] + self.size[1] * 0.5,
        ]
    }

    /// Strict overlap: boxes that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}
