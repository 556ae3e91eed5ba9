use serde::{Deserialize, Serialize};

/// A pixel position on the province bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

/// An axis-aligned rectangle on the province bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Zone {
    /// Build a zone from its left/top corner and size.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    fn right(&self) -> i32 {
        self.x + self.w
    }

    fn bottom(&self) -> i32 {
        self.y + self.h
    }
}

/// Whether two points are the same position.
pub fn point_equal(a: Point, b: Point) -> bool {
    a.x == b.x && a.y == b.y
}

/// Smallest zone covering both `a` and `b` on a map that wraps horizontally.
///
/// If one zone lies entirely in the left quarter of the map and the other
/// starts in the right quarter, the right-hand zone is moved one map width to
/// the left first, so shapes crossing the seam get a tight box with a
/// negative `x` instead of one spanning the whole map.
pub fn merge_bounding_box(a: Zone, b: Zone, width: i32) -> Zone {
    let quarter = f64::from(width) * 0.25;
    let three_quarters = f64::from(width) * 0.75;

    let mut a = a;
    let mut b = b;
    if f64::from(a.right()) < quarter && f64::from(b.x) > three_quarters {
        b.x -= width;
    }
    if f64::from(b.right()) < quarter && f64::from(a.x) > three_quarters {
        a.x -= width;
    }

    let left = a.x.min(b.x);
    let top = a.y.min(b.y);
    let right = a.right().max(b.right());
    let bottom = a.bottom().max(b.bottom());
    Zone::new(left, top, right - left, bottom - top)
}
