// ── Mouse displacement tracking ───────────────────────────────────────────────
//
// Pure Rust.  Fed with cursor positions from WM_MOUSEMOVE / WM_LBUTTONDOWN;
// reports the displacement between consecutive positions.

use crate::geometry::Point;

/// Reports the incremental displacement between consecutive cursor updates.
#[derive(Debug, Default)]
pub(crate) struct MouseTracker {
    last: Option<Point>,
    dx: i32,
    dy: i32,
}

impl MouseTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a new cursor position.
    ///
    /// The first update after construction reports no displacement.
    pub(crate) fn update(&mut self, pos: Point) {
        let prev = self.last.unwrap_or(pos);
        self.dx = pos.x - prev.x;
        self.dy = pos.y - prev.y;
        self.last = Some(pos);
    }

    /// Restart measuring from `pos` without reporting a displacement.
    pub(crate) fn anchor(&mut self, pos: Point) {
        self.last = Some(pos);
        self.dx = 0;
        self.dy = 0;
    }

    pub(crate) fn dx(&self) -> i32 {
        self.dx
    }

    pub(crate) fn dy(&self) -> i32 {
        self.dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_has_no_displacement() {
        let mut m = MouseTracker::new();
        m.update(Point::new(300, 400));
        assert_eq!((m.dx(), m.dy()), (0, 0));
    }

    #[test]
    fn reports_delta_since_previous_update() {
        let mut m = MouseTracker::new();
        m.update(Point::new(100, 100));
        m.update(Point::new(150, 130));
        assert_eq!((m.dx(), m.dy()), (50, 30));
        m.update(Point::new(140, 135));
        assert_eq!((m.dx(), m.dy()), (-10, 5));
    }

    #[test]
    fn anchor_resets_reference_point() {
        let mut m = MouseTracker::new();
        m.update(Point::new(0, 0));
        m.update(Point::new(10, 10));
        m.anchor(Point::new(500, 500));
        assert_eq!((m.dx(), m.dy()), (0, 0));
        m.update(Point::new(510, 490));
        assert_eq!((m.dx(), m.dy()), (10, -10));
    }
}
