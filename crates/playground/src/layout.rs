//! Static per-frame pane layout.
//!
//! Rectangles depend only on the pane index and the policy, never on any
//! pane's render content, so hit-testing stays stable within a frame.

/// Axis-aligned pane bounds in logical (density-independent) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PaneRect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x <= x && x <= self.x + self.width && self.y <= y && y <= self.y + self.height
    }
}

/// Row-wrapping grid: fixed pane size, a fixed number of panes per row
/// before wrapping, and a uniform gap on all sides.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPolicy {
    pub pane_width: f64,
    pub pane_height: f64,
    pub panes_per_row: usize,
    pub gap: f64,
}

impl LayoutPolicy {
    pub fn pane_rect(&self, index: usize) -> PaneRect {
        let per_row = self.panes_per_row.max(1);
        let column = index % per_row;
        let row = index / per_row;
        PaneRect {
            x: self.gap + column as f64 * (self.pane_width + self.gap),
            y: self.gap + row as f64 * (self.pane_height + self.gap),
            width: self.pane_width,
            height: self.pane_height,
        }
    }

    /// This frame's rectangles for `pane_count` panes, in layout order.
    pub fn rects(&self, pane_count: usize) -> Vec<PaneRect> {
        (0..pane_count).map(|index| self.pane_rect(index)).collect()
    }

    /// Logical window size needed to show `pane_count` panes.
    pub fn bounds(&self, pane_count: usize) -> (f64, f64) {
        if pane_count == 0 {
            return (self.gap * 2.0, self.gap * 2.0);
        }
        let per_row = self.panes_per_row.max(1);
        let columns = pane_count.min(per_row);
        let rows = pane_count.div_ceil(per_row);
        (
            self.gap + columns as f64 * (self.pane_width + self.gap),
            self.gap + rows as f64 * (self.pane_height + self.gap),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> LayoutPolicy {
        LayoutPolicy {
            pane_width: 100.0,
            pane_height: 50.0,
            panes_per_row: 3,
            gap: 10.0,
        }
    }

    #[test]
    fn rows_wrap_at_the_configured_threshold() {
        let layout = policy();
        let first = layout.pane_rect(0);
        let last_in_row = layout.pane_rect(2);
        let wrapped = layout.pane_rect(3);
        assert_eq!((first.x, first.y), (10.0, 10.0));
        assert_eq!((last_in_row.x, last_in_row.y), (230.0, 10.0));
        assert_eq!((wrapped.x, wrapped.y), (10.0, 70.0));
    }

    #[test]
    fn rects_never_overlap() {
        let layout = policy();
        let rects = layout.rects(7);
        for (i, a) in rects.iter().enumerate() {
            for b in rects.iter().skip(i + 1) {
                let disjoint = a.x + a.width < b.x
                    || b.x + b.width < a.x
                    || a.y + a.height < b.y
                    || b.y + b.height < a.y;
                assert!(disjoint, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn bounds_cover_every_pane() {
        let layout = policy();
        let (width, height) = layout.bounds(5);
        for rect in layout.rects(5) {
            assert!(rect.x + rect.width + layout.gap <= width + 1e-9);
            assert!(rect.y + rect.height + layout.gap <= height + 1e-9);
        }
    }

    #[test]
    fn contains_is_inclusive_of_edges() {
        let rect = PaneRect {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 50.0,
        };
        assert!(rect.contains(10.0, 10.0));
        assert!(rect.contains(110.0, 60.0));
        assert!(!rect.contains(110.1, 60.0));
    }
}
