//! Pointer state and pane hit-testing.
//!
//! A single pointer is tracked across every pane. Raw press/release/move
//! events mutate the router immediately; the once-per-frame decay of
//! `FirstDown` into `Down` happens at the frame boundary, after the frame
//! has read the phase.

use crate::layout::PaneRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Up,
    /// Holds for exactly one frame after a press, then decays to `Down`.
    FirstDown,
    Down,
}

/// Pointer values resolved for one frame and shared by every pane's draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Pane-local, density-scaled, bottom-left-origin coordinates.
    pub local: (f32, f32),
    pub down: bool,
    pub first_down: bool,
}

impl PointerSample {
    /// The `iMouse`-style vec4 handed to shaders.
    pub fn as_uniform(&self) -> [f32; 4] {
        [
            self.local.0,
            self.local.1,
            if self.down { 1.0 } else { 0.0 },
            if self.first_down { 1.0 } else { 0.0 },
        ]
    }
}

/// Tracks the pointer's phase, global position, and the sticky last hit.
#[derive(Debug)]
pub struct InputRouter {
    phase: PointerPhase,
    global: (f64, f64),
    last_local_hit: (f32, f32),
}

impl InputRouter {
    pub fn new() -> Self {
        Self {
            phase: PointerPhase::Up,
            // Nothing sensible to report until the first move event arrives.
            global: (f64::NEG_INFINITY, f64::NEG_INFINITY),
            last_local_hit: (0.0, 0.0),
        }
    }

    pub fn phase(&self) -> PointerPhase {
        self.phase
    }

    /// Raw press. Coordinates are refreshed too: platforms can deliver a
    /// press whose preceding move event carried a stale position.
    pub fn pointer_pressed(&mut self, x: f64, y: f64) {
        self.phase = PointerPhase::FirstDown;
        self.global = (x, y);
    }

    pub fn pointer_released(&mut self) {
        self.phase = PointerPhase::Up;
    }

    /// Raw move. The position may lie outside every pane, or outside the
    /// window entirely while a drag is in progress.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.global = (x, y);
    }

    /// Resolves this frame's pointer sample against the frame's pane
    /// rectangles. When the pointer is up or over no pane, the sticky last
    /// hit is reported instead, so shaders never snap back to the origin
    /// when a drag leaves all panes.
    pub fn resolve(&self, rects: &[PaneRect], scale_factor: f64) -> PointerSample {
        let down = self.phase != PointerPhase::Up;
        let local = match (down, hit_test(rects, self.global.0, self.global.1)) {
            (true, Some(index)) => {
                let rect = rects[index];
                let local_x = (self.global.0 - rect.x) * scale_factor;
                let local_y = (rect.height - (self.global.1 - rect.y)) * scale_factor;
                (local_x as f32, local_y as f32)
            }
            _ => self.last_local_hit,
        };
        PointerSample {
            local,
            down,
            first_down: self.phase == PointerPhase::FirstDown,
        }
    }

    /// Frame-boundary bookkeeping: `FirstDown` decays to `Down` once the
    /// frame has read it, and the sticky coordinate carries the sample the
    /// frame resolved.
    pub fn end_frame(&mut self, sample: PointerSample) {
        if self.phase == PointerPhase::FirstDown {
            self.phase = PointerPhase::Down;
        }
        self.last_local_hit = sample.local;
    }
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the first pane, in layout order, whose rectangle contains the
/// point. Bounds are static for the frame, so at most one pane wins.
pub fn hit_test(rects: &[PaneRect], x: f64, y: f64) -> Option<usize> {
    rects.iter().position(|rect| rect.contains(x, y))
}
