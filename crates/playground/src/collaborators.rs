//! Capability contracts for the three external collaborators: the graphics
//! backend, the text editor, and the persistent store.
//!
//! The playground only ever talks to them through these traits, which keeps
//! the frame loop testable without a GPU, a widget toolkit, or a filesystem.

use thiserror::Error;

/// Raised by a [`GraphicsBackend`] when wrapped source fails to compile or
/// link. `raw_log` is whatever the backend's compiler produced; the
/// [`diagnostics`](crate::diagnostics) module mines line-grouped records out
/// of it and degrades to zero diagnostics when the format is unrecognised.
#[derive(Debug, Clone, Error)]
#[error("shader compilation failed:\n{raw_log}")]
pub struct CompileError {
    pub raw_log: String,
}

/// Per-draw inputs handed to the backend once per pane per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    /// Viewport origin inside the shared surface, in physical pixels. All
    /// panes render into one OS surface, so each draw states where its
    /// viewport sits.
    pub origin: (u32, u32),
    /// Pane size in physical pixels; doubles as the resolution uniform.
    pub resolution: (u32, u32),
    /// Seconds since startup, or the synthetic clock in manual-step mode.
    pub time_secs: f32,
    /// `(x, y, is_down, is_first_down)`: pane-local, density-scaled,
    /// bottom-left-origin pointer state shared by every pane this frame.
    pub pointer: [f32; 4],
}

/// Owns a drawable surface and compiles/executes shading programs on it.
pub trait GraphicsBackend {
    /// Opaque handle to a successfully linked program.
    type Program;

    /// Compiles already-wrapped source. Must either return a fully usable
    /// program or fail without disturbing any previously returned one.
    fn compile(&mut self, wrapped_source: &str) -> Result<Self::Program, CompileError>;

    /// Draws one frame with `program`. Failures degrade to a skipped draw;
    /// they never escalate out of the backend.
    fn draw(&mut self, program: &Self::Program, call: DrawCall);

    /// Releases a program that stopped being the pane's active one.
    fn release(&mut self, program: Self::Program);
}

/// Holds one pane's editable source text and accepts diagnostic annotations.
pub trait EditorWidget {
    fn text(&self) -> String;

    /// Edge-triggered change notification, polled once per frame: returns
    /// true when the text changed since the previous call. Multiple edits
    /// between two frames collapse into a single `true`.
    fn take_changed(&mut self) -> bool;

    /// Attaches a marker with its messages to the gutter of `line` (1-based).
    fn set_gutter_annotation(&mut self, line: usize, messages: &[String]);

    /// Removes every gutter annotation currently attached.
    fn clear_gutter_annotations(&mut self);
}

/// Durable key → string storage surviving process restarts.
pub trait PersistentStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str);
}
