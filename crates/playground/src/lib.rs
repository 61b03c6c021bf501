//! Core state machines for the shaderpad live-coding playground.
//!
//! A playground is a set of [`Pane`]s, each pairing an editable shader source
//! with a drawable surface. Edits recompile with minimal latency; a failed
//! compile keeps the last good program on screen and surfaces line-grouped
//! diagnostics instead of crashing the render loop.
//!
//! The crate is deliberately host-agnostic: the graphics backend, the text
//! editor, and the persistent store are narrow capability traits declared in
//! [`collaborators`], so the whole frame loop can be exercised in tests with
//! in-memory fakes. Everything runs on one cooperative loop: event callbacks
//! mutate state and request frames, [`FrameScheduler`] coalesces the requests,
//! and [`Playground::run_frame`] executes exactly one logical frame.

pub mod collaborators;
pub mod compile;
pub mod diagnostics;
pub mod frame;
pub mod input;
pub mod layout;
pub mod pane;
pub mod persist;

pub use collaborators::{CompileError, DrawCall, EditorWidget, GraphicsBackend, PersistentStore};
pub use compile::{preamble_lines, wrap_source, CompileResult};
pub use diagnostics::{parse_diagnostics, AnnotationBatch, Diagnostic};
pub use frame::{ClockMode, FrameScheduler, STEP_MS};
pub use input::{hit_test, InputRouter, PointerPhase, PointerSample};
pub use layout::{LayoutPolicy, PaneRect};
pub use pane::{FrameReport, Pane, Playground};
pub use persist::{flush_sources, seed_sources, DEFAULT_SOURCE, STORE_KEY};

#[cfg(test)]
pub(crate) mod testkit;
