//! wgpu implementation of the playground's graphics collaborator.
//!
//! Every pane draws into its own viewport of one shared window surface.
//! [`SurfaceShell`] owns the GPU context, the static full-screen quad, and
//! the per-frame swapchain texture; [`PaneCanvas`] is the per-pane handle
//! that implements [`playground::GraphicsBackend`].

mod context;
mod pipeline;
mod shell;

pub use shell::{PaneCanvas, PaneProgram, SurfaceShell};

/// Re-exported so hosts can match surface loss without a direct wgpu
/// dependency.
pub use wgpu::SurfaceError;
