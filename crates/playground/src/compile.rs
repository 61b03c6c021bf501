//! The canonical wrapper template and the per-pane compile step.
//!
//! User source is never handed to the backend bare: it is sandwiched between
//! a preamble declaring the three implicit uniforms and a trailer that
//! defines the real entry point, calls the user's `mainImage`, and forces
//! alpha to 1.0. The diagnostic line offset is derived from the preamble's
//! actual line count so template edits can never leave the mapping stale.

use crate::collaborators::GraphicsBackend;
use crate::diagnostics::{parse_diagnostics, Diagnostic};

/// Declares the implicit uniform inputs every pane program receives.
/// `_paneOrigin` is plumbing, not part of the user-facing contract: panes
/// share one surface, so the trailer needs the viewport origin to localise
/// the fragment coordinate.
pub(crate) const PREAMBLE: &str = "\
#version 450
layout(location = 0) out vec4 pad_fragColor;
layout(std140, set = 0, binding = 0) uniform PaneParams {
    vec3 _iResolution;
    float _iTime;
    vec4 _iMouse;
    vec2 _paneOrigin;
} pad_params;
#define iResolution pad_params._iResolution
#define iTime pad_params._iTime
#define iMouse pad_params._iMouse
";

/// Defines the real entry point: shifts the fragment coordinate by the
/// pane's viewport origin and remaps it to the bottom-left origin, so
/// `mainImage` sees pane-local coordinates in the same space as `iMouse`,
/// then delegates and writes RGB with alpha forced to 1.0.
pub(crate) const TRAILER: &str = "\
void main() {
    vec4 pad_color = vec4(0.0);
    mainImage(pad_color, vec2(
        gl_FragCoord.x - pad_params._paneOrigin.x,
        iResolution.y - (gl_FragCoord.y - pad_params._paneOrigin.y)));
    pad_fragColor = vec4(pad_color.rgb, 1.0);
}
";

/// Wraps user source in the fixed preamble + trailer template. The user's
/// first line lands on line `preamble_lines() + 1` of the wrapped source.
pub fn wrap_source(user_source: &str) -> String {
    let mut wrapped =
        String::with_capacity(PREAMBLE.len() + user_source.len() + TRAILER.len() + 1);
    wrapped.push_str(PREAMBLE);
    wrapped.push_str(user_source);
    if !user_source.ends_with('\n') {
        wrapped.push('\n');
    }
    wrapped.push_str(TRAILER);
    wrapped
}

/// Number of wrapped-source lines ahead of user source; the offset
/// subtracted when mapping compiler diagnostics back onto editor lines.
pub fn preamble_lines() -> usize {
    PREAMBLE.lines().count()
}

/// Outcome of one compile attempt for a pane.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileResult<P> {
    /// A fully linked program, ready to swap in.
    Success(P),
    /// Editor-line diagnostics; the previous program stays active.
    Failure(Vec<Diagnostic>),
}

/// Wraps and compiles `source`, turning a backend failure into editor-line
/// diagnostics.
pub fn compile_pane_source<G: GraphicsBackend>(
    backend: &mut G,
    source: &str,
) -> CompileResult<G::Program> {
    let wrapped = wrap_source(source);
    match backend.compile(&wrapped) {
        Ok(program) => CompileResult::Success(program),
        Err(err) => CompileResult::Failure(parse_diagnostics(&err.raw_log, preamble_lines())),
    }
}
