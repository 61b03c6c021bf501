//! Panes and the per-frame update that drives them.

use tracing::debug;

use crate::collaborators::{DrawCall, EditorWidget, GraphicsBackend, PersistentStore};
use crate::compile::{compile_pane_source, CompileResult};
use crate::diagnostics::{AnnotationBatch, Diagnostic};
use crate::input::InputRouter;
use crate::layout::LayoutPolicy;
use crate::persist;

/// One editor + canvas unit with independent compile and render state.
pub struct Pane<G: GraphicsBackend, E: EditorWidget> {
    backend: G,
    editor: E,
    dirty: bool,
    program: Option<G::Program>,
    annotations: Option<AnnotationBatch>,
}

impl<G: GraphicsBackend, E: EditorWidget> Pane<G, E> {
    /// New panes start dirty so the first frame compiles them.
    pub fn new(backend: G, editor: E) -> Self {
        Self {
            backend,
            editor,
            dirty: true,
            program: None,
            annotations: None,
        }
    }

    /// The active program, if any compile ever succeeded.
    pub fn program(&self) -> Option<&G::Program> {
        self.program.as_ref()
    }

    /// Diagnostics from the most recent failed compile; empty after a
    /// success or before the first attempt.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.annotations
            .as_ref()
            .map(AnnotationBatch::diagnostics)
            .unwrap_or(&[])
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    /// One compile attempt against the editor's current text.
    ///
    /// The previous annotation batch is released first in every case. On
    /// failure the active program is left untouched so the last good image
    /// keeps rendering; on success the old program is released only after
    /// the new one exists, so no frame observes a half-swapped pane.
    fn recompile(&mut self) {
        if let Some(batch) = self.annotations.take() {
            batch.release(&mut self.editor);
        }
        let source = self.editor.text();
        match compile_pane_source(&mut self.backend, &source) {
            CompileResult::Success(program) => {
                if let Some(old) = self.program.replace(program) {
                    self.backend.release(old);
                }
            }
            CompileResult::Failure(diagnostics) => {
                debug!(
                    errors = diagnostics.len(),
                    "compile failed; keeping last good program"
                );
                self.annotations = Some(AnnotationBatch::apply(&mut self.editor, diagnostics));
            }
        }
    }
}

/// What one frame did; the host uses it to decide about the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// True while any pane exists; this system renders every refresh.
    pub continue_animating: bool,
    /// Panes recompiled this frame.
    pub recompiled: usize,
    /// Whether the persistence bridge flushed sources this frame.
    pub flushed: bool,
}

/// Everything a frame reads and mutates, owned in one place and driven by
/// exactly one cooperative caller at a time.
pub struct Playground<G: GraphicsBackend, E: EditorWidget, S: PersistentStore> {
    layout: LayoutPolicy,
    input: InputRouter,
    store: S,
    panes: Vec<Pane<G, E>>,
}

impl<G: GraphicsBackend, E: EditorWidget, S: PersistentStore> Playground<G, E, S> {
    pub fn new(layout: LayoutPolicy, store: S, panes: Vec<Pane<G, E>>) -> Self {
        Self {
            layout,
            input: InputRouter::new(),
            store,
            panes,
        }
    }

    pub fn layout(&self) -> &LayoutPolicy {
        &self.layout
    }

    pub fn input_mut(&mut self) -> &mut InputRouter {
        &mut self.input
    }

    pub fn panes(&self) -> &[Pane<G, E>] {
        &self.panes
    }

    pub fn panes_mut(&mut self) -> &mut [Pane<G, E>] {
        &mut self.panes
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Executes exactly one logical frame, synchronously:
    /// layout → pointer resolution → per-pane recompile/draw → persistence
    /// flush → pointer decay and dirty-flag reset.
    pub fn run_frame(&mut self, now_ms: f64, scale_factor: f64) -> FrameReport {
        let rects = self.layout.rects(self.panes.len());
        let sample = self.input.resolve(&rects, scale_factor);
        let pointer = sample.as_uniform();
        let time_secs = (now_ms / 1000.0) as f32;

        let mut recompiled = 0;
        let mut any_dirty = false;
        for (pane, rect) in self.panes.iter_mut().zip(&rects) {
            if pane.editor.take_changed() {
                pane.dirty = true;
            }
            if pane.dirty {
                any_dirty = true;
                recompiled += 1;
                pane.recompile();
            }
            if let Some(program) = pane.program.as_ref() {
                let call = DrawCall {
                    origin: (
                        (rect.x * scale_factor).round() as u32,
                        (rect.y * scale_factor).round() as u32,
                    ),
                    resolution: (
                        (rect.width * scale_factor).round() as u32,
                        (rect.height * scale_factor).round() as u32,
                    ),
                    time_secs,
                    pointer,
                };
                pane.backend.draw(program, call);
            }
        }

        let flushed = if any_dirty {
            let sources: Vec<String> = self.panes.iter().map(|pane| pane.editor.text()).collect();
            persist::flush_sources(&mut self.store, &sources);
            true
        } else {
            false
        };

        for pane in &mut self.panes {
            pane.dirty = false;
        }
        self.input.end_frame(sample);

        FrameReport {
            continue_animating: !self.panes.is_empty(),
            recompiled,
            flushed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerPhase;
    use crate::persist::STORE_KEY;
    use crate::testkit::{FakeBackend, FakeEditor, MemoryStore};

    fn layout() -> LayoutPolicy {
        LayoutPolicy {
            pane_width: 100.0,
            pane_height: 50.0,
            panes_per_row: 2,
            gap: 10.0,
        }
    }

    fn playground(
        sources: &[&str],
    ) -> Playground<FakeBackend, FakeEditor, MemoryStore> {
        let panes = sources
            .iter()
            .map(|source| Pane::new(FakeBackend::succeeding(), FakeEditor::new(source)))
            .collect();
        Playground::new(layout(), MemoryStore::default(), panes)
    }

    #[test]
    fn first_frame_compiles_every_pane_once() {
        let mut playground = playground(&["// a", "// b"]);
        let report = playground.run_frame(0.0, 1.0);
        assert_eq!(report.recompiled, 2);
        assert!(report.flushed);
        let report = playground.run_frame(16.0, 1.0);
        assert_eq!(report.recompiled, 0);
        assert!(!report.flushed);
    }

    #[test]
    fn failed_compile_keeps_the_previous_program() {
        let mut playground = playground(&["// a"]);
        playground.run_frame(0.0, 1.0);
        let before = *playground.panes()[0].program().expect("first compile");

        let pane = &mut playground.panes_mut()[0];
        pane.editor_mut().edit("broken {");
        pane.backend.fail_next("ERROR: 0:7: syntax error");

        playground.run_frame(16.0, 1.0);
        let pane = &playground.panes()[0];
        assert_eq!(pane.program(), Some(&before));
        assert!(!pane.diagnostics().is_empty());
        assert!(pane.backend.released.is_empty());
    }

    #[test]
    fn successful_compile_swaps_and_releases_the_old_program() {
        let mut playground = playground(&["// a"]);
        playground.run_frame(0.0, 1.0);
        let first = *playground.panes()[0].program().expect("first compile");

        playground.panes_mut()[0].editor_mut().edit("// a2");
        playground.run_frame(16.0, 1.0);

        let pane = &playground.panes()[0];
        assert_ne!(pane.program(), Some(&first));
        assert_eq!(pane.backend.released, vec![first]);
        assert!(pane.diagnostics().is_empty());
    }

    #[test]
    fn second_attempt_clears_annotations_from_the_first() {
        let mut playground = playground(&["// a"]);
        {
            let pane = &mut playground.panes_mut()[0];
            pane.backend.fail_next("ERROR: 0:8: first failure");
        }
        playground.run_frame(0.0, 1.0);
        assert_eq!(playground.panes()[0].editor().annotations.len(), 1);

        {
            let pane = &mut playground.panes_mut()[0];
            pane.editor_mut().edit("still broken");
            pane.backend.fail_next("ERROR: 0:9: second failure");
        }
        playground.run_frame(16.0, 1.0);
        let editor = playground.panes()[0].editor();
        assert_eq!(editor.annotations.len(), 1);
        assert!(editor.annotations[0].1[0].contains("second failure"));

        playground.panes_mut()[0].editor_mut().edit("// fixed");
        playground.run_frame(32.0, 1.0);
        assert!(playground.panes()[0].editor().annotations.is_empty());
    }

    #[test]
    fn panes_that_never_compiled_are_not_drawn() {
        let mut playground = playground(&["// a"]);
        playground.panes_mut()[0]
            .backend
            .fail_next("ERROR: 0:7: nope");
        playground.run_frame(0.0, 1.0);
        assert!(playground.panes()[0].backend.draws.is_empty());
        playground.run_frame(16.0, 1.0);
        assert!(playground.panes()[0].backend.draws.is_empty());
    }

    #[test]
    fn draw_calls_carry_layout_scaled_viewports_and_time() {
        let mut playground = playground(&["// a", "// b"]);
        playground.run_frame(2_000.0, 2.0);
        let second = &playground.panes()[1].backend;
        assert_eq!(second.draws.len(), 1);
        let call = second.draws[0];
        assert_eq!(call.origin, (240, 20));
        assert_eq!(call.resolution, (200, 100));
        assert_eq!(call.time_secs, 2.0);
    }

    #[test]
    fn edits_flush_all_sources_to_the_store() {
        let mut playground = playground(&["// a", "// b"]);
        playground.run_frame(0.0, 1.0);
        playground.panes_mut()[1].editor_mut().edit("// b2");
        playground.run_frame(16.0, 1.0);
        let raw = playground.store().entries.get(STORE_KEY).expect("flushed");
        let decoded: Vec<String> = serde_json::from_str(raw).expect("valid json");
        assert_eq!(decoded, vec!["// a".to_string(), "// b2".to_string()]);
    }

    #[test]
    fn pointer_decays_at_the_frame_boundary() {
        let mut playground = playground(&["// a"]);
        playground.input_mut().pointer_pressed(20.0, 20.0);
        assert_eq!(playground.input_mut().phase(), PointerPhase::FirstDown);
        playground.run_frame(0.0, 1.0);
        assert_eq!(playground.input_mut().phase(), PointerPhase::Down);
    }

    #[test]
    fn pointer_uniform_sticks_while_dragging_outside_all_panes() {
        let mut playground = playground(&["// a"]);
        playground.run_frame(0.0, 1.0);
        playground.input_mut().pointer_pressed(20.0, 20.0);
        playground.run_frame(16.0, 1.0);
        let inside = playground.panes()[0].backend.draws[1].pointer;

        playground.input_mut().pointer_moved(-500.0, -500.0);
        playground.run_frame(32.0, 1.0);
        let outside = playground.panes()[0].backend.draws[2].pointer;
        assert_eq!(outside[0], inside[0]);
        assert_eq!(outside[1], inside[1]);
        assert_eq!(outside[2], 1.0);
        assert_eq!(outside[3], 0.0);
    }

    #[test]
    fn empty_playground_stops_animating() {
        let mut playground = playground(&[]);
        let report = playground.run_frame(0.0, 1.0);
        assert!(!report.continue_animating);
    }
}
