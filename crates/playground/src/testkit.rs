//! Shared fakes for exercising the frame loop without a GPU, a widget
//! toolkit, or a filesystem.

use std::collections::BTreeMap;

use crate::collaborators::{CompileError, DrawCall, EditorWidget, GraphicsBackend, PersistentStore};

/// Scripted backend: each compile consumes the next scripted outcome and
/// succeeds once the script runs out. Program handles are sequential ids so
/// tests can compare them across swaps.
pub(crate) struct FakeBackend {
    script: Vec<Result<(), String>>,
    next_program: u32,
    pub released: Vec<u32>,
    pub draws: Vec<DrawCall>,
    pub compiles: Vec<String>,
}

impl FakeBackend {
    pub fn succeeding() -> Self {
        Self {
            script: Vec::new(),
            next_program: 0,
            released: Vec::new(),
            draws: Vec::new(),
            compiles: Vec::new(),
        }
    }

    /// Makes the next compile fail with `raw_log`.
    pub fn fail_next(&mut self, raw_log: &str) {
        self.script.insert(0, Err(raw_log.to_string()));
    }
}

impl GraphicsBackend for FakeBackend {
    type Program = u32;

    fn compile(&mut self, wrapped_source: &str) -> Result<u32, CompileError> {
        self.compiles.push(wrapped_source.to_string());
        let outcome = if self.script.is_empty() {
            Ok(())
        } else {
            self.script.remove(0)
        };
        match outcome {
            Ok(()) => {
                let id = self.next_program;
                self.next_program += 1;
                Ok(id)
            }
            Err(raw_log) => Err(CompileError { raw_log }),
        }
    }

    fn draw(&mut self, _program: &u32, call: DrawCall) {
        self.draws.push(call);
    }

    fn release(&mut self, program: u32) {
        self.released.push(program);
    }
}

pub(crate) struct FakeEditor {
    text: String,
    changed: bool,
    pub annotations: Vec<(usize, Vec<String>)>,
    pub clear_calls: usize,
}

impl FakeEditor {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            changed: false,
            annotations: Vec::new(),
            clear_calls: 0,
        }
    }

    /// Simulates the user typing: replaces the text and raises the change
    /// flag the next frame will observe.
    pub fn edit(&mut self, text: &str) {
        self.text = text.to_string();
        self.changed = true;
    }
}

impl EditorWidget for FakeEditor {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn set_gutter_annotation(&mut self, line: usize, messages: &[String]) {
        self.annotations.push((line, messages.to_vec()));
    }

    fn clear_gutter_annotations(&mut self) {
        self.annotations.clear();
        self.clear_calls += 1;
    }
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    pub entries: BTreeMap<String, String>,
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}
