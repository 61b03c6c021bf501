use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::warn;

use playground::EditorWidget;

/// A pane source living in a plain file, edited with any external editor.
///
/// Change notification polls the file's modification time once per frame;
/// diagnostics surface as log warnings carrying the file and line, since a
/// file has no gutter to draw into. The annotated lines are retained so a
/// batch release genuinely clears them.
pub struct FileEditor {
    path: PathBuf,
    text: String,
    last_modified: Option<SystemTime>,
    changed: bool,
    annotations: Vec<(usize, Vec<String>)>,
}

impl FileEditor {
    /// Opens the pane file, creating it with `seed_text` when missing. An
    /// existing file wins over the seed and counts as an initial edit so
    /// the first flush writes it back to the store.
    pub fn open(path: PathBuf, seed_text: &str) -> Result<Self> {
        let (text, changed) = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read pane source {}", path.display()))?;
            let changed = text != seed_text;
            (text, changed)
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create sources directory {}", parent.display())
                })?;
            }
            fs::write(&path, seed_text)
                .with_context(|| format!("failed to seed pane source {}", path.display()))?;
            (seed_text.to_string(), false)
        };
        let last_modified = modification_time(&path);
        Ok(Self {
            path,
            text,
            last_modified,
            changed,
            annotations: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the file when its modification time moved.
    fn poll_file(&mut self) {
        let modified = modification_time(&self.path);
        if modified == self.last_modified {
            return;
        }
        self.last_modified = modified;
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                if text != self.text {
                    self.text = text;
                    self.changed = true;
                }
            }
            Err(err) => {
                // Editors often replace-and-rename; a transiently missing
                // file is retried next frame.
                warn!(path = %self.path.display(), %err, "failed to re-read pane source");
            }
        }
    }
}

fn modification_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

impl EditorWidget for FileEditor {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn take_changed(&mut self) -> bool {
        self.poll_file();
        std::mem::take(&mut self.changed)
    }

    fn set_gutter_annotation(&mut self, line: usize, messages: &[String]) {
        warn!(
            file = %self.path.display(),
            line,
            "shader error: {}",
            messages.join("; ")
        );
        self.annotations.push((line, messages.to_vec()));
    }

    fn clear_gutter_annotations(&mut self) {
        self.annotations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_seeded_and_not_marked_changed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pane0.frag");
        let mut editor = FileEditor::open(path.clone(), "// seed").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "// seed");
        assert_eq!(editor.text(), "// seed");
        assert!(!editor.take_changed());
    }

    #[test]
    fn existing_file_wins_over_the_seed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pane0.frag");
        fs::write(&path, "// user edit").unwrap();
        let mut editor = FileEditor::open(path, "// seed").unwrap();
        assert_eq!(editor.text(), "// user edit");
        assert!(editor.take_changed());
        assert!(!editor.take_changed());
    }

    #[test]
    fn on_disk_edits_are_observed_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pane0.frag");
        let mut editor = FileEditor::open(path.clone(), "// seed").unwrap();
        assert!(!editor.take_changed());

        // Coarse mtime granularity on some filesystems; make sure the
        // rewrite lands in a later tick.
        std::thread::sleep(Duration::from_millis(20));
        fs::write(&path, "// edited").unwrap();

        assert!(editor.take_changed());
        assert_eq!(editor.text(), "// edited");
        assert!(!editor.take_changed());
    }

    #[test]
    fn annotations_accumulate_and_clear() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pane0.frag");
        let mut editor = FileEditor::open(path, "// seed").unwrap();
        editor.set_gutter_annotation(3, &["bad call".to_string()]);
        editor.set_gutter_annotation(7, &["worse call".to_string()]);
        assert_eq!(editor.annotations.len(), 2);
        editor.clear_gutter_annotations();
        assert!(editor.annotations.is_empty());
    }
}
