//! Compile-failure diagnostics: record parsing, line grouping, and the
//! annotation batch lifecycle.

use crate::collaborators::EditorWidget;

/// One editor line with every message the compiler reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line in the user's source, after subtracting the preamble.
    pub line: usize,
    pub messages: Vec<String>,
}

/// Extracts `(line, message)` pairs from `ERROR: <source>:<line>: <message>`
/// records, maps compiler lines back onto editor lines by subtracting
/// `line_offset`, and groups consecutive records that share a line.
///
/// Records that do not match the shape are skipped; a log with no matching
/// record yields an empty list. Messages simply go unannotated in that case,
/// the pipeline itself never fails on malformed logs.
pub fn parse_diagnostics(raw_log: &str, line_offset: usize) -> Vec<Diagnostic> {
    let mut grouped: Vec<Diagnostic> = Vec::new();
    for record in raw_log.lines() {
        let Some((raw_line, message)) = parse_record(record) else {
            continue;
        };
        let line = raw_line.saturating_sub(line_offset).max(1);
        match grouped.last_mut() {
            Some(last) if last.line == line => last.messages.push(message),
            _ => grouped.push(Diagnostic {
                line,
                messages: vec![message],
            }),
        }
    }
    grouped
}

fn parse_record(record: &str) -> Option<(usize, String)> {
    let rest = record.trim_start().strip_prefix("ERROR: ")?;
    // "<source>:<line>: <message>"; the source index is unused.
    let (_source, rest) = rest.split_once(':')?;
    let (line, message) = rest.split_once(':')?;
    let line = line.trim().parse::<usize>().ok()?;
    let message = message.trim();
    if message.is_empty() {
        return None;
    }
    Some((line, message.to_string()))
}

/// Markers materialised for one failed compile attempt.
///
/// Exactly one batch may be live per pane. The batch owns its cleanup: the
/// pane releases the previous batch unconditionally at the start of the next
/// compile attempt, success or failure, before any new markers appear.
#[derive(Debug)]
pub struct AnnotationBatch {
    diagnostics: Vec<Diagnostic>,
}

impl AnnotationBatch {
    /// Attaches one gutter annotation per diagnostic group and returns the
    /// batch owning their removal.
    pub fn apply<E: EditorWidget>(editor: &mut E, diagnostics: Vec<Diagnostic>) -> Self {
        for diagnostic in &diagnostics {
            editor.set_gutter_annotation(diagnostic.line, &diagnostic.messages);
        }
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Removes every annotation this batch created.
    pub fn release<E: EditorWidget>(self, editor: &mut E) {
        editor.clear_gutter_annotations();
    }
}
