//! src/core/comments.rs
//!
//! Annotation extraction for Meraki source text
//!
//! Meraki supports three annotation forms:
//! - line comments: a line whose first non-blank character is `#`
//! - inline comments: `code  # trailing note`
//! - multiline notes: a `@END` line, free text, then a closing `END` line
//!
//! Extraction runs before lexing and blanks every annotation character
//! while keeping the line count identical, so tokens produced from the
//! cleaned text keep their original source line numbers.
//!
//! The pass is purely textual: a `#` inside a quoted action string is
//! misread as a comment start. Known limitation.

use serde::{Deserialize, Serialize};

/// Classification of an extracted annotation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CommentKind {
    /// Whole line was a `#` comment
    Line,
    /// Trailing `#` comment after code on the same line
    Inline,
    /// `@END` … `END` note block
    Multiline,
}

/// An annotation lifted out of the source text.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Comment {
    pub kind: CommentKind,
    /// Comment text without markers. Multiline notes keep their content
    /// lines verbatim, joined by `\n`.
    pub text: String,
    /// 1-based line of the comment; for multiline notes, the first
    /// content line after `@END`.
    pub line_number: usize,
    /// Line of the closing `END` marker (multiline notes only).
    pub end_line: Option<usize>,
    /// Line of the code this comment trails (inline comments only).
    pub associated_code_line: Option<usize>,
}

/// Strips annotations from `raw`, returning them together with cleaned
/// text that has the same line count as the input.
///
/// An `@END` block with no closing `END` before end of input is dropped
/// silently; its lines are still blanked.
pub fn extract(raw: &str) -> (Vec<Comment>, String) {
    let lines: Vec<&str> = raw.split('\n').collect();
    let mut comments = Vec::new();
    let mut clean: Vec<String> = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim_end();
        let line_number = i + 1;
        let trimmed = line.trim_start();

        if let Some(rest) = trimmed.strip_prefix('#') {
            comments.push(Comment {
                kind: CommentKind::Line,
                text: rest.trim().to_string(),
                line_number,
                end_line: None,
                associated_code_line: None,
            });
            clean.push(String::new());
            i += 1;
            continue;
        }

        if trimmed == "@END" {
            clean.push(String::new()); // the @END line
            let mut j = i + 1;
            let mut body: Vec<&str> = Vec::new();
            while j < lines.len() && lines[j].trim() != "END" {
                body.push(lines[j]);
                clean.push(String::new());
                j += 1;
            }
            if j < lines.len() {
                // Found the END marker.
                comments.push(Comment {
                    kind: CommentKind::Multiline,
                    text: body.join("\n"),
                    line_number: line_number + 1,
                    end_line: Some(j + 1),
                    associated_code_line: None,
                });
                clean.push(String::new()); // the END line
                i = j + 1;
            } else {
                // Unterminated note: dropped, lines already blanked.
                i = j;
            }
            continue;
        }

        if let Some(idx) = line.find('#') {
            let (code, rest) = line.split_at(idx);
            comments.push(Comment {
                kind: CommentKind::Inline,
                text: rest[1..].trim().to_string(),
                line_number,
                end_line: None,
                associated_code_line: Some(line_number),
            });
            clean.push(code.trim_end().to_string());
            i += 1;
            continue;
        }

        clean.push(line.to_string());
        i += 1;
    }

    (comments, clean.join("\n"))
}
