//! Pretty-printer for parsed Meraki documents.
//!
//! Renders a `Document` back to canonical text: aligned inline comments,
//! `key = a + b` modifier definitions, one binding per statement, nested
//! menus indented one level per depth, chain segments joined with `; `.
//!
//! The formatter makes no decisions beyond spacing and alignment. For
//! any syntactically valid source, formatting its parse and reparsing
//! yields the same document, modulo comment placement and the
//! materialised nested-menu timeout default.

use crate::core::comments::{Comment, CommentKind};
use crate::core::types::{BindingBody, Document, KeyBinding, NestedBlock};

/// Style knobs for the formatter.
#[derive(Clone, Copy, Debug)]
pub struct FormatOptions {
    /// Spaces per nesting level
    pub indent_size: usize,
    /// Pad statements so trailing comments line up
    pub align_comments: bool,
    /// Column trailing comments are aligned to
    pub comment_column: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_size: 4,
            align_comments: true,
            comment_column: 40,
        }
    }
}

/// Renders documents to canonical Meraki text.
pub struct Formatter {
    options: FormatOptions,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {
            options: FormatOptions::default(),
        }
    }

    pub fn with_options(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Renders `doc` as configuration text ending in a newline.
    pub fn format(&self, doc: &Document) -> String {
        let mut sections: Vec<String> = Vec::new();

        let standalone = self.format_standalone_comments(doc);
        if !standalone.is_empty() {
            sections.push(standalone.join("\n"));
        }

        if !doc.modifiers.is_empty() {
            let lines: Vec<String> = doc
                .modifiers
                .iter()
                .map(|def| self.with_trailing_comment(def.to_string(), &def.comments))
                .collect();
            sections.push(lines.join("\n"));
        }

        if !doc.keybindings.is_empty() {
            let mut lines = Vec::new();
            for binding in &doc.keybindings {
                self.format_binding(binding, &mut lines);
            }
            sections.push(lines.join("\n"));
        }

        let mut out = sections.join("\n\n");
        out.push('\n');
        out
    }

    /// Unclaimed comments and notes come first, each in its source form.
    fn format_standalone_comments(&self, doc: &Document) -> Vec<String> {
        let mut lines = Vec::new();
        for comment in &doc.comments {
            match comment.kind {
                CommentKind::Multiline => {
                    lines.push("@END".to_string());
                    lines.push(comment.text.clone());
                    lines.push("END".to_string());
                }
                CommentKind::Line | CommentKind::Inline => {
                    lines.push(format!("# {}", comment.text));
                }
            }
        }
        lines
    }

    fn format_binding(&self, binding: &KeyBinding, lines: &mut Vec<String>) {
        let mut head = binding.trigger();
        if let Some(timeout) = binding.timeout {
            head.push_str(&format!(" [{}ms]", timeout));
        }

        match &binding.body {
            BindingBody::Chain(actions) => {
                let chain = actions
                    .iter()
                    .map(|a| a.command.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                let line = format!("{} : {}", head, chain);
                lines.push(self.with_trailing_comment(line, &binding.comments));
            }
            BindingBody::Nested(block) => {
                let opener = format!("{} : {{", head);
                lines.push(self.with_trailing_comment(opener, &binding.comments));
                self.format_block(block, 1, lines);
                lines.push("}".to_string());
            }
        }
    }

    fn format_block(&self, block: &NestedBlock, level: usize, lines: &mut Vec<String>) {
        let indent = " ".repeat(self.options.indent_size * level);
        for entry in &block.entries {
            match &entry.body {
                BindingBody::Chain(actions) => {
                    let chain = actions
                        .iter()
                        .map(|a| a.command.as_str())
                        .collect::<Vec<_>>()
                        .join("; ");
                    lines.push(format!("{}{} : {};", indent, entry.key, chain));
                }
                BindingBody::Nested(inner) => {
                    lines.push(format!("{}{} : {{", indent, entry.key));
                    self.format_block(inner, level + 1, lines);
                    lines.push(format!("{}}}", indent));
                }
            }
        }
    }

    /// Appends the first claimed comment as a trailing `# …`, aligned to
    /// the configured column when alignment is on.
    fn with_trailing_comment(&self, line: String, comments: &[Comment]) -> String {
        let Some(comment) = comments.first() else {
            return line;
        };
        if self.options.align_comments {
            format!(
                "{:<width$}# {}",
                line,
                comment.text,
                width = self.options.comment_column
            )
        } else {
            format!("{}  # {}", line, comment.text)
        }
    }
}
