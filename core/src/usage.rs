//! Human-readable dump of a schema tree.
//!
//! Each scope prints its flags and values first, aligned into name, default
//! and type columns, then its contexts as indented blocks:
//!
//! ```text
//! --count   = 5   [i32   ] - how many
//! --name    = abc [string]
//! --verbose                - print more
//! --camera { - view settings
//!   --fov = 60 [f32]
//! }
//! ```

use std::fmt;

use crate::schema::{ArgumentList, SchemaNode};
use crate::symbols::{CONTEXT_BEGIN, CONTEXT_END, LEVEL_INDENT, MAX_DATA_LINE_LENGTH};

/// Accumulates words into lines no wider than [`MAX_DATA_LINE_LENGTH`].
#[derive(Debug, Default)]
struct LineSplitter {
    text: String,
    line_start: usize,
}

impl LineSplitter {
    fn push(&mut self, piece: &str) {
        let line_len = self.text.len() - self.line_start;
        if line_len > 0 && line_len + 1 + piece.len() >= MAX_DATA_LINE_LENGTH {
            self.text.push('\n');
            self.line_start = self.text.len();
            if piece == " " {
                return;
            }
        }
        self.text.push_str(piece);
    }

    fn push_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, word) in words.into_iter().enumerate() {
            if i > 0 {
                self.push(" ");
            }
            self.push(word.as_ref());
        }
    }

    fn finish(self) -> String {
        self.text
    }
}

/// Default-value column for a node; may span several lines.
fn data_column(node: &SchemaNode) -> String {
    match node {
        SchemaNode::Flag { .. } | SchemaNode::Context { .. } => String::new(),
        SchemaNode::Scalar { default, .. } => default.to_string(),
        SchemaNode::Vector { defaults, .. } => {
            let mut splitter = LineSplitter::default();
            splitter.push_words(defaults.iter().map(ToString::to_string));
            splitter.finish()
        }
        SchemaNode::StringVector { defaults, .. } => {
            let mut splitter = LineSplitter::default();
            splitter.push(CONTEXT_BEGIN);
            splitter.push_words(defaults);
            splitter.push(CONTEXT_END);
            splitter.finish()
        }
    }
}

fn width(text: &str) -> usize {
    text.chars().count()
}

/// Width a node claims in the data column. Wrapped vector data reserves one
/// extra space after its widest line.
fn data_width(node: &SchemaNode) -> usize {
    let data = data_column(node);
    match node {
        SchemaNode::Vector { .. } | SchemaNode::StringVector { .. } => {
            data.lines().map(width).max().unwrap_or(0) + 1
        }
        _ => width(&data),
    }
}

fn pad(out: &mut String, text: &str, column: usize) {
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', column.saturating_sub(width(text))));
}

fn indent(out: &mut String, amount: usize) {
    out.extend(std::iter::repeat_n(' ', amount));
}

#[derive(Debug, Default, Clone, Copy)]
struct Columns {
    name: usize,
    data: usize,
    kind: usize,
}

impl Columns {
    fn measure(list: &ArgumentList) -> Self {
        let mut columns = Self::default();
        for node in list.iter().filter(|n| !matches!(n, SchemaNode::Context { .. })) {
            columns.name = columns.name.max(width(node.name()));
            columns.kind = columns.kind.max(width(&node.type_tag()));
            columns.data = columns.data.max(data_width(node));
        }
        columns
    }
}

fn write_comment(out: &mut String, comment: &str) {
    if !comment.is_empty() {
        out.push_str(" - ");
        out.push_str(comment);
    }
}

fn write_value(out: &mut String, node: &SchemaNode, level: usize, columns: Columns) {
    let line_start = out.len();
    indent(out, level);
    pad(out, node.name(), columns.name);
    out.push_str(" = ");
    let data_indent = out.len() - line_start;

    let data = data_column(node);
    let lines: Vec<&str> = data.split('\n').collect();
    let last = lines.len() - 1;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            indent(out, data_indent);
        }
        if i == last {
            pad(out, line, columns.data);
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }

    out.push_str(" [");
    pad(out, &node.type_tag(), columns.kind);
    out.push(']');
    write_comment(out, node.comment());
    out.push('\n');
}

fn write_flag(out: &mut String, node: &SchemaNode, level: usize, columns: Columns) {
    let mut line = String::new();
    indent(&mut line, level);
    pad(&mut line, node.name(), columns.name);
    indent(&mut line, 3 + columns.data + 2 + columns.kind + 1);
    write_comment(&mut line, node.comment());
    out.push_str(line.trim_end());
    out.push('\n');
}

fn write_context(out: &mut String, node: &SchemaNode, level: usize) {
    indent(out, level);
    out.push_str(node.name());
    out.push(' ');
    out.push_str(CONTEXT_BEGIN);
    write_comment(out, node.comment());
    out.push('\n');
    if let Some(children) = node.children() {
        write_scope(out, children, level + LEVEL_INDENT);
    }
    indent(out, level);
    out.push_str(CONTEXT_END);
    out.push('\n');
}

fn write_scope(out: &mut String, list: &ArgumentList, level: usize) {
    let columns = Columns::measure(list);
    for node in list.iter() {
        match node {
            SchemaNode::Context { .. } => {}
            SchemaNode::Flag { .. } => write_flag(out, node, level, columns),
            _ => write_value(out, node, level, columns),
        }
    }
    for node in list.iter() {
        if matches!(node, SchemaNode::Context { .. }) {
            write_context(out, node, level);
        }
    }
}

impl ArgumentList {
    /// Renders the schema tree as an aligned usage listing.
    pub fn usage(&self) -> String {
        let mut out = String::new();
        write_scope(&mut out, self, 0);
        out
    }
}

impl fmt::Display for ArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.usage())
    }
}
