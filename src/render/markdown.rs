//! Markdown document builder

use super::DocumentBuilder;
use crate::tree::Deprecation;

/// Builds Markdown schema documents
#[derive(Debug, Default)]
pub struct MarkdownBuilder {
    out: String,
    escape_html: bool,
}

impl MarkdownBuilder {
    pub fn new(escape_html: bool) -> Self {
        Self {
            out: String::new(),
            escape_html,
        }
    }

    fn text(&self, text: &str) -> String {
        if self.escape_html {
            escape_html(text)
        } else {
            text.to_string()
        }
    }
}

/// Heading marker for a nested attribute list (`####` and deeper, max 6)
fn nested_heading(depth: usize) -> String {
    "#".repeat((3 + depth).min(6))
}

impl DocumentBuilder for MarkdownBuilder {
    fn title(&mut self, name: &str) {
        self.out.push_str(&format!("## Schema {}\n\n", name));
    }

    fn deprecation(&mut self, deprecation: &Deprecation) {
        self.out.push_str("**Deprecated**");
        if let Some(since) = &deprecation.since {
            self.out.push_str(&format!(" since {}", since));
        }
        if let Some(reason) = &deprecation.reason {
            let reason = self.text(reason);
            self.out.push_str(&format!(": {}", reason));
        }
        self.out.push_str("\n\n");
    }

    fn description(&mut self, text: &str) {
        let text = self.text(text);
        self.out.push_str(&format!("{}\n\n", text));
    }

    fn begin_attributes(&mut self, depth: usize, owner: Option<&str>) {
        match owner {
            Some(owner) if depth > 0 => {
                self.out
                    .push_str(&format!("{} Attributes of {}\n\n", nested_heading(depth), owner));
            }
            _ => self.out.push_str("### Attributes\n\n"),
        }
    }

    fn attribute_header(&mut self, _depth: usize, name: &str, required: bool, deprecated: bool) {
        self.out.push_str(&format!("**{}**", name));
        if required {
            self.out.push_str(" *required*");
        }
        if deprecated {
            self.out.push_str(" *deprecated*");
        }
        self.out.push_str("\n\n");
    }

    fn type_token(&mut self, _depth: usize, token: &str) {
        self.out.push_str(&format!("{}\n\n", code_span(token)));
    }

    fn attribute_description(&mut self, _depth: usize, text: &str) {
        let text = self.text(text);
        self.out.push_str(&format!("{}\n\n", text));
    }

    fn default_value(&mut self, _depth: usize, literal: &str) {
        self.out.push_str(&format!("default: {}\n\n", code_span(literal)));
    }

    fn end_attributes(&mut self, depth: usize) {
        // nested lists share the blank line closing the top-level list
        if depth == 0 {
            self.out.push('\n');
        }
    }

    fn source_files(&mut self, label: &str, link: &str) {
        self.out
            .push_str(&format!("## Source Files\n\n- [{}]({})\n", label, link));
    }

    fn reference(&mut self, label: &str, link: &str) {
        self.out
            .push_str(&format!("Re-exported from [{}]({})\n", label, link));
    }

    fn finish(&mut self) -> String {
        std::mem::take(&mut self.out)
    }
}

/// Inline code span with a fence longer than any backtick run in `text`
fn code_span(text: &str) -> String {
    let longest = text.split(|c: char| c != '`').map(str::len).max().unwrap_or(0);
    if longest == 0 {
        return format!("`{}`", text);
    }
    let fence = "`".repeat(longest + 1);
    format!("{} {} {}", fence, text, fence)
}

/// Escape the characters that would otherwise be read as inline HTML
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
