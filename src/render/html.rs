//! HTML document builder
//!
//! Produces an HTML fragment (no `<html>`/`<body>` wrapper) so documents can
//! be embedded in a site template. All text is escaped.

use super::markdown::escape_html;
use super::DocumentBuilder;
use crate::tree::Deprecation;

/// Builds HTML schema documents
#[derive(Debug, Default)]
pub struct HtmlBuilder {
    out: String,
}

impl HtmlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }
}

impl DocumentBuilder for HtmlBuilder {
    fn title(&mut self, name: &str) {
        self.line(&format!("<h2>Schema {}</h2>", escape_html(name)));
    }

    fn deprecation(&mut self, deprecation: &Deprecation) {
        let mut note = String::from("<p><strong>Deprecated</strong>");
        if let Some(since) = &deprecation.since {
            note.push_str(&format!(" since {}", escape_html(since)));
        }
        if let Some(reason) = &deprecation.reason {
            note.push_str(&format!(": {}", escape_html(reason)));
        }
        note.push_str("</p>");
        self.line(&note);
    }

    fn description(&mut self, text: &str) {
        self.line(&format!("<p>{}</p>", escape_html(text)));
    }

    fn begin_attributes(&mut self, depth: usize, owner: Option<&str>) {
        match owner {
            Some(owner) if depth > 0 => {
                let level = (3 + depth).min(6);
                self.line("<dd>");
                self.line(&format!(
                    "<h{level}>Attributes of {}</h{level}>",
                    escape_html(owner),
                    level = level
                ));
            }
            _ => self.line("<h3>Attributes</h3>"),
        }
        self.line("<dl>");
    }

    fn attribute_header(&mut self, _depth: usize, name: &str, required: bool, deprecated: bool) {
        let mut header = format!("<dt><strong>{}</strong>", escape_html(name));
        if required {
            header.push_str(" <em>required</em>");
        }
        if deprecated {
            header.push_str(" <em>deprecated</em>");
        }
        header.push_str("</dt>");
        self.line(&header);
    }

    fn type_token(&mut self, _depth: usize, token: &str) {
        self.line(&format!("<dd><code>{}</code></dd>", escape_html(token)));
    }

    fn attribute_description(&mut self, _depth: usize, text: &str) {
        self.line(&format!("<dd>{}</dd>", escape_html(text)));
    }

    fn default_value(&mut self, _depth: usize, literal: &str) {
        self.line(&format!("<dd>default: <code>{}</code></dd>", escape_html(literal)));
    }

    fn end_attributes(&mut self, depth: usize) {
        self.line("</dl>");
        if depth > 0 {
            self.line("</dd>");
        }
    }

    fn source_files(&mut self, label: &str, link: &str) {
        self.line("<h2>Source Files</h2>");
        self.line("<ul>");
        self.line(&format!(
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(link),
            escape_html(label)
        ));
        self.line("</ul>");
    }

    fn reference(&mut self, label: &str, link: &str) {
        self.line(&format!(
            "<p>Re-exported from <a href=\"{}\">{}</a></p>",
            escape_html(link),
            escape_html(label)
        ));
    }

    fn finish(&mut self) -> String {
        std::mem::take(&mut self.out)
    }
}
