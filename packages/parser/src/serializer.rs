use crate::ast::ElementNode;
use crate::rules::RuleTable;
use std::borrow::Borrow;

/// Serializer converts element trees back to markup
///
/// Output is indented one element per line. Content is written inline
/// between the start and end tag, so the parser reads it back unchanged
/// (modulo surrounding whitespace). A node with children never writes its
/// content.
pub struct Serializer {
    indent_level: usize,
    indent_string: String,
    rules: &'static RuleTable,
}

impl Serializer {
    pub fn new() -> Self {
        Self::with_indent("  ")
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_level: 0,
            indent_string: indent.to_string(),
            rules: RuleTable::standard(),
        }
    }

    pub fn with_rules(mut self, rules: &'static RuleTable) -> Self {
        self.rules = rules;
        self
    }

    /// Serialize a forest of nodes
    pub fn serialize<N: Borrow<ElementNode>>(&mut self, nodes: &[N]) -> String {
        let mut output = String::new();
        for node in nodes {
            self.serialize_element(node.borrow(), &mut output);
        }
        output
    }

    fn serialize_element(&mut self, node: &ElementNode, output: &mut String) {
        self.write_indent(output);
        output.push('<');
        output.push_str(&node.tag);

        for (key, value) in node.attributes.iter() {
            output.push(' ');
            output.push_str(key);
            output.push_str("=\"");
            output.push_str(&escape_attribute(value));
            output.push('"');
        }

        if !node.children.is_empty() {
            if node.content.is_some() {
                tracing::debug!(tag = %node.tag, "content ignored on node with children");
            }

            output.push_str(">\n");
            self.indent_level += 1;
            for child in &node.children {
                self.serialize_element(child, output);
            }
            self.indent_level -= 1;
            self.write_indent(output);
            self.write_close(&node.tag, output);
            return;
        }

        match &node.content {
            Some(content) => {
                output.push('>');
                output.push_str(content);
                self.write_close(&node.tag, output);
            }
            None if self.rules.is_void(&node.tag) => output.push_str(" />\n"),
            None => {
                output.push('>');
                self.write_close(&node.tag, output);
            }
        }
    }

    fn write_close(&self, tag: &str, output: &mut String) {
        output.push_str("</");
        output.push_str(tag);
        output.push_str(">\n");
    }

    fn write_indent(&self, output: &mut String) {
        for _ in 0..self.indent_level {
            output.push_str(&self.indent_string);
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape characters that would end or corrupt a quoted attribute value
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Convenience function to serialize nodes with default formatting
pub fn serialize<N: Borrow<ElementNode>>(nodes: &[N]) -> String {
    Serializer::new().serialize(nodes)
}
