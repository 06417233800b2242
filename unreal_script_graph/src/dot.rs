//! DOT emission
//!
//! Turns the nodes and links of an extracted subgraph into DOT text with
//! record-style node labels, ready for an external renderer.

use serde_json::Value;

use crate::ast::{Link, ScriptStatement};
use crate::types::AstValue;

/// Default graph background color
pub const BG_COLOR: &str = "#222222";
/// Default node, edge and text color
pub const FG_COLOR: &str = "#dddddd";
/// Default label font family
pub const FONT_NAME: &str = "Arial";
/// Default label font size
pub const FONT_SIZE: &str = "12";

/// Attribute keys never rendered into labels
const EXCLUDED_FIELDS: [&str; 2] = ["index", "kind"];

/// Color and font theme applied to a whole graph
#[derive(Debug, Clone)]
pub struct GraphTheme {
    /// Graph background color
    pub background: String,
    /// Node, edge and text color
    pub foreground: String,
    /// Label font family
    pub font_name: String,
    /// Label font size
    pub font_size: String,
}

impl Default for GraphTheme {
    fn default() -> Self {
        GraphTheme {
            background: BG_COLOR.to_string(),
            foreground: FG_COLOR.to_string(),
            font_name: FONT_NAME.to_string(),
            font_size: FONT_SIZE.to_string(),
        }
    }
}

/// Name of the artifact emitted for one entrypoint
pub fn artifact_name(script_name: &str, entrypoint: usize) -> String {
    match entrypoint {
        0 => script_name.to_string(),
        ep => format!("{script_name}_{ep}"),
    }
}

/// A directed graph of script statements, emitted as DOT text
#[derive(Debug, Clone)]
pub struct ScriptGraph {
    name: String,
    theme: GraphTheme,
    nodes: Vec<(usize, String)>,
    edges: Vec<Link>,
}

impl ScriptGraph {
    /// Create an empty graph with a name and a theme
    pub fn new(name: &str, theme: GraphTheme) -> Self {
        ScriptGraph {
            name: name.to_string(),
            theme,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Graph name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add one statement as a record-labeled node
    pub fn draw_node(&mut self, statement: &ScriptStatement) {
        self.nodes
            .push((statement.index, make_label(&statement.ast_value())));
    }

    /// Add one directed edge
    pub fn draw_edge(&mut self, link: Link) {
        self.edges.push(link);
    }

    /// Emit the whole graph as DOT text
    pub fn to_dot(&self) -> String {
        let GraphTheme {
            background,
            foreground,
            font_name,
            font_size,
        } = &self.theme;
        let mut dot = String::new();
        dot.push_str(&format!("// {}\n", self.name));
        dot.push_str("digraph {\n");
        dot.push_str(&format!(
            "\tgraph [bgcolor=\"{background}\" color=\"{foreground}\" fontcolor=\"{foreground}\" \
             fontname=\"{font_name}\" fontsize=\"{font_size}\" charset=\"UTF-8\" compound=\"true\"]\n"
        ));
        dot.push_str(&format!(
            "\tnode [shape=\"box\" color=\"{foreground}\" fontcolor=\"{foreground}\" \
             fontname=\"{font_name}\" fontsize=\"{font_size}\"]\n"
        ));
        dot.push_str(&format!(
            "\tedge [color=\"{foreground}\" fontcolor=\"{foreground}\" \
             fontname=\"{font_name}\" fontsize=\"{font_size}\"]\n"
        ));
        for (index, label) in &self.nodes {
            dot.push_str(&format!("\t{index} [label=\"{label}\" shape=\"record\"]\n"));
        }
        for (from, to) in &self.edges {
            dot.push_str(&format!("\t{from} -> {to}\n"));
        }
        dot.push_str("}\n");
        dot
    }
}

/// Compose the record label of one attribute tree.
///
/// The `index` attribute leads the record once; `index` and `kind` keys are
/// skipped at every nesting level.
pub fn make_label(value: &AstValue) -> String {
    match value {
        AstValue::Map(fields) => {
            let mut parts = Vec::new();
            if let Some((_, index)) = fields.iter().find(|(key, _)| *key == "index") {
                parts.push(format!("{{index|{}}}", make_label(index)));
            }
            for (key, value) in fields {
                if EXCLUDED_FIELDS.contains(key) {
                    continue;
                }
                parts.push(format!("{{{key}|{{{}}}}}", make_label(value)));
            }
            parts.join("|")
        }
        AstValue::List(values) => values
            .iter()
            .map(|value| format!("{{{}}}", make_label(value)))
            .collect::<Vec<_>>()
            .join("|"),
        AstValue::Text(text) => escape_record_text(text),
        AstValue::Bool(value) => value.to_string(),
        AstValue::Int(value) => value.to_string(),
        AstValue::Null => "null".to_string(),
        AstValue::Raw(value) => raw_label(value),
    }
}

fn raw_label(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut parts = Vec::new();
            if let Some(index) = map.get("index") {
                parts.push(format!("{{index|{}}}", raw_label(index)));
            }
            for (key, value) in map {
                if EXCLUDED_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                parts.push(format!(
                    "{{{}|{{{}}}}}",
                    escape_record_text(key),
                    raw_label(value)
                ));
            }
            parts.join("|")
        }
        Value::Array(values) => values
            .iter()
            .map(|value| format!("{{{}}}", raw_label(value)))
            .collect::<Vec<_>>()
            .join("|"),
        Value::String(text) => escape_record_text(text),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Escape record-special characters in scalar text
fn escape_record_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '{' | '}' | '|' | '<' | '>' | '"' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}
