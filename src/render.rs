//! Purpose: Render projected JSON for stdout in compact, pretty, or ANSI-colored form.
//! Exports: `RenderStyle`, `render_json`.
//! Role: Pure formatter used by every CLI emission path.
//! Invariants: `Pretty` output equals `serde_json::to_string_pretty`; `Compact` equals `to_string`.
//! Invariants: ANSI escapes appear only in `Color` style.
use serde_json::{Map, Value};

const INDENT: &str = "  ";

// 8/16-color palette; bright variants lose contrast on some themes.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "39";
const COLOR_PUNCT: &str = "39";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RenderStyle {
    Compact,
    Pretty,
    Color,
}

impl RenderStyle {
    /// Pretty when asked for or on a terminal; colored only when color is allowed.
    pub fn choose(pretty: bool, is_tty: bool, use_color: bool) -> Self {
        match (pretty || is_tty, use_color) {
            (_, true) => RenderStyle::Color,
            (true, false) => RenderStyle::Pretty,
            (false, false) => RenderStyle::Compact,
        }
    }
}

pub fn render_json(value: &Value, style: RenderStyle) -> String {
    match style {
        RenderStyle::Compact => serde_json::to_string(value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string()),
        RenderStyle::Pretty | RenderStyle::Color => {
            let mut writer = PrettyWriter {
                use_color: style == RenderStyle::Color,
                out: String::new(),
            };
            writer.value(value, 0);
            writer.out
        }
    }
}

struct PrettyWriter {
    use_color: bool,
    out: String,
}

impl PrettyWriter {
    fn value(&mut self, value: &Value, indent: usize) {
        match value {
            Value::Null => self.colored("null", COLOR_NULL),
            Value::Bool(val) => self.colored(if *val { "true" } else { "false" }, COLOR_BOOL),
            Value::Number(num) => self.colored(&num.to_string(), COLOR_NUMBER),
            Value::String(text) => self.colored(&encode_str(text), COLOR_STRING),
            Value::Array(items) => self.array(items, indent),
            Value::Object(map) => self.object(map, indent),
        }
    }

    fn array(&mut self, items: &[Value], indent: usize) {
        if items.is_empty() {
            self.colored("[]", COLOR_PUNCT);
            return;
        }
        self.colored("[", COLOR_PUNCT);
        self.out.push('\n');
        for (idx, item) in items.iter().enumerate() {
            self.indent(indent + 1);
            self.value(item, indent + 1);
            if idx + 1 < items.len() {
                self.colored(",", COLOR_PUNCT);
            }
            self.out.push('\n');
        }
        self.indent(indent);
        self.colored("]", COLOR_PUNCT);
    }

    fn object(&mut self, map: &Map<String, Value>, indent: usize) {
        if map.is_empty() {
            self.colored("{}", COLOR_PUNCT);
            return;
        }
        self.colored("{", COLOR_PUNCT);
        self.out.push('\n');
        let len = map.len();
        for (idx, (key, value)) in map.iter().enumerate() {
            self.indent(indent + 1);
            self.colored(&encode_str(key), COLOR_KEY);
            self.colored(":", COLOR_PUNCT);
            self.out.push(' ');
            self.value(value, indent + 1);
            if idx + 1 < len {
                self.colored(",", COLOR_PUNCT);
            }
            self.out.push('\n');
        }
        self.indent(indent);
        self.colored("}", COLOR_PUNCT);
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str(INDENT);
        }
    }

    fn colored(&mut self, text: &str, color: &str) {
        if !self.use_color {
            self.out.push_str(text);
            return;
        }
        self.out.push_str("\u{1b}[");
        self.out.push_str(color);
        self.out.push('m');
        self.out.push_str(text);
        self.out.push_str("\u{1b}[0m");
    }
}

fn encode_str(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}
