//! Purpose: Render a stream of writer events as JSON text.
//! Exports: `JsonWriter`.
//! Role: Output seam for the encoder; the only place that knows text layout.
//! Invariants: Compact mode emits no extraneous whitespace; pretty mode
//! Invariants: indents nested structures by a fixed 2-space step and matches
//! Invariants: `serde_json::to_string_pretty` layout for standard values.
//! Invariants: Non-finite doubles are written as the `NaN`/`Infinity`/
//! Invariants: `-Infinity` literal tokens; converting them to `null` is the
//! Invariants: caller's decision.

use std::fmt::Write as _;

const INDENT: &str = "  ";

#[derive(Clone, Copy)]
enum Container {
    Array,
    Object,
}

struct Frame {
    container: Container,
    count: usize,
}

pub(crate) struct JsonWriter {
    out: String,
    pretty: bool,
    stack: Vec<Frame>,
    has_key: bool,
}

impl JsonWriter {
    pub(crate) fn new(pretty: bool) -> Self {
        Self {
            out: String::new(),
            pretty,
            stack: Vec::new(),
            has_key: false,
        }
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }

    pub(crate) fn start_array(&mut self) {
        self.begin_value();
        self.out.push('[');
        self.stack.push(Frame {
            container: Container::Array,
            count: 0,
        });
    }

    pub(crate) fn end_array(&mut self) {
        let frame = self.stack.pop();
        if self.pretty && frame.is_some_and(|frame| frame.count > 0) {
            self.out.push('\n');
            self.push_indent();
        }
        self.out.push(']');
    }

    pub(crate) fn start_object(&mut self) {
        self.begin_value();
        self.out.push('{');
        self.stack.push(Frame {
            container: Container::Object,
            count: 0,
        });
    }

    pub(crate) fn end_object(&mut self) {
        let frame = self.stack.pop();
        if self.pretty && frame.is_some_and(|frame| frame.count > 0) {
            self.out.push('\n');
            self.push_indent();
        }
        self.out.push('}');
    }

    pub(crate) fn key(&mut self, name: &str) {
        debug_assert!(
            matches!(
                self.stack.last().map(|frame| frame.container),
                Some(Container::Object)
            ),
            "key emitted outside an object"
        );
        let needs_comma = self.bump_count();
        if needs_comma {
            self.out.push(',');
        }
        if self.pretty {
            self.out.push('\n');
            self.push_indent();
        }
        self.push_escaped(name);
        self.out.push(':');
        if self.pretty {
            self.out.push(' ');
        }
        self.has_key = true;
    }

    pub(crate) fn null(&mut self) {
        self.begin_value();
        self.out.push_str("null");
    }

    pub(crate) fn bool(&mut self, value: bool) {
        self.begin_value();
        self.out.push_str(if value { "true" } else { "false" });
    }

    pub(crate) fn int(&mut self, value: i64) {
        self.begin_value();
        let _ = write!(self.out, "{value}");
    }

    pub(crate) fn double(&mut self, value: f64) {
        self.begin_value();
        if value.is_nan() {
            self.out.push_str("NaN");
        } else if value == f64::INFINITY {
            self.out.push_str("Infinity");
        } else if value == f64::NEG_INFINITY {
            self.out.push_str("-Infinity");
        } else {
            let _ = write!(self.out, "{value}");
        }
    }

    pub(crate) fn string(&mut self, value: &str) {
        self.begin_value();
        self.push_escaped(value);
    }

    // Comma/newline bookkeeping shared by array elements and object keys.
    // Values following a key were already positioned by `key`.
    fn begin_value(&mut self) {
        if self.has_key {
            self.has_key = false;
            return;
        }
        if self.stack.is_empty() {
            return;
        }
        let needs_comma = self.bump_count();
        if needs_comma {
            self.out.push(',');
        }
        if self.pretty {
            self.out.push('\n');
            self.push_indent();
        }
    }

    fn bump_count(&mut self) -> bool {
        match self.stack.last_mut() {
            Some(frame) => {
                let seen = frame.count;
                frame.count += 1;
                seen > 0
            }
            None => false,
        }
    }

    fn push_indent(&mut self) {
        for _ in 0..self.stack.len() {
            self.out.push_str(INDENT);
        }
    }

    fn push_escaped(&mut self, text: &str) {
        let encoded = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
        self.out.push_str(&encoded);
    }
}

#[cfg(test)]
mod tests {
    use super::JsonWriter;
    use serde_json::{Value, json};

    fn write_serde_value(writer: &mut JsonWriter, value: &Value) {
        match value {
            Value::Null => writer.null(),
            Value::Bool(flag) => writer.bool(*flag),
            Value::Number(num) => match num.as_i64() {
                Some(int) => writer.int(int),
                None => writer.double(num.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(text) => writer.string(text),
            Value::Array(items) => {
                writer.start_array();
                for item in items {
                    write_serde_value(writer, item);
                }
                writer.end_array();
            }
            Value::Object(map) => {
                writer.start_object();
                for (key, item) in map {
                    writer.key(key);
                    write_serde_value(writer, item);
                }
                writer.end_object();
            }
        }
    }

    #[test]
    fn compact_output_has_no_whitespace() {
        let mut writer = JsonWriter::new(false);
        writer.start_object();
        writer.key("a");
        writer.int(1);
        writer.key("b");
        writer.start_array();
        writer.int(1);
        writer.double(2.5);
        writer.string("x");
        writer.end_array();
        writer.end_object();
        assert_eq!(writer.finish(), r#"{"a":1,"b":[1,2.5,"x"]}"#);
    }

    #[test]
    fn pretty_output_matches_serde_json_layout() {
        let value = json!({
            "arr": [1, true, null],
            "empty": [],
            "nested": { "x": "y" }
        });
        let mut writer = JsonWriter::new(true);
        write_serde_value(&mut writer, &value);
        let pretty = serde_json::to_string_pretty(&value).expect("pretty");
        assert_eq!(writer.finish(), pretty);
    }

    #[test]
    fn nonfinite_doubles_use_literal_tokens() {
        let mut writer = JsonWriter::new(false);
        writer.start_array();
        writer.double(f64::NAN);
        writer.double(f64::INFINITY);
        writer.double(f64::NEG_INFINITY);
        writer.end_array();
        assert_eq!(writer.finish(), "[NaN,Infinity,-Infinity]");
    }

    #[test]
    fn strings_are_escaped() {
        let mut writer = JsonWriter::new(false);
        writer.string("a\"b\nc");
        assert_eq!(writer.finish(), r#""a\"b\nc""#);
    }

    #[test]
    fn empty_containers_stay_inline_in_pretty_mode() {
        let mut writer = JsonWriter::new(true);
        writer.start_object();
        writer.key("a");
        writer.start_array();
        writer.end_array();
        writer.key("b");
        writer.start_object();
        writer.end_object();
        writer.end_object();
        assert_eq!(writer.finish(), "{\n  \"a\": [],\n  \"b\": {}\n}");
    }
}
