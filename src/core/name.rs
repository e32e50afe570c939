//! Purpose: Normalize arbitrary strings into valid record field names.
//! Exports: `ReplacementStyle`, `NameOptions`, `make_valid_name`.
//! Role: Pure transform applied to JSON object keys during decoding.
//! Invariants: Output is always a valid identifier under the target grammar
//! Invariants: (`[A-Za-z_][A-Za-z0-9_]*`); a given input and option set map
//! Invariants: to exactly one output.
//! Invariants: Prefix and style are validated once at option construction,
//! Invariants: never per field.

use crate::core::error::{Error, ErrorKind};

// Reserved words of the target identifier grammar, sorted for binary search.
const KEYWORDS: &[&str] = &[
    "__FILE__",
    "__LINE__",
    "break",
    "case",
    "catch",
    "classdef",
    "continue",
    "do",
    "else",
    "elseif",
    "end",
    "end_try_catch",
    "end_unwind_protect",
    "endclassdef",
    "endenumeration",
    "endevents",
    "endfor",
    "endfunction",
    "endif",
    "endmethods",
    "endparfor",
    "endproperties",
    "endswitch",
    "endwhile",
    "enumeration",
    "events",
    "for",
    "function",
    "global",
    "if",
    "methods",
    "otherwise",
    "parfor",
    "persistent",
    "properties",
    "return",
    "switch",
    "try",
    "until",
    "unwind_protect",
    "unwind_protect_cleanup",
    "while",
];

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReplacementStyle {
    #[default]
    Underscore,
    Delete,
    Hex,
}

impl ReplacementStyle {
    pub fn parse(text: &str) -> Result<Self, Error> {
        match text.to_ascii_lowercase().as_str() {
            "underscore" => Ok(Self::Underscore),
            "delete" => Ok(Self::Delete),
            "hex" => Ok(Self::Hex),
            _ => Err(Error::new(ErrorKind::Option)
                .with_message(format!("invalid 'ReplacementStyle' value '{text}'"))
                .with_hint("Valid styles are underscore, delete, and hex.")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NameOptions {
    style: ReplacementStyle,
    prefix: String,
}

impl NameOptions {
    pub fn new(style: ReplacementStyle, prefix: impl Into<String>) -> Result<Self, Error> {
        let prefix = prefix.into();
        if !is_valid_identifier(&prefix) || is_keyword(&prefix) {
            return Err(Error::new(ErrorKind::Option)
                .with_message(format!("invalid 'Prefix' value '{prefix}'"))
                .with_hint("The prefix must be a valid, non-reserved identifier."));
        }
        Ok(Self { style, prefix })
    }

    pub fn with_style(mut self, style: ReplacementStyle) -> Self {
        self.style = style;
        self
    }

    pub fn style(&self) -> ReplacementStyle {
        self.style
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for NameOptions {
    fn default() -> Self {
        Self {
            style: ReplacementStyle::Underscore,
            prefix: "x".to_string(),
        }
    }
}

fn is_valid_identifier(text: &str) -> bool {
    let mut bytes = text.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {}
        _ => return false,
    }
    bytes.all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}

fn is_keyword(text: &str) -> bool {
    KEYWORDS.binary_search(&text).is_ok()
}

// ASCII whitespace per the source grammar, including vertical tab.
fn is_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r')
}

fn permitted(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

pub fn make_valid_name(name: &str, options: &NameOptions) -> String {
    if is_valid_identifier(name) && !is_keyword(name) {
        return name.to_string();
    }

    // Title-case a letter that follows an internal whitespace run, then drop
    // all whitespace. The very first non-space character is never changed.
    let mut out = String::with_capacity(name.len());
    let mut previous_space = false;
    let mut seen_non_space = false;
    for ch in name.chars() {
        let mapped = if seen_non_space && previous_space && ch.is_ascii_alphabetic() {
            ch.to_ascii_uppercase()
        } else {
            ch
        };
        previous_space = is_space(mapped);
        seen_non_space |= !previous_space;
        if !previous_space {
            out.push(mapped);
        }
    }

    if out.is_empty() {
        out = options.prefix.clone();
    }

    if is_keyword(&out) {
        let mut chars = out.chars();
        let first = chars
            .next()
            .map(|ch| ch.to_ascii_uppercase())
            .unwrap_or_default();
        out = format!("{}{}{}", options.prefix, first, chars.as_str());
    }

    let leading = out.as_bytes()[0];
    if !leading.is_ascii_alphabetic() && leading != b'_' {
        out = format!("{}{}", options.prefix, out);
    }

    // Style replacement works byte-wise: a multi-byte character is replaced
    // per byte, mirroring the reference transform.
    let replaced: Vec<u8> = match options.style {
        ReplacementStyle::Underscore => out
            .bytes()
            .map(|byte| if permitted(byte) { byte } else { b'_' })
            .collect(),
        ReplacementStyle::Delete => out.bytes().filter(|&byte| permitted(byte)).collect(),
        ReplacementStyle::Hex => {
            let mut bytes = Vec::with_capacity(out.len());
            for byte in out.bytes() {
                if permitted(byte) {
                    bytes.push(byte);
                } else {
                    bytes.extend_from_slice(format!("0x{byte:02X}").as_bytes());
                }
            }
            bytes
        }
    };
    String::from_utf8_lossy(&replaced).into_owned()
}
