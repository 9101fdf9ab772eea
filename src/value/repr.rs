//! Safe single-line text conversion for leaf values.

use thiserror::Error;

use super::{Identity, Key, SeqKind, Value};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReprError {
    #[error("text conversion failed: {0}")]
    Failed(String),
    #[error("value is mutably borrowed")]
    Borrowed,
    #[error("text form exceeds {limit} bytes")]
    TooLong { limit: usize },
}

impl ReprError {
    pub fn failed(reason: impl Into<String>) -> Self {
        ReprError::Failed(reason.into())
    }
}

/// Text used when a value has no usable textual form.
pub fn placeholder(type_name: &str) -> String {
    format!("<unrepresentable value of type {type_name}>")
}

/// Textual form of `value`, or the placeholder if conversion fails or the text
/// grows beyond `limit` bytes.
pub fn safe_repr(value: &Value, limit: usize) -> String {
    match try_repr(value, limit) {
        Ok(text) => text,
        Err(e) => {
            let type_name = value.type_name();
            tracing::debug!(type_name = %type_name, error = %e, "Falling back to placeholder");
            placeholder(&type_name)
        }
    }
}

pub fn try_repr(value: &Value, limit: usize) -> Result<String, ReprError> {
    let mut writer = ReprWriter {
        out: String::new(),
        limit,
        active: Vec::new(),
    };
    writer.value(value)?;
    Ok(writer.out)
}

impl Key {
    /// Literal form used inside `path[...]` expressions.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        write_key(self, &mut out);
        out
    }
}

fn write_key(key: &Key, out: &mut String) {
    match key {
        Key::Null => out.push_str("null"),
        Key::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Key::Int(i) => out.push_str(&i.to_string()),
        Key::Str(s) => quote_str(s, out),
        Key::Bytes(b) => quote_bytes(b, out),
        Key::Tuple(items) => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_key(item, out);
            }
            if items.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
    }
}

struct ReprWriter {
    out: String,
    limit: usize,
    // Containers currently being written; nested repeats print as `[...]`.
    active: Vec<Identity>,
}

impl ReprWriter {
    fn push(&mut self, text: &str) -> Result<(), ReprError> {
        self.out.push_str(text);
        self.check()
    }

    fn check(&self) -> Result<(), ReprError> {
        if self.out.len() > self.limit {
            return Err(ReprError::TooLong { limit: self.limit });
        }
        Ok(())
    }

    fn value(&mut self, value: &Value) -> Result<(), ReprError> {
        match value {
            Value::Null => self.push("null"),
            Value::Bool(b) => self.push(if *b { "true" } else { "false" }),
            Value::Int(i) => self.push(&i.to_string()),
            Value::Float(x) => self.push(&float_repr(*x)),
            Value::Str(s) => {
                quote_str(s, &mut self.out);
                self.check()
            }
            Value::Bytes(b) => {
                quote_bytes(b, &mut self.out);
                self.check()
            }
            Value::Seq(rc) => {
                let id = Identity::of_rc(rc);
                let seq = rc.try_borrow().map_err(|_| ReprError::Borrowed)?;
                let (open, close, recursive) = match seq.kind {
                    SeqKind::List => ("[", "]", "[...]"),
                    SeqKind::Tuple => ("(", ")", "(...)"),
                    SeqKind::Set if seq.items.is_empty() => return self.push("set()"),
                    SeqKind::Set => ("{", "}", "{...}"),
                    SeqKind::Deque => ("deque([", "])", "deque([...])"),
                };
                if self.active.contains(&id) {
                    return self.push(recursive);
                }
                self.active.push(id);
                self.push(open)?;
                for (i, item) in seq.items.iter().enumerate() {
                    if i > 0 {
                        self.push(", ")?;
                    }
                    self.value(item)?;
                }
                if seq.kind == SeqKind::Tuple && seq.items.len() == 1 {
                    self.push(",")?;
                }
                self.push(close)?;
                self.active.pop();
                Ok(())
            }
            Value::Map(rc) => {
                let id = Identity::of_rc(rc);
                if self.active.contains(&id) {
                    return self.push("{...}");
                }
                let map = rc.try_borrow().map_err(|_| ReprError::Borrowed)?;
                self.active.push(id);
                self.push("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        self.push(", ")?;
                    }
                    write_key(key, &mut self.out);
                    self.push(": ")?;
                    self.value(item)?;
                }
                self.push("}")?;
                self.active.pop();
                Ok(())
            }
            Value::Record(rc) => {
                let id = Identity::of_rc(rc);
                let record = rc.try_borrow().map_err(|_| ReprError::Borrowed)?;
                if self.active.contains(&id) {
                    return self.push(&format!("{}(...)", record.type_name()));
                }
                self.active.push(id);
                self.push(record.type_name())?;
                self.push("(")?;
                for (i, (name, item)) in record.fields().iter().enumerate() {
                    if i > 0 {
                        self.push(", ")?;
                    }
                    self.push(name)?;
                    self.push("=")?;
                    self.value(item)?;
                }
                self.push(")")?;
                self.active.pop();
                Ok(())
            }
            Value::Object(object) => {
                let id = Identity::of_rc(object);
                if self.active.contains(&id) {
                    return self.push(&format!("<{} ...>", object.type_name()));
                }
                let text = object.repr()?;
                self.push(&text)
            }
        }
    }
}

fn float_repr(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x == f64::INFINITY {
        "inf".to_string()
    } else if x == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{x:?}")
    }
}

fn quote_str(s: &str, out: &mut String) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() && (c as u32) < 0x100 => {
                out.push_str(&format!("\\x{:02x}", c as u32))
            }
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
}

fn quote_bytes(bytes: &[u8], out: &mut String) {
    out.push_str("b'");
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out.push('\'');
}
