//! Recursive value formatter.
//!
//! Renders one [`Value`] as assignment-style lines, `<path> = <rendering>`.
//! Mappings, records and known external records expand into a header line
//! followed by their children, indented one level per depth. Everything else,
//! sequences and sets included, is a single leaf line.
//!
//! Traversal is an explicit depth-first walk: a composite's identity is pushed onto
//! the cycle guard before its children are visited and popped once they are done,
//! so only genuine ancestor cycles are cut short.

pub mod scrub;

pub use scrub::Scrubber;

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use crate::value::{placeholder, safe_repr, Identity, Key, Value};

pub const CIRCULAR_REFERENCE: &str = "<circular reference>";
pub const INDENT: &str = "  ";
pub const DEFAULT_MAX_REPR_LEN: usize = 8192;

/// Per-dump traversal state.
#[derive(Debug, Default)]
pub struct FormatterState {
    active: HashSet<Identity>,
    visits: usize,
}

impl FormatterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values visited so far, circular markers included.
    pub fn visits(&self) -> usize {
        self.visits
    }

    pub fn is_active(&self, identity: Identity) -> bool {
        self.active.contains(&identity)
    }

    /// Number of composites on the current descent path.
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// Forget the current descent path after an aborted traversal.
    pub(crate) fn reset(&mut self) {
        self.active.clear();
    }
}

enum Class {
    Circular,
    KnownExternalRecord {
        identity: Identity,
        header: String,
        attributes: Vec<(String, Value)>,
    },
    Mapping {
        identity: Identity,
        header: String,
        entries: Vec<(Key, Value)>,
    },
    Record {
        identity: Identity,
        header: String,
        attributes: Vec<(String, Value)>,
    },
    Leaf,
}

enum Step {
    Visit {
        path: String,
        value: Value,
        depth: usize,
    },
    /// Holds the composite so its address cannot be reused while it is on the guard.
    Leave(Value),
}

#[derive(Debug, Clone)]
pub struct Formatter {
    max_repr_len: usize,
    scrubber: Option<Scrubber>,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            max_repr_len: DEFAULT_MAX_REPR_LEN,
            scrubber: None,
        }
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_repr_len(mut self, max_repr_len: usize) -> Self {
        self.max_repr_len = max_repr_len;
        self
    }

    pub fn with_scrubber(mut self, scrubber: Scrubber) -> Self {
        self.scrubber = Some(scrubber);
        self
    }

    pub fn max_repr_len(&self) -> usize {
        self.max_repr_len
    }

    /// Format `value` under `path` into a fresh line buffer.
    pub fn format(&self, path: &str, value: &Value, state: &mut FormatterState) -> Vec<String> {
        let mut lines = Vec::new();
        self.format_into(path, value, state, &mut lines);
        lines
    }

    pub fn format_into(
        &self,
        path: &str,
        value: &Value,
        state: &mut FormatterState,
        out: &mut Vec<String>,
    ) {
        let mut work = vec![Step::Visit {
            path: path.to_string(),
            value: value.clone(),
            depth: 0,
        }];

        while let Some(step) = work.pop() {
            let (path, value, depth) = match step {
                Step::Leave(value) => {
                    if let Some(identity) = value.identity() {
                        state.active.remove(&identity);
                    }
                    continue;
                }
                Step::Visit { path, value, depth } => (path, value, depth),
            };
            state.visits += 1;
            let indent = INDENT.repeat(depth);

            let (identity, header, children) = match self.classify(&value, state) {
                Class::Circular => {
                    out.push(format!("{indent}{path} = {CIRCULAR_REFERENCE}"));
                    continue;
                }
                Class::Leaf => {
                    self.leaf(&indent, &path, &value, out);
                    continue;
                }
                Class::KnownExternalRecord {
                    identity,
                    header,
                    attributes,
                } => (identity, header, attribute_paths(&path, attributes)),
                Class::Mapping {
                    identity,
                    header,
                    entries,
                } => (identity, header, entry_paths(&path, entries)),
                Class::Record {
                    identity,
                    header,
                    attributes,
                } => (identity, header, attribute_paths(&path, attributes)),
            };

            out.push(format!("{indent}{path} = {header}"));
            state.active.insert(identity);
            work.push(Step::Leave(value));
            for (child_path, child) in children.into_iter().rev() {
                work.push(Step::Visit {
                    path: child_path,
                    value: child,
                    depth: depth + 1,
                });
            }
        }
    }

    /// Format like [`format`](Self::format), but a panic raised by an
    /// [`Inspect`](crate::value::Inspect) hook collapses the whole block into one
    /// placeholder line instead of unwinding into the caller.
    ///
    /// The process panic hook still runs, so the default hook prints the panic
    /// message to stderr before the placeholder is produced.
    pub fn format_guarded(
        &self,
        path: &str,
        value: &Value,
        state: &mut FormatterState,
    ) -> Vec<String> {
        let formatted =
            panic::catch_unwind(AssertUnwindSafe(|| self.format(path, value, &mut *state)));
        match formatted {
            Ok(lines) => lines,
            Err(payload) => {
                // The partial descent path is stale.
                state.reset();
                tracing::warn!(
                    path,
                    panic = panic_message(payload.as_ref()),
                    "Formatting panicked, using placeholder"
                );
                vec![format!("{path} = {}", placeholder(&value.type_name()))]
            }
        }
    }

    fn classify(&self, value: &Value, state: &FormatterState) -> Class {
        if let Some(identity) = value.identity() {
            if state.is_active(identity) {
                return Class::Circular;
            }
        }

        match value {
            Value::Object(object) => {
                let identity = Identity::of_rc(object);
                if let Some(attributes) = object.known_attributes() {
                    let header = match object.repr() {
                        Ok(text) if !text.contains('\n') => text,
                        _ => format!("<{}>", object.type_name()),
                    };
                    return Class::KnownExternalRecord {
                        identity,
                        header,
                        attributes,
                    };
                }
                if let Some(entries) = object.entries() {
                    return Class::Mapping {
                        identity,
                        header: format!("<{}>", object.type_name()),
                        entries,
                    };
                }
                if let Some(attributes) = object.attributes() {
                    return Class::Record {
                        identity,
                        header: format!("<{}>", object.type_name()),
                        attributes,
                    };
                }
                Class::Leaf
            }
            Value::Map(rc) => match rc.try_borrow() {
                Ok(map) => Class::Mapping {
                    identity: Identity::of_rc(rc),
                    header: format!("<{}>", map.type_name()),
                    entries: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                },
                Err(_) => Class::Leaf,
            },
            Value::Record(rc) => match rc.try_borrow() {
                Ok(record) => Class::Record {
                    identity: Identity::of_rc(rc),
                    header: format!("<{}>", record.type_name()),
                    attributes: record.fields().to_vec(),
                },
                Err(_) => Class::Leaf,
            },
            _ => Class::Leaf,
        }
    }

    fn leaf(&self, indent: &str, path: &str, value: &Value, out: &mut Vec<String>) {
        let mut text = safe_repr(value, self.max_repr_len);
        if let Some(scrubber) = &self.scrubber {
            text = scrubber.scrub_string(&text);
        }

        if text.contains('\n') {
            out.push(format!("{indent}{path} = \\"));
            for line in text.lines() {
                out.push(format!("{indent}{INDENT}{line}"));
            }
        } else {
            out.push(format!("{indent}{path} = {text}"));
        }
    }
}

fn attribute_paths(path: &str, attributes: Vec<(String, Value)>) -> Vec<(String, Value)> {
    attributes
        .into_iter()
        .map(|(name, value)| (format!("{path}.{name}"), value))
        .collect()
}

fn entry_paths(path: &str, entries: Vec<(Key, Value)>) -> Vec<(String, Value)> {
    entries
        .into_iter()
        .map(|(key, value)| (format!("{path}[{}]", key.repr()), value))
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// Format with default settings and a fresh state.
pub fn format_value(path: &str, value: &Value) -> Vec<String> {
    Formatter::new().format(path, value, &mut FormatterState::new())
}
