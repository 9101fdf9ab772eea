//! In-flight error chains.

use std::cell::RefCell;
use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::rc::Rc;

use crate::format::{Formatter, FormatterState, CIRCULAR_REFERENCE, INDENT};
use crate::value::{Identity, Value};

/// An error with its type, message and optional cause.
///
/// Causes are shared and can be replaced after construction, so a chain may
/// loop back on itself; rendering stops at the first repeated link.
pub struct ExceptionInfo {
    type_name: String,
    message: String,
    args: Option<Value>,
    cause: RefCell<Option<Rc<ExceptionInfo>>>,
}

impl ExceptionInfo {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            args: None,
            cause: RefCell::new(None),
        }
    }

    pub fn with_args(mut self, args: impl Into<Value>) -> Self {
        self.args = Some(args.into());
        self
    }

    pub fn with_cause(self, cause: impl Into<Rc<ExceptionInfo>>) -> Self {
        self.set_cause(Some(cause.into()));
        self
    }

    pub fn set_cause(&self, cause: Option<Rc<ExceptionInfo>>) {
        *self.cause.borrow_mut() = cause;
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn args(&self) -> Option<&Value> {
        self.args.as_ref()
    }

    pub fn cause(&self) -> Option<Rc<ExceptionInfo>> {
        self.cause.try_borrow().ok().and_then(|cause| cause.clone())
    }

    /// Build from a Rust error and its `source()` chain.
    ///
    /// The outer type name comes from `E`; for sources only the trait object is
    /// known, so the name is taken from the leading identifier of their `Debug`
    /// output (`ParseIntError { .. }`), or `Error` when there is none.
    pub fn from_error<E: Error + 'static>(err: &E) -> Self {
        let outer = Self::new(short_type_name::<E>(), err.to_string());
        outer.set_cause(err.source().map(|source| Rc::new(Self::from_dyn_error(source))));
        outer
    }

    /// Build from a trait object error chain.
    pub fn from_dyn_error(err: &(dyn Error + 'static)) -> Self {
        let mut links = Vec::new();
        let mut next = Some(err);
        while let Some(link) = next {
            links.push((debug_type_name(link), link.to_string()));
            next = link.source();
        }
        Self::from_links(links)
    }

    /// Build from an `anyhow::Error` context chain.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        Self::from_links(
            err.chain()
                .map(|link| (debug_type_name(link), link.to_string()))
                .collect(),
        )
    }

    fn from_links(links: Vec<(String, String)>) -> Self {
        let mut links = links.into_iter();
        let Some((type_name, message)) = links.next() else {
            return Self::new("Error", "");
        };
        let outer = Self::new(type_name, message);

        let mut cause = None;
        for (type_name, message) in links.rev() {
            let link = Self::new(type_name, message);
            link.set_cause(cause.take());
            cause = Some(Rc::new(link));
        }
        outer.set_cause(cause);
        outer
    }
}

impl fmt::Debug for ExceptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionInfo")
            .field("type_name", &self.type_name)
            .field("message", &self.message)
            .field("has_cause", &self.cause().is_some())
            .finish()
    }
}

fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    // Strip module paths but keep generic arguments readable.
    let base = full.split('<').next().unwrap_or(full);
    let short = base.rsplit("::").next().unwrap_or(base);
    format!("{short}{}", &full[base.len()..])
}

fn debug_type_name(err: &(dyn Error + 'static)) -> String {
    let debug = format!("{err:?}");
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    let rest = &debug[name.len()..];
    let looks_like_type = name.chars().next().is_some_and(char::is_uppercase)
        && (rest.is_empty() || rest.starts_with([' ', '(', '{']));
    if looks_like_type {
        name
    } else {
        "Error".to_string()
    }
}

/// Render `Exception:` followed by the chain, outer to inner.
pub fn render_exception(
    exception: &ExceptionInfo,
    formatter: &Formatter,
    state: &mut FormatterState,
) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::from([Identity::of_ref(exception)]);
    let mut circular = false;
    let mut next = exception.cause();
    while let Some(link) = next {
        if !seen.insert(Identity::of_rc(&link)) {
            circular = true;
            break;
        }
        next = link.cause();
        links.push(link);
    }

    let mut lines = vec!["Exception:".to_string()];
    render_link(exception, 1, formatter, state, &mut lines);
    for (i, link) in links.iter().enumerate() {
        let depth = i + 1;
        lines.push(format!("{}Caused by:", INDENT.repeat(depth)));
        render_link(link, depth + 1, formatter, state, &mut lines);
    }
    if circular {
        let depth = links.len() + 1;
        lines.push(format!("{}Caused by:", INDENT.repeat(depth)));
        lines.push(format!("{}{CIRCULAR_REFERENCE}", INDENT.repeat(depth + 1)));
    }
    lines
}

fn render_link(
    link: &ExceptionInfo,
    depth: usize,
    formatter: &Formatter,
    state: &mut FormatterState,
    lines: &mut Vec<String>,
) {
    let indent = INDENT.repeat(depth);
    lines.push(format!("{indent}{}: {}", link.type_name, one_line(&link.message)));
    if let Some(args) = &link.args {
        for line in formatter.format_guarded("args", args, state) {
            lines.push(format!("{indent}{line}"));
        }
    }
}

fn one_line(message: &str) -> String {
    message.replace('\n', "\\n")
}
