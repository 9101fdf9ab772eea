//! Captured call frames and their rendering.

use crate::format::{Formatter, FormatterState, INDENT};
use crate::value::Value;

/// Snapshot of one call-stack activation.
///
/// Location fields are optional because capture facilities do not always know
/// them; missing pieces are left out of the header.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub function: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    /// Dotted name of the module the frame's code belongs to.
    pub module: Option<String>,
    /// Short source snippet for the current line.
    pub context: Option<String>,
    /// Locals in definition order.
    pub locals: Vec<(String, Value)>,
}

impl Frame {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: Some(function.into()),
            file: Some(file.into()),
            line: Some(line),
            ..Self::default()
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_local(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.locals.push((name.into(), value.into()));
        self
    }

    /// `Locals from file "<file>", line <n>, in <function>:`
    pub fn header(&self) -> String {
        let mut parts = Vec::new();
        if let Some(file) = &self.file {
            parts.push(format!("from file \"{file}\""));
        }
        if let Some(line) = self.line {
            if parts.is_empty() {
                parts.push(format!("at line {line}"));
            } else {
                parts.push(format!("line {line}"));
            }
        }
        if let Some(function) = &self.function {
            parts.push(format!("in {function}"));
        }

        let mut header = String::from("Locals");
        if !parts.is_empty() {
            header.push(' ');
            header.push_str(&parts.join(", "));
        }
        if let Some(context) = self.context.as_deref().map(str::trim) {
            if !context.is_empty() && !context.contains('\n') {
                header.push_str(&format!(" ({context})"));
            }
        }
        header.push(':');
        header
    }
}

/// Render the frame header followed by one formatted block per local.
pub fn render_frame(frame: &Frame, formatter: &Formatter, state: &mut FormatterState) -> Vec<String> {
    let mut lines = vec![frame.header()];

    for (name, value) in &frame.locals {
        let block = formatter.format_guarded(name, value, state);
        lines.extend(block.into_iter().map(|line| format!("{INDENT}{line}")));
    }

    lines
}
