//! Assemble frames and an optional error chain into a dump document.

use std::io::{self, Write};

use super::exception::{render_exception, ExceptionInfo};
use super::frame::{render_frame, Frame};
use crate::format::{Formatter, FormatterState};

/// Dotted-namespace membership: `pkg` and `pkg.sub` belong to `pkg`, `pkg_other` does not.
pub fn in_package(module: &str, package: &str) -> bool {
    module == package
        || module
            .strip_prefix(package)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Frames that belong to `package_name`, in input order.
///
/// A frame without a module inherits the module of the nearest preceding frame
/// that has one; a module-less frame with no such predecessor is dropped.
pub fn scope_frames<'a>(stack: &'a [Frame], package_name: Option<&str>) -> Vec<&'a Frame> {
    let Some(package) = package_name else {
        return stack.iter().collect();
    };

    let mut kept = Vec::new();
    let mut inherited: Option<&str> = None;
    for frame in stack {
        if let Some(module) = frame.module.as_deref() {
            inherited = Some(module);
        }
        if inherited.is_some_and(|module| in_package(module, package)) {
            kept.push(frame);
        }
    }
    kept
}

#[derive(Debug, Clone, Default)]
pub struct StackSerializer {
    formatter: Formatter,
    package_name: Option<String>,
}

impl StackSerializer {
    pub fn new(formatter: Formatter) -> Self {
        Self {
            formatter,
            package_name: None,
        }
    }

    pub fn with_package_name(mut self, package_name: Option<String>) -> Self {
        self.package_name = package_name;
        self
    }

    pub fn package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    pub fn serialize(&self, stack: &[Frame], exception: Option<&ExceptionInfo>) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _frames = self.write_to(&mut buf, stack, exception);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Stream the document into `sink`, returning the number of frames written.
    pub fn write_to<W: Write + ?Sized>(
        &self,
        sink: &mut W,
        stack: &[Frame],
        exception: Option<&ExceptionInfo>,
    ) -> io::Result<usize> {
        let frames = scope_frames(stack, self.package_name());
        tracing::debug!(
            total = stack.len(),
            kept = frames.len(),
            package = ?self.package_name,
            "Serializing stack"
        );

        let mut state = FormatterState::new();
        for frame in &frames {
            write_block(sink, &render_frame(frame, &self.formatter, &mut state))?;
        }
        if let Some(exception) = exception {
            write_block(sink, &render_exception(exception, &self.formatter, &mut state))?;
        }
        sink.flush()?;
        Ok(frames.len())
    }
}

fn write_block<W: Write + ?Sized>(sink: &mut W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        sink.write_all(line.as_bytes())?;
        sink.write_all(b"\n")?;
    }
    sink.write_all(b"\n")
}

/// Serialize with default formatting.
pub fn serialize(
    stack: &[Frame],
    package_name: Option<&str>,
    exception: Option<&ExceptionInfo>,
) -> String {
    StackSerializer::default()
        .with_package_name(package_name.map(str::to_string))
        .serialize(stack, exception)
}
