//! Dump orchestration: pick a destination, serialize, report where it went.

pub mod layer;
pub mod scope;

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::config::DumpConfig;
use crate::format::{Formatter, Scrubber};
use crate::stack::{CaptureStack, ExceptionInfo, Frame, StackSerializer};
use crate::util::paths::{resolve_path, temp_prefix};

pub use layer::DumpLayer;
pub use scope::DumpScope;

/// Target for notice events; [`DumpLayer`] ignores events sent here.
pub const NOTICE_TARGET: &str = "framedump::notice";

#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("failed to open dump file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create temporary dump file: {0}")]
    TempFile(#[source] io::Error),
    #[error("failed to write dump: {0}")]
    Write(#[from] io::Error),
}

/// Where a dump is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpTarget {
    /// Append to this file, creating it when missing.
    Path(PathBuf),
    /// A new uniquely named file in the temp directory, kept after the dump.
    Temp,
    /// Return the document in the report.
    Memory,
}

impl DumpTarget {
    pub fn from_config(config: &DumpConfig) -> Self {
        match &config.dump_path {
            Some(path) => Self::Path(path.clone()),
            None => Self::Temp,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpReport {
    /// File the dump went to, for file targets.
    pub location: Option<PathBuf>,
    /// Rendered document, for memory targets.
    pub document: Option<String>,
    pub frames_written: usize,
}

impl DumpReport {
    /// Human-readable pointer to the dump file.
    pub fn notice(&self) -> Option<String> {
        self.location.as_deref().map(notice_for)
    }
}

fn notice_for(path: &Path) -> String {
    let name = path.display();
    format!(
        "Dumped stack and locals to \"{name}\"\n\
         Copy and paste the following to view:\n\n    cat '{name}'\n"
    )
}

/// Renders stacks with one configuration and writes them to dump targets.
#[derive(Debug, Clone)]
pub struct Dumper {
    config: DumpConfig,
    serializer: StackSerializer,
}

impl Default for Dumper {
    fn default() -> Self {
        Self::new(DumpConfig::default())
    }
}

impl Dumper {
    pub fn new(config: DumpConfig) -> Self {
        let mut formatter = Formatter::new().with_max_repr_len(config.max_repr_len);
        if config.redact {
            formatter = formatter.with_scrubber(Scrubber::with_extra_patterns(&config.redact_patterns));
        }
        let serializer =
            StackSerializer::new(formatter).with_package_name(config.package_name.clone());
        Self { config, serializer }
    }

    pub fn config(&self) -> &DumpConfig {
        &self.config
    }

    pub fn serializer(&self) -> &StackSerializer {
        &self.serializer
    }

    pub fn render(&self, stack: &[Frame], exception: Option<&ExceptionInfo>) -> String {
        self.serializer.serialize(stack, exception)
    }

    /// Write the document to an arbitrary sink. Returns the number of frames written.
    pub fn write_to<W: Write + ?Sized>(
        &self,
        sink: &mut W,
        stack: &[Frame],
        exception: Option<&ExceptionInfo>,
    ) -> Result<usize, DumpError> {
        Ok(self.serializer.write_to(sink, stack, exception)?)
    }

    /// Dump to the configured target: the explicit path, or a temp file.
    pub fn dump(
        &self,
        stack: &[Frame],
        exception: Option<&ExceptionInfo>,
    ) -> Result<DumpReport, DumpError> {
        self.dump_to(&DumpTarget::from_config(&self.config), stack, exception)
    }

    pub fn dump_to(
        &self,
        target: &DumpTarget,
        stack: &[Frame],
        exception: Option<&ExceptionInfo>,
    ) -> Result<DumpReport, DumpError> {
        let report = match target {
            DumpTarget::Path(path) => self.append_to_file(path, stack, exception)?,
            DumpTarget::Temp => self.write_temp_file(stack, exception)?,
            DumpTarget::Memory => {
                let mut buf = Vec::new();
                let frames_written = self.write_to(&mut buf, stack, exception)?;
                DumpReport {
                    location: None,
                    document: Some(String::from_utf8_lossy(&buf).into_owned()),
                    frames_written,
                }
            }
        };

        if let Some(path) = &report.location {
            tracing::debug!(
                path = %path.display(),
                frames = report.frames_written,
                "Dumped stack and locals"
            );
        }
        Ok(report)
    }

    fn append_to_file(
        &self,
        path: &Path,
        stack: &[Frame],
        exception: Option<&ExceptionInfo>,
    ) -> Result<DumpReport, DumpError> {
        let open_error = |source| DumpError::Open {
            path: path.to_path_buf(),
            source,
        };
        let path = resolve_path(path).map_err(open_error)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_error)?;

        let mut writer = BufWriter::new(file);
        // Separates consecutive dumps appended to the same file.
        writeln!(writer, "--- {} ---", Utc::now().to_rfc3339())?;
        let frames_written = self.write_to(&mut writer, stack, exception)?;
        writer.flush()?;

        Ok(DumpReport {
            location: Some(path),
            document: None,
            frames_written,
        })
    }

    fn write_temp_file(
        &self,
        stack: &[Frame],
        exception: Option<&ExceptionInfo>,
    ) -> Result<DumpReport, DumpError> {
        let dir = match &self.config.temp_dir {
            Some(dir) => resolve_path(dir).map_err(DumpError::TempFile)?,
            None => std::env::temp_dir(),
        };
        let prefix = temp_prefix(self.config.package_name.as_deref());
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".txt")
            .tempfile_in(&dir)
            .map_err(DumpError::TempFile)?;

        let frames_written = {
            let mut writer = BufWriter::new(file.as_file_mut());
            let frames_written = self.write_to(&mut writer, stack, exception)?;
            writer.flush()?;
            frames_written
        };
        let (_file, path) = file.keep().map_err(|e| DumpError::TempFile(e.error))?;

        Ok(DumpReport {
            location: Some(path),
            document: None,
            frames_written,
        })
    }

    /// Run `f`; if it fails, dump the captured stack with the error chain and
    /// hand the error back unchanged.
    pub fn run<C, T, E, F>(&self, capture: &C, f: F) -> Result<T, E>
    where
        C: CaptureStack + ?Sized,
        E: std::error::Error + 'static,
        F: FnOnce() -> Result<T, E>,
    {
        let scope = self.scope(capture);
        let result = f();
        scope.finish(result)
    }

    /// Guard that dumps on error results, or when dropped during a panic.
    pub fn scope<'d, C>(&'d self, capture: &'d C) -> DumpScope<'d, C>
    where
        C: CaptureStack + ?Sized,
    {
        DumpScope::new(self, capture)
    }
}
