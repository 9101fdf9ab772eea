//! Scoped dumping: dump when a guarded block fails or panics.

use std::error::Error;

use super::{Dumper, NOTICE_TARGET};
use crate::stack::{CaptureStack, ExceptionInfo};

/// Guard that dumps the captured stack when its block fails.
///
/// Call [`DumpScope::finish`] with the block's result. A scope dropped
/// without `finish` while the thread is panicking dumps with a `panic`
/// exception; an ordinary early drop does nothing.
///
/// Dump failures are logged and never replace the block's own error.
pub struct DumpScope<'d, C: CaptureStack + ?Sized> {
    dumper: &'d Dumper,
    capture: &'d C,
    armed: bool,
}

impl<'d, C: CaptureStack + ?Sized> DumpScope<'d, C> {
    pub fn new(dumper: &'d Dumper, capture: &'d C) -> Self {
        Self {
            dumper,
            capture,
            armed: true,
        }
    }

    /// Dump if `result` is an error, then return it unchanged.
    pub fn finish<T, E: Error + 'static>(self, result: Result<T, E>) -> Result<T, E> {
        self.finish_with(result, |e| ExceptionInfo::from_error(e))
    }

    /// Like [`finish`](Self::finish) for errors that need their own description,
    /// e.g. `scope.finish_with(result, ExceptionInfo::from_anyhow)`.
    pub fn finish_with<T, E>(
        mut self,
        result: Result<T, E>,
        describe: impl FnOnce(&E) -> ExceptionInfo,
    ) -> Result<T, E> {
        self.armed = false;
        if let Err(e) = &result {
            self.dump(&describe(e));
        }
        result
    }

    /// Leave the scope without dumping.
    pub fn disarm(mut self) {
        self.armed = false;
    }

    fn dump(&self, exception: &ExceptionInfo) {
        let stack = self.capture.capture();
        match self.dumper.dump(&stack, Some(exception)) {
            Ok(report) => {
                if let Some(notice) = report.notice() {
                    tracing::error!(target: NOTICE_TARGET, "{notice}");
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    exception = exception.type_name(),
                    "Failed to dump stack and locals"
                );
            }
        }
    }
}

impl<C: CaptureStack + ?Sized> Drop for DumpScope<'_, C> {
    fn drop(&mut self) {
        if self.armed && std::thread::panicking() {
            self.armed = false;
            self.dump(&ExceptionInfo::new(
                "panic",
                "thread panicked inside a dump scope",
            ));
        }
    }
}
