//! `tracing` layer that dumps the stack whenever something goes wrong.

use std::fmt;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use super::{Dumper, NOTICE_TARGET};
use crate::stack::{CaptureStack, ExceptionInfo};

type NoticeSink = Box<dyn Fn(&str) + Send + Sync>;

/// Dumps the captured stack on every WARN or ERROR event while
/// `dump_locals` is enabled.
///
/// An `error` field on the event becomes the dump's exception. Notices go to
/// a sink (stderr by default) rather than back through `tracing`, since events
/// raised from inside a layer callback are not dispatched.
pub struct DumpLayer<C> {
    dumper: Dumper,
    capture: C,
    notice: NoticeSink,
    // Serializes dumps from concurrent threads so appends do not interleave.
    lock: Mutex<()>,
}

impl<C> DumpLayer<C>
where
    C: CaptureStack + Send + Sync + 'static,
{
    pub fn new(dumper: Dumper, capture: C) -> Self {
        Self {
            dumper,
            capture,
            notice: Box::new(|notice| eprintln!("{notice}")),
            lock: Mutex::new(()),
        }
    }

    pub fn with_notice_sink(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.notice = Box::new(sink);
        self
    }

    pub fn dumper(&self) -> &Dumper {
        &self.dumper
    }

    fn should_dump(&self, event: &Event<'_>) -> bool {
        let meta = event.metadata();
        self.dumper.config().dump_locals
            && *meta.level() <= Level::WARN
            && meta.target() != NOTICE_TARGET
    }
}

impl<S, C> Layer<S> for DumpLayer<C>
where
    S: Subscriber,
    C: CaptureStack + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !self.should_dump(event) {
            return;
        }

        let mut fields = EventFields::default();
        event.record(&mut fields);
        let exception = fields
            .error
            .map(|error| ExceptionInfo::new(event.metadata().level().as_str(), error));

        let _guard = self.lock.lock();
        let stack = self.capture.capture();
        match self.dumper.dump(&stack, exception.as_ref()) {
            Ok(report) => {
                if let Some(notice) = report.notice() {
                    (self.notice)(&notice);
                }
            }
            Err(e) => (self.notice)(&format!("Failed to dump stack and locals: {e}")),
        }
    }
}

#[derive(Default)]
struct EventFields {
    error: Option<String>,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "error" {
            self.error = Some(value.to_string());
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        if field.name() == "error" {
            self.error = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "error" {
            self.error = Some(format!("{value:?}"));
        }
    }
}
