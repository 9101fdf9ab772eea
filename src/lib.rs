//! Human-readable dumps of call stacks, local variables and error chains.
//!
//! A [`Dumper`] renders a captured [`Stack`] (and optionally an in-flight
//! error as [`ExceptionInfo`]) into a text document:
//!
//! ```text
//! Locals from file "app/load.py", line 33, in load:
//!   example = <map>
//!     example['user_id'] = 123456790
//!
//! Exception:
//!   KeyError: 'profile'
//! ```

pub mod cli;
pub mod config;
pub mod dump;
pub mod format;
pub mod snapshot;
pub mod stack;
pub mod util;
pub mod value;

pub use config::{ConfigError, DumpConfig};
pub use dump::{DumpError, DumpLayer, DumpReport, DumpScope, DumpTarget, Dumper, NOTICE_TARGET};
pub use format::{format_value, Formatter, FormatterState, Scrubber};
pub use snapshot::{Snapshot, SnapshotError};
pub use stack::{serialize, CaptureStack, ExceptionInfo, Frame, Stack, StackSerializer};
pub use value::{HttpRequest, HttpResponse, Inspect, Key, Mapping, Record, Value};
