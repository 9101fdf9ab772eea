//! Recorded stack snapshots in JSON form.
//!
//! ```json
//! {
//!   "frames": [
//!     {"function": "load", "file": "app/load.py", "line": 33, "module": "app.load",
//!      "locals": {"user_id": 123456790}}
//!   ],
//!   "exception": {"type": "KeyError", "message": "'profile'"}
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::stack::{CaptureStack, ExceptionInfo, Frame, Stack};
use crate::value::Value;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub frames: Vec<FrameSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    /// Local name to JSON value, in document order.
    #[serde(default)]
    pub locals: Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionSnapshot {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<ExceptionSnapshot>>,
}

impl Snapshot {
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read_from(path: &Path) -> Result<Self, SnapshotError> {
        let contents = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot = Self::from_json_str(&contents)?;
        tracing::debug!(
            path = %path.display(),
            frames = snapshot.frames.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    pub fn stack(&self) -> Stack {
        self.frames.iter().map(FrameSnapshot::to_frame).collect()
    }

    pub fn exception(&self) -> Option<ExceptionInfo> {
        self.exception.as_ref().map(ExceptionSnapshot::to_exception)
    }
}

impl CaptureStack for Snapshot {
    fn capture(&self) -> Stack {
        self.stack()
    }
}

impl FrameSnapshot {
    pub fn to_frame(&self) -> Frame {
        Frame {
            function: self.function.clone(),
            file: self.file.clone(),
            line: self.line,
            module: self.module.clone(),
            context: self.context.clone(),
            locals: self
                .locals
                .iter()
                .map(|(name, value)| (name.clone(), Value::from(value.clone())))
                .collect(),
        }
    }
}

impl ExceptionSnapshot {
    /// Convert the whole cause chain, outermost first.
    pub fn to_exception(&self) -> ExceptionInfo {
        let mut links = vec![self];
        let mut next = self.cause.as_deref();
        while let Some(link) = next {
            links.push(link);
            next = link.cause.as_deref();
        }

        let mut cause: Option<Rc<ExceptionInfo>> = None;
        for link in links[1..].iter().rev() {
            let info = link.to_info();
            info.set_cause(cause.take());
            cause = Some(Rc::new(info));
        }
        let outer = self.to_info();
        outer.set_cause(cause);
        outer
    }

    fn to_info(&self) -> ExceptionInfo {
        let info = ExceptionInfo::new(&self.type_name, &self.message);
        match &self.args {
            // Exception arguments read as a tuple.
            Some(serde_json::Value::Array(items)) => {
                info.with_args(Value::tuple(items.iter().cloned().map(Value::from)))
            }
            Some(args) => info.with_args(Value::from(args.clone())),
            None => info,
        }
    }
}
