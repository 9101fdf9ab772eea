//! Call-stack snapshots and their serialization.

pub mod exception;
pub mod frame;
pub mod serializer;

pub use exception::{render_exception, ExceptionInfo};
pub use frame::{render_frame, Frame};
pub use serializer::{in_package, scope_frames, serialize, StackSerializer};

/// Frames in caller-supplied order.
pub type Stack = Vec<Frame>;

/// Source of stack snapshots, e.g. a debugger hook or a recorded snapshot file.
pub trait CaptureStack {
    fn capture(&self) -> Stack;
}

impl<F> CaptureStack for F
where
    F: Fn() -> Stack,
{
    fn capture(&self) -> Stack {
        self()
    }
}
