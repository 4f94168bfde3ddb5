//! Logical frames
//!
//! A [`StackSnapshot`] is the inlining-aware view of a thread's stack at one
//! point in time, innermost frame first. Walking it front to back follows the
//! sender chain. Snapshots are never cached: the stack may change as soon as
//! the owning thread resumes.

use crate::call_frame::CallFrame;
use core_types::{Bci, CodeId, MethodId};

/// How a logical frame is executing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// Running in the interpreter
    Interpreted,
    /// Running compiled code (possibly as an inlined scope)
    Compiled(CodeId),
}

/// A logical frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VFrame {
    /// Executing method
    pub method: MethodId,
    /// Current bytecode index
    pub bci: Bci,
    /// Execution mode
    pub mode: FrameMode,
    /// Distance from the innermost logical frame
    pub depth: usize,
    /// Index of the backing physical frame, counted from the stack bottom
    pub physical_index: usize,
}

impl VFrame {
    /// Whether the frame is interpreted
    pub fn is_interpreted_frame(&self) -> bool {
        self.mode == FrameMode::Interpreted
    }

    /// Whether the frame runs compiled code
    pub fn is_compiled_frame(&self) -> bool {
        matches!(self.mode, FrameMode::Compiled(_))
    }

    /// Artifact the frame runs, if compiled
    pub fn code(&self) -> Option<CodeId> {
        match self.mode {
            FrameMode::Interpreted => None,
            FrameMode::Compiled(code) => Some(code),
        }
    }
}

/// Logical view of a call stack, innermost frame first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackSnapshot {
    frames: Vec<VFrame>,
}

impl StackSnapshot {
    /// Flatten physical frames (bottom first) into logical frames (top first)
    pub fn capture(stack: &[CallFrame]) -> Self {
        let mut frames = Vec::with_capacity(stack.len());
        for (physical_index, frame) in stack.iter().enumerate().rev() {
            let mode = match frame.code() {
                Some(code) => FrameMode::Compiled(code),
                None => FrameMode::Interpreted,
            };
            for scope in frame.scopes().into_iter().rev() {
                frames.push(VFrame {
                    method: scope.method,
                    bci: scope.bci,
                    mode,
                    depth: frames.len(),
                    physical_index,
                });
            }
        }
        Self { frames }
    }

    /// Number of logical frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the stack has no managed frame
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Innermost logical frame
    pub fn top(&self) -> Option<&VFrame> {
        self.frames.first()
    }

    /// Logical frame at `depth`
    pub fn at(&self, depth: usize) -> Option<&VFrame> {
        self.frames.get(depth)
    }

    /// Walk the sender chain from the innermost frame
    pub fn iter(&self) -> std::slice::Iter<'_, VFrame> {
        self.frames.iter()
    }

    /// Whether any logical frame belongs to `method`
    pub fn contains_method(&self, method: MethodId) -> bool {
        self.frames.iter().any(|vf| vf.method == method)
    }
}

impl<'a> IntoIterator for &'a StackSnapshot {
    type Item = &'a VFrame;
    type IntoIter = std::slice::Iter<'a, VFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
