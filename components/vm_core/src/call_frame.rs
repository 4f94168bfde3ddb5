//! Physical call frames

use core_types::{Bci, CodeId, MethodId};

/// One method activation inside a compiled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeDesc {
    /// Method of this activation
    pub method: MethodId,
    /// Current bytecode index of this activation
    pub bci: Bci,
}

impl ScopeDesc {
    /// Create a scope at the method entry
    pub fn new(method: MethodId) -> Self {
        Self { method, bci: 0 }
    }
}

/// Physical frame on a thread's call stack
///
/// A compiled frame may carry inlined callees; each of them is a separate
/// logical frame even though they share one physical frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallFrame {
    /// Frame executed by the interpreter
    Interpreted {
        /// Executing method
        method: MethodId,
        /// Current bytecode index
        bci: Bci,
    },
    /// Frame executing compiled code
    Compiled {
        /// Artifact the frame is running
        code: CodeId,
        /// Method the artifact was compiled for
        root: ScopeDesc,
        /// Inlined activations, outermost first
        inlined: Vec<ScopeDesc>,
    },
}

impl CallFrame {
    /// Create an interpreted frame at the method entry
    pub fn interpreted(method: MethodId) -> Self {
        CallFrame::Interpreted { method, bci: 0 }
    }

    /// Create a compiled frame at the method entry
    pub fn compiled(code: CodeId, method: MethodId) -> Self {
        CallFrame::Compiled {
            code,
            root: ScopeDesc::new(method),
            inlined: Vec::new(),
        }
    }

    /// Method owning the physical frame
    pub fn method(&self) -> MethodId {
        match self {
            CallFrame::Interpreted { method, .. } => *method,
            CallFrame::Compiled { root, .. } => root.method,
        }
    }

    /// Whether the frame is interpreted
    pub fn is_interpreted(&self) -> bool {
        matches!(self, CallFrame::Interpreted { .. })
    }

    /// Artifact a compiled frame is running
    pub fn code(&self) -> Option<CodeId> {
        match self {
            CallFrame::Interpreted { .. } => None,
            CallFrame::Compiled { code, .. } => Some(*code),
        }
    }

    /// Number of logical frames this physical frame expands to
    pub fn logical_count(&self) -> usize {
        match self {
            CallFrame::Interpreted { .. } => 1,
            CallFrame::Compiled { inlined, .. } => 1 + inlined.len(),
        }
    }

    /// Logical activations, outermost first
    pub fn scopes(&self) -> Vec<ScopeDesc> {
        match self {
            CallFrame::Interpreted { method, bci } => vec![ScopeDesc {
                method: *method,
                bci: *bci,
            }],
            CallFrame::Compiled { root, inlined, .. } => {
                std::iter::once(*root).chain(inlined.iter().copied()).collect()
            }
        }
    }

    /// Convert into interpreted frames, outermost first.
    ///
    /// This is the frame rewrite a deoptimization performs: every inlined
    /// activation gets its own interpreter frame resuming at its bci.
    pub fn unpack(&self) -> Vec<CallFrame> {
        self.scopes()
            .into_iter()
            .map(|scope| CallFrame::Interpreted {
                method: scope.method,
                bci: scope.bci,
            })
            .collect()
    }
}
